use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Comparison applied by a single [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "not equals")]
    NotEquals,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
    #[serde(rename = "greater than")]
    GreaterThan,
    #[serde(rename = "less than")]
    LessThan,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "not exists")]
    NotExists,
    /// An operator this crate does not know; never holds.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logic {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(other)]
    Unsupported,
}

/// Compares one field of the node against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

/// Combines nested conditions with a boolean operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub logic: Logic,
    pub conditions: Vec<FieldCondition>,
}

/// Visibility rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldCondition {
    Group(ConditionGroup),
    Single(Condition),
}

/// Evaluates a field condition against the node's current values.
///
/// A missing condition always holds, as does an empty group. Unsupported operators and
/// logic never hold.
pub fn evaluate_condition(condition: Option<&FieldCondition>, values: &Map<String, Value>) -> bool {
    match condition {
        None => true,
        Some(FieldCondition::Group(group)) => {
            if group.conditions.is_empty() {
                tracing::warn!("condition group has no conditions");
                return true;
            }
            let mut results = group
                .conditions
                .iter()
                .map(|c| evaluate_condition(Some(c), values));
            match group.logic {
                Logic::And => results.all(|r| r),
                Logic::Or => results.any(|r| r),
                Logic::Unsupported => {
                    tracing::warn!("unsupported condition group logic");
                    false
                }
            }
        }
        Some(FieldCondition::Single(condition)) => evaluate_single(condition, values),
    }
}

fn evaluate_single(condition: &Condition, values: &Map<String, Value>) -> bool {
    let field_value = values.get(&condition.field).filter(|v| !v.is_null());

    match condition.operator {
        Operator::Equals => field_value.is_some_and(|v| loosely_equal(v, &condition.value)),
        Operator::NotEquals => !field_value.is_some_and(|v| loosely_equal(v, &condition.value)),
        Operator::In => match (&condition.value, field_value) {
            (Value::Array(items), Some(v)) => items.iter().any(|item| loosely_equal(item, v)),
            _ => false,
        },
        Operator::NotIn => match &condition.value {
            Value::Array(items) => {
                !field_value.is_some_and(|v| items.iter().any(|item| loosely_equal(item, v)))
            }
            _ => false,
        },
        Operator::GreaterThan => compare_numbers(field_value, &condition.value, |a, b| a > b),
        Operator::LessThan => compare_numbers(field_value, &condition.value, |a, b| a < b),
        Operator::Exists => field_value.is_some(),
        Operator::NotExists => field_value.is_none(),
        Operator::Unsupported => {
            tracing::warn!(field = %condition.field, "unsupported condition operator");
            false
        }
    }
}

// Integers and floats with the same numeric value compare equal.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_numbers(field_value: Option<&Value>, target: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (field_value.and_then(Value::as_f64), target.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
