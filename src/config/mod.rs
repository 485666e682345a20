//! Node configuration schema.
//!
//! A `NodeConfig` describes what a processor type looks like in the editor: its
//! declared fields, which of them are mandatory, the names of its input slots and the
//! kind of output it produces. Field values themselves live in the node's data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod condition;
mod registry;

pub use condition::*;
pub use registry::*;

/// Editor widget used for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    Input,
    InputInt,
    Textarea,
    Select,
    Option,
    InputNameBar,
    Boolean,
    Slider,
    Textfield,
    Numericfield,
    Switch,
    TextToDisplay,
    List,
    Json,
    NonRendered,
    Dictionnary,
    FileUpload,
    ImageMaskCreator,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Whether fields of this type expose an input handle that an edge can feed.
    pub fn has_handle(self) -> bool {
        !matches!(
            self,
            FieldType::Select | FieldType::Option | FieldType::Boolean | FieldType::Slider
        )
    }
}

/// Kind of data a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputType {
    ImageUrl,
    VideoUrl,
    AudioUrl,
    PdfUrl,
    ImageBase64,
    Markdown,
    Text,
    FileUrl,
    #[serde(rename = "3dUrl")]
    ThreeDUrl,
    #[serde(other)]
    Unknown,
}

/// Palette section a processor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    Models,
    ImageGeneration,
    Tools,
    Input,
    #[serde(other)]
    Unknown,
}

/// One choice of a `select`/`option` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

/// A declared field of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_handle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FieldCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presentation hints (`min`, `max`, `step`, ...) kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Field {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            label: None,
            placeholder: None,
            default_value: None,
            required: false,
            hidden: false,
            has_handle: None,
            options: None,
            condition: None,
            description: None,
            extra: Map::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Whether an edge can be wired into this field.
    pub fn accepts_handle(&self) -> bool {
        self.has_handle
            .unwrap_or_else(|| self.field_type.has_handle())
    }

    /// Whether the field is shown for the given node values.
    pub fn is_visible(&self, values: &Map<String, Value>) -> bool {
        !self.hidden && evaluate_condition(self.condition.as_ref(), values)
    }
}

/// Describes a processor type: its fields, input slots and output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<String>,
    #[serde(default)]
    pub node_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_names: Option<Vec<String>>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_input_handle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeConfig {
    pub fn new(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_processor_type(mut self, processor_type: &str) -> Self {
        self.processor_type = Some(processor_type.to_string());
        self
    }

    pub fn with_input_names(mut self, names: &[&str]) -> Self {
        self.input_names = Some(names.iter().map(|n| n.to_string()).collect());
        self.has_input_handle = Some(true);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    pub fn with_section(mut self, section: SectionType) -> Self {
        self.section = Some(section);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name of the input slot at `port`, when the node declares named inputs.
    pub fn input_name(&self, port: usize) -> Option<&str> {
        self.input_names.as_ref()?.get(port).map(String::as_str)
    }

    /// Port index of the named input slot.
    pub fn input_port(&self, input_name: &str) -> Option<usize> {
        self.input_names
            .as_ref()?
            .iter()
            .position(|n| n == input_name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }

    /// The subset of the configuration carried inside exported documents.
    pub fn essentials(&self) -> NodeConfig {
        NodeConfig {
            processor_type: None,
            node_name: self.node_name.clone(),
            icon: String::new(),
            input_names: self.input_names.clone(),
            fields: self.fields.clone(),
            output_type: self.output_type,
            has_input_handle: self.has_input_handle,
            section: None,
            help_message: None,
            extra: Map::new(),
        }
    }
}
