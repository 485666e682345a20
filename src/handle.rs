//! Handle identifiers.
//!
//! A handle is a connection point on a node. Edges name the exact ports they connect
//! through two string ids, `sourceHandle` and `targetHandle`, built here from a port
//! index and a direction:
//!
//! ```
//! use aiflow::handle::{self, HandleId};
//!
//! assert_eq!(handle::encode(2, true), "handle-out-2");
//! assert_eq!(handle::decode("handle-in-0").unwrap(), HandleId::input(0));
//! ```

use crate::error::HandleError;
use std::fmt;
use std::str::FromStr;

pub const INPUT_PREFIX: &str = "handle-in";
pub const OUTPUT_PREFIX: &str = "handle-out";
pub const SEPARATOR: char = '-';

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleDirection {
    Input,
    Output,
}

impl HandleDirection {
    fn prefix(self) -> &'static str {
        match self {
            HandleDirection::Input => INPUT_PREFIX,
            HandleDirection::Output => OUTPUT_PREFIX,
        }
    }
}

/// A decoded handle: the port index on a node plus its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    pub index: u32,
    pub direction: HandleDirection,
}

impl HandleId {
    pub fn new(index: u32, direction: HandleDirection) -> Self {
        Self { index, direction }
    }

    pub fn input(index: u32) -> Self {
        Self::new(index, HandleDirection::Input)
    }

    pub fn output(index: u32) -> Self {
        Self::new(index, HandleDirection::Output)
    }

    pub fn is_output(&self) -> bool {
        self.direction == HandleDirection::Output
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.direction.prefix(), SEPARATOR, self.index)
    }
}

impl FromStr for HandleId {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Encodes a port index and direction into a handle id string.
pub fn encode(port_index: u32, is_output: bool) -> String {
    let direction = if is_output {
        HandleDirection::Output
    } else {
        HandleDirection::Input
    };
    HandleId::new(port_index, direction).to_string()
}

/// Decodes a handle id produced by [`encode`].
///
/// The prefix must be one of the two known namespaces and the segment after the last
/// separator must be a non-negative integer.
pub fn decode(handle_id: &str) -> Result<HandleId, HandleError> {
    let (prefix, _) = handle_id
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| HandleError::NotAHandleId(handle_id.to_string()))?;

    let direction = match prefix {
        INPUT_PREFIX => HandleDirection::Input,
        OUTPUT_PREFIX => HandleDirection::Output,
        _ => return Err(HandleError::NotAHandleId(handle_id.to_string())),
    };

    let index =
        port_index(handle_id).ok_or_else(|| HandleError::NotAHandleId(handle_id.to_string()))?;
    Ok(HandleId::new(index, direction))
}

/// Extracts the trailing port index of any `<prefix>-<index>` style id.
///
/// Unlike [`decode`] this does not check the prefix, so ids from other editors
/// (`"output-2"`, `"input-0"`) still resolve to a port.
pub fn port_index(handle_id: &str) -> Option<u32> {
    handle_id.rsplit(SEPARATOR).next()?.parse().ok()
}
