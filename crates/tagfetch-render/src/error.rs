//! Error types for layout rendering.
//!
//! Almost every [`RenderError`] is recoverable: the renderer logs it,
//! records it in the context's diagnostics and keeps going, emitting the
//! offending span literally or a placeholder. A malformed layout line never
//! aborts a render. The one exception is [`RenderError::Config`], returned
//! when a configuration snapshot cannot be built at all.

use tagfetch_scan::{ScanError, TagKind};
use thiserror::Error;

/// Error type for rendering operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A tag's closing delimiter is missing.
    #[error("unterminated {kind} at byte {offset}")]
    UnterminatedTag { kind: TagKind, offset: usize },

    /// A conditional tag with fewer than four fields.
    #[error("conditional tag `{source_text}` needs 4 fields, found {found}")]
    MalformedConditional { source_text: String, found: usize },

    /// No module is registered under the dotted path.
    #[error("unknown module `{0}`")]
    ModuleNotFound(String),

    /// A command tag was reached while command execution is disabled.
    #[error("command tag `{0}` not executed: command tags are disabled")]
    CommandExecutionDisabled(String),

    /// The command could not be spawned, read, or timed out.
    #[error("command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// A color tag payload that names no color.
    #[error("invalid color `{spec}`: {reason}")]
    ColorSpecInvalid { spec: String, reason: String },

    /// A percentage operand that does not parse as a number.
    #[error("percentage operand `{0}` is not a number")]
    InvalidNumber(String),

    /// A `room` marker line without a following `endroom`. Holds the
    /// zero-based index of the layout line carrying the marker.
    #[error("`room` marker on layout line {0} has no matching `endroom`")]
    UnterminatedRoom(usize),

    /// The configuration snapshot could not be built.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RenderError {
    /// Wraps a scanner error, attaching the tag source for context.
    pub fn from_scan(err: ScanError, source_text: &str) -> Self {
        match err {
            ScanError::UnterminatedTag { kind, offset } => {
                RenderError::UnterminatedTag { kind, offset }
            }
            ScanError::MalformedConditional { found } => RenderError::MalformedConditional {
                source_text: source_text.to_string(),
                found,
            },
        }
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}
