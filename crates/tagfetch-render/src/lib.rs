//! # tagfetch-render - Layout Tag Rendering
//!
//! `tagfetch-render` turns layout text into display lines. Layouts embed a
//! small tag language; this crate resolves it against a module registry and
//! a configuration snapshot, then aligns the result into boxes.
//!
//! ## Core Concepts
//!
//! - [`RenderContext`]: per-render state; owns the color tracker and the
//!   list of recovered errors
//! - [`ModuleRegistry`]: dotted path → handler, backing `$<info>` tags
//! - [`ConfigProvider`] / [`YamlConfig`]: typed configuration lookups
//! - [`BoxLayout`]: the `room` / `$<pin>` / `$<fill>` alignment pass
//!
//! ## Tags
//!
//! | tag | result |
//! |---|---|
//! | `$<os.name>` | module text |
//! | `$(uname -r)` | command stdout, one trailing newline stripped |
//! | `$[a,b,then,else]` | `then` if `a == b`, else `else` |
//! | `${red}` | color change |
//! | `$%used,total%` | colored percentage |
//!
//! Tags nest freely and `\` escapes the next character.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagfetch_exec::ShellRunner;
//! use tagfetch_render::{render_layout, ModuleRegistry, RenderContext, YamlConfig};
//!
//! let registry = ModuleRegistry::new()
//!     .with("os.name", |_, _| "Linux".to_string())
//!     .with("user.name", |_, _| "toni".to_string());
//! let config = YamlConfig::from_yaml("config:\n  box-chars:\n    horizontal: \"-\"\n").unwrap();
//! let runner = ShellRunner::new();
//! let mut ctx = RenderContext::new(&registry, &config, &runner);
//!
//! let lines = render_layout(&mut ctx, &[
//!     "room",
//!     "OS$<pin> $<os.name>",
//!     "User$<pin> $<user.name>",
//!     "$<fill>",
//!     "endroom",
//! ]);
//! assert_eq!(lines, ["OS   Linux", "User  toni", "----------"]);
//! ```
//!
//! ## Errors
//!
//! Rendering never fails. Malformed tags are emitted literally, unknown
//! modules become a placeholder, and every such event is logged and kept in
//! [`RenderContext::diagnostics`].

pub mod color;
pub mod config;
pub mod context;
pub mod error;
mod evaluate;
pub mod layout;
mod line;
pub mod percentage;
pub mod registry;
pub mod width;

pub use color::{ColorSpec, ColorState};
pub use config::{ConfigProvider, YamlConfig};
pub use context::{OutputTarget, RenderContext};
pub use error::RenderError;
pub use layout::{BoxLayout, RoomLayoutInfo};
pub use registry::{ModuleArgs, ModuleHandler, ModuleRegistry, CUT_LINE, UNKNOWN_MODULE};
pub use width::{visual_width, FILL_MARKER, PIN_MARKER};

pub type Result<T> = std::result::Result<T, RenderError>;

/// Renders layout lines and runs the box layout pass over the result.
///
/// Cut lines are dropped before boxes are measured. An unterminated room is
/// recorded in the context's diagnostics against the layout line that opened
/// it.
pub fn render_layout<S: AsRef<str>>(ctx: &mut RenderContext<'_>, lines: &[S]) -> Vec<String> {
    let (sources, rendered): (Vec<usize>, Vec<String>) =
        ctx.render_lines_with_source(lines).into_iter().unzip();
    let (laid_out, unterminated) = BoxLayout::from_config(ctx.config).apply(&rendered);
    if let Some(RenderError::UnterminatedRoom(row)) = unterminated {
        let line = sources.get(row).copied().unwrap_or(row);
        ctx.report(RenderError::UnterminatedRoom(line));
    }
    laid_out
}
