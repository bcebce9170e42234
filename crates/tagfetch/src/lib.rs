//! # tagfetch - System Information From Tagged Layouts
//!
//! `tagfetch` shows a layout of system information next to a logo. The
//! layout is plain text with embedded tags, rendered by
//! [`tagfetch_render`]; this crate composes the rendered layout with the
//! logo art into frames and can redraw them live.
//!
//! - [`display`]: frame composition and its geometry options
//! - [`live`]: the redraw loop and its quit signal
//! - [`static_registry`]: modules declared directly in the configuration
//!
//! ```rust
//! use tagfetch::{display::Display, layout_lines, static_registry};
//! use tagfetch_exec::ShellRunner;
//! use tagfetch_render::YamlConfig;
//!
//! let config = YamlConfig::from_yaml(r#"
//! modules:
//!   os:
//!     name: Linux
//! layout:
//!   - "OS $<os.name>"
//! intern:
//!   args:
//!     disable-colors: true
//! "#).unwrap();
//!
//! let registry = static_registry(&config);
//! let runner = ShellRunner::new();
//! let empty: [&str; 0] = [];
//! let frame = Display::new(&registry, &config, &runner)
//!     .compose(&empty, &layout_lines(&config));
//! assert_eq!(frame.lines, [" OS Linux"]);
//! ```

pub mod display;
pub mod live;

pub use display::{Display, DisplayOptions, Frame, LogoPosition};
pub use live::{KeyboardQuit, LiveLoop, QuitSignal};

use tagfetch_render::{ConfigProvider, ModuleRegistry, YamlConfig};

/// Builds a registry from the `modules:` mapping of `config`.
///
/// Every leaf becomes a module at its dotted path that always returns the
/// leaf's text; a list of strings becomes a multi-line module.
pub fn static_registry(config: &YamlConfig) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for (path, text) in config.flatten("modules") {
        registry.register_static(path, text);
    }
    log::debug!("registered {} static modules", registry.len());
    registry
}

/// Layout lines declared under `layout:`.
pub fn layout_lines(config: &dyn ConfigProvider) -> Vec<String> {
    config.string_array("layout", &[])
}

/// Splits file contents into lines, dropping the trailing empty line a
/// final newline would leave.
pub fn text_lines(text: &str) -> Vec<String> {
    text.lines().map(String::from).collect()
}
