//! State carried through one render pass.
//!
//! A [`RenderContext`] is built once per frame and threaded by `&mut`
//! through every tag evaluation of that frame. It borrows the module
//! registry, configuration snapshot and command runner, and owns the
//! mutable color bookkeeping plus the list of recovered errors.
//!
//! # Example
//!
//! ```rust
//! use tagfetch_exec::ShellRunner;
//! use tagfetch_render::{ModuleRegistry, OutputTarget, RenderContext, YamlConfig};
//!
//! let registry = ModuleRegistry::new().with("os.name", |_, _| "Linux".to_string());
//! let config = YamlConfig::new();
//! let runner = ShellRunner::new();
//!
//! let mut ctx = RenderContext::new(&registry, &config, &runner)
//!     .with_target(OutputTarget::Terminal);
//! assert_eq!(ctx.resolve("OS is $<os.name>"), "OS is Linux");
//! assert!(ctx.diagnostics.is_empty());
//! ```

use crate::color::ColorState;
use crate::config::ConfigProvider;
use crate::error::RenderError;
use crate::registry::ModuleRegistry;
use tagfetch_exec::CommandRunner;

/// Where rendered lines will be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    /// ANSI escape sequences.
    #[default]
    Terminal,
    /// Pango `<span>` markup.
    Gui,
}

pub struct RenderContext<'a> {
    pub registry: &'a ModuleRegistry,
    pub config: &'a dyn ConfigProvider,
    pub runner: &'a dyn CommandRunner,
    pub target: OutputTarget,
    /// Set while rendering logo art: no separator resets, and emitted
    /// colors are collected for `${auto}`.
    pub parsing_logo_art: bool,
    pub colors: ColorState,
    /// Every error recovered during this render, in order.
    pub diagnostics: Vec<RenderError>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        registry: &'a ModuleRegistry,
        config: &'a dyn ConfigProvider,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            registry,
            config,
            runner,
            target: OutputTarget::Terminal,
            parsing_logo_art: false,
            colors: ColorState::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    /// Records a recovered error and logs it.
    pub fn report(&mut self, err: RenderError) {
        log::warn!("{}", err);
        self.diagnostics.push(err);
    }
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("registry", self.registry)
            .field("target", &self.target)
            .field("parsing_logo_art", &self.parsing_logo_art)
            .field("colors", &self.colors)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
