//! Module registry: dotted paths mapped to text-producing handlers.
//!
//! Information tags (`$<os.name>`) are resolved here. A handler receives the
//! arguments collected from the tag path and the live [`RenderContext`], and
//! returns text. Lookup distinguishes "not registered" (`None`) from a
//! handler that returned an empty string.
//!
//! # Example
//!
//! ```rust
//! use tagfetch_render::{ModuleArgs, ModuleRegistry};
//!
//! let registry = ModuleRegistry::new()
//!     .with("user.name", |_, _| "toni".to_string())
//!     .with("disk.used", |args, _| {
//!         format!("used on {}", args.get("disk").unwrap_or("/"))
//!     });
//!
//! assert!(registry.contains("user.name"));
//! assert!(!registry.contains("user.shell"));
//! ```

use crate::context::RenderContext;
use std::collections::HashMap;
use std::fmt;

/// Handlers return this to drop the layout line they appear on.
pub const CUT_LINE: &str = "(cut this line)";

/// Text spliced in for an information tag with no registered module.
pub const UNKNOWN_MODULE: &str = "(unknown/invalid module)";

/// Arguments collected from an information tag path, in source order.
///
/// `$<disk(/home).used>` yields one argument named `disk` with value
/// `/home`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleArgs {
    pairs: Vec<(String, String)>,
}

impl ModuleArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Value of the first argument named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<(String, String)>> for ModuleArgs {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

/// A module handler.
pub type ModuleHandler = Box<dyn Fn(&ModuleArgs, &RenderContext<'_>) -> String>;

/// Dotted path → handler table.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleHandler>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `path`, replacing any previous handler.
    pub fn register<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&ModuleArgs, &RenderContext<'_>) -> String + 'static,
    {
        self.modules.insert(path.into(), Box::new(handler));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ModuleArgs, &RenderContext<'_>) -> String + 'static,
    {
        self.register(path, handler);
        self
    }

    /// Registers a module that always returns `text`.
    pub fn register_static(&mut self, path: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        self.register(path, move |_, _| text.clone());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Runs the handler for `path`, or returns `None` if there is none.
    pub fn resolve(&self, path: &str, args: &ModuleArgs, ctx: &RenderContext<'_>) -> Option<String> {
        let handler = self.modules.get(path)?;
        log::debug!("resolving module `{}` with {} argument(s)", path, args.len());
        Some(handler(args, ctx))
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}
