//! Configuration snapshot consulted while rendering.
//!
//! The renderer never parses configuration files. It reads typed values
//! through [`ConfigProvider`], addressing them by dotted path
//! (`config.sep-reset`, `gui.red`, ...). Every getter takes an explicit
//! fallback that is returned when the key is absent or holds a value of the
//! wrong type.
//!
//! [`YamlConfig`] is the provided implementation: a [`serde_yaml::Value`]
//! tree built from YAML text.
//!
//! # Example
//!
//! ```rust
//! use tagfetch_render::{ConfigProvider, YamlConfig};
//!
//! let config = YamlConfig::from_yaml(r#"
//! config:
//!   sep-reset: "->"
//!   percentage-colors: [blue, cyan, magenta]
//! "#).unwrap();
//!
//! assert_eq!(config.separator(), "->");
//! assert!(!config.separator_reset_after());
//! assert_eq!(config.percentage_colors(), ["blue", "cyan", "magenta"]);
//! ```

use crate::color::default_palette_color;
use crate::context::OutputTarget;
use crate::error::RenderError;
use serde_yaml::{Mapping, Value};
use std::time::Duration;

/// Typed, read-only access to a configuration snapshot.
///
/// Implementors supply the four primitive getters; the named lookups the
/// renderer uses are provided on top of them.
pub trait ConfigProvider {
    fn string(&self, path: &str, fallback: &str) -> String;

    fn bool(&self, path: &str, fallback: bool) -> bool;

    fn int(&self, path: &str, fallback: i64) -> i64;

    fn string_array(&self, path: &str, fallback: &[&str]) -> Vec<String>;

    /// Separator that triggers an automatic color reset. Empty disables it.
    fn separator(&self) -> String {
        self.string("config.sep-reset", ":")
    }

    /// Whether the automatic reset goes after the separator instead of before.
    fn separator_reset_after(&self) -> bool {
        self.bool("config.sep-reset-after", false)
    }

    /// The `[good, normal, bad]` colors used by percentage tags.
    ///
    /// Missing trailing entries are taken from the default palette.
    fn percentage_colors(&self) -> [String; 3] {
        const DEFAULTS: [&str; 3] = ["green", "yellow", "red"];
        let configured = self.string_array("config.percentage-colors", &DEFAULTS);
        let mut colors = DEFAULTS.map(String::from);
        for (slot, value) in colors.iter_mut().zip(configured) {
            *slot = value;
        }
        colors
    }

    /// Color aliases as `(name, value)` pairs, from `name=value` entries.
    fn alias_colors(&self) -> Vec<(String, String)> {
        self.string_array("config.alias-colors", &[])
            .into_iter()
            .filter_map(|entry| match entry.split_once('=') {
                Some((name, value)) => Some((name.to_string(), value.to_string())),
                None => {
                    log::warn!("alias color `{}` has no `=` separating name and value", entry);
                    None
                }
            })
            .collect()
    }

    /// The configured value of one of the eight palette names.
    ///
    /// Returns `None` if `name` is not a palette name.
    fn palette_color(&self, name: &str, target: OutputTarget) -> Option<String> {
        let fallback = default_palette_color(name, target)?;
        let section = match target {
            OutputTarget::Terminal => "config",
            OutputTarget::Gui => "gui",
        };
        Some(self.string(&format!("{}.{}", section, name), fallback))
    }

    /// Character repeated to expand `fill` markers.
    fn box_horizontal(&self) -> String {
        self.string("config.box-chars.horizontal", "")
    }

    fn commands_disabled(&self) -> bool {
        self.bool("intern.args.disallow-commands", false)
    }

    fn colors_disabled(&self) -> bool {
        self.bool("intern.args.disable-colors", false)
    }

    /// Command tag timeout; `None` when unset or not positive.
    fn command_timeout(&self) -> Option<Duration> {
        match self.int("config.command-timeout-ms", 0) {
            ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        }
    }
}

/// A configuration snapshot held as a YAML value tree.
///
/// Dotted paths walk nested mappings: `config.box-chars.horizontal` reads
/// the `horizontal` key of the `box-chars` mapping under `config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YamlConfig {
    root: Value,
}

impl YamlConfig {
    /// Creates an empty snapshot; every lookup returns its fallback.
    pub fn new() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    /// Parses a snapshot from YAML text.
    ///
    /// An empty document is an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] if the text is not valid YAML or its
    /// top level is not a mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        let root: Value = serde_yaml::from_str(yaml)?;
        match root {
            Value::Mapping(_) => Ok(Self { root }),
            Value::Null => Ok(Self::new()),
            other => Err(RenderError::Config(format!(
                "top level must be a mapping, found {}",
                value_kind(&other)
            ))),
        }
    }

    /// Returns the raw value at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |node, key| node.as_mapping()?.get(key))
    }

    /// Sets the value at `path`, creating intermediate mappings.
    ///
    /// A non-mapping value on the way is replaced by a mapping.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let mut node = &mut self.root;
        let mut keys = path.split('.').peekable();
        while let Some(key) = keys.next() {
            if !node.is_mapping() {
                *node = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(map) = node else {
                return;
            };
            let key = Value::String(key.to_string());
            if keys.peek().is_none() {
                map.insert(key, value.into());
                return;
            }
            node = map
                .entry(key)
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }
    }

    /// Flattens the mapping at `path` into `(dotted.key, text)` pairs.
    ///
    /// Scalars are rendered as text; sequences of scalars are joined with
    /// newlines. Keys are relative to `path`. Returns an empty list if
    /// there is no mapping at `path`.
    pub fn flatten(&self, path: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(Value::Mapping(map)) = self.get(path) {
            flatten_into(map, "", &mut out);
        }
        out
    }
}

fn flatten_into(map: &Mapping, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let Some(key) = scalar_text(key) else {
            continue;
        };
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Mapping(inner) => flatten_into(inner, &path, out),
            Value::Sequence(items) => {
                let lines: Vec<String> = items.iter().filter_map(scalar_text).collect();
                out.push((path, lines.join("\n")));
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    out.push((path, text));
                }
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

impl ConfigProvider for YamlConfig {
    fn string(&self, path: &str, fallback: &str) -> String {
        match self.get(path) {
            Some(Value::String(s)) => s.clone(),
            _ => fallback.to_string(),
        }
    }

    fn bool(&self, path: &str, fallback: bool) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(fallback)
    }

    fn int(&self, path: &str, fallback: i64) -> i64 {
        self.get(path).and_then(Value::as_i64).unwrap_or(fallback)
    }

    fn string_array(&self, path: &str, fallback: &[&str]) -> Vec<String> {
        let strings = match self.get(path) {
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| item.as_str().map(String::from))
                .collect::<Option<Vec<_>>>(),
            _ => None,
        };
        strings.unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
    }
}
