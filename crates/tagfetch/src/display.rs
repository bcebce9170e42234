//! Frame composition: logo art beside (or above) the rendered layout.
//!
//! A frame is rendered from scratch every time [`Display::compose`] runs.
//! The art goes first so that the colors it emits are available to
//! `${auto}` tags in the layout.

use std::str::FromStr;

use tagfetch_exec::CommandRunner;
use tagfetch_render::color::RESET;
use tagfetch_render::{
    render_layout, visual_width, ConfigProvider, ModuleRegistry, OutputTarget, RenderContext,
    RenderError,
};

/// Where the logo art goes relative to the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoPosition {
    #[default]
    Left,
    Top,
}

impl FromStr for LogoPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "top" => Ok(Self::Top),
            other => Err(format!("unknown logo position `{}`", other)),
        }
    }
}

/// Frame geometry read from `config.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Columns between the widest art row and the layout.
    pub offset: usize,
    pub logo_padding_left: usize,
    pub logo_padding_top: usize,
    pub layout_padding_top: usize,
    pub logo_position: LogoPosition,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            offset: 5,
            logo_padding_left: 0,
            logo_padding_top: 0,
            layout_padding_top: 0,
            logo_position: LogoPosition::Left,
        }
    }
}

impl DisplayOptions {
    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        let defaults = Self::default();
        let count = |path: &str, fallback: usize| {
            let value = config.int(path, fallback as i64);
            usize::try_from(value).unwrap_or_else(|_| {
                log::warn!("`{}` must not be negative, got {}", path, value);
                fallback
            })
        };
        let position = config.string("config.logo-position", "left");

        Self {
            offset: count("config.offset", defaults.offset),
            logo_padding_left: count("config.logo-padding-left", defaults.logo_padding_left),
            logo_padding_top: count("config.logo-padding-top", defaults.logo_padding_top),
            layout_padding_top: count("config.layout-padding-top", defaults.layout_padding_top),
            logo_position: position.parse().unwrap_or_else(|err| {
                log::warn!("{}, using `left`", err);
                LogoPosition::Left
            }),
        }
    }
}

/// A composed frame and everything recovered while rendering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
    pub diagnostics: Vec<RenderError>,
}

/// Renders frames against a fixed registry, configuration and runner.
pub struct Display<'a> {
    registry: &'a ModuleRegistry,
    config: &'a dyn ConfigProvider,
    runner: &'a dyn CommandRunner,
    target: OutputTarget,
    options: DisplayOptions,
}

impl<'a> Display<'a> {
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
            options: DisplayOptions::from_config(config),
        }
    }

    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    /// Renders one frame.
    ///
    /// The GUI target always stacks the art above the layout: markup has
    /// no column width to align against. Without art the layout is set one
    /// column in instead of `offset`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tagfetch::display::Display;
    /// use tagfetch_exec::ShellRunner;
    /// use tagfetch_render::{ModuleRegistry, YamlConfig};
    ///
    /// let registry = ModuleRegistry::new().with("os.name", |_, _| "Linux".to_string());
    /// let config = YamlConfig::from_yaml(
    ///     "config:\n  offset: 2\nintern:\n  args:\n    disable-colors: true\n",
    /// ).unwrap();
    /// let runner = ShellRunner::new();
    ///
    /// let frame = Display::new(&registry, &config, &runner)
    ///     .compose(&["<o>", "/|"], &["OS: $<os.name>"]);
    /// assert_eq!(frame.lines, ["<o>  OS: Linux", "/|"]);
    /// ```
    pub fn compose<A, L>(&self, art: &[A], layout: &[L]) -> Frame
    where
        A: AsRef<str>,
        L: AsRef<str>,
    {
        let mut ctx = RenderContext::new(self.registry, self.config, self.runner)
            .with_target(self.target);

        ctx.parsing_logo_art = true;
        let art = ctx.render_lines(art);
        ctx.parsing_logo_art = false;
        let layout = render_layout(&mut ctx, layout);

        let wrap = self.target == OutputTarget::Terminal && !self.config.colors_disabled();
        let mut layout_rows = vec![String::new(); self.options.layout_padding_top];
        layout_rows.extend(layout.into_iter().map(|row| {
            if wrap {
                format!("{}{}{}", RESET, row, RESET)
            } else {
                row
            }
        }));

        let offset = if art.is_empty() { 1 } else { self.options.offset };
        let mut art_rows = vec![String::new(); self.options.logo_padding_top];
        art_rows.extend(art);

        let stacked = self.options.logo_position == LogoPosition::Top
            || self.target == OutputTarget::Gui;
        let lines = if stacked {
            self.stack(art_rows, layout_rows)
        } else {
            self.side_by_side(&art_rows, layout_rows, offset)
        };

        Frame {
            lines,
            diagnostics: ctx.diagnostics,
        }
    }

    fn stack(&self, art: Vec<String>, layout: Vec<String>) -> Vec<String> {
        let indent = " ".repeat(self.options.logo_padding_left);
        art.into_iter()
            .map(|row| format!("{}{}", indent, row))
            .chain(layout)
            .collect()
    }

    fn side_by_side(&self, art: &[String], layout: Vec<String>, offset: usize) -> Vec<String> {
        let indent = " ".repeat(self.options.logo_padding_left);
        let art_width = art.iter().map(|row| visual_width(row)).max().unwrap_or(0);
        let rows = art.len().max(layout.len());

        let mut layout = layout.into_iter();
        (0..rows)
            .map(|i| {
                let art_row = art.get(i).map_or("", String::as_str);
                match layout.next() {
                    Some(layout_row) => {
                        let gap = art_width + offset - visual_width(art_row);
                        format!("{}{}{}{}", indent, art_row, " ".repeat(gap), layout_row)
                    }
                    None => format!("{}{}", indent, art_row),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagfetch_exec::{CommandOutput, ShellError};
    use tagfetch_render::YamlConfig;

    fn no_shell(cmd: &str) -> Result<CommandOutput, ShellError> {
        Ok(CommandOutput::from_stdout(cmd))
    }

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new()
            .with("os.name", |_, _| "Linux".to_string())
            .with("user.name", |_, _| "toni".to_string())
    }

    fn compose(yaml: &str, art: &[&str], layout: &[&str]) -> Frame {
        let registry = registry();
        let config = YamlConfig::from_yaml(yaml).unwrap();
        let runner = no_shell;
        Display::new(&registry, &config, &runner).compose(art, layout)
    }

    const NO_COLORS: &str = "intern:\n  args:\n    disable-colors: true\n";

    mod options {
        use super::*;

        #[test]
        fn defaults() {
            assert_eq!(
                DisplayOptions::from_config(&YamlConfig::new()),
                DisplayOptions::default()
            );
        }

        #[test]
        fn read_from_config() {
            let config = YamlConfig::from_yaml(
                "config:\n  offset: 2\n  logo-padding-left: 1\n  logo-padding-top: 3\n  layout-padding-top: 4\n  logo-position: Top\n",
            )
            .unwrap();
            assert_eq!(
                DisplayOptions::from_config(&config),
                DisplayOptions {
                    offset: 2,
                    logo_padding_left: 1,
                    logo_padding_top: 3,
                    layout_padding_top: 4,
                    logo_position: LogoPosition::Top,
                }
            );
        }

        #[test]
        fn bad_values_fall_back() {
            let config =
                YamlConfig::from_yaml("config:\n  offset: -3\n  logo-position: middle\n").unwrap();
            let options = DisplayOptions::from_config(&config);
            assert_eq!(options.offset, 5);
            assert_eq!(options.logo_position, LogoPosition::Left);
        }
    }

    mod layout {
        use super::*;

        #[test]
        fn art_left_of_layout() {
            let yaml = "config:\n  offset: 1\nintern:\n  args:\n    disable-colors: true\n";
            let frame = compose(yaml, &["##", "#"], &["a", "b", "c"]);
            assert_eq!(frame.lines, ["## a", "#  b", "   c"]);
        }

        #[test]
        fn surplus_art_rows_stand_alone() {
            let yaml = "config:\n  offset: 1\n  logo-padding-left: 2\nintern:\n  args:\n    disable-colors: true\n";
            let frame = compose(yaml, &["##", "##", "##"], &["a"]);
            assert_eq!(frame.lines, ["  ## a", "  ##", "  ##"]);
        }

        #[test]
        fn padding_rows() {
            let yaml = "config:\n  offset: 1\n  logo-padding-top: 1\n  layout-padding-top: 2\nintern:\n  args:\n    disable-colors: true\n";
            let frame = compose(yaml, &["@"], &["x"]);
            assert_eq!(frame.lines, ["  ", "@ ", "  x"]);
        }

        #[test]
        fn logo_on_top() {
            let yaml = "config:\n  logo-position: top\n  logo-padding-left: 1\nintern:\n  args:\n    disable-colors: true\n";
            let frame = compose(yaml, &["/^"], &["OS $<os.name>"]);
            assert_eq!(frame.lines, [" /^", "OS Linux"]);
        }

        #[test]
        fn colored_art_is_measured_by_visible_width() {
            let frame = compose("config:\n  offset: 1\n", &["${red}##", "#"], &["a", "b"]);
            assert_eq!(
                frame.lines,
                [
                    format!("\x1b[1;31m## {r}a{r}", r = RESET),
                    format!("#  {r}b{r}", r = RESET),
                ]
            );
        }

        #[test]
        fn no_art() {
            let empty: [&str; 0] = [];
            let frame = compose(NO_COLORS, &empty, &["User $<user.name>"]);
            assert_eq!(frame.lines, [" User toni"]);
        }

        #[test]
        fn no_art_ignores_offset() {
            let empty: [&str; 0] = [];
            let yaml = "config:\n  offset: 7\n  logo-padding-left: 2\nintern:\n  args:\n    disable-colors: true\n";
            let frame = compose(yaml, &empty, &["x", "y"]);
            assert_eq!(frame.lines, ["   x", "   y"]);
        }
    }

    #[test]
    fn test_art_colors_feed_auto_tags() {
        let frame = compose("", &["${blue}@"], &["${auto}x"]);
        assert_eq!(frame.lines[0], format!("\x1b[1;34m@     {r}\x1b[1;34mx{r}", r = RESET));
    }

    #[test]
    fn test_art_has_no_separator_resets() {
        let empty: [&str; 0] = [];
        let frame = compose("config:\n  logo-position: top\n", &["${red}a:b"], &empty);
        assert_eq!(frame.lines, ["\x1b[1;31ma:b"]);
    }

    #[test]
    fn test_gui_stacks_art_above_layout() {
        let registry = registry();
        let config = YamlConfig::new();
        let runner = no_shell;
        let frame = Display::new(&registry, &config, &runner)
            .with_target(OutputTarget::Gui)
            .compose(&["@"], &["OS $<os.name>"]);
        assert_eq!(frame.lines, ["@", "OS Linux"]);
    }

    #[test]
    fn test_diagnostics_are_collected() {
        let empty: [&str; 0] = [];
        let frame = compose(NO_COLORS, &empty, &["$<missing.module>", "room"]);
        assert_eq!(
            frame.diagnostics,
            [
                RenderError::ModuleNotFound("missing.module".into()),
                RenderError::UnterminatedRoom(1),
            ]
        );
    }
}
