//! Color tag payloads and the per-line color state.
//!
//! A color tag `${spec}` accepts:
//!
//! - `0` and `1`: reset, and reset followed by bold
//! - palette names: `black`, `red`, `green`, `yellow`, `blue`, `magenta`,
//!   `cyan`, `white`, looked up in the configuration
//! - `auto` / `autoN`: the N-th color collected while rendering logo art
//! - hex colors with optional modifier prefix: `#ff6b35`, `!u#fff`
//! - raw escapes: `\e[1;31m` (literal backslash-e) or a real `ESC [`
//!
//! # Modifiers
//!
//! | prefix | meaning | target |
//! |---|---|---|
//! | `!` | bold | both |
//! | `u` | underline | both |
//! | `i` | italic | both |
//! | `s` | strikethrough | both |
//! | `l` | blink | terminal |
//! | `b` | color applies to the background | both |
//! | `o` | overline | GUI |
//! | `a(v)` `A(v)` | foreground / background alpha | GUI |
//! | `L(v)` | underline style | GUI |
//! | `U(v)` `B(v)` `O(v)` `S(v)` | underline / background / overline / strikethrough color | GUI |
//! | `w(v)` | font weight | GUI |
//!
//! GUI-only modifiers are accepted on the terminal and ignored.
//!
//! # Example
//!
//! ```rust
//! use tagfetch_render::color::{ColorSource, ColorSpec, Modifier};
//!
//! let spec = ColorSpec::parse("!u#ff0000").unwrap();
//! assert_eq!(spec.modifiers, vec![Modifier::Bold, Modifier::Underline]);
//! assert_eq!(spec.source, ColorSource::Rgb(255, 0, 0));
//! assert_eq!(spec.to_ansi(), "\x1b[1m\x1b[4m\x1b[38;2;255;0;0m");
//! ```

use crate::context::OutputTarget;

/// Resets all attributes.
pub const RESET: &str = "\x1b[0m";

/// Resets all attributes, then turns bold on.
pub const BOLD_RESET: &str = "\x1b[0m\x1b[1m";

/// The eight names resolved through the configured palette.
pub const PALETTE_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

const TERMINAL_PALETTE: [&str; 8] = [
    "\x1b[1;30m",
    "\x1b[1;31m",
    "\x1b[1;32m",
    "\x1b[1;33m",
    "\x1b[1;34m",
    "\x1b[1;35m",
    "\x1b[1;36m",
    "\x1b[1;37m",
];

const GUI_PALETTE: [&str; 8] = [
    "!#000005", "!#ff2000", "!#00ff00", "!#ffff00", "!#00aaff", "!#ff11cc", "!#00ffff", "!#ffffff",
];

/// Built-in value of a palette name for `target`.
pub fn default_palette_color(name: &str, target: OutputTarget) -> Option<&'static str> {
    let index = PALETTE_NAMES.iter().position(|&n| n == name)?;
    Some(match target {
        OutputTarget::Terminal => TERMINAL_PALETTE[index],
        OutputTarget::Gui => GUI_PALETTE[index],
    })
}

/// Where a color comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSource {
    /// `0` or `1`.
    Reset { bold: bool },
    /// One of [`PALETTE_NAMES`]; resolved through the configuration.
    Palette(String),
    /// `auto` / `autoN`, stored zero-based.
    Auto(usize),
    /// Literal hex color.
    Rgb(u8, u8, u8),
    /// Raw escape body following `ESC [`, emitted verbatim on a terminal.
    Escape(String),
}

/// A text attribute carried by a color spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Bold,
    Underline,
    Italic,
    Strike,
    Blink,
    Background,
    Overline,
    FgAlpha(String),
    BgAlpha(String),
    UnderlineStyle(String),
    UnderlineColor(String),
    BgColor(String),
    Weight(String),
    OverlineColor(String),
    StrikeColor(String),
}

impl Modifier {
    fn with_argument(letter: char, value: &str) -> Option<Self> {
        let value = value.to_string();
        Some(match letter {
            'a' => Modifier::FgAlpha(value),
            'A' => Modifier::BgAlpha(value),
            'L' => Modifier::UnderlineStyle(value),
            'U' => Modifier::UnderlineColor(value),
            'B' => Modifier::BgColor(value),
            'w' => Modifier::Weight(value),
            'O' => Modifier::OverlineColor(value),
            'S' => Modifier::StrikeColor(value),
            _ => return None,
        })
    }

    fn sgr(&self) -> Option<u8> {
        match self {
            Modifier::Bold => Some(1),
            Modifier::Italic => Some(3),
            Modifier::Underline => Some(4),
            Modifier::Blink => Some(5),
            Modifier::Strike => Some(9),
            _ => None,
        }
    }

    fn markup(&self) -> Option<(&'static str, &str)> {
        Some(match self {
            Modifier::Bold => ("weight", "bold"),
            Modifier::Underline => ("underline", "single"),
            Modifier::Italic => ("style", "italic"),
            Modifier::Overline => ("overline", "single"),
            Modifier::Strike => ("strikethrough", "true"),
            Modifier::FgAlpha(v) => ("fgalpha", v),
            Modifier::BgAlpha(v) => ("bgalpha", v),
            Modifier::UnderlineStyle(v) => ("underline", v),
            Modifier::UnderlineColor(v) => ("underline_color", v),
            Modifier::BgColor(v) => ("bgcolor", v),
            Modifier::Weight(v) => ("weight", v),
            Modifier::OverlineColor(v) => ("overline_color", v),
            Modifier::StrikeColor(v) => ("strikethrough_color", v),
            Modifier::Blink | Modifier::Background => return None,
        })
    }
}

/// A parsed color tag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpec {
    /// Modifiers in the order they were written.
    pub modifiers: Vec<Modifier>,
    pub source: ColorSource,
}

impl ColorSpec {
    /// Parses a color tag payload.
    ///
    /// Modifiers are only recognised in front of a hex color; palette
    /// names carry theirs in the configured value.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let source = match spec {
            "0" => ColorSource::Reset { bold: false },
            "1" => ColorSource::Reset { bold: true },
            name if PALETTE_NAMES.contains(&name) => ColorSource::Palette(name.to_string()),
            _ => {
                if let Some(rest) = spec.strip_prefix("auto") {
                    return Ok(Self::plain(ColorSource::Auto(parse_auto_index(rest)?)));
                }
                if let Some(body) = escape_body(spec) {
                    return Ok(Self::plain(ColorSource::Escape(body.to_string())));
                }
                if let Some(pos) = spec.rfind('#') {
                    let (r, g, b) = parse_hex(&spec[pos + 1..])?;
                    return Ok(Self {
                        modifiers: parse_modifiers(&spec[..pos])?,
                        source: ColorSource::Rgb(r, g, b),
                    });
                }
                return Err("expected a palette name, hex color or escape sequence".to_string());
            }
        };
        Ok(Self::plain(source))
    }

    fn plain(source: ColorSource) -> Self {
        Self {
            modifiers: Vec::new(),
            source,
        }
    }

    /// True once palette and auto references are resolved.
    pub fn is_concrete(&self) -> bool {
        !matches!(
            self.source,
            ColorSource::Palette(_) | ColorSource::Auto(_)
        )
    }

    fn has(&self, modifier: &Modifier) -> bool {
        self.modifiers.contains(modifier)
    }

    /// ANSI SGR sequence for a terminal.
    ///
    /// Palette and auto sources must be resolved first; they render empty.
    pub fn to_ansi(&self) -> String {
        match &self.source {
            ColorSource::Reset { bold: false } => RESET.to_string(),
            ColorSource::Reset { bold: true } => BOLD_RESET.to_string(),
            ColorSource::Escape(body) => format!("\x1b[{}", body),
            ColorSource::Rgb(r, g, b) => {
                let mut out: String = self
                    .modifiers
                    .iter()
                    .filter_map(Modifier::sgr)
                    .map(|code| format!("\x1b[{}m", code))
                    .collect();
                let layer = if self.has(&Modifier::Background) { 48 } else { 38 };
                out.push_str(&format!("\x1b[{};2;{};{};{}m", layer, r, g, b));
                out
            }
            ColorSource::Palette(_) | ColorSource::Auto(_) => String::new(),
        }
    }

    /// Opening `<span>` tag for GUI markup.
    ///
    /// `palette` maps a palette name to its configured GUI value and is only
    /// consulted when translating raw escapes.
    pub fn to_markup(&self, palette: &dyn Fn(&str) -> String) -> Result<String, String> {
        match &self.source {
            ColorSource::Reset { bold: false } => Ok("<span>".to_string()),
            ColorSource::Reset { bold: true } => Ok("<span weight='bold'>".to_string()),
            ColorSource::Escape(body) => escape_to_markup(body, palette),
            ColorSource::Rgb(r, g, b) => {
                let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
                let mut attrs: Vec<String> = Vec::new();
                for modifier in &self.modifiers {
                    if *modifier == Modifier::Background {
                        attrs.push(format!("bgcolor='{}'", hex));
                    } else if let Some((name, value)) = modifier.markup() {
                        attrs.push(format!("{}='{}'", name, value));
                    }
                }
                if !self.has(&Modifier::Background) {
                    attrs.push(format!("fgcolor='{}'", hex));
                }
                Ok(format!("<span {}>", attrs.join(" ")))
            }
            ColorSource::Palette(_) | ColorSource::Auto(_) => {
                Err("unresolved color reference".to_string())
            }
        }
    }
}

fn parse_auto_index(rest: &str) -> Result<usize, String> {
    if rest.is_empty() {
        return Ok(0);
    }
    rest.parse::<usize>()
        .map(|n| n.saturating_sub(1))
        .map_err(|_| format!("`auto{}` index is not a number", rest))
}

/// Body after `ESC [` for both the literal `\e[` and real escape forms.
fn escape_body(spec: &str) -> Option<&str> {
    spec.strip_prefix("\\e[")
        .or_else(|| spec.strip_prefix("\x1b["))
}

fn parse_modifiers(prefix: &str) -> Result<Vec<Modifier>, String> {
    let mut modifiers = Vec::new();
    let mut chars = prefix.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let simple = match c {
            '!' => Some(Modifier::Bold),
            'u' => Some(Modifier::Underline),
            'i' => Some(Modifier::Italic),
            's' => Some(Modifier::Strike),
            'l' => Some(Modifier::Blink),
            'b' => Some(Modifier::Background),
            'o' => Some(Modifier::Overline),
            _ => None,
        };
        if let Some(modifier) = simple {
            modifiers.push(modifier);
            continue;
        }
        if chars.peek().map(|&(_, next)| next) != Some('(') {
            continue;
        }
        let open = i + c.len_utf8();
        let Some(close) = prefix[open..].find(')').map(|p| open + p) else {
            return Err(format!("`{}(` modifier has no closing `)`", c));
        };
        if let Some(modifier) = Modifier::with_argument(c, &prefix[open + 1..close]) {
            modifiers.push(modifier);
        }
        while chars.peek().is_some_and(|&(j, _)| j <= close) {
            chars.next();
        }
    }
    Ok(modifiers)
}

/// Parses 3 or 6 hex digits (without `#`).
pub fn parse_hex(hex: &str) -> Result<(u8, u8, u8), String> {
    let invalid = || format!("invalid hex color `#{}`", hex);
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => Ok((
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Ok((
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => Err(format!("invalid hex color `#{}` (must be 3 or 6 digits)", hex)),
    }
}

/// Translates a terminal escape body into a GUI span.
fn escape_to_markup(body: &str, palette: &dyn Fn(&str) -> String) -> Result<String, String> {
    let Some(params) = body.strip_suffix('m') else {
        return Err(format!("escape `{}` does not end with `m`", body));
    };

    for (prefix, attr) in [("38;2;", "fgcolor"), ("48;2;", "bgcolor")] {
        if let Some(rgb) = params.strip_prefix(prefix) {
            let channels: Vec<u8> = rgb
                .split(';')
                .map(|c| c.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| format!("escape `{}` has an invalid rgb value", body))?;
            let [r, g, b] = channels[..] else {
                return Err(format!("escape `{}` needs exactly 3 rgb values", body));
            };
            return Ok(format!("<span {}='#{:02x}{:02x}{:02x}'>", attr, r, g, b));
        }
    }
    if params.starts_with("38;5;") || params.starts_with("48;5;") {
        return Err(format!("256-color escape `{}` only works in a terminal", body));
    }

    let weight = if params.starts_with("1;") {
        "bold"
    } else {
        "normal"
    };
    let code_text = params
        .strip_prefix("1;")
        .or_else(|| params.strip_prefix("0;"))
        .unwrap_or(params);
    let code: u8 = code_text
        .parse()
        .map_err(|_| format!("escape `{}` is not a color code", body))?;

    let attr = match code {
        30..=37 | 90..=97 => "fgcolor",
        40..=47 | 100..=107 => "bgcolor",
        _ => return Err(format!("escape `{}` is not a palette color code", body)),
    };
    let name = PALETTE_NAMES[(code % 10) as usize];
    let configured = palette(name);
    let hex = match configured.rfind('#') {
        Some(pos) => &configured[pos..],
        None => return Err(format!("palette color `{}` is not a hex color", configured)),
    };

    let color = if matches!(code, 90..=97 | 100..=107) {
        let (r, g, b) = parse_hex(&hex[1..])?;
        let (r, g, b) = (lighten(r), lighten(g), lighten(b));
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        hex.to_string()
    };

    Ok(format!("<span {}='{}' weight='{}'>", attr, color, weight))
}

/// Mixes a channel 35% towards white, for bright palette variants.
fn lighten(channel: u8) -> u8 {
    (channel as f32 * 0.65 + 255.0 * 0.35) as u8
}

/// Color bookkeeping for one render.
///
/// `emitted_on_line` is the "first color emitted" flag: it is cleared at the
/// start of every line and set by the first color tag on it. Auto colors
/// persist for the whole render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorState {
    emitted_on_line: bool,
    auto_colors: Vec<String>,
}

impl ColorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_line(&mut self) {
        self.emitted_on_line = false;
    }

    pub fn mark_emitted(&mut self) {
        self.emitted_on_line = true;
    }

    /// True if a color tag already produced output on the current line.
    pub fn emitted_on_line(&self) -> bool {
        self.emitted_on_line
    }

    /// Records a color used in logo art, keeping first-seen order.
    pub fn remember_auto(&mut self, spec: &str) {
        if !self.auto_colors.iter().any(|c| c == spec) {
            self.auto_colors.push(spec.to_string());
        }
    }

    /// The color for `${auto}` (index 0) or `${autoN}` (index N-1).
    ///
    /// Out-of-range indices fall back to the first color; `None` when no
    /// color has been collected.
    pub fn auto(&self, index: usize) -> Option<&str> {
        self.auto_colors
            .get(index)
            .or_else(|| self.auto_colors.first())
            .map(String::as_str)
    }

    pub fn auto_colors(&self) -> &[String] {
        &self.auto_colors
    }
}
