//! Tag evaluation.
//!
//! Tags are resolved depth-first, left to right: a tag's payload is resolved
//! before the tag itself acts on it, so `$[$<user.name>,toni,hi,bye]` queries
//! the module, then compares. Only the chosen branch of a conditional is
//! resolved, so commands in the other branch never run.
//!
//! Every failure is recovered here. The error goes to
//! [`RenderContext::report`] and the tag is replaced by its literal source,
//! a placeholder, or nothing, depending on the tag kind.

use crate::color::{ColorSource, ColorSpec};
use crate::context::{OutputTarget, RenderContext};
use crate::error::RenderError;
use crate::percentage::{parse_operand, Percentage};
use crate::registry::{ModuleArgs, UNKNOWN_MODULE};
use crate::width::{FILL_MARKER, PIN_MARKER};
use tagfetch_scan::{parse_module_ref, split_conditional, split_fields, Tag, TagKind, Token, Tokenizer};

impl RenderContext<'_> {
    /// Resolves every tag in `text`.
    ///
    /// This is the evaluator for nested payloads. Separator resets and line
    /// splitting belong to the line renderer and are not applied here.
    pub fn resolve(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for token in Tokenizer::new(text) {
            match token {
                Token::Text(t) => out.push_str(t),
                other => out.push_str(&self.token_text(other)),
            }
        }
        out
    }

    /// Text for any token other than plain text.
    pub(crate) fn token_text(&mut self, token: Token<'_>) -> String {
        match token {
            Token::Text(t) => t.to_string(),
            Token::Escaped(c) => self.escaped(c),
            Token::Tag(tag) => self.evaluate_tag(&tag),
            Token::Unterminated { kind, text, offset } => {
                self.report(RenderError::UnterminatedTag { kind, offset });
                text.to_string()
            }
        }
    }

    fn escaped(&self, c: char) -> String {
        match (self.target, c) {
            (OutputTarget::Gui, '<') => "&lt;".to_string(),
            (OutputTarget::Gui, '>') => "&gt;".to_string(),
            (OutputTarget::Gui, '&') => "&amp;".to_string(),
            _ => c.to_string(),
        }
    }

    /// Evaluates one matched tag.
    pub fn evaluate_tag(&mut self, tag: &Tag<'_>) -> String {
        match tag.kind {
            TagKind::Information => self.information(tag),
            TagKind::Command => self.command(tag),
            TagKind::Conditional => self.conditional(tag),
            TagKind::Color => self.color(tag.payload),
            TagKind::Percentage => self.percentage(tag),
        }
    }

    fn information(&mut self, tag: &Tag<'_>) -> String {
        match tag.payload {
            "pin" => return PIN_MARKER.to_string(),
            "fill" => return FILL_MARKER.to_string(),
            _ => {}
        }

        let mut path = String::new();
        let mut args = ModuleArgs::new();
        for segment in parse_module_ref(tag.payload) {
            let name = self.resolve(&segment.name);
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&name);
            if let Some(arg) = segment.arg {
                let value = self.resolve(arg);
                args.push(name, value);
            }
        }

        let registry = self.registry;
        match registry.resolve(&path, &args, self) {
            Some(text) => text,
            None => {
                self.report(RenderError::ModuleNotFound(path));
                UNKNOWN_MODULE.to_string()
            }
        }
    }

    fn command(&mut self, tag: &Tag<'_>) -> String {
        if self.config.commands_disabled() {
            self.report(RenderError::CommandExecutionDisabled(tag.source.to_string()));
            return tag.source.to_string();
        }

        let resolved = self.resolve(tag.payload);
        let command = resolved.strip_prefix('!').unwrap_or(&resolved);
        match self.runner.run(command) {
            Ok(output) => output.into_text(),
            Err(err) => {
                self.report(RenderError::CommandFailed {
                    command: command.to_string(),
                    reason: err.to_string(),
                });
                String::new()
            }
        }
    }

    fn conditional(&mut self, tag: &Tag<'_>) -> String {
        let [left, right, then, otherwise] = match split_conditional(tag.payload) {
            Ok(fields) => fields,
            Err(err) => {
                self.report(RenderError::from_scan(err, tag.source));
                return tag.source.to_string();
            }
        };

        let left = self.resolve(left);
        let right = self.resolve(right);
        if left == right {
            self.resolve(then)
        } else {
            self.resolve(otherwise)
        }
    }

    /// Evaluates a color tag payload and updates the color state.
    pub(crate) fn color(&mut self, payload: &str) -> String {
        if self.config.colors_disabled() {
            return String::new();
        }

        let mut name = self.resolve(payload);
        if let Some((_, value)) = self
            .config
            .alias_colors()
            .into_iter()
            .find(|(alias, _)| *alias == name)
        {
            name = value;
        }

        match self.render_color(&name) {
            Ok((text, remembered)) => {
                if self.parsing_logo_art {
                    if let Some(spec) = remembered {
                        self.colors.remember_auto(&spec);
                    }
                }
                let close = self.target == OutputTarget::Gui && self.colors.emitted_on_line();
                self.colors.mark_emitted();
                if close {
                    format!("</span>{}", text)
                } else {
                    text
                }
            }
            Err(reason) => {
                self.report(RenderError::ColorSpecInvalid { spec: name, reason });
                String::new()
            }
        }
    }

    /// Output text for a color name, plus the name to remember as an auto
    /// color.
    fn render_color(&self, name: &str) -> Result<(String, Option<String>), String> {
        let spec = ColorSpec::parse(name)?;
        let (spec, remembered) = match spec.source {
            ColorSource::Reset { .. } => (spec, None),
            ColorSource::Auto(index) => match self.colors.auto(index) {
                Some(auto) => (self.concrete(ColorSpec::parse(auto)?)?, Some(auto.to_string())),
                None => (ColorSpec::parse("1")?, None),
            },
            _ => (self.concrete(spec)?, Some(name.to_string())),
        };

        match self.target {
            OutputTarget::Terminal => Ok((spec.to_ansi(), remembered)),
            OutputTarget::Gui => {
                let palette = |n: &str| {
                    self.config
                        .palette_color(n, OutputTarget::Gui)
                        .unwrap_or_default()
                };
                Ok((spec.to_markup(&palette)?, remembered))
            }
        }
    }

    /// Replaces a palette reference with the configured value.
    fn concrete(&self, spec: ColorSpec) -> Result<ColorSpec, String> {
        let ColorSource::Palette(name) = &spec.source else {
            return Ok(spec);
        };
        let configured = self
            .config
            .palette_color(name, self.target)
            .unwrap_or_default();
        let resolved = ColorSpec::parse(&configured)
            .map_err(|reason| format!("palette color `{}`: {}", name, reason))?;
        if resolved.is_concrete() {
            Ok(resolved)
        } else {
            Err(format!(
                "palette color `{}` refers to `{}` instead of a color",
                name, configured
            ))
        }
    }

    fn percentage(&mut self, tag: &Tag<'_>) -> String {
        let (inverted, body) = match tag.payload.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, tag.payload),
        };
        let fields = split_fields(body, 2);
        let [value, total] = fields[..] else {
            self.report(RenderError::InvalidNumber(body.to_string()));
            return tag.source.to_string();
        };

        let value = self.resolve(value);
        let total = self.resolve(total);
        let operands = parse_operand(&value).and_then(|v| Ok((v, parse_operand(&total)?)));
        let (value, total) = match operands {
            Ok(operands) => operands,
            Err(err) => {
                self.report(err);
                return tag.source.to_string();
            }
        };

        let percentage = Percentage::compute(value, total, inverted);
        let colors = self.config.percentage_colors();
        let color = self.color(&colors[percentage.threshold().index()]);
        let reset = self.color("0");
        format!("{}{}{}", color, percentage.formatted(), reset)
    }
}
