//! Line rendering.
//!
//! A layout line is tokenized once at the top level. Plain text goes
//! through the separator auto-reset; each tag is evaluated in place. A tag
//! whose text spans several lines turns the source line into several output
//! lines, with the surrounding text repeated on each.

use crate::context::{OutputTarget, RenderContext};
use crate::registry::CUT_LINE;
use tagfetch_scan::{Token, Tokenizer};

/// One top-level piece of a line: a single line of text, or the lines of a
/// multi-line tag result.
enum Piece {
    Text(String),
    Lines(Vec<String>),
}

impl RenderContext<'_> {
    /// Renders one layout line into one or more output lines.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tagfetch_exec::ShellRunner;
    /// use tagfetch_render::{ModuleRegistry, RenderContext, YamlConfig};
    ///
    /// let registry = ModuleRegistry::new()
    ///     .with("gpu.names", |_, _| "RTX\nArc".to_string());
    /// let config = YamlConfig::new();
    /// let runner = ShellRunner::new();
    /// let mut ctx = RenderContext::new(&registry, &config, &runner);
    ///
    /// assert_eq!(ctx.render_line("GPU [$<gpu.names>]"), ["GPU [RTX]", "GPU [Arc]"]);
    /// ```
    pub fn render_line(&mut self, line: &str) -> Vec<String> {
        self.colors.begin_line();

        let separator = if self.parsing_logo_art {
            String::new()
        } else {
            self.config.separator()
        };
        let reset_after = self.config.separator_reset_after();

        let mut pieces: Vec<Piece> = Vec::new();
        let mut current = String::new();
        for token in Tokenizer::new(line) {
            match token {
                Token::Text(text) => self.push_separated(&mut current, text, &separator, reset_after),
                Token::Tag(ref tag) => {
                    let text = self.evaluate_tag(tag);
                    if text.contains('\n') {
                        pieces.push(Piece::Text(std::mem::take(&mut current)));
                        pieces.push(Piece::Lines(text.split('\n').map(String::from).collect()));
                    } else {
                        current.push_str(&text);
                    }
                }
                other => current.push_str(&self.token_text(other)),
            }
        }
        pieces.push(Piece::Text(current));

        let count = pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(_) => 1,
                Piece::Lines(lines) => lines.len(),
            })
            .max()
            .unwrap_or(1);

        let close = if self.target == OutputTarget::Gui && self.colors.emitted_on_line() {
            "</span>"
        } else {
            ""
        };

        (0..count)
            .map(|row| {
                let mut out: String = pieces
                    .iter()
                    .map(|piece| match piece {
                        Piece::Text(text) => text.as_str(),
                        Piece::Lines(lines) => lines.get(row).map_or("", String::as_str),
                    })
                    .collect();
                out.push_str(close);
                out
            })
            .collect()
    }

    /// Appends `text`, inserting a reset at each separator once a color has
    /// been emitted on the line.
    fn push_separated(&mut self, out: &mut String, text: &str, separator: &str, after: bool) {
        if separator.is_empty() {
            out.push_str(text);
            return;
        }

        let mut rest = text;
        while let Some(pos) = rest.find(separator) {
            out.push_str(&rest[..pos]);
            let reset = if self.colors.emitted_on_line() {
                self.color("0")
            } else {
                String::new()
            };
            if after {
                out.push_str(separator);
                out.push_str(&reset);
            } else {
                out.push_str(&reset);
                out.push_str(separator);
            }
            rest = &rest[pos + separator.len()..];
        }
        out.push_str(rest);
    }

    /// Renders layout lines in order, dropping any output line that
    /// contains [`CUT_LINE`].
    pub fn render_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<String> {
        self.render_lines_with_source(lines)
            .into_iter()
            .map(|(_, line)| line)
            .collect()
    }

    /// Like [`RenderContext::render_lines`], pairing each output line with
    /// the index of the layout line it came from.
    pub(crate) fn render_lines_with_source<S: AsRef<str>>(
        &mut self,
        lines: &[S],
    ) -> Vec<(usize, String)> {
        let mut out = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            for rendered in self.render_line(line.as_ref()) {
                if rendered.contains(CUT_LINE) {
                    log::debug!("dropping cut line `{}`", line.as_ref());
                    continue;
                }
                out.push((index, rendered));
            }
        }
        out
    }
}
