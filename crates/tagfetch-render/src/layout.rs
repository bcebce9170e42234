//! Box layout: rooms, pins and fills.
//!
//! This pass runs over fully rendered lines. A line whose visible text is
//! `room` opens a room and a line whose visible text is `endroom` closes it;
//! both marker lines are consumed. Every line of a room is aligned against
//! one [`RoomLayoutInfo`] computed from all of its lines:
//!
//! ```text
//! room
//! CPU$<pin>: Ryzen 7         CPU   : Ryzen 7
//! Memory$<pin>: 16 GiB   =>  Memory : 16 GiB
//! $<fill>                    ---------------
//! endroom
//! ```
//!
//! The right-hand text starts at `pin_position` plus whatever padding the
//! room width leaves, so right columns of different widths do not line up.
//! Lines outside rooms are copied unchanged.

use crate::config::ConfigProvider;
use crate::error::RenderError;
use crate::width::{strip_ansi, visual_width, FILL_MARKER, PIN_MARKER};

const ROOM: &str = "room";
const END_ROOM: &str = "endroom";

/// Alignment geometry shared by every line of one room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomLayoutInfo {
    /// Column where the text right of a pin starts.
    pub pin_position: usize,
    /// Padded width of every line in the room.
    pub total_width: usize,
}

impl RoomLayoutInfo {
    /// Measures the lines of one room.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tagfetch_render::layout::RoomLayoutInfo;
    ///
    /// let info = RoomLayoutInfo::measure(&["A$<pin>1", "BB$<pin>22"]);
    /// assert_eq!(info.pin_position, 2);
    /// assert_eq!(info.total_width, 4);
    /// ```
    pub fn measure<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut max_left = 0;
        let mut max_right = 0;
        let mut max_plain = 0;

        for line in lines {
            let line = line.as_ref();
            match line.split_once(PIN_MARKER) {
                Some((left, right)) => {
                    max_left = max_left.max(visual_width(left));
                    max_right = max_right.max(visual_width(right));
                }
                None => max_plain = max_plain.max(visual_width(line)),
            }
        }

        Self {
            pin_position: max_left,
            total_width: max_plain.max(max_left + max_right),
        }
    }
}

/// The box layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxLayout {
    /// Repeated to expand fill markers. Empty fills expand to nothing.
    pub horizontal: String,
}

impl BoxLayout {
    pub fn new(horizontal: impl Into<String>) -> Self {
        Self {
            horizontal: horizontal.into(),
        }
    }

    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self::new(config.box_horizontal())
    }

    /// Runs the pass over `lines`.
    ///
    /// A `room` left open at the end of input is abandoned: its marker and
    /// contents are emitted unprocessed, and the error, holding the index of
    /// the marker within `lines`, is returned alongside the lines.
    pub fn apply<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, Option<RenderError>) {
        let mut out = Vec::with_capacity(lines.len());
        let mut room: Option<(usize, Vec<&str>)> = None;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            match room.as_mut() {
                None if is_marker(line, ROOM) => room = Some((index, Vec::new())),
                None => out.push(line.to_string()),
                Some((_, body)) if !is_marker(line, END_ROOM) => body.push(line),
                Some(_) => {
                    if let Some((_, body)) = room.take() {
                        let info = RoomLayoutInfo::measure(&body);
                        out.extend(body.iter().map(|l| self.rewrite_line(l, info)));
                    }
                }
            }
        }

        let unterminated = room.map(|(start, body)| {
            out.push(lines[start].as_ref().to_string());
            out.extend(body.into_iter().map(String::from));
            RenderError::UnterminatedRoom(start)
        });
        (out, unterminated)
    }

    /// Rewrites one room line against `info`.
    ///
    /// Pinned lines are padded as
    /// `left + spaces(pin_position - left) + spaces(total - pin_position - right) + right`,
    /// then fill markers share whatever width is still missing.
    pub fn rewrite_line(&self, line: &str, info: RoomLayoutInfo) -> String {
        let line = match line.split_once(PIN_MARKER) {
            Some((left, right)) => {
                let left_padding = info.pin_position.saturating_sub(visual_width(left));
                let right_padding = info
                    .total_width
                    .saturating_sub(info.pin_position + visual_width(right));
                format!(
                    "{}{}{}",
                    left,
                    " ".repeat(left_padding + right_padding),
                    right.replace(PIN_MARKER, "")
                )
            }
            None => line.to_string(),
        };

        if line.contains(FILL_MARKER) {
            self.expand_fills(&line, info.total_width)
        } else {
            line
        }
    }

    fn expand_fills(&self, line: &str, total_width: usize) -> String {
        let count = line.matches(FILL_MARKER).count();
        let needed = total_width.saturating_sub(visual_width(line));
        let (each, extra) = (needed / count, needed % count);

        let mut out = String::with_capacity(line.len() + needed * self.horizontal.len());
        for (i, part) in line.split(FILL_MARKER).enumerate() {
            if i > 0 {
                let len = each + usize::from(i <= extra);
                out.push_str(&self.horizontal.repeat(len));
            }
            out.push_str(part);
        }
        out
    }
}

fn is_marker(line: &str, marker: &str) -> bool {
    strip_ansi(line).trim() == marker
}
