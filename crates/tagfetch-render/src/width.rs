//! Visual width of rendered text.
//!
//! Rendered lines carry ANSI escapes and layout markers that take no screen
//! columns. Widths here are measured after removing both, summing the
//! per-character display width (wide glyphs count 2, control characters 0).

use std::borrow::Cow;
use unicode_width::UnicodeWidthChar;

/// Marks the alignment column of a room line.
pub const PIN_MARKER: &str = "$<pin>";

/// Expands to horizontal padding up to the room width.
pub const FILL_MARKER: &str = "$<fill>";

/// Removes ANSI CSI sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    console::strip_ansi_codes(text)
}

/// Removes every pin and fill marker.
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    if !text.contains(PIN_MARKER) && !text.contains(FILL_MARKER) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace(PIN_MARKER, "").replace(FILL_MARKER, ""))
}

/// Display columns of `text`, ignoring escapes and markers.
///
/// # Example
///
/// ```rust
/// use tagfetch_render::width::visual_width;
///
/// assert_eq!(visual_width("\x1b[1;31mred\x1b[0m"), 3);
/// assert_eq!(visual_width("日本"), 4);
/// assert_eq!(visual_width("a$<pin>b"), 2);
/// ```
pub fn visual_width(text: &str) -> usize {
    let stripped = strip_ansi(text);
    strip_markers(&stripped)
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}
