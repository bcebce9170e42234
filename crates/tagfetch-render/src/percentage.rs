//! Percentage tag arithmetic.
//!
//! `$%value,total%` renders `value / total * 100` with two decimals, colored
//! by threshold. `$%!value,total%` swaps the good and bad colors.

use crate::error::RenderError;

/// The three percentage color slots, indexing `config.percentage-colors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Good,
    Normal,
    Bad,
}

impl Threshold {
    /// Picks a slot for `ratio` (in percent).
    ///
    /// The ratio is clamped to `[0, 100]` for selection only.
    pub fn select(ratio: f64, inverted: bool) -> Self {
        let clamped = ratio.clamp(0.0, 100.0);
        let threshold = if clamped >= 200.0 / 3.0 {
            Threshold::Good
        } else if clamped >= 100.0 / 3.0 {
            Threshold::Normal
        } else {
            Threshold::Bad
        };
        match (threshold, inverted) {
            (Threshold::Good, true) => Threshold::Bad,
            (Threshold::Bad, true) => Threshold::Good,
            (t, _) => t,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Threshold::Good => 0,
            Threshold::Normal => 1,
            Threshold::Bad => 2,
        }
    }
}

/// A computed percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage {
    /// `value / total * 100`, unclamped. Zero when `total` is zero.
    pub ratio: f64,
    pub inverted: bool,
}

impl Percentage {
    pub fn compute(value: f64, total: f64, inverted: bool) -> Self {
        let ratio = if total == 0.0 {
            0.0
        } else {
            value / total * 100.0
        };
        Self { ratio, inverted }
    }

    pub fn threshold(&self) -> Threshold {
        Threshold::select(self.ratio, self.inverted)
    }

    /// The number with two decimals and a trailing `%`.
    pub fn formatted(&self) -> String {
        format!("{:.2}%", self.ratio)
    }
}

/// Parses a resolved operand. Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`RenderError::InvalidNumber`] if the text is not a finite number.
pub fn parse_operand(text: &str) -> Result<f64, RenderError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(RenderError::InvalidNumber(trimmed.to_string())),
    }
}
