//! Fit-to-box text layout.
//!
//! Chooses a font size and a greedy word wrap so a block of text fits a
//! rectangle, shrinking one point at a time down to a minimum size and
//! truncating when even the minimum overflows.

mod metrics;

pub use metrics::{FontMetrics, Helvetica};

use serde::{Deserialize, Serialize};

/// Size limits for fitting text into a block's box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub base_font_size: f32,
    pub min_font_size: f32,
    pub line_height_factor: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            base_font_size: 9.0,
            min_font_size: 5.0,
            line_height_factor: 1.2,
        }
    }
}

/// Parameters of the flowing export, which ignores block geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    pub font_size: f32,
    pub line_height_factor: f32,
    pub margin: f32,
}

impl FlowConfig {
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_factor
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            line_height_factor: 1.4,
            margin: 40.0,
        }
    }
}

/// How a block's text ended up in its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// All lines fit at `font_size`
    Fitted,
    /// Lines were cut at the minimum size
    Truncated,
    /// Nothing can be drawn
    Dropped,
}

/// Result of fitting one block. Blank entries in `lines` are paragraph gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFit {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub outcome: FitOutcome,
}

impl TextFit {
    const fn dropped(font_size: f32) -> Self {
        Self {
            lines: Vec::new(),
            font_size,
            outcome: FitOutcome::Dropped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_height(&self, config: &FitConfig) -> f32 {
        self.font_size * config.line_height_factor
    }
}

/// Greedy-wrap `text` to `max_width` at `font_size`.
///
/// Paragraphs are separated by `\n`. An empty paragraph yields one blank
/// line. A word wider than the box still gets a line of its own.
pub fn wrap_paragraphs(
    text: &str,
    max_width: f32,
    font_size: f32,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(String::new());
            continue;
        };

        let mut current = first.to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if metrics.text_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines
}

/// Fit `text` into a `width` x `height` box.
pub fn layout_block_text(
    text: &str,
    width: f32,
    height: f32,
    metrics: &dyn FontMetrics,
    config: &FitConfig,
) -> TextFit {
    let min = config.min_font_size;
    if width <= 0.0 || height <= 0.0 {
        return TextFit::dropped(min);
    }

    let base = config.base_font_size.max(min);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let attempts = (base - min).floor() as usize + 1;

    for step in 0..attempts {
        #[allow(clippy::cast_precision_loss)]
        let size = (base - step as f32).max(min);
        let lines = wrap_paragraphs(text, width, size, metrics);
        if needed_height(lines.len(), size, config) <= height {
            return TextFit {
                lines,
                font_size: size,
                outcome: FitOutcome::Fitted,
            };
        }
    }

    let line_height = min * config.line_height_factor;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let keep = (height / line_height).floor() as usize;
    if keep == 0 {
        return TextFit::dropped(min);
    }

    let mut lines = wrap_paragraphs(text, width, min, metrics);
    // Reachable when `base - min` is fractional: min itself was never tried
    if lines.len() <= keep {
        return TextFit {
            lines,
            font_size: min,
            outcome: FitOutcome::Fitted,
        };
    }

    lines.truncate(keep);
    TextFit {
        lines,
        font_size: min,
        outcome: FitOutcome::Truncated,
    }
}

fn needed_height(line_count: usize, font_size: f32, config: &FitConfig) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let count = line_count as f32;
    count * font_size * config.line_height_factor
}
