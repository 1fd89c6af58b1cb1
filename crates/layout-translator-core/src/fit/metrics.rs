//! Font metrics used for fitting text into boxes.
//!
//! Widths are in 1/1000 em, the unit of standard AFM files.

use unicode_normalization::UnicodeNormalization;

/// Capability to measure rendered text width for one fixed typeface.
pub trait FontMetrics {
    /// Width of `text` set at `font_size` points, in points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Advance widths of the base-14 Helvetica face for ASCII 0x20..=0x7E.
/// Index = (char as usize) - 32.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, // space ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, // 0-7
    556, 556, 278, 278, 584, 584, 584, 556, // 8 9 : ; < = > ?
    1015, 667, 667, 722, 722, 667, 611, 778, // @ A-G
    722, 278, 500, 667, 556, 833, 722, 778, // H-O
    667, 778, 722, 667, 611, 722, 667, 944, // P-W
    667, 667, 611, 278, 278, 278, 469, 556, // X Y Z [ \ ] ^ _
    333, 556, 556, 500, 556, 556, 278, 556, // ` a-g
    556, 222, 222, 500, 222, 833, 556, 556, // h-o
    556, 556, 333, 500, 278, 556, 500, 722, // p-w
    500, 500, 500, 334, 260, 334, 584, // x y z { | } ~
];

/// Used for characters the table does not cover.
const HELVETICA_AVERAGE: u16 = 556;

/// Static metrics for Helvetica, the face the PDF writer draws with.
///
/// Accented letters measure as their base letter (Helvetica's accented
/// glyphs share the base advance width).
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// Advance width of one character in 1/1000 em.
    pub fn char_width(c: char) -> u16 {
        if let Some(width) = ascii_width(c) {
            return width;
        }

        match c {
            '\u{a0}' => 278,
            '\u{2018}' | '\u{2019}' | '\u{201a}' => 222,
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{a1}' | '\u{ab}' | '\u{bb}' => 333,
            '\u{2022}' => 350,
            '\u{b0}' => 400,
            '\u{2013}' | '\u{20ac}' => 556,
            '\u{df}' | '\u{f8}' | '\u{bf}' => 611,
            '\u{a9}' | '\u{ae}' => 737,
            '\u{d8}' => 778,
            '\u{e6}' => 889,
            '\u{2014}' | '\u{2026}' | '\u{c6}' | '\u{2030}' => 1000,
            _ => c
                .nfd()
                .next()
                .and_then(ascii_width)
                .unwrap_or(HELVETICA_AVERAGE),
        }
    }
}

fn ascii_width(c: char) -> Option<u16> {
    let code = c as usize;
    (32..=126).contains(&code).then(|| HELVETICA_ASCII[code - 32])
}

impl FontMetrics for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(Self::char_width(c))).sum();
        #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for width calculations
        let units = units as f32;
        units * font_size / 1000.0
    }
}
