//! WCAG 2.x color contrast checks.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const AA_NORMAL_TEXT: f64 = 4.5;
pub const AA_LARGE_TEXT: f64 = 3.0;
pub const AAA_NORMAL_TEXT: f64 = 7.0;
pub const AAA_LARGE_TEXT: f64 = 4.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color is empty")]
    Empty,
    #[error("color {0:?} must have 3 or 6 hex digits")]
    Length(String),
    #[error("color {0:?} contains a non-hex digit")]
    Digit(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`, with or without the leading `#`.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(input.to_string()));
        }
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorParseError::Digit(input.to_string()))
        };
        match digits.len() {
            6 => Ok(Rgb::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(ColorParseError::Length(input.to_string())),
        }
    }

    pub fn relative_luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ratio in `1.0..=21.0`; symmetric in its arguments.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastReport {
    pub foreground: Rgb,
    pub background: Rgb,
    pub ratio: f64,
    pub aa_normal_text: bool,
    pub aa_large_text: bool,
    pub aaa_normal_text: bool,
    pub aaa_large_text: bool,
}

impl ContrastReport {
    pub fn new(foreground: Rgb, background: Rgb) -> Self {
        let ratio = contrast_ratio(foreground, background);
        Self {
            foreground,
            background,
            ratio,
            aa_normal_text: ratio >= AA_NORMAL_TEXT,
            aa_large_text: ratio >= AA_LARGE_TEXT,
            aaa_normal_text: ratio >= AAA_NORMAL_TEXT,
            aaa_large_text: ratio >= AAA_LARGE_TEXT,
        }
    }
}

pub fn meets_aa(foreground: Rgb, background: Rgb, large_text: bool) -> bool {
    let threshold = if large_text { AA_LARGE_TEXT } else { AA_NORMAL_TEXT };
    contrast_ratio(foreground, background) >= threshold
}

pub fn meets_aaa(foreground: Rgb, background: Rgb, large_text: bool) -> bool {
    let threshold = if large_text { AAA_LARGE_TEXT } else { AAA_NORMAL_TEXT };
    contrast_ratio(foreground, background) >= threshold
}

/// Black or white, whichever reads better on `background`.
pub fn best_text_color(background: Rgb) -> Rgb {
    best_of(background, &[Rgb::BLACK, Rgb::WHITE]).unwrap_or(Rgb::BLACK)
}

/// Highest-contrast candidate; `None` when `candidates` is empty.
pub fn best_of(background: Rgb, candidates: &[Rgb]) -> Option<Rgb> {
    candidates.iter().copied().max_by(|a, b| {
        contrast_ratio(*a, background).total_cmp(&contrast_ratio(*b, background))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, proptest};

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::from_hex("#1B365D"), Ok(Rgb::new(0x1B, 0x36, 0x5D)));
        assert_eq!(Rgb::from_hex("1b365d"), Ok(Rgb::new(0x1B, 0x36, 0x5D)));
        assert_eq!(Rgb::from_hex("#fff"), Ok(Rgb::WHITE));
        assert_eq!("#000".parse::<Rgb>(), Ok(Rgb::BLACK));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgb::from_hex("  "), Err(ColorParseError::Empty));
        assert!(matches!(Rgb::from_hex("#12345"), Err(ColorParseError::Length(_))));
        assert!(matches!(Rgb::from_hex("#GGGGGG"), Err(ColorParseError::Digit(_))));
        assert!(matches!(Rgb::from_hex("#ééé"), Err(ColorParseError::Digit(_))));
    }

    #[test]
    fn black_on_white_is_twenty_one() {
        assert!((contrast_ratio(Rgb::BLACK, Rgb::WHITE) - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(Rgb::WHITE, Rgb::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn grey_767676_is_the_aa_boundary_on_white() {
        let grey = Rgb::from_hex("#767676").expect("hex");
        let report = ContrastReport::new(grey, Rgb::WHITE);
        assert!(report.aa_normal_text);
        assert!(!report.aaa_normal_text);
        assert!(meets_aa(grey, Rgb::WHITE, false));
        assert!(meets_aaa(grey, Rgb::WHITE, true));
    }

    #[test]
    fn best_text_color_flips_with_background() {
        assert_eq!(best_text_color(Rgb::from_hex("#1B365D").expect("hex")), Rgb::WHITE);
        assert_eq!(best_text_color(Rgb::from_hex("#F5F7FA").expect("hex")), Rgb::BLACK);
        assert_eq!(best_of(Rgb::WHITE, &[]), None);
    }

    #[test]
    fn displays_as_upper_hex() {
        assert_eq!(Rgb::new(0x1b, 0x36, 0x5d).to_string(), "#1B365D");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_ratio_is_symmetric_and_bounded(a in any::<[u8; 3]>(), b in any::<[u8; 3]>()) {
            let a = Rgb::new(a[0], a[1], a[2]);
            let b = Rgb::new(b[0], b[1], b[2]);
            let ab = contrast_ratio(a, b);
            prop_assert!((ab - contrast_ratio(b, a)).abs() < 1e-12);
            prop_assert!((1.0..=21.0 + 1e-9).contains(&ab));
            prop_assert!(contrast_ratio(best_text_color(b), b) >= 4.5);
        }
    }
}
