use serde::Serialize;
use std::fmt::Write as _;

use super::contrast::{ContrastReport, Rgb};

/// A named brand color, emitted as `--color-<name>`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ColorToken {
    pub name: &'static str,
    pub value: Rgb,
}

const fn token(name: &'static str, r: u8, g: u8, b: u8) -> ColorToken {
    ColorToken {
        name,
        value: Rgb::new(r, g, b),
    }
}

pub const PRIMARY: ColorToken = token("primary", 0x1B, 0x36, 0x5D);
pub const PRIMARY_DARK: ColorToken = token("primary-dark", 0x10, 0x24, 0x3F);
pub const ACCENT: ColorToken = token("accent", 0xE0, 0xB6, 0x4F);
pub const BACKGROUND: ColorToken = token("background", 0xFF, 0xFF, 0xFF);
pub const SURFACE: ColorToken = token("surface", 0xF5, 0xF7, 0xFA);
pub const TEXT: ColorToken = token("text", 0x1F, 0x29, 0x33);
pub const TEXT_MUTED: ColorToken = token("text-muted", 0x52, 0x60, 0x6D);
pub const ON_PRIMARY: ColorToken = token("on-primary", 0xFF, 0xFF, 0xFF);
pub const SUCCESS: ColorToken = token("success", 0x1E, 0x7B, 0x4F);
pub const DANGER: ColorToken = token("danger", 0xB4, 0x23, 0x18);
pub const BORDER: ColorToken = token("border", 0xD9, 0xE2, 0xEC);

pub const PALETTE: [ColorToken; 11] = [
    PRIMARY,
    PRIMARY_DARK,
    ACCENT,
    BACKGROUND,
    SURFACE,
    TEXT,
    TEXT_MUTED,
    ON_PRIMARY,
    SUCCESS,
    DANGER,
    BORDER,
];

/// Foreground/background combinations the stylesheet actually uses.
pub const BRAND_PAIRINGS: [(ColorToken, ColorToken); 12] = [
    (TEXT, BACKGROUND),
    (TEXT, SURFACE),
    (TEXT_MUTED, BACKGROUND),
    (TEXT_MUTED, SURFACE),
    (PRIMARY, SURFACE),
    (ON_PRIMARY, PRIMARY),
    (ON_PRIMARY, PRIMARY_DARK),
    (ACCENT, PRIMARY),
    (ACCENT, PRIMARY_DARK),
    (DANGER, BACKGROUND),
    (ON_PRIMARY, SUCCESS),
    (ON_PRIMARY, DANGER),
];

pub fn token_by_name(name: &str) -> Option<ColorToken> {
    PALETTE.iter().copied().find(|t| t.name == name)
}

pub fn pairing_reports() -> Vec<(&'static str, &'static str, ContrastReport)> {
    BRAND_PAIRINGS
        .iter()
        .map(|(fg, bg)| (fg.name, bg.name, ContrastReport::new(fg.value, bg.value)))
        .collect()
}

/// `:root { --color-…: #…; }` block served as `/theme.css`.
pub fn css_variables() -> String {
    let mut css = String::from(":root {\n");
    for token in PALETTE {
        let _ = writeln!(css, "  --color-{}: {};", token.name, token.value);
    }
    css.push_str("  --radius: 6px;\n");
    css.push_str("  --font-body: system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif;\n");
    css.push_str("}\n");
    css
}
