pub mod contrast;
pub mod palette;

pub use contrast::{
    ColorParseError, ContrastReport, Rgb, best_of, best_text_color, contrast_ratio, meets_aa,
    meets_aaa,
};
pub use palette::{BRAND_PAIRINGS, ColorToken, PALETTE, css_variables, pairing_reports};
