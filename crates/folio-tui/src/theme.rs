use ratatui::style::Color;
use tracing::warn;

/// Runtime theme with configurable colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey: Color,

    // Semantic colors
    pub border: Color,
    pub accent: Color,
    pub active: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        midnight()
    }
}

/// Built-in theme names accepted by [`load_theme`]
pub const THEME_NAMES: &[&str] = &["midnight", "nord", "gruvbox-dark", "dracula"];

/// Load a theme by name, falling back to the default
pub fn load_theme(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "midnight" => midnight(),
        "nord" => nord(),
        "gruvbox" | "gruvbox-dark" => gruvbox_dark(),
        "dracula" => dracula(),
        other => {
            warn!(theme = other, "Unknown theme, using default");
            Theme::default()
        }
    }
}

/// Blend `fg` over `bg`; `alpha` 0.0 gives `bg`, 1.0 gives `fg`.
/// Non-RGB colors cannot be mixed and switch at half opacity.
pub fn blend(fg: Color, bg: Color, alpha: f32) -> Color {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    match (fg, bg) {
        (Color::Rgb(fr, fg_, fb), Color::Rgb(br, bg_, bb)) => {
            let mix = |f: u8, b: u8| (b as f32 + (f as f32 - b as f32) * alpha).round() as u8;
            Color::Rgb(mix(fr, br), mix(fg_, bg_), mix(fb, bb))
        }
        _ if alpha >= 0.5 => fg,
        _ => bg,
    }
}

fn midnight() -> Theme {
    Theme {
        bg0: Color::Rgb(0x0b, 0x0f, 0x1a),
        bg1: Color::Rgb(0x14, 0x1b, 0x2d),
        bg2: Color::Rgb(0x1f, 0x29, 0x40),
        fg0: Color::Rgb(0xe6, 0xea, 0xf2),
        fg1: Color::Rgb(0xb8, 0xc1, 0xd6),
        grey: Color::Rgb(0x6b, 0x76, 0x90),
        border: Color::Rgb(0x3a, 0x4a, 0x6b),
        accent: Color::Rgb(0x7a, 0xa2, 0xf7),
        active: Color::Rgb(0xc9, 0xa2, 0x27),
        warning: Color::Rgb(0xe0, 0xaf, 0x68),
        error: Color::Rgb(0xf7, 0x76, 0x8e),
    }
}

fn nord() -> Theme {
    Theme {
        bg0: Color::Rgb(0x2e, 0x34, 0x40), // nord0
        bg1: Color::Rgb(0x3b, 0x42, 0x52), // nord1
        bg2: Color::Rgb(0x43, 0x4c, 0x5e), // nord2
        fg0: Color::Rgb(0xec, 0xef, 0xf4), // nord6
        fg1: Color::Rgb(0xe5, 0xe9, 0xf0), // nord5
        grey: Color::Rgb(0x4c, 0x56, 0x6a), // nord3
        border: Color::Rgb(0x5e, 0x81, 0xac), // nord10
        accent: Color::Rgb(0x88, 0xc0, 0xd0), // nord8
        active: Color::Rgb(0xeb, 0xcb, 0x8b), // nord13
        warning: Color::Rgb(0xd0, 0x87, 0x70), // nord12
        error: Color::Rgb(0xbf, 0x61, 0x6a), // nord11
    }
}

fn gruvbox_dark() -> Theme {
    Theme {
        bg0: Color::Rgb(0x28, 0x28, 0x28),
        bg1: Color::Rgb(0x32, 0x30, 0x2f),
        bg2: Color::Rgb(0x45, 0x40, 0x3d),
        fg0: Color::Rgb(0xd4, 0xbe, 0x98),
        fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
        grey: Color::Rgb(0x92, 0x83, 0x74),
        border: Color::Rgb(0x7c, 0x6f, 0x64),
        accent: Color::Rgb(0x89, 0xb4, 0x82),
        active: Color::Rgb(0xd8, 0xa6, 0x57),
        warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        error: Color::Rgb(0xea, 0x69, 0x62),
    }
}

fn dracula() -> Theme {
    Theme {
        bg0: Color::Rgb(0x28, 0x2a, 0x36),
        bg1: Color::Rgb(0x34, 0x37, 0x46),
        bg2: Color::Rgb(0x44, 0x47, 0x5a),
        fg0: Color::Rgb(0xf8, 0xf8, 0xf2),
        fg1: Color::Rgb(0xe2, 0xe2, 0xdc),
        grey: Color::Rgb(0x62, 0x72, 0xa4),
        border: Color::Rgb(0x62, 0x72, 0xa4),
        accent: Color::Rgb(0xbd, 0x93, 0xf9),
        active: Color::Rgb(0xf1, 0xfa, 0x8c),
        warning: Color::Rgb(0xff, 0xb8, 0x6c),
        error: Color::Rgb(0xff, 0x55, 0x55),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_and_unknown() {
        for name in THEME_NAMES {
            let _ = load_theme(name);
        }
        assert_eq!(load_theme("NORD"), nord());
        assert_eq!(load_theme("no-such-theme"), Theme::default());
    }

    #[test]
    fn test_blend_endpoints() {
        let fg = Color::Rgb(200, 100, 0);
        let bg = Color::Rgb(0, 0, 100);
        assert_eq!(blend(fg, bg, 1.0), fg);
        assert_eq!(blend(fg, bg, 0.0), bg);
        assert_eq!(blend(fg, bg, 0.5), Color::Rgb(100, 50, 50));
        assert_eq!(blend(fg, bg, f32::NAN), bg);
        assert_eq!(blend(Color::White, Color::Black, 0.7), Color::White);
    }
}
