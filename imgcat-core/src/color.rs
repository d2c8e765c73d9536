// ABOUTME: Terminal color profile detection and true-color quantization
// ABOUTME: Maps RGB samples to the nearest color the current terminal can display

use std::env;
use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;

/// Environment variable that forces a color profile, bypassing detection
pub const COLOR_PROFILE_ENV: &str = "IMGCAT_COLOR_PROFILE";

/// Color capability of the terminal, from richest to poorest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProfile {
    TrueColor,
    Ansi256,
    Ansi16,
    /// No color at all; cells fall back to the terminal's default colors
    Ascii,
}

/// An 8-bit sRGB sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space
    fn distance_sq(self, other: Rgb) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// A color as it will be emitted to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalColor {
    Rgb(Rgb),
    /// Entry of the 256-color palette
    Indexed(u8),
    /// One of the 16 base colors, written with the classic `30-37`/`90-97` codes
    Ansi(u8),
    /// Leave the terminal's own foreground/background untouched
    Default,
}

impl TerminalColor {
    /// The crossterm color for this value, `None` for [`TerminalColor::Default`]
    pub fn to_crossterm(self) -> Option<Color> {
        match self {
            TerminalColor::Rgb(Rgb { r, g, b }) => Some(Color::Rgb { r, g, b }),
            TerminalColor::Indexed(idx) | TerminalColor::Ansi(idx) => Some(Color::AnsiValue(idx)),
            TerminalColor::Default => None,
        }
    }
}

impl ColorProfile {
    /// Detect the color profile from the environment.
    ///
    /// `IMGCAT_COLOR_PROFILE` wins when set to a valid profile name. `NO_COLOR`
    /// disables color entirely. Otherwise `COLORTERM` and `TERM` decide.
    pub fn detect() -> Self {
        if let Ok(forced) = env::var(COLOR_PROFILE_ENV) {
            match forced.parse::<ColorProfile>() {
                Ok(profile) => return profile,
                Err(e) => log::warn!("Ignoring {}: {}", COLOR_PROFILE_ENV, e),
            }
        }

        if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return ColorProfile::Ascii;
        }

        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        Self::from_terminal(&colorterm, &term)
    }

    fn from_terminal(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_lowercase();
        if colorterm == "truecolor" || colorterm == "24bit" {
            return ColorProfile::TrueColor;
        }

        let term = term.to_lowercase();
        if term.is_empty() || term == "dumb" {
            return ColorProfile::Ascii;
        }

        if term.contains("truecolor") || term.contains("direct") {
            return ColorProfile::TrueColor;
        }

        if term.contains("256color") {
            return ColorProfile::Ansi256;
        }

        // Terminals known to at least understand the 16 base colors
        const ANSI_TERMS: [&str; 8] = [
            "color", "ansi", "xterm", "screen", "tmux", "linux", "rxvt", "vt100",
        ];
        if ANSI_TERMS.iter().any(|t| term.contains(t)) {
            return ColorProfile::Ansi16;
        }

        ColorProfile::Ascii
    }

    /// Map a true-color sample to the nearest color representable in this profile
    pub fn quantize(self, rgb: Rgb) -> TerminalColor {
        quantize(rgb, self)
    }
}

impl FromStr for ColorProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truecolor" | "24bit" | "rgb" => Ok(ColorProfile::TrueColor),
            "256" | "ansi256" => Ok(ColorProfile::Ansi256),
            "16" | "ansi" | "ansi16" => Ok(ColorProfile::Ansi16),
            "none" | "ascii" | "off" | "mono" => Ok(ColorProfile::Ascii),
            other => Err(format!(
                "unknown color profile '{}'. Valid values: truecolor, 256, 16, none",
                other
            )),
        }
    }
}

impl fmt::Display for ColorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorProfile::TrueColor => "truecolor",
            ColorProfile::Ansi256 => "256",
            ColorProfile::Ansi16 => "16",
            ColorProfile::Ascii => "none",
        };
        f.write_str(name)
    }
}

/// Map a true-color sample to the nearest color representable in `profile`.
///
/// Pure: the same sample and profile always produce the same color.
pub fn quantize(rgb: Rgb, profile: ColorProfile) -> TerminalColor {
    match profile {
        ColorProfile::TrueColor => TerminalColor::Rgb(rgb),
        ColorProfile::Ansi256 => TerminalColor::Indexed(nearest_ansi256(rgb)),
        ColorProfile::Ansi16 => TerminalColor::Ansi(nearest_ansi16(rgb)),
        ColorProfile::Ascii => TerminalColor::Default,
    }
}

/// The xterm defaults for the 16 base colors
const ANSI16_RGB: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // 0: Black
    Rgb::new(128, 0, 0),     // 1: Red
    Rgb::new(0, 128, 0),     // 2: Green
    Rgb::new(128, 128, 0),   // 3: Yellow
    Rgb::new(0, 0, 128),     // 4: Blue
    Rgb::new(128, 0, 128),   // 5: Magenta
    Rgb::new(0, 128, 128),   // 6: Cyan
    Rgb::new(192, 192, 192), // 7: White
    Rgb::new(128, 128, 128), // 8: Bright Black
    Rgb::new(255, 0, 0),     // 9: Bright Red
    Rgb::new(0, 255, 0),     // 10: Bright Green
    Rgb::new(255, 255, 0),   // 11: Bright Yellow
    Rgb::new(0, 0, 255),     // 12: Bright Blue
    Rgb::new(255, 0, 255),   // 13: Bright Magenta
    Rgb::new(0, 255, 255),   // 14: Bright Cyan
    Rgb::new(255, 255, 255), // 15: Bright White
];

/// Channel levels of the 6×6×6 color cube
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Index of the cube level closest to a channel value
fn cube_index(v: u8) -> u8 {
    match v {
        0..=47 => 0,
        48..=114 => 1,
        _ => (v - 35) / 40,
    }
}

/// Convert an ANSI-256 palette index to RGB
pub fn ansi256_to_rgb(idx: u8) -> Rgb {
    match idx {
        0..=15 => ANSI16_RGB[idx as usize],
        16..=231 => {
            let i = idx - 16;
            Rgb::new(
                CUBE_LEVELS[(i / 36) as usize],
                CUBE_LEVELS[((i % 36) / 6) as usize],
                CUBE_LEVELS[(i % 6) as usize],
            )
        }
        232..=255 => {
            let v = 8 + 10 * (idx - 232);
            Rgb::new(v, v, v)
        }
    }
}

/// Nearest palette entry among the color cube and the gray ramp.
///
/// The 16 base colors are skipped because terminals commonly remap them.
pub fn nearest_ansi256(rgb: Rgb) -> u8 {
    let (ri, gi, bi) = (cube_index(rgb.r), cube_index(rgb.g), cube_index(rgb.b));
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;
    let cube = ansi256_to_rgb(cube_idx);

    let average = (u32::from(rgb.r) + u32::from(rgb.g) + u32::from(rgb.b)) / 3;
    let gray_step = if average > 238 {
        23
    } else {
        (average.saturating_sub(3) / 10) as u8
    };
    let gray_idx = 232 + gray_step;
    let gray = ansi256_to_rgb(gray_idx);

    if rgb.distance_sq(gray) < rgb.distance_sq(cube) {
        gray_idx
    } else {
        cube_idx
    }
}

/// Nearest of the 16 base colors
pub fn nearest_ansi16(rgb: Rgb) -> u8 {
    let mut best_idx = 0u8;
    let mut best_dist = u32::MAX;

    for (idx, candidate) in ANSI16_RGB.iter().enumerate() {
        let dist = rgb.distance_sq(*candidate);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx as u8;
        }
    }

    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_truecolor_passthrough() {
        let c = Rgb::new(12, 34, 56);
        assert_eq!(quantize(c, ColorProfile::TrueColor), TerminalColor::Rgb(c));
    }

    #[test]
    fn test_ascii_profile_uses_default_colors() {
        assert_eq!(
            quantize(Rgb::new(255, 0, 0), ColorProfile::Ascii),
            TerminalColor::Default
        );
        assert_eq!(TerminalColor::Default.to_crossterm(), None);
    }

    #[test]
    fn test_quantize_is_deterministic() {
        let profiles = [
            ColorProfile::TrueColor,
            ColorProfile::Ansi256,
            ColorProfile::Ansi16,
            ColorProfile::Ascii,
        ];
        for profile in profiles {
            for v in (0..=255u8).step_by(17) {
                let c = Rgb::new(v, 255 - v, v / 2);
                assert_eq!(quantize(c, profile), quantize(c, profile));
            }
        }
    }

    #[test]
    fn test_ansi256_exact_cube_colors() {
        assert_eq!(nearest_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(nearest_ansi256(Rgb::new(0, 255, 0)), 46);
        assert_eq!(nearest_ansi256(Rgb::new(0, 0, 255)), 21);
        assert_eq!(nearest_ansi256(Rgb::new(0, 0, 0)), 16);
        assert_eq!(nearest_ansi256(Rgb::new(255, 255, 255)), 231);
        assert_eq!(nearest_ansi256(Rgb::new(95, 135, 175)), 67);
    }

    #[test]
    fn test_ansi256_prefers_gray_ramp_for_grays() {
        // 128 is far from every cube level but sits exactly on the ramp
        let idx = nearest_ansi256(Rgb::new(128, 128, 128));
        assert_eq!(idx, 244);
        assert_eq!(ansi256_to_rgb(idx), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_ansi256_palette_conversion() {
        assert_eq!(ansi256_to_rgb(1), Rgb::new(128, 0, 0));
        assert_eq!(ansi256_to_rgb(16), Rgb::new(0, 0, 0));
        assert_eq!(ansi256_to_rgb(231), Rgb::new(255, 255, 255));
        assert_eq!(ansi256_to_rgb(232), Rgb::new(8, 8, 8));
        assert_eq!(ansi256_to_rgb(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn test_ansi16_nearest() {
        assert_eq!(nearest_ansi16(Rgb::new(250, 5, 5)), 9);
        assert_eq!(nearest_ansi16(Rgb::new(10, 10, 10)), 0);
        assert_eq!(nearest_ansi16(Rgb::new(120, 0, 0)), 1);
        assert_eq!(nearest_ansi16(Rgb::new(200, 200, 200)), 7);
        assert_eq!(
            quantize(Rgb::new(0, 250, 250), ColorProfile::Ansi16),
            TerminalColor::Ansi(14)
        );
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("truecolor".parse::<ColorProfile>(), Ok(ColorProfile::TrueColor));
        assert_eq!("24BIT".parse::<ColorProfile>(), Ok(ColorProfile::TrueColor));
        assert_eq!("256".parse::<ColorProfile>(), Ok(ColorProfile::Ansi256));
        assert_eq!("16".parse::<ColorProfile>(), Ok(ColorProfile::Ansi16));
        assert_eq!("none".parse::<ColorProfile>(), Ok(ColorProfile::Ascii));
        assert!("sepia".parse::<ColorProfile>().is_err());
        assert_eq!(ColorProfile::Ansi256.to_string(), "256");
    }

    #[test]
    fn test_profile_from_terminal() {
        assert_eq!(
            ColorProfile::from_terminal("truecolor", "xterm"),
            ColorProfile::TrueColor
        );
        assert_eq!(
            ColorProfile::from_terminal("", "xterm-256color"),
            ColorProfile::Ansi256
        );
        assert_eq!(ColorProfile::from_terminal("", "xterm"), ColorProfile::Ansi16);
        assert_eq!(ColorProfile::from_terminal("", "linux"), ColorProfile::Ansi16);
        assert_eq!(ColorProfile::from_terminal("", "dumb"), ColorProfile::Ascii);
        assert_eq!(ColorProfile::from_terminal("", ""), ColorProfile::Ascii);
    }

    fn restore(name: &str, value: Option<String>) {
        unsafe {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
    }

    #[test]
    #[serial]
    fn test_detect_honors_override() {
        let original = env::var(COLOR_PROFILE_ENV).ok();

        unsafe {
            env::set_var(COLOR_PROFILE_ENV, "256");
        }
        assert_eq!(ColorProfile::detect(), ColorProfile::Ansi256);

        unsafe {
            env::set_var(COLOR_PROFILE_ENV, "none");
        }
        assert_eq!(ColorProfile::detect(), ColorProfile::Ascii);

        restore(COLOR_PROFILE_ENV, original);
    }

    #[test]
    #[serial]
    fn test_detect_no_color() {
        let original_force = env::var(COLOR_PROFILE_ENV).ok();
        let original_no_color = env::var("NO_COLOR").ok();
        let original_colorterm = env::var("COLORTERM").ok();

        unsafe {
            env::remove_var(COLOR_PROFILE_ENV);
            env::set_var("NO_COLOR", "1");
            env::set_var("COLORTERM", "truecolor");
        }
        assert_eq!(ColorProfile::detect(), ColorProfile::Ascii);

        restore(COLOR_PROFILE_ENV, original_force);
        restore("NO_COLOR", original_no_color);
        restore("COLORTERM", original_colorterm);
    }

    #[test]
    #[serial]
    fn test_detect_invalid_override_falls_back() {
        let original_force = env::var(COLOR_PROFILE_ENV).ok();
        let original_no_color = env::var("NO_COLOR").ok();
        let original_colorterm = env::var("COLORTERM").ok();

        unsafe {
            env::set_var(COLOR_PROFILE_ENV, "sepia");
            env::remove_var("NO_COLOR");
            env::set_var("COLORTERM", "24bit");
        }
        assert_eq!(ColorProfile::detect(), ColorProfile::TrueColor);

        restore(COLOR_PROFILE_ENV, original_force);
        restore("NO_COLOR", original_no_color);
        restore("COLORTERM", original_colorterm);
    }
}
