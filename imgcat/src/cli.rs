// ABOUTME: CLI argument definitions for imgcat
// ABOUTME: Positional image references plus a few rendering and diagnostics options

use clap::{Parser, ValueEnum};
use imgcat_core::ColorProfile;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
    imgcat path/to/image.jpg
    imgcat *.jpg
    imgcat https://example.com/image.jpg

Keys:
    j, down     next image
    k, up       previous image
    q, ctrl+c   quit";

#[derive(Parser, Debug)]
#[command(name = "imgcat")]
#[command(about = "Browse images in the terminal", long_about = None)]
#[command(version)]
#[command(override_usage = "imgcat [OPTIONS] [pattern|url ...]")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Image files or http(s) URLs, shown in the order given
    #[arg(value_name = "pattern|url", required = true)]
    pub references: Vec<String>,

    /// Color profile to render with instead of detecting it
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// HTTP timeout in seconds for image URLs
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Write diagnostics to this file (the screen belongs to the viewer)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    /// Detect from COLORTERM, TERM and NO_COLOR
    Auto,
    /// 24-bit color
    Truecolor,
    /// 256-color palette
    #[value(name = "256")]
    Ansi256,
    /// 16 base colors
    #[value(name = "16")]
    Ansi16,
    /// No color
    None,
}

impl ColorChoice {
    /// The forced profile, or `None` when detection should decide
    pub fn profile(self) -> Option<ColorProfile> {
        match self {
            ColorChoice::Auto => None,
            ColorChoice::Truecolor => Some(ColorProfile::TrueColor),
            ColorChoice::Ansi256 => Some(ColorProfile::Ansi256),
            ColorChoice::Ansi16 => Some(ColorProfile::Ansi16),
            ColorChoice::None => Some(ColorProfile::Ascii),
        }
    }
}
