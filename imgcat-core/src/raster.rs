// ABOUTME: Resamples decoded images and maps pixel row pairs onto half-block cells
// ABOUTME: Produces immutable terminal frames that render to ANSI escape sequences

use std::fmt::Write;

use crossterm::style::{ResetColor, SetBackgroundColor, SetForegroundColor};
use image::{imageops::FilterType, RgbaImage};

use crate::color::{ColorProfile, Rgb, TerminalColor};
use crate::error::ImageError;

/// Upper half block: the foreground paints the top pixel, the background the bottom one
pub const HALF_BLOCK: char = '▀';

/// Filter used for every resize. Lanczos3 keeps small outputs free of moiré.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// A decoded RGBA image, consumed once by [`rasterize`]
#[derive(Debug, Clone)]
pub struct PixelGrid {
    image: RgbaImage,
}

impl PixelGrid {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode image bytes in any format the `image` crate was built with
    pub fn decode(reference: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| ImageError::from_image(reference, e))?;

        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            reference,
            image.width(),
            image.height(),
            image.color()
        );

        Ok(Self::new(image.into_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color of the pixel at `(x, y)`. Fully transparent pixels read as black.
    fn rgb_at(&self, x: u32, y: u32) -> Rgb {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        if a == 0 {
            Rgb::BLACK
        } else {
            Rgb::new(r, g, b)
        }
    }
}

impl From<RgbaImage> for PixelGrid {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

/// One glyph cell: top pixel as foreground, bottom pixel as background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub fg: TerminalColor,
    pub bg: TerminalColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalFrame {
    rows: Vec<Vec<Cell>>,
    width: u32,
}

impl TerminalFrame {
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of glyph columns per row
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of text rows
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Render the frame as ANSI text, one line per row.
    ///
    /// Rows are reset at their end only when they set a color, so a frame
    /// without color is plain glyphs.
    pub fn render(&self) -> String {
        // Roughly 40 bytes of escape sequences per truecolor cell
        let mut out = String::with_capacity(self.rows.len() * (self.width as usize * 40 + 8));

        for row in &self.rows {
            let mut colored = false;
            for cell in row {
                colored |= write_color(&mut out, cell.fg, Layer::Foreground);
                colored |= write_color(&mut out, cell.bg, Layer::Background);
                out.push(HALF_BLOCK);
            }
            if colored {
                let _ = write!(out, "{}", ResetColor);
            }
            out.push('\n');
        }

        out
    }
}

#[derive(Clone, Copy)]
enum Layer {
    Foreground,
    Background,
}

/// Append the escape sequence selecting `color`; false when nothing was written
fn write_color(out: &mut String, color: TerminalColor, layer: Layer) -> bool {
    if let TerminalColor::Ansi(idx) = color {
        // crossterm writes `38;5;N` even for the base colors
        let base = match layer {
            Layer::Foreground => 30,
            Layer::Background => 40,
        };
        let code = if idx < 8 { base + idx } else { base + 60 + (idx - 8) };
        let _ = write!(out, "\x1b[{}m", code);
        return true;
    }

    match (color.to_crossterm(), layer) {
        (Some(c), Layer::Foreground) => {
            let _ = write!(out, "{}", SetForegroundColor(c));
            true
        }
        (Some(c), Layer::Background) => {
            let _ = write!(out, "{}", SetBackgroundColor(c));
            true
        }
        (None, _) => false,
    }
}

/// Height in pixels and width preserving aspect ratio for `target_rows` text rows
pub fn resized_dimensions(width: u32, height: u32, target_rows: u32) -> (u32, u32) {
    let new_height = target_rows.max(1) * 2;
    if width == 0 || height == 0 {
        return (0, new_height);
    }

    let new_width = (f64::from(width) * f64::from(new_height) / f64::from(height)).round() as u32;
    (new_width.max(1), new_height)
}

/// Resample `pixels` to `2 * target_rows` pixel rows and pair them into half-block cells.
///
/// `target_rows` of zero is treated as one. The resized height is always even;
/// should an odd height ever reach the pairing loop, the trailing row is dropped.
/// Width is not capped: a very wide, short image yields a frame far wider than
/// the terminal, and terminals wrap or clip it.
pub fn rasterize(pixels: &PixelGrid, target_rows: u32, profile: ColorProfile) -> TerminalFrame {
    let target_rows = target_rows.max(1);
    let (width, height) = resized_dimensions(pixels.width(), pixels.height(), target_rows);

    if width == 0 {
        return TerminalFrame {
            rows: vec![Vec::new(); target_rows as usize],
            width: 0,
        };
    }

    let resized = PixelGrid::new(image::imageops::resize(
        &pixels.image,
        width,
        height,
        RESAMPLE_FILTER,
    ));

    let rows = (0..height / 2)
        .map(|row| {
            let y = row * 2;
            (0..width)
                .map(|x| Cell {
                    fg: profile.quantize(resized.rgb_at(x, y)),
                    bg: profile.quantize(resized.rgb_at(x, y + 1)),
                })
                .collect()
        })
        .collect();

    TerminalFrame { rows, width }
}
