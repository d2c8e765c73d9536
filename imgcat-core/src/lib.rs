// ABOUTME: Core library for rendering images as half-block terminal glyphs
// ABOUTME: Exposes the rasterizer, color quantizer, image sources and navigation state machine

pub mod color;
pub mod error;
pub mod navigation;
pub mod pipeline;
pub mod raster;
pub mod source;

pub use color::{quantize, ColorProfile, Rgb, TerminalColor};
pub use error::ImageError;
pub use navigation::{Command, Event, ExitStatus, Key, LoadRequest, LoadTicket, Session, State};
pub use pipeline::load_frame;
pub use raster::{rasterize, Cell, PixelGrid, TerminalFrame};
pub use source::{FetchConfig, ImageFetcher, ImageSource, SourceFetcher};
