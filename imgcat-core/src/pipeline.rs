// ABOUTME: Load pipeline turning a load request into a rasterized terminal frame
// ABOUTME: Fetches asynchronously, then decodes and resamples on the blocking pool

use crate::color::ColorProfile;
use crate::error::ImageError;
use crate::navigation::LoadRequest;
use crate::raster::{rasterize, PixelGrid, TerminalFrame};
use crate::source::ImageFetcher;

/// Fetch, decode and rasterize the image behind `request`.
///
/// The fetched bytes live only until decoding finishes, on success and failure alike.
pub async fn load_frame<F>(
    fetcher: &F,
    request: &LoadRequest,
    profile: ColorProfile,
) -> Result<TerminalFrame, ImageError>
where
    F: ImageFetcher + ?Sized,
{
    let bytes = fetcher.fetch(&request.source).await?;
    let reference = request.source.reference();
    let rows = request.rows;

    tokio::task::spawn_blocking(move || -> Result<TerminalFrame, ImageError> {
        let grid = PixelGrid::decode(&reference, &bytes)?;
        drop(bytes);
        log::debug!(
            "Rasterizing {} to {} rows ({} profile)",
            reference,
            rows,
            profile
        );
        Ok(rasterize(&grid, rows, profile))
    })
    .await
    .map_err(|e| {
        ImageError::decode_failed(&request.source.reference(), format!("decode task failed: {}", e))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{Event, Session};
    use crate::source::ImageSource;
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;

    struct MemoryFetcher {
        files: HashMap<ImageSource, Vec<u8>>,
    }

    #[async_trait]
    impl ImageFetcher for MemoryFetcher {
        async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, ImageError> {
            self.files
                .get(source)
                .cloned()
                .ok_or_else(|| ImageError::source_unavailable(&source.reference(), "not found"))
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn request_for(session: &mut Session, rows: u16) -> LoadRequest {
        match session.transition(Event::Resize { rows }) {
            Some(crate::navigation::Command::Load(req)) => req,
            other => panic!("expected load, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_frame_success() {
        let mut files = HashMap::new();
        files.insert(ImageSource::parse("wide.png"), png_bytes(40, 10));
        let fetcher = MemoryFetcher { files };

        let mut session = Session::new(vec![ImageSource::parse("wide.png")]).unwrap();
        let request = request_for(&mut session, 6);

        let frame = load_frame(&fetcher, &request, ColorProfile::TrueColor)
            .await
            .unwrap();
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.width(), 40);
    }

    #[tokio::test]
    async fn test_load_frame_decode_failure() {
        let mut files = HashMap::new();
        files.insert(
            ImageSource::parse("notes.txt"),
            b"these are my notes, not a picture".to_vec(),
        );
        let fetcher = MemoryFetcher { files };

        let mut session = Session::new(vec![ImageSource::parse("notes.txt")]).unwrap();
        let request = request_for(&mut session, 6);

        let err = load_frame(&fetcher, &request, ColorProfile::Ansi256)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::DecodeFailed { .. }));
    }

    #[tokio::test]
    async fn test_load_frame_missing_source() {
        let fetcher = MemoryFetcher {
            files: HashMap::new(),
        };
        let mut session = Session::new(vec![ImageSource::parse("gone.png")]).unwrap();
        let request = request_for(&mut session, 6);

        let err = load_frame(&fetcher, &request, ColorProfile::Ansi16)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::SourceUnavailable { .. }));
    }
}
