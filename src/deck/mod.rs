//! Presentation rendering
//!
//! Composes slides from an approved outline and writes them as a `.pptx`
//! package into the output directory.

pub mod layout;
pub mod media;
pub mod mock;
pub mod package;
pub mod renderer;
pub mod shape;
pub mod slide;

pub use mock::MockDeckRenderer;
pub use package::{PptxPackage, PPTX_MIME};
pub use renderer::DeckRenderer;

use crate::models::{DeckFile, Outline, ThemeColor};
use crate::Result;
use async_trait::async_trait;
use media::Picture;
use tracing::warn;

#[async_trait]
pub trait DeckService: Send + Sync {
    /// Render `outline` into a file. `images[i]` belongs to `outline.slides[i]`.
    async fn render(
        &self,
        outline: &Outline,
        images: Vec<Option<Vec<u8>>>,
        theme: ThemeColor,
    ) -> Result<DeckFile>;
}

/// Build the complete `.pptx` bytes for `outline`.
///
/// Image bytes that cannot be decoded are dropped and the slide is laid out
/// without a picture.
pub fn build_pptx(
    outline: &Outline,
    images: &[Option<Vec<u8>>],
    theme: ThemeColor,
) -> Result<Vec<u8>> {
    let pictures: Vec<Option<Picture>> = images
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            let bytes = bytes.as_ref()?;
            match Picture::prepare(bytes) {
                Ok(picture) => Some(picture),
                Err(e) => {
                    warn!("Skipping unusable image for slide {}: {}", index + 1, e);
                    None
                }
            }
        })
        .collect();

    let slides = layout::compose(outline, &pictures, theme);
    PptxPackage::new(&outline.presentation_title, theme).write(&slides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockOutlineClient;
    use crate::photos::mock::sample_png;
    use std::io::Cursor;
    use zip::ZipArchive;

    fn slide_parts(bytes: &[u8]) -> (usize, usize) {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let slides = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count();
        let media = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/media/"))
            .count();
        (slides, media)
    }

    #[test]
    fn test_build_pptx_slide_count_matches_outline() {
        let outline = MockOutlineClient::sample_outline("Rivers", 3);
        let images = vec![Some(sample_png(32, 18)), None, Some(sample_png(10, 10))];

        let bytes = build_pptx(&outline, &images, ThemeColor::NAVY).unwrap();
        assert_eq!(slide_parts(&bytes), (outline.deck_slide_count(), 2));
    }

    #[test]
    fn test_build_pptx_skips_broken_images() {
        let outline = MockOutlineClient::sample_outline("Rivers", 2);
        let images = vec![Some(b"not an image".to_vec()), Some(sample_png(4, 4))];

        let bytes = build_pptx(&outline, &images, ThemeColor::NAVY).unwrap();
        assert_eq!(slide_parts(&bytes), (6, 1));
    }

    #[test]
    fn test_build_pptx_without_images() {
        let outline = MockOutlineClient::sample_outline("Rivers", 1);
        let bytes = build_pptx(&outline, &[], ThemeColor::NAVY).unwrap();
        assert_eq!(slide_parts(&bytes), (5, 0));
    }
}
