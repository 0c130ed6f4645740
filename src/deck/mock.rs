use super::renderer::file_name_for;
use super::DeckService;
use crate::models::{DeckFile, Outline, ThemeColor};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Renderer that records calls and writes nothing.
#[derive(Clone)]
pub struct MockDeckRenderer {
    render_count: Arc<Mutex<usize>>,
    image_counts: Arc<Mutex<Vec<usize>>>,
    themes: Arc<Mutex<Vec<ThemeColor>>>,
    base_path: PathBuf,
    should_fail: Arc<Mutex<bool>>,
}

impl MockDeckRenderer {
    pub fn new() -> Self {
        Self {
            render_count: Arc::new(Mutex::new(0)),
            image_counts: Arc::new(Mutex::new(Vec::new())),
            themes: Arc::new(Mutex::new(Vec::new())),
            base_path: PathBuf::from("/tmp"),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_render_count(&self) -> usize {
        *self.render_count.lock().unwrap()
    }

    /// Number of present images passed to each `render` call.
    pub fn get_image_counts(&self) -> Vec<usize> {
        self.image_counts.lock().unwrap().clone()
    }

    pub fn get_themes(&self) -> Vec<ThemeColor> {
        self.themes.lock().unwrap().clone()
    }
}

impl Default for MockDeckRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeckService for MockDeckRenderer {
    async fn render(
        &self,
        outline: &Outline,
        images: Vec<Option<Vec<u8>>>,
        theme: ThemeColor,
    ) -> Result<DeckFile> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Io(std::io::Error::other("Mock failure")));
        }

        *self.render_count.lock().unwrap() += 1;
        self.image_counts
            .lock()
            .unwrap()
            .push(images.iter().filter(|i| i.is_some()).count());
        self.themes.lock().unwrap().push(theme);

        let id = Uuid::new_v4();
        let file_name = file_name_for(&id);
        Ok(DeckFile {
            id,
            path: self.base_path.join(&file_name),
            file_name,
            slide_count: outline.deck_slide_count(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockOutlineClient;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let renderer = MockDeckRenderer::new();
        let outline = MockOutlineClient::sample_outline("Test", 3);

        let file = renderer
            .render(&outline, vec![Some(vec![1]), None, Some(vec![2])], ThemeColor::NAVY)
            .await
            .unwrap();

        assert_eq!(file.slide_count, 7);
        assert!(file.path.starts_with("/tmp"));
        assert_eq!(renderer.get_render_count(), 1);
        assert_eq!(renderer.get_image_counts(), vec![2]);
        assert_eq!(renderer.get_themes(), vec![ThemeColor::NAVY]);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let renderer = MockDeckRenderer::new().with_failure(true);
        let outline = MockOutlineClient::sample_outline("Test", 1);

        assert!(renderer
            .render(&outline, vec![], ThemeColor::NAVY)
            .await
            .is_err());
        assert_eq!(renderer.get_render_count(), 0);
    }
}
