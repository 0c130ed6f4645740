use super::PhotoService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory photo provider for tests and offline runs.
#[derive(Clone)]
pub struct MockPhotoClient {
    image: Arc<Mutex<Vec<u8>>>,
    missing: Arc<Mutex<HashSet<String>>>,
    fetch_fails: Arc<Mutex<bool>>,
    queries: Arc<Mutex<Vec<String>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockPhotoClient {
    pub fn new() -> Self {
        Self {
            image: Arc::new(Mutex::new(sample_png(16, 9))),
            missing: Arc::new(Mutex::new(HashSet::new())),
            fetch_fails: Arc::new(Mutex::new(false)),
            queries: Arc::new(Mutex::new(Vec::new())),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(self, bytes: Vec<u8>) -> Self {
        *self.image.lock().unwrap() = bytes;
        self
    }

    /// Make searches for `query` come back empty.
    pub fn with_no_results_for(self, query: &str) -> Self {
        self.missing.lock().unwrap().insert(query.to_string());
        self
    }

    pub fn with_fetch_failure(self, fails: bool) -> Self {
        *self.fetch_fails.lock().unwrap() = fails;
        self
    }

    pub fn get_search_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockPhotoClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Solid-colour PNG of the given size.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 120, 200]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .expect("encoding an in-memory PNG cannot fail");
    bytes
}

#[async_trait]
impl PhotoService for MockPhotoClient {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.missing.lock().unwrap().contains(query) {
            return Ok(None);
        }
        Ok(Some(format!(
            "https://mock-photos.example.com/{}.png",
            query.replace(' ', "-")
        )))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        *self.fetch_count.lock().unwrap() += 1;

        if *self.fetch_fails.lock().unwrap() {
            return Err(Error::ImageSearch(format!("Mock download failure: {}", url)));
        }
        Ok(self.image.lock().unwrap().clone())
    }
}
