use super::{build_pptx, DeckService};
use crate::models::{DeckFile, Outline, ThemeColor};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub struct DeckRenderer {
    output_dir: PathBuf,
}

impl DeckRenderer {
    pub fn new(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Pick an id whose short file name is not taken yet.
    fn allocate(&self) -> (Uuid, String, PathBuf) {
        loop {
            let id = Uuid::new_v4();
            let file_name = file_name_for(&id);
            let path = self.output_dir.join(&file_name);
            if !path.exists() {
                return (id, file_name, path);
            }
        }
    }
}

/// `generated_presentation_<6 hex>.pptx`
pub fn file_name_for(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    format!("generated_presentation_{}.pptx", &hex[..6])
}

#[async_trait]
impl DeckService for DeckRenderer {
    async fn render(
        &self,
        outline: &Outline,
        images: Vec<Option<Vec<u8>>>,
        theme: ThemeColor,
    ) -> Result<DeckFile> {
        let slide_count = outline.deck_slide_count();
        let bytes = tokio::task::spawn_blocking({
            let outline = outline.clone();
            move || build_pptx(&outline, &images, theme)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Deck rendering task join error: {}", e)))??;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let (id, file_name, path) = self.allocate();
        tokio::fs::write(&path, &bytes).await?;

        info!(
            "Saved {} ({} slides, {} bytes)",
            path.display(),
            slide_count,
            bytes.len()
        );

        Ok(DeckFile {
            id,
            file_name,
            path,
            slide_count,
            created_at: Utc::now(),
        })
    }
}
