//! Application orchestration for the outline review loop.
//!
//! A turn either drafts an outline from a topic, refines the pending outline
//! with feedback, or (on confirmation) gathers photos and renders the deck.

use crate::ai::{DisconnectedOutlineClient, GroqOutlineClient, OutlineService};
use crate::deck::{DeckRenderer, DeckService};
use crate::models::{ChatEntry, Config, DeckFile, Outline, ThemeColor};
use crate::photos::{DisabledPhotoClient, PexelsClient, PhotoService};
use crate::session::{is_confirmation, Session, SessionStore};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const REVIEW_PROMPT: &str = "Type 'Yes' to generate the file, or type feedback to change it.";
pub const REFINED_PROMPT: &str = "How is this? Type 'Yes' to generate.";
pub const DONE_PROMPT: &str = "Great! What should we create next?";

/// Coordinates outline generation, photo lookup and deck rendering for every session.
pub struct App {
    outline: Box<dyn OutlineService>,
    photos: Box<dyn PhotoService>,
    deck: Box<dyn DeckService>,
    sessions: SessionStore,
    default_theme: ThemeColor,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub outline: Box<dyn OutlineService>,
    pub photos: Box<dyn PhotoService>,
    pub deck: Box<dyn DeckService>,
}

/// What a single user message produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TurnOutcome {
    pub reply: Vec<ChatEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<DeckFile>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppStatus {
    pub llm_connected: bool,
    pub model: Option<String>,
    pub images_enabled: bool,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, default_theme: ThemeColor) -> Self {
        Self {
            outline: services.outline,
            photos: services.photos,
            deck: services.deck,
            sessions: SessionStore::new(),
            default_theme,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let outline: Box<dyn OutlineService> = match &config.groq_api_key {
            Some(api_key) => {
                info!("Outline provider: Groq (model: {})", config.groq_model);
                Box::new(
                    GroqOutlineClient::new_with_client(
                        api_key.clone(),
                        config.groq_model.clone(),
                        http_client.clone(),
                    )
                    .with_base_url(config.groq_base_url.clone()),
                )
            }
            None => Box::new(DisconnectedOutlineClient),
        };

        let photos: Box<dyn PhotoService> = match &config.pexels_api_key {
            Some(api_key) => {
                info!("Photo provider: Pexels");
                Box::new(
                    PexelsClient::new_with_client(api_key.clone(), http_client)
                        .with_base_url(config.pexels_base_url.clone()),
                )
            }
            None => Box::new(DisabledPhotoClient),
        };

        let deck = Box::new(DeckRenderer::new(&config.output_dir)?);
        info!("Writing decks to {}", config.output_dir.display());

        Ok(Self::with_services(
            AppServices {
                outline,
                photos,
                deck,
            },
            config.default_theme,
        ))
    }

    pub fn status(&self) -> AppStatus {
        let provider = self.outline.status();
        AppStatus {
            llm_connected: provider.connected,
            model: provider.model,
            images_enabled: self.photos.enabled(),
        }
    }

    pub fn default_theme(&self) -> ThemeColor {
        self.default_theme
    }

    pub async fn create_session(&self) -> Session {
        let session = self.sessions.create().await;
        info!("Started session {}", session.id);
        session
    }

    pub async fn session(&self, id: Uuid) -> Result<Session> {
        self.sessions.snapshot(id).await
    }

    /// End a session and delete the files it generated.
    pub async fn delete_session(&self, id: Uuid) -> Result<()> {
        let session = self.sessions.remove(id).await?;
        for file in &session.files {
            if let Err(e) = tokio::fs::remove_file(&file.path).await {
                warn!("Failed to delete {}: {}", file.path.display(), e);
            }
        }
        info!(
            "Ended session {} ({} files removed)",
            id,
            session.files.len()
        );
        Ok(())
    }

    pub async fn file(&self, id: Uuid) -> Result<DeckFile> {
        self.sessions.find_file(id).await
    }

    /// End every session idle for at least `ttl`; returns how many were removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut evicted = 0;
        for id in self.sessions.idle_sessions(ttl).await {
            match self.delete_session(id).await {
                Ok(()) => evicted += 1,
                // Deleted by the user in the meantime
                Err(Error::SessionNotFound(_)) => {}
                Err(e) => warn!("Failed to evict session {}: {}", id, e),
            }
        }
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Periodically evict sessions idle for `ttl`.
    pub fn spawn_session_reaper(app: Arc<App>, ttl: Duration) -> JoinHandle<()> {
        let period = ttl.min(Duration::from_secs(60)).max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                debug!("Sweeping idle sessions");
                app.evict_idle(ttl).await;
            }
        })
    }

    /// Process one user message.
    ///
    /// `theme` is the requested `#RRGGBB` colour; missing or invalid values use
    /// the configured default. On error the pending outline is left as it was
    /// and the error is also recorded in the transcript.
    pub async fn handle_message(
        &self,
        session_id: Uuid,
        text: &str,
        theme: Option<&str>,
    ) -> Result<TurnOutcome> {
        let session = self.sessions.get(session_id).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("message text is empty".to_string()));
        }

        let mut guard = session.lock().await;
        guard.touch();
        guard.messages.push(ChatEntry::user(text));

        let theme = self.resolve_theme(theme);
        let result = match self.run_turn(&mut guard, text, theme).await {
            Ok(outcome) => {
                guard.messages.extend(outcome.reply.iter().cloned());
                Ok(outcome)
            }
            Err(e) => {
                error!("Turn failed for session {}: {}", session_id, e);
                guard.messages.push(ChatEntry::error(e.to_string()));
                Err(e)
            }
        };
        guard.touch();
        result
    }

    fn resolve_theme(&self, requested: Option<&str>) -> ThemeColor {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => ThemeColor::parse(value).unwrap_or_else(|e| {
                warn!("Ignoring theme colour {:?}: {}", value, e);
                self.default_theme
            }),
            None => self.default_theme,
        }
    }

    async fn run_turn(
        &self,
        session: &mut Session,
        text: &str,
        theme: ThemeColor,
    ) -> Result<TurnOutcome> {
        let Some(pending) = session.pending_outline.clone() else {
            info!("[{}] Drafting outline for topic: {}", session.id, text);
            let outline = self.outline.generate_outline(text).await?;
            session.pending_outline = Some(outline.clone());
            return Ok(Self::outline_reply(outline, REVIEW_PROMPT));
        };

        if is_confirmation(text) {
            let file = self.build_deck(&pending, theme).await?;
            session.pending_outline = None;
            self.sessions.register_file(session, file.clone()).await;
            return Ok(TurnOutcome {
                reply: vec![ChatEntry::file(file.clone()), ChatEntry::assistant(DONE_PROMPT)],
                outline: None,
                file: Some(file),
            });
        }

        info!("[{}] Refining outline with feedback: {}", session.id, text);
        let outline = self.outline.refine_outline(&pending, text).await?;
        session.pending_outline = Some(outline.clone());
        Ok(Self::outline_reply(outline, REFINED_PROMPT))
    }

    fn outline_reply(outline: Outline, prompt: &str) -> TurnOutcome {
        TurnOutcome {
            reply: vec![
                ChatEntry::outline(outline.clone()),
                ChatEntry::assistant(prompt),
            ],
            outline: Some(outline),
            file: None,
        }
    }

    async fn build_deck(&self, outline: &Outline, theme: ThemeColor) -> Result<DeckFile> {
        info!(
            "Building deck '{}' with {} content slides",
            outline.presentation_title,
            outline.slides.len()
        );

        let mut images = Vec::with_capacity(outline.slides.len());
        for slide in &outline.slides {
            let image = match slide.image_query() {
                Some(query) if self.photos.enabled() => self.photos.find_image(query).await,
                _ => None,
            };
            images.push(image);
        }

        let found = images.iter().filter(|i| i.is_some()).count();
        info!("Collected {}/{} images", found, images.len());

        let file = self.deck.render(outline, images, theme).await?;
        info!("Generated {} ({} slides)", file.file_name, file.slide_count);
        Ok(file)
    }
}
