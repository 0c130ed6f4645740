//! Data models and structures
//!
//! Defines the outline produced by the LLM, the chat history entries shown in
//! the UI, generated deck files and the environment configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

fn default_presentation_title() -> String {
    "Presentation".to_string()
}

fn default_slide_title() -> String {
    "Slide".to_string()
}

fn default_conclusion_title() -> String {
    "Conclusion".to_string()
}

/// Slide-by-slide plan returned by the LLM and reviewed by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outline {
    #[serde(default = "default_presentation_title")]
    pub presentation_title: String,
    #[serde(default)]
    pub table_of_contents: Vec<String>,
    #[serde(default)]
    pub slides: Vec<SlideOutline>,
    #[serde(default)]
    pub conclusion: Conclusion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideOutline {
    #[serde(default = "default_slide_title")]
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
}

impl SlideOutline {
    /// Stock-photo query for this slide, if the LLM supplied a usable one.
    pub fn image_query(&self) -> Option<&str> {
        self.image_description
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conclusion {
    #[serde(default = "default_conclusion_title")]
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
}

impl Default for Conclusion {
    fn default() -> Self {
        Self {
            title: default_conclusion_title(),
            content: Vec::new(),
        }
    }
}

impl Outline {
    /// Parse the raw text of an LLM reply into an outline.
    ///
    /// Markdown code fences and chatter around the JSON object are tolerated.
    /// An outline without content slides is rejected.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let json = extract_json_object(raw)
            .ok_or_else(|| crate::Error::Outline("reply contains no JSON object".to_string()))?;

        let outline: Outline = serde_json::from_str(json)
            .map_err(|e| crate::Error::Outline(format!("invalid outline JSON: {}", e)))?;

        if outline.slides.is_empty() {
            return Err(crate::Error::Outline(
                "outline contains no content slides".to_string(),
            ));
        }

        Ok(outline)
    }

    /// Number of slides the rendered deck will contain: title, table of
    /// contents, every content slide, conclusion and the closing slide.
    pub fn deck_slide_count(&self) -> usize {
        self.slides.len() + 4
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Theme colour applied to bars, titles, borders and the closing slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ThemeColor {
    pub const NAVY: ThemeColor = ThemeColor {
        r: 0,
        g: 51,
        b: 102,
    };

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn parse(input: &str) -> crate::Result<Self> {
        let hex = input.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(crate::Error::InvalidInput(format!(
                "'{}' is not a #RRGGBB colour",
                input
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| {
                crate::Error::InvalidInput(format!("'{}' is not a #RRGGBB colour", input))
            })
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Parse a colour, falling back to navy when the input is unusable.
    pub fn parse_or_default(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|e| {
            tracing::warn!("{}; using default theme colour", e);
            Self::NAVY
        })
    }

    /// Upper-case hex without `#`, as DrawingML expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for ThemeColor {
    fn default() -> Self {
        Self::NAVY
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Payload of one chat history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryBody {
    Text { text: String },
    Outline { outline: Outline },
    File { file: DeckFile },
    Error { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub role: ChatRole,
    #[serde(flatten)]
    pub body: EntryBody,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            body: EntryBody::Text { text: text.into() },
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: EntryBody::Text { text: text.into() },
        }
    }

    pub fn outline(outline: Outline) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: EntryBody::Outline { outline },
        }
    }

    pub fn file(file: DeckFile) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: EntryBody::File { file },
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: EntryBody::Error { text: text.into() },
        }
    }
}

/// A rendered presentation waiting to be downloaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckFile {
    pub id: Uuid,
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub slide_count: usize,
    pub created_at: DateTime<Utc>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub pexels_api_key: Option<String>,
    pub pexels_base_url: String,
    pub output_dir: PathBuf,
    pub bind_addr: String,
    pub default_theme: ThemeColor,
    pub session_ttl: Duration,
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Idle session lifetime in whole seconds; must be positive.
fn parse_session_ttl(value: &str) -> crate::Result<Duration> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(crate::Error::InvalidInput(format!(
            "SESSION_TTL_SECS must be a positive number of seconds, got '{}'",
            value
        ))),
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn check_dotenv(loaded: dotenvy::Result<PathBuf>) -> crate::Result<()> {
    match loaded {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        check_dotenv(dotenvy::dotenv())?;

        let groq_api_key = optional_env("GROQ_API_KEY");
        if groq_api_key.is_none() {
            tracing::warn!("GROQ_API_KEY not set; outline generation is unavailable");
        }

        let pexels_api_key = optional_env("PEXELS_API_KEY");
        if pexels_api_key.is_none() {
            tracing::warn!("PEXELS_API_KEY not set; decks will be built without images");
        }

        Ok(Self {
            groq_api_key,
            groq_model: env_or("GROQ_MODEL_NAME", "llama-3.3-70b-versatile"),
            groq_base_url: env_or("GROQ_BASE_URL", "https://api.groq.com/openai"),
            pexels_api_key,
            pexels_base_url: env_or("PEXELS_BASE_URL", "https://api.pexels.com"),
            output_dir: PathBuf::from(env_or("OUTPUT_DIR", "output")),
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8080"),
            default_theme: ThemeColor::parse_or_default(&env_or(
                "DEFAULT_THEME_COLOR",
                "#003366",
            )),
            session_ttl: parse_session_ttl(&env_or("SESSION_TTL_SECS", "3600"))?,
        })
    }
}
