//! Chat-driven slide deck generator
//!
//! Turns a topic into a reviewed outline with an LLM, illustrates it with
//! stock photos and writes the result as a downloadable `.pptx` file.

pub mod ai;
pub mod app;
pub mod deck;
pub mod error;
pub mod models;
pub mod photos;
pub mod prompts;
pub mod server;
pub mod session;

pub use error::{Error, Result};
