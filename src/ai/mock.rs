use super::{OutlineService, ProviderStatus};
use crate::models::{Conclusion, Outline, SlideOutline};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outline provider.
///
/// Queued responses are consumed in order; once the queue is empty a small
/// outline derived from the topic (or feedback) is returned.
#[derive(Clone)]
pub struct MockOutlineClient {
    responses: Arc<Mutex<VecDeque<Result<Outline>>>>,
    feedback: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockOutlineClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            feedback: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Make every later call (on this client and its clones) take `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn with_outline(self, outline: Outline) -> Self {
        self.responses.lock().unwrap().push_back(Ok(outline));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::AiProvider(message.to_string())));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Feedback strings passed to `refine_outline`, in call order.
    pub fn get_feedback(&self) -> Vec<String> {
        self.feedback.lock().unwrap().clone()
    }

    /// Outline with `slide_count` content slides, each asking for an image.
    pub fn sample_outline(title: &str, slide_count: usize) -> Outline {
        let slides: Vec<SlideOutline> = (1..=slide_count)
            .map(|i| SlideOutline {
                title: format!("{} part {}", title, i),
                content: vec![
                    format!("First point about part {}", i),
                    format!("Second point about part {}", i),
                    format!("Third point about part {}", i),
                ],
                image_description: Some(format!("{} photo {}", title, i)),
            })
            .collect();

        Outline {
            presentation_title: title.to_string(),
            table_of_contents: slides.iter().map(|s| s.title.clone()).collect(),
            slides,
            conclusion: Conclusion {
                title: "Conclusion".to_string(),
                content: vec![
                    "Takeaway one".to_string(),
                    "Takeaway two".to_string(),
                    "Takeaway three".to_string(),
                ],
            },
        }
    }

    async fn next_response(&self, fallback_title: &str) -> Result<Outline> {
        *self.call_count.lock().unwrap() += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(Self::sample_outline(fallback_title, 3)),
        }
    }
}

impl Default for MockOutlineClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutlineService for MockOutlineClient {
    async fn generate_outline(&self, topic: &str) -> Result<Outline> {
        self.next_response(topic).await
    }

    async fn refine_outline(&self, current: &Outline, feedback: &str) -> Result<Outline> {
        self.feedback.lock().unwrap().push(feedback.to_string());
        self.next_response(&current.presentation_title).await
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            connected: true,
            model: Some("mock".to_string()),
        }
    }
}
