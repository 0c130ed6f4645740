use super::client::GroqHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ResponseFormat};
use crate::ai::{OutlineService, ProviderStatus};
use crate::models::Outline;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const TEMPERATURE: f32 = 0.7;

pub struct GroqOutlineClient {
    http: GroqHttpClient,
    model: String,
}

impl GroqOutlineClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GroqHttpClient::new_with_client(api_key, Duration::from_secs(60), client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    async fn request_outline(&self, user_prompt: String) -> Result<Outline> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::OUTLINE_SYSTEM),
                ChatMessage::user(user_prompt),
            ],
            temperature: TEMPERATURE,
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self.http.chat_completion(&request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::AiProvider("No choices in Groq response".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Groq reply was truncated at the token limit");
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::AiProvider("Empty message in Groq response".to_string()))?;

        let outline = Outline::parse(&content)?;
        tracing::info!(
            "Received outline '{}' with {} content slides",
            outline.presentation_title,
            outline.slides.len()
        );
        Ok(outline)
    }
}

#[async_trait]
impl OutlineService for GroqOutlineClient {
    async fn generate_outline(&self, topic: &str) -> Result<Outline> {
        tracing::debug!("Requesting outline for topic: {}", topic);
        self.request_outline(prompts::render(prompts::OUTLINE_USER, &[("topic", topic)]))
            .await
    }

    async fn refine_outline(&self, current: &Outline, feedback: &str) -> Result<Outline> {
        tracing::debug!("Refining outline with feedback: {}", feedback);
        let current_json = serde_json::to_string(current)?;
        self.request_outline(prompts::render(
            prompts::OUTLINE_REFINE,
            &[("outline", current_json.as_str()), ("feedback", feedback)],
        ))
        .await
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            connected: true,
            model: Some(self.model.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn outline_reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    const OUTLINE_JSON: &str = r#"{"presentation_title":"Bees","table_of_contents":["Hives"],"slides":[{"title":"Hives","content":["a","b","c"],"image_description":"beehive"}],"conclusion":{"title":"Conclusion","content":["x","y","z"]}}"#;

    fn make_client(server: &MockServer, model: &str) -> GroqOutlineClient {
        GroqOutlineClient::new("test-key".to_string(), model.to_string())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_outline_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_string_contains("Create a presentation about: bees"))
            .and(body_string_contains("\"json_object\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(outline_reply(OUTLINE_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let outline = make_client(&server, "llama")
            .generate_outline("bees")
            .await
            .unwrap();

        assert_eq!(outline.presentation_title, "Bees");
        assert_eq!(outline.slides[0].image_query(), Some("beehive"));
    }

    #[tokio::test]
    async fn test_generate_outline_sends_configured_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("\"model\":\"custom-model\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(outline_reply(OUTLINE_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server, "custom-model")
            .generate_outline("bees")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refine_outline_sends_current_outline_and_feedback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("User Feedback: make it shorter"))
            .and(body_string_contains("Hives"))
            .respond_with(ResponseTemplate::new(200).set_body_json(outline_reply(OUTLINE_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let current = Outline::parse(OUTLINE_JSON).unwrap();
        let refined = make_client(&server, "llama")
            .refine_outline(&current, "make it shorter")
            .await
            .unwrap();
        assert_eq!(refined, current);
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = make_client(&server, "llama")
            .generate_outline("bees")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(ref msg) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_non_outline_reply_returns_outline_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(outline_reply(r#"{"presentation_title":"x","slides":[]}"#)),
            )
            .mount(&server)
            .await;

        let err = make_client(&server, "llama")
            .generate_outline("bees")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Outline(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = make_client(&server, "llama")
            .generate_outline("bees")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_status_reports_model() {
        let client = GroqOutlineClient::new("k".to_string(), "llama".to_string());
        assert_eq!(
            client.status(),
            ProviderStatus {
                connected: true,
                model: Some("llama".to_string()),
            }
        );
    }
}
