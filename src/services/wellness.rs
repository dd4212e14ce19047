//! Mood tracking and daily wellness content
//!
//! These endpoints also accept anonymous visitors; with no stored session
//! the requests simply go out without a bearer token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

const MOOD_LOG_PATH: &str = "mentalhealth/mood/log/";
const MOOD_HISTORY_PATH: &str = "mentalhealth/mood/history/";
const WELLNESS_TIP_PATH: &str = "mentalhealth/wellness-tip/";
const JOURNAL_PROMPTS_PATH: &str = "mentalhealth/journal-prompts/";

/// One day of the mood history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// `YYYY-MM-DD`
    pub date: String,
    pub mood: String,
}

#[derive(Debug, Serialize)]
struct MoodLog<'a> {
    mood: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TipResponse {
    #[serde(default)]
    tip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptsResponse {
    #[serde(default)]
    prompts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WellnessService {
    api: Arc<ApiClient>,
}

impl WellnessService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Records today's mood and returns the backend's message
    ///
    /// Only one mood is kept per day; a second log the same day is
    /// acknowledged without replacing the first.
    pub async fn log_mood(&self, mood: &str) -> Result<String, ApiError> {
        let response: MessageResponse = self.api.post_json(MOOD_LOG_PATH, &MoodLog { mood }).await?;
        tracing::debug!("Mood logged: {}", response.message);
        Ok(response.message)
    }

    /// Moods of the last seven days, oldest first
    pub async fn mood_history(&self) -> Result<Vec<MoodEntry>, ApiError> {
        self.api.get_json(MOOD_HISTORY_PATH).await
    }

    pub async fn wellness_tip(&self) -> Result<Option<String>, ApiError> {
        let response: TipResponse = self.api.get_json(WELLNESS_TIP_PATH).await?;
        Ok(response.tip.filter(|tip| !tip.trim().is_empty()))
    }

    pub async fn journal_prompts(&self) -> Result<Vec<String>, ApiError> {
        let response: PromptsResponse = self.api.get_json(JOURNAL_PROMPTS_PATH).await?;
        Ok(response.prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LogNavigator, MemoryStorage};
    use crate::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> WellnessService {
        let config = ClientConfig::new(format!("{}/api/", server.uri()));
        let api = ApiClient::new(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(LogNavigator),
        )
        .unwrap();
        WellnessService::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_log_mood() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/mentalhealth/mood/log/"))
            .and(body_json(json!({"mood": "calm"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Mood logged successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let message = service(&server).log_mood("calm").await.unwrap();
        assert_eq!(message, "Mood logged successfully.");
    }

    #[tokio::test]
    async fn test_log_mood_requires_mood() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/mentalhealth/mood/log/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Mood is required."})),
            )
            .mount(&server)
            .await;

        let error = service(&server).log_mood("").await.unwrap_err();
        assert_eq!(error.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_mood_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentalhealth/mood/history/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "2026-10-16", "mood": "sad"},
                {"date": "2026-10-17", "mood": "happy"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let history = service(&server).mood_history().await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(
            history[1],
            MoodEntry {
                date: "2026-10-17".into(),
                mood: "happy".into()
            }
        );
    }

    #[tokio::test]
    async fn test_wellness_tip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentalhealth/wellness-tip/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tip": "Drink a glass of water."})),
            )
            .mount(&server)
            .await;

        let tip = service(&server).wellness_tip().await.unwrap();
        assert_eq!(tip.as_deref(), Some("Drink a glass of water."));
    }

    #[tokio::test]
    async fn test_blank_wellness_tip_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentalhealth/wellness-tip/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tip": " "})))
            .mount(&server)
            .await;

        assert_eq!(service(&server).wellness_tip().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_journal_prompts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentalhealth/journal-prompts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prompts": ["What made you smile today?", "What are you grateful for?"]
            })))
            .mount(&server)
            .await;

        let prompts = service(&server).journal_prompts().await.unwrap();
        assert_eq!(prompts.len(), 2);
    }
}
