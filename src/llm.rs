use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::ChatError;

const SYSTEM: &str = "You are a short, decisive intent helper. \
Given a user's prompt, reply with exactly one of : FIND_PLACES or UNKNOWN.";

const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Words that send a prompt down the place search even when the model
/// says otherwise.
const ACTION_KEYWORDS: [&str; 6] = ["eat", "makan", "visit", "places", "restaurant", "cafe"];

/// What the model thinks the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FindPlaces,
    Unknown,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Asks the local Ollama server whether a prompt is a request for places.
pub struct IntentClassifier {
    host: String,
    model: String,
    user_agent: String,
}

impl IntentClassifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            host: config.ollama_host.clone(),
            model: config.ollama_model.clone(),
            user_agent: config.user_agent(),
        }
    }

    /// Returns `FindPlaces` or `Unknown`. Any failure talking to the model
    /// is reported as `Unknown`.
    pub async fn classify(&self, prompt: &str) -> Verdict {
        match self.generate(prompt).await {
            Ok(out) => {
                tracing::debug!(verdict = %out.trim(), "classifier replied");
                parse_verdict(&out)
            }
            Err(e) => {
                tracing::warn!(error = %e, "intent classifier unavailable, assuming UNKNOWN");
                Verdict::Unknown
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(CLASSIFY_TIMEOUT)
            .build()?;

        let request_body = GenerateRequest {
            model: &self.model,
            prompt: format!("{}\nUSER: {}\nASSISTANT:", SYSTEM, prompt),
            stream: false,
        };

        let response = client
            .post(format!("{}/api/generate", self.host))
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        let generate_response: GenerateResponse = response.json().await?;
        Ok(generate_response.response)
    }
}

fn parse_verdict(out: &str) -> Verdict {
    if out.trim().to_uppercase().contains("FIND_PLACES") {
        Verdict::FindPlaces
    } else {
        Verdict::Unknown
    }
}

/// Case-insensitive check for the action keywords that override an
/// `Unknown` verdict.
pub fn has_action_keyword(prompt: &str) -> bool {
    let p = prompt.to_lowercase();
    ACTION_KEYWORDS.iter().any(|w| p.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("FIND_PLACES"), Verdict::FindPlaces);
        assert_eq!(parse_verdict("  find_places.\n"), Verdict::FindPlaces);
        assert_eq!(
            parse_verdict("The answer is: Find_Places"),
            Verdict::FindPlaces
        );
        assert_eq!(parse_verdict("UNKNOWN"), Verdict::Unknown);
        assert_eq!(parse_verdict(""), Verdict::Unknown);
        assert_eq!(parse_verdict("find places"), Verdict::Unknown);
    }

    #[test]
    fn test_action_keywords() {
        assert!(has_action_keyword("Where can I EAT tonight"));
        assert!(has_action_keyword("mau makan di mana"));
        assert!(has_action_keyword("cafe near the station"));
        assert!(has_action_keyword("places to see"));
        assert!(!has_action_keyword("what's the weather like"));
    }

    #[tokio::test]
    async fn test_unreachable_model_is_unknown() {
        let config = AppConfig {
            // Nothing listens on port 1
            ollama_host: "http://127.0.0.1:1".to_string(),
            ..AppConfig::default()
        };
        let classifier = IntentClassifier::new(&config);
        assert_eq!(
            classifier.classify("seafood in Bandung").await,
            Verdict::Unknown
        );
    }
}
