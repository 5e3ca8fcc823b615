use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ChatError};
use crate::osm::PlaceItem;
use crate::pipeline::{self, ChatOutcome};
use crate::AppState;

pub const PROMPT_MIN_CHARS: usize = 2;
pub const PROMPT_MAX_CHARS: usize = 500;

const HELP_MESSAGE: &str =
    "I can help you find places to eat/go/visit. Try: 'seafood in Senayan'.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FindPlaces,
    Unknown,
    Error,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let len = self.prompt.chars().count();
        if len < PROMPT_MIN_CHARS {
            return Err(ApiError::InvalidPrompt(format!(
                "prompt must be at least {} characters",
                PROMPT_MIN_CHARS
            )));
        }
        if len > PROMPT_MAX_CHARS {
            return Err(ApiError::InvalidPrompt(format!(
                "prompt must be at most {} characters",
                PROMPT_MAX_CHARS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub intent: Intent,
    pub city: Option<String>,
    #[serde(default)]
    pub items: Vec<PlaceItem>,
    pub message: String,
}

impl ChatResponse {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            city: None,
            items: Vec::new(),
            message: HELP_MESSAGE.to_string(),
        }
    }

    pub fn places(city: String, items: Vec<PlaceItem>) -> Self {
        let message = format!(
            "Here are some places in {}. Click a result to open it in OpenStreetMap.",
            city
        );
        Self {
            intent: Intent::FindPlaces,
            city: Some(city),
            items,
            message,
        }
    }

    pub fn error(err: &ChatError) -> Self {
        Self {
            intent: Intent::Error,
            city: None,
            items: Vec::new(),
            message: format!("An error occurred: {}", err),
        }
    }

    /// Map a pipeline result onto a reply. Only the not-found outcome
    /// escapes as an HTTP-level error.
    pub fn assemble(result: Result<ChatOutcome, ChatError>) -> Result<Self, ApiError> {
        match result {
            Ok(ChatOutcome::Unknown) => Ok(Self::unknown()),
            Ok(ChatOutcome::NotFound { city }) => {
                tracing::info!(%city, "no places found");
                Err(ApiError::NotFound)
            }
            Ok(ChatOutcome::Places { city, items }) => Ok(Self::places(city, items)),
            Err(e) => {
                tracing::error!(error = %e, "chat pipeline failed");
                Ok(Self::error(&e))
            }
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody {
        status: rejection.status(),
        detail: rejection.body_text(),
    })?;
    request.validate()?;

    let result = pipeline::run(&state.config, &request.prompt).await;
    ChatResponse::assemble(result).map(Json)
}
