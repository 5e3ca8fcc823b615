use reqwest::Client;

use crate::config::AppConfig;
use crate::error::ChatError;
use crate::llm::{self, IntentClassifier, Verdict};
use crate::osm::{OsmClient, PlaceItem};
use crate::query_parser;

/// What a single chat prompt resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// Not a request for places.
    Unknown,
    /// The city could not be geocoded or the search came back empty.
    NotFound { city: String },
    Places { city: String, items: Vec<PlaceItem> },
}

/// Run one prompt through classification, parsing, geocoding and the
/// place search. Steps run strictly in sequence.
pub async fn run(config: &AppConfig, prompt: &str) -> Result<ChatOutcome, ChatError> {
    let verdict = IntentClassifier::new(config).classify(prompt).await;
    if verdict != Verdict::FindPlaces && !llm::has_action_keyword(prompt) {
        return Ok(ChatOutcome::Unknown);
    }

    let parsed = query_parser::parse(prompt, &config.default_location);
    tracing::info!(city = %parsed.city, amenity = %parsed.amenity, ?verdict, "searching places");

    // Dropped on every return path below
    let client = Client::builder().user_agent(config.user_agent()).build()?;
    let osm = OsmClient::new(&client, config);

    let items = osm
        .search_places(&parsed.city, &parsed.amenity, config.max_results)
        .await?;

    if items.is_empty() {
        return Ok(ChatOutcome::NotFound { city: parsed.city });
    }

    tracing::info!(city = %parsed.city, count = items.len(), "places found");
    Ok(ChatOutcome::Places {
        city: parsed.city,
        items,
    })
}
