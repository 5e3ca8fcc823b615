//! OpenStreetMap lookups: Nominatim for geocoding, Overpass for the
//! amenity search around the geocoded point.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::ChatError;

pub const SEARCH_RADIUS_M: u32 = 5000;
const UNNAMED: &str = "(Unnamed)";

const GEOCODE_TIMEOUT: Duration = Duration::from_secs(20);
const OVERPASS_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceItem {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub osm_id: String,
    pub category: Option<String>,
    pub rating: Option<f32>,
}

#[derive(Deserialize)]
struct GeocodeMatch {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Default, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct Center {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Client for the two OSM services, bound to one `reqwest::Client` that
/// lives as long as the request using it.
pub struct OsmClient<'a> {
    client: &'a Client,
    nominatim_url: &'a str,
    overpass_url: &'a str,
}

impl<'a> OsmClient<'a> {
    pub fn new(client: &'a Client, config: &'a AppConfig) -> Self {
        Self {
            client,
            nominatim_url: &config.nominatim_url,
            overpass_url: &config.overpass_url,
        }
    }

    /// Best Nominatim match for `city`, or `None` when nothing matched.
    pub async fn geocode_city(&self, city: &str) -> Result<Option<Coordinates>, ChatError> {
        let response = self
            .client
            .get(format!("{}/search", self.nominatim_url))
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .timeout(GEOCODE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let matches: Vec<GeocodeMatch> = response.json().await?;
        let Some(best) = matches.into_iter().next() else {
            return Ok(None);
        };

        let coords = Coordinates {
            lat: parse_coordinate("lat", &best.lat)?,
            lon: parse_coordinate("lon", &best.lon)?,
        };
        tracing::debug!(
            city,
            display_name = best.display_name.as_deref().unwrap_or(""),
            lat = coords.lat,
            lon = coords.lon,
            "geocoded city"
        );
        Ok(Some(coords))
    }

    /// Geocode `city` and run the amenity search around it. Returns an empty
    /// list without touching Overpass when the city cannot be geocoded.
    pub async fn search_places(
        &self,
        city: &str,
        amenity: &str,
        max_results: usize,
    ) -> Result<Vec<PlaceItem>, ChatError> {
        let Some(coords) = self.geocode_city(city).await? else {
            tracing::info!(city, "city not found by geocoder");
            return Ok(Vec::new());
        };

        self.search_around(coords, amenity, max_results).await
    }

    pub async fn search_around(
        &self,
        coords: Coordinates,
        amenity: &str,
        max_results: usize,
    ) -> Result<Vec<PlaceItem>, ChatError> {
        let query = build_overpass_query(amenity, SEARCH_RADIUS_M, coords);
        tracing::debug!(%query, "overpass query");

        let response = self
            .client
            .post(self.overpass_url)
            .form(&[("data", query.as_str())])
            .timeout(OVERPASS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let overpass: OverpassResponse = response.json().await?;
        Ok(extract_places(overpass.elements, max_results))
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, ChatError> {
    value
        .trim()
        .parse()
        .map_err(|_| ChatError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

pub fn build_overpass_query(amenity: &str, radius: u32, at: Coordinates) -> String {
    let around = format!("(around:{},{},{})", radius, at.lat, at.lon);
    format!(
        "[out:json][timeout:25];\
         (node[amenity~\"{a}\"]{r}; way[amenity~\"{a}\"]{r}; rel[amenity~\"{a}\"]{r};);\
         out center;",
        a = amenity,
        r = around
    )
}

/// Keep the first `max_results` elements in response order, dropping any
/// without usable coordinates. Elements are dropped after truncation, so
/// the result can be shorter than `max_results`.
fn extract_places(elements: Vec<OverpassElement>, max_results: usize) -> Vec<PlaceItem> {
    elements
        .into_iter()
        .take(max_results)
        .filter_map(place_from_element)
        .collect()
}

fn place_from_element(el: OverpassElement) -> Option<PlaceItem> {
    let (lat, lon) = match el.center.filter(|c| c.lat.is_some() || c.lon.is_some()) {
        Some(center) => (center.lat, center.lon),
        None => (el.lat, el.lon),
    };

    // A coordinate of exactly 0.0 is treated the same as a missing one.
    let lat = lat.filter(|v| *v != 0.0)?;
    let lon = lon.filter(|v| *v != 0.0)?;

    let tags = el.tags;
    let tag = |key: &str| tags.get(key).map(String::as_str).filter(|v| !v.is_empty());

    let name = tag("name").unwrap_or(UNNAMED).to_string();

    let parts: Vec<&str> = ["addr:street", "addr:housenumber", "addr:city", "addr:postcode"]
        .into_iter()
        .filter_map(|key| tag(key))
        .collect();
    let address = if parts.is_empty() {
        tag("addr:full").unwrap_or_default().to_string()
    } else {
        parts.join(", ")
    };

    let category = tag("amenity").or_else(|| tag("tourism")).map(str::to_string);

    Some(PlaceItem {
        name,
        address,
        lat,
        lon,
        osm_id: el.id.map(|id| id.to_string()).unwrap_or_default(),
        category,
        rating: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elements(value: serde_json::Value) -> Vec<OverpassElement> {
        let response: OverpassResponse = serde_json::from_value(value).unwrap();
        response.elements
    }

    #[test]
    fn test_overpass_query_text() {
        let query = build_overpass_query("cafe", 5000, Coordinates { lat: -6.9, lon: 107.6 });
        assert_eq!(
            query,
            "[out:json][timeout:25];\
             (node[amenity~\"cafe\"](around:5000,-6.9,107.6); \
             way[amenity~\"cafe\"](around:5000,-6.9,107.6); \
             rel[amenity~\"cafe\"](around:5000,-6.9,107.6););\
             out center;"
        );
    }

    #[test]
    fn test_node_and_way_elements() {
        let places = extract_places(
            elements(json!({
                "elements": [
                    {
                        "type": "node", "id": 101, "lat": -6.91, "lon": 107.61,
                        "tags": {
                            "name": "Sate Hadori", "amenity": "restaurant",
                            "addr:street": "Jl. Stasiun Barat", "addr:housenumber": "9",
                            "addr:city": "Bandung", "addr:postcode": "40181"
                        }
                    },
                    {
                        "type": "way", "id": 202, "center": { "lat": -6.92, "lon": 107.62 },
                        "tags": { "tourism": "museum", "addr:full": "Jl. Diponegoro 57" }
                    }
                ]
            })),
            5,
        );

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Sate Hadori");
        assert_eq!(places[0].address, "Jl. Stasiun Barat, 9, Bandung, 40181");
        assert_eq!(places[0].osm_id, "101");
        assert_eq!(places[0].category.as_deref(), Some("restaurant"));
        assert_eq!(places[0].rating, None);

        assert_eq!(places[1].name, "(Unnamed)");
        assert_eq!(places[1].address, "Jl. Diponegoro 57");
        assert_eq!((places[1].lat, places[1].lon), (-6.92, 107.62));
        assert_eq!(places[1].category.as_deref(), Some("museum"));
    }

    #[test]
    fn test_partial_address_skips_empty_parts() {
        let places = extract_places(
            elements(json!({
                "elements": [{
                    "id": 1, "lat": 1.5, "lon": 2.5,
                    "tags": { "addr:street": "Jl. Braga", "addr:housenumber": "", "addr:city": "Bandung" }
                }]
            })),
            5,
        );
        assert_eq!(places[0].address, "Jl. Braga, Bandung");
        assert_eq!(places[0].category, None);
    }

    #[test]
    fn test_null_center_is_dropped() {
        let places = extract_places(
            elements(json!({
                "elements": [
                    { "type": "way", "id": 1, "center": null, "tags": { "name": "Ghost" } },
                    { "type": "way", "id": 2, "center": { "lat": -6.9, "lon": 107.6 }, "tags": { "name": "Real" } }
                ]
            })),
            5,
        );
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Real");
        assert_eq!(places[0].osm_id, "2");
    }

    #[test]
    fn test_zero_coordinate_is_dropped() {
        let places = extract_places(
            elements(json!({
                "elements": [
                    { "id": 1, "lat": 0.0, "lon": 9.0 },
                    { "id": 2, "lat": 3.0, "lon": null },
                    { "id": 3, "lat": 3.0, "lon": 9.0 }
                ]
            })),
            5,
        );
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].osm_id, "3");
    }

    #[test]
    fn test_truncates_in_response_order() {
        let places = extract_places(
            elements(json!({
                "elements": [
                    { "id": 5, "lat": 1.0, "lon": 1.0, "tags": { "name": "Zeta" } },
                    { "id": 4, "lat": 1.0, "lon": 1.0, "tags": { "name": "Alpha" } },
                    { "id": 3, "lat": 1.0, "lon": 1.0, "tags": { "name": "Mid" } },
                    { "id": 2, "lat": 1.0, "lon": 1.0, "tags": { "name": "Beta" } }
                ]
            })),
            2,
        );
        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_bad_geocoder_coordinate() {
        assert_eq!(parse_coordinate("lat", " -6.9 ").unwrap(), -6.9);
        assert!(matches!(
            parse_coordinate("lon", "east"),
            Err(ChatError::InvalidCoordinate { field: "lon", .. })
        ));
    }
}
