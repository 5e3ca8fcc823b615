/// Keyword -> Overpass amenity alternation. Checked in declaration order;
/// the first key found anywhere in the prompt wins.
const AMENITY_TABLE: [(&str, &str); 11] = [
    ("restaurant", RESTAURANT_FILTER),
    ("cafe", "cafe"),
    ("coffee", "cafe"),
    ("warung", "restaurant|fast_food"),
    ("bakso", "restaurant"),
    ("mie", "restaurant"),
    ("sate", "restaurant"),
    ("seafood", "restaurant"),
    ("museum", "museum"),
    ("park", "park"),
    ("mall", "marketplace|mall|supermarket"),
];

pub const RESTAURANT_FILTER: &str = "restaurant|fast_food|cafe|food_court";
pub const SIGHTSEEING_FILTER: &str = "museum|park|tourism";

const EAT_WORDS: [&str; 5] = ["eat", "makan", "restaurant", "kuliner", "food"];
const VISIT_WORDS: [&str; 5] = ["go", "visit", "tempat", "wisata", "attraction"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub city: String,
    pub amenity: String,
}

/// Resolve the city (falling back to `default_city`) and amenity filter for
/// a prompt.
pub fn parse(prompt: &str, default_city: &str) -> ParsedQuery {
    ParsedQuery {
        city: parse_city(prompt).unwrap_or_else(|| default_city.to_string()),
        amenity: guess_amenity(prompt).to_string(),
    }
}

/// Pull a trailing "in <place>" / "di <place>" phrase off the prompt.
pub fn parse_city(prompt: &str) -> Option<String> {
    let city_pattern = regex::Regex::new(r"(?i)\b(in|di)\s+([a-zA-Z\s]+)$").ok()?;
    let caps = city_pattern.captures(prompt.trim())?;
    let city = caps.get(2)?.as_str().trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

pub fn guess_amenity(prompt: &str) -> &'static str {
    let p = prompt.to_lowercase();

    if let Some((_, filter)) = AMENITY_TABLE.iter().find(|(key, _)| p.contains(key)) {
        return *filter;
    }

    if EAT_WORDS.iter().any(|w| p.contains(w)) {
        return RESTAURANT_FILTER;
    }

    if VISIT_WORDS.iter().any(|w| p.contains(w)) {
        return SIGHTSEEING_FILTER;
    }

    RESTAURANT_FILTER
}
