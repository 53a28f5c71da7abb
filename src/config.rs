use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "MTGSEARCH_API_URL";

pub const SEARCH_PATH: &str = "/cards/search";
pub const PRINTINGS_PATH: &str = "/cards/printings";
pub const FILTERS_PATH: &str = "/cards/filters";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of cards per result page, matching the upstream API.
pub const PAGE_SIZE: usize = 175;

/// Card types offered as filters when the catalog has to derive them itself.
pub const CARD_TYPES: &[&str] = &[
    "Artifact",
    "Battle",
    "Creature",
    "Enchantment",
    "Instant",
    "Land",
    "Planeswalker",
    "Sorcery",
];

/// `(symbol, label)` pairs for the color filter, in WUBRG order.
pub const COLORS: &[(&str, &str)] = &[
    ("W", "White"),
    ("U", "Blue"),
    ("B", "Black"),
    ("R", "Red"),
    ("G", "Green"),
    ("C", "Colorless"),
];

pub fn default_base_url() -> String {
    match std::env::var(BASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
