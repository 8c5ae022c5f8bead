use serde::Deserialize;

use crate::api::Backend;
use crate::config::build_api_url;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct PostcodeResponse {
    #[serde(default)]
    result: Option<PostcodeResult>,
}

#[derive(Debug, Deserialize)]
struct PostcodeResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Strips all whitespace and upper-cases: " sw1a 1aa " -> "SW1A1AA".
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub fn postcode_url(base: &str, postcode: &str) -> String {
    build_api_url(base, &format!("/postcodes/{}", normalize_postcode(postcode)))
}

/// Any failure (transport, status, missing result) is a miss.
pub fn postcode_to_coordinates<B: Backend + ?Sized>(
    backend: &B,
    base: &str,
    postcode: &str,
) -> Option<Coordinates> {
    let cleaned = normalize_postcode(postcode);
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let body = backend.get(&postcode_url(base, &cleaned)).ok()?;
    parse_postcode_json(&body)
}

pub fn parse_postcode_json(raw: &str) -> Option<Coordinates> {
    let parsed: PostcodeResponse = serde_json::from_str(raw.trim()).ok()?;
    let result = parsed.result?;
    Some(Coordinates {
        latitude: result.latitude?,
        longitude: result.longitude?,
    })
}
