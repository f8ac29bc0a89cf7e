// src/places/mod.rs
//! Client for the places nearby-search REST upstream.
//!
//! The API key is attached server-side as a query parameter; callers of the
//! gateway never see it. `ZERO_RESULTS` is an empty candidate list, every
//! other non-OK upstream status is an error.

use anyhow::Result;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::geo::Coordinate;

/// A place returned by a nearby-search query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub place_id: Option<String>,
    pub location: Coordinate,
    pub vicinity: Option<String>,
    pub rating: Option<f64>,
}

pub struct PlacesClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl PlacesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Forward a nearby search and return the upstream JSON body verbatim.
    /// Used by the gateway passthrough route.
    pub async fn nearby_search_raw(
        &self,
        location: Coordinate,
        radius: u32,
        keyword: &str,
    ) -> Result<Value> {
        let url = format!("{}/nearbysearch/json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", location.to_string()),
                ("radius", radius.to_string()),
                ("keyword", keyword.to_string()),
                ("key", self.api_key.clone()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Places API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }

    /// Typed nearby search for the location-search flow. Candidates missing a
    /// geometry are skipped rather than failing the whole result set.
    pub async fn search_nearby(
        &self,
        location: Coordinate,
        radius: u32,
        keyword: &str,
    ) -> Result<Vec<Candidate>> {
        let body = self.nearby_search_raw(location, radius, keyword).await?;
        let parsed: NearbySearchResponse = serde_json::from_value(body)?;

        match parsed.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            other => anyhow::bail!(
                "Places API status: {} - {}",
                other,
                parsed.error_message.unwrap_or_default()
            ),
        }

        let candidates = parsed
            .results
            .into_iter()
            .filter_map(|place| {
                let location = place.geometry?.location;
                Some(Candidate {
                    name: place.name,
                    place_id: place.place_id,
                    location: Coordinate::new(location.lat, location.lng),
                    vicinity: place.vicinity,
                    rating: place.rating,
                })
            })
            .collect();

        Ok(candidates)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct PlaceResult {
    name: String,
    place_id: Option<String>,
    geometry: Option<PlaceGeometry>,
    vicinity: Option<String>,
    rating: Option<f64>,
}

#[derive(Deserialize)]
struct PlaceGeometry {
    location: PlaceLatLng,
}

#[derive(Deserialize)]
struct PlaceLatLng {
    lat: f64,
    lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nearby_search_response() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "name": "Community Food Bank",
                    "place_id": "abc123",
                    "geometry": { "location": { "lat": 40.001, "lng": -75.0 } },
                    "vicinity": "12 Main St",
                    "rating": 4.5
                },
                {
                    "name": "No Geometry Org"
                }
            ]
        });

        let parsed: NearbySearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.results.len(), 2);
        assert!(parsed.results[1].geometry.is_none());
    }

    #[test]
    fn zero_results_has_empty_list() {
        let body = serde_json::json!({ "status": "ZERO_RESULTS" });
        let parsed: NearbySearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.status, "ZERO_RESULTS");
        assert!(parsed.results.is_empty());
    }
}
