//! Address and postal-code geocoding.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocoderConfig;

/// One resolved place
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No location found for '{0}'")]
    NoResults(String),

    #[error("Geocoder is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolves free-form addresses and postal codes to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeoLocation, GeocodeError>;
}

/// MapQuest geocoding API client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: String,
    #[serde(default)]
    admin_area5: String,
    #[serde(default)]
    admin_area3: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    admin_area1: String,
    lat_lng: MapQuestLatLng,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

impl From<MapQuestLocation> for GeoLocation {
    fn from(loc: MapQuestLocation) -> Self {
        let region = format!("{} {}", loc.admin_area3, loc.postal_code);
        let formatted_address = [
            loc.street.as_str(),
            loc.admin_area5.as_str(),
            region.as_str(),
            loc.admin_area1.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        GeoLocation {
            latitude: loc.lat_lng.lat,
            longitude: loc.lat_lng.lng,
            formatted_address,
            street: non_empty(loc.street),
            city: non_empty(loc.admin_area5),
            state: non_empty(loc.admin_area3),
            zipcode: non_empty(loc.postal_code),
            country: non_empty(loc.admin_area1),
        }
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeoLocation, GeocodeError> {
        let api_key = self.api_key.as_deref().ok_or(GeocodeError::NotConfigured("GEOCODER_API_KEY"))?;

        let response: MapQuestResponse = self
            .client
            .get(format!("{}/address", self.base_url))
            .query(&[("key", api_key), ("location", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .map(GeoLocation::from)
            .ok_or_else(|| GeocodeError::NoResults(query.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapquest_payload() {
        let payload = serde_json::json!({
            "results": [{
                "locations": [{
                    "street": "233 Bay State Rd",
                    "adminArea5": "Boston",
                    "adminArea3": "MA",
                    "postalCode": "02215",
                    "adminArea1": "US",
                    "latLng": { "lat": 42.350846, "lng": -71.105995 }
                }]
            }]
        });
        let response: MapQuestResponse = serde_json::from_value(payload).unwrap();
        let location = response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .map(GeoLocation::from)
            .unwrap();
        assert_eq!(location.formatted_address, "233 Bay State Rd, Boston, MA 02215, US");
        assert_eq!(location.zipcode.as_deref(), Some("02215"));
        assert_eq!(location.longitude, -71.105995);
    }

    #[tokio::test]
    async fn missing_api_key_is_reported() {
        let geocoder = MapQuestGeocoder::new(&GeocoderConfig {
            api_key: None,
            base_url: "http://localhost:1".to_string(),
        });
        assert!(matches!(
            geocoder.geocode("02215").await,
            Err(GeocodeError::NotConfigured(_))
        ));
    }
}
