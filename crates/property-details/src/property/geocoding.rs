use async_trait::async_trait;
use serde::Deserialize;
use std::num::ParseFloatError;
use tracing::debug;

use super::domain::Coordinates;
use super::upstream::{endpoint, fetch_json, UpstreamError, UpstreamService};
use crate::config::UpstreamConfig;

/// Resolves a free-text address to a single coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("address not found")]
    NotFound,
    #[error("invalid {axis} value '{value}': {source}")]
    InvalidCoordinate {
        axis: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchMatch {
    lat: String,
    lon: String,
}

impl SearchMatch {
    fn coordinates(&self) -> Result<Coordinates, GeocodeError> {
        Ok(Coordinates::new(
            parse_axis("latitude", &self.lat)?,
            parse_axis("longitude", &self.lon)?,
        ))
    }
}

fn parse_axis(axis: &'static str, raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|source| GeocodeError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
            source,
        })
}

/// [`Geocoder`] backed by the Nominatim `search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            search_url: endpoint(&config.nominatim_url, "/search"),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        debug!(address, "geocoding address");
        let request = self
            .client
            .get(&self.search_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")]);

        let matches: Vec<SearchMatch> = fetch_json(UpstreamService::Nominatim, request).await?;
        let first = matches.first().ok_or(GeocodeError::NotFound)?;
        first.coordinates()
    }
}
