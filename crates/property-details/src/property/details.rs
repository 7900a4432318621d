use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::domain::{DetailsLookup, PropertyDetails};
use super::tags::OsmTags;
use super::upstream::{endpoint, fetch_json, UpstreamError, UpstreamService};
use crate::config::UpstreamConfig;

const LEVELS_TAG: &str = "building:levels";

/// Source of structural details for a property.
#[async_trait]
pub trait DetailsProvider: Send + Sync {
    async fn details(&self, lookup: DetailsLookup<'_>) -> Result<PropertyDetails, UpstreamError>;
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    components: OsmTags,
    #[serde(default)]
    annotations: Annotations,
}

#[derive(Debug, Default, Deserialize)]
struct Annotations {
    #[serde(default, rename = "OSM")]
    osm: OsmTags,
}

/// Fold the first structured result into the fallback record.
///
/// `components` is the primary source; `osm` (the OSM annotation block) only
/// fills in the level count for the size description.
pub fn apply_components(details: &mut PropertyDetails, components: &OsmTags, osm: &OsmTags) {
    let kind = components.first_of(&["_type", "type"]);
    let category = components.first_of(&["_category", "category"]);
    let mut fragments = Vec::new();

    if kind.as_deref() == Some("residential") || category.as_deref() == Some("building") {
        if let Some(building) = components.get("building") {
            fragments.push(building);
        }
        if let Some(kind) = kind {
            fragments.push(kind);
        }
    }

    if let Some(levels) = components.get(LEVELS_TAG).or_else(|| osm.get(LEVELS_TAG)) {
        fragments.push(format!("{levels} stories"));
    }

    if components.get("apartments").is_some() {
        fragments.push("apartment building".to_string());
    }

    details.size = if fragments.is_empty() {
        "Residential Property".to_string()
    } else {
        fragments.join(" ")
    };

    if let Some(levels) = components
        .get(LEVELS_TAG)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|levels| *levels > 0)
    {
        details.rooms = levels.saturating_mul(2);
    }
}

/// [`DetailsProvider`] backed by the OpenCage geocoding API.
#[derive(Debug, Clone)]
pub struct OpenCageDetailsProvider {
    client: reqwest::Client,
    geocode_url: String,
    api_key: String,
}

impl OpenCageDetailsProvider {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            geocode_url: endpoint(&config.opencage_url, "/geocode/v1/json"),
            api_key: config.opencage_api_key.clone(),
        }
    }
}

#[async_trait]
impl DetailsProvider for OpenCageDetailsProvider {
    async fn details(&self, lookup: DetailsLookup<'_>) -> Result<PropertyDetails, UpstreamError> {
        let query = lookup.query();
        debug!(query = %query, "requesting structured details");
        let request = self
            .client
            .get(&self.geocode_url)
            .query(&[("q", query.as_str()), ("key", self.api_key.as_str())]);

        let response: GeocodeResponse = fetch_json(UpstreamService::OpenCage, request).await?;

        let mut details = PropertyDetails::fallback(Utc::now());
        if let Some(first) = response.results.first() {
            let osm = &first.annotations.osm;
            if let Some(building) = osm.get("building") {
                debug!(building = %building, "osm building type");
            }
            if let Some(levels) = osm.get(LEVELS_TAG) {
                debug!(levels = %levels, "osm building levels");
            }
            apply_components(&mut details, &first.components, osm);
        }

        Ok(details)
    }
}
