use std::sync::Arc;

use tracing::{info, warn};

use super::address::{validate_address, AddressError};
use super::details::{DetailsProvider, OpenCageDetailsProvider};
use super::domain::{DetailsLookup, PropertyInfo};
use super::geocoding::{GeocodeError, Geocoder, NominatimGeocoder};
use super::schools::{OverpassSchoolsFinder, SchoolsFinder};
use super::upstream::{http_client, UpstreamError};
use crate::config::{DetailsLookupMode, UpstreamConfig};

/// Service chaining validation, geocoding, details, and school lookup.
pub struct PropertyService<G, D, S> {
    geocoder: Arc<G>,
    details: Arc<D>,
    schools: Arc<S>,
    details_lookup: DetailsLookupMode,
}

/// The production wiring against the public upstream APIs.
pub type HttpPropertyService =
    PropertyService<NominatimGeocoder, OpenCageDetailsProvider, OverpassSchoolsFinder>;

impl HttpPropertyService {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = http_client(config)?;

        Ok(Self::new(
            Arc::new(NominatimGeocoder::new(client.clone(), config)),
            Arc::new(OpenCageDetailsProvider::new(client.clone(), config)),
            Arc::new(OverpassSchoolsFinder::new(client, config)),
        )
        .with_details_lookup(config.details_lookup))
    }
}

impl<G, D, S> PropertyService<G, D, S>
where
    G: Geocoder + 'static,
    D: DetailsProvider + 'static,
    S: SchoolsFinder + 'static,
{
    pub fn new(geocoder: Arc<G>, details: Arc<D>, schools: Arc<S>) -> Self {
        Self {
            geocoder,
            details,
            schools,
            details_lookup: DetailsLookupMode::Address,
        }
    }

    pub fn with_details_lookup(mut self, mode: DetailsLookupMode) -> Self {
        self.details_lookup = mode;
        self
    }

    /// Run the full pipeline for one address. Stages run strictly in order and
    /// the first failure aborts the lookup.
    pub async fn lookup(&self, address: &str) -> Result<PropertyInfo, PropertyError> {
        let result = self.run_stages(address).await;

        match &result {
            Ok(info) => info!(
                address,
                lat = info.coordinates.lat,
                lon = info.coordinates.lon,
                schools = info.schools.len(),
                "property lookup complete"
            ),
            Err(err) => warn!(
                address,
                stage = err.stage(),
                error = %err,
                "property lookup failed"
            ),
        }

        result
    }

    async fn run_stages(&self, address: &str) -> Result<PropertyInfo, PropertyError> {
        validate_address(address)?;

        let coordinates = self.geocoder.geocode(address).await?;

        let lookup = match self.details_lookup {
            DetailsLookupMode::Address => DetailsLookup::Address(address),
            DetailsLookupMode::Coordinates => DetailsLookup::Coordinates(coordinates),
        };
        let details = self
            .details
            .details(lookup)
            .await
            .map_err(PropertyError::Details)?;

        let schools = self
            .schools
            .nearby_schools(coordinates)
            .await
            .map_err(PropertyError::Schools)?;

        Ok(PropertyInfo {
            address: address.to_string(),
            coordinates,
            details,
            schools,
        })
    }
}

/// Lookup failure tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("address validation failed: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("geocoding failed: {0}")]
    Geocoding(#[from] GeocodeError),
    #[error("failed to get property details: {0}")]
    Details(#[source] UpstreamError),
    #[error("failed to get nearby schools: {0}")]
    Schools(#[source] UpstreamError),
}

impl PropertyError {
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "validation",
            Self::Geocoding(_) => "geocoding",
            Self::Details(_) => "details",
            Self::Schools(_) => "schools",
        }
    }
}
