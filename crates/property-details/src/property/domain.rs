use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// False for null island (either component exactly zero) and for anything
    /// outside the valid latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat != 0.0
            && self.lon != 0.0
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Structural summary of a property. Mostly placeholder values; see
/// [`PropertyDetails::fallback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub size: String,
    pub rooms: u32,
    pub value: f64,
    pub last_updated: DateTime<Utc>,
}

impl PropertyDetails {
    pub const FALLBACK_SIZE: &'static str = "Mock-Data";
    pub const FALLBACK_ROOMS: u32 = 3;
    pub const FALLBACK_VALUE: f64 = 500_000.0;

    pub fn fallback(last_updated: DateTime<Utc>) -> Self {
        Self {
            size: Self::FALLBACK_SIZE.to_string(),
            rooms: Self::FALLBACK_ROOMS,
            value: Self::FALLBACK_VALUE,
            last_updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    pub distance_km: f64,
    pub rating: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Aggregate response returned for a single address lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub address: String,
    pub coordinates: Coordinates,
    pub details: PropertyDetails,
    pub schools: Vec<School>,
}

/// Input handed to a [`DetailsProvider`](super::details::DetailsProvider).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailsLookup<'a> {
    Address(&'a str),
    Coordinates(Coordinates),
}

impl DetailsLookup<'_> {
    /// Query string understood by forward and reverse geocoders alike.
    pub fn query(&self) -> String {
        match self {
            DetailsLookup::Address(address) => (*address).to_string(),
            DetailsLookup::Coordinates(coords) => format!("{},{}", coords.lat, coords.lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validity_rejects_null_island_and_out_of_range() {
        assert!(Coordinates::new(37.7749, -122.4194).is_valid());
        assert!(!Coordinates::new(0.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -122.4194).is_valid());
        assert!(!Coordinates::new(91.0, -122.4194).is_valid());
        assert!(!Coordinates::new(37.7749, 181.0).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn school_serializes_with_wire_names() {
        let school = School {
            name: "Test School".to_string(),
            distance_km: 1.25,
            rating: 4.1,
            kind: "Elementary".to_string(),
        };

        let value = serde_json::to_value(&school).expect("serializes");
        assert_eq!(value["distance_km"], 1.25);
        assert_eq!(value["type"], "Elementary");
    }

    #[test]
    fn reverse_lookup_query_joins_coordinates() {
        let lookup = DetailsLookup::Coordinates(Coordinates::new(37.5, -122.25));
        assert_eq!(lookup.query(), "37.5,-122.25");
        assert_eq!(DetailsLookup::Address("1 A St").query(), "1 A St");
    }
}
