//! Address-to-property lookup: validate, geocode, enrich with structural
//! details, and resolve nearby schools.

mod address;
pub mod details;
pub mod domain;
pub mod geo;
pub mod geocoding;
pub mod router;
pub mod schools;
pub mod service;
mod tags;
pub mod upstream;

pub use address::{validate_address, AddressError};
pub use details::{DetailsProvider, OpenCageDetailsProvider};
pub use domain::{Coordinates, DetailsLookup, PropertyDetails, PropertyInfo, School};
pub use geocoding::{GeocodeError, Geocoder, NominatimGeocoder};
pub use router::property_router;
pub use schools::{mock_school_rating, school_type, OverpassSchoolsFinder, SchoolsFinder};
pub use service::{HttpPropertyService, PropertyError, PropertyService};
pub use tags::OsmTags;
pub use upstream::{UpstreamError, UpstreamService};
