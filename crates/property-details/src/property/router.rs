use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::details::DetailsProvider;
use super::domain::PropertyInfo;
use super::geocoding::Geocoder;
use super::schools::SchoolsFinder;
use super::service::PropertyService;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyQuery {
    #[serde(default)]
    address: Option<String>,
}

/// Router exposing `GET /property?address=...`.
pub fn property_router<G, D, S>(service: Arc<PropertyService<G, D, S>>) -> Router
where
    G: Geocoder + 'static,
    D: DetailsProvider + 'static,
    S: SchoolsFinder + 'static,
{
    Router::new()
        .route(
            "/property",
            get(property_handler::<G, D, S>).options(preflight_handler),
        )
        .with_state(service)
}

pub(crate) async fn property_handler<G, D, S>(
    State(service): State<Arc<PropertyService<G, D, S>>>,
    query: Result<Query<PropertyQuery>, QueryRejection>,
) -> Result<Json<PropertyInfo>, AppError>
where
    G: Geocoder + 'static,
    D: DetailsProvider + 'static,
    S: SchoolsFinder + 'static,
{
    let Query(params) = query.map_err(|_| AppError::BadRequest("invalid address format"))?;
    let address = params
        .address
        .filter(|address| !address.is_empty())
        .ok_or(AppError::BadRequest("address parameter is required"))?;

    let info = service.lookup(&address).await?;
    Ok(Json(info))
}

/// Plain `OPTIONS` requests get an empty 200; CORS preflights are answered by
/// the CORS layer before reaching here.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}
