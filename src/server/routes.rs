//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::backfill::{lookup_address, JobStatus};
use crate::building::NearbyBuildings;
use crate::constants::backfill::PREVIEW_BATCH_SIZE;
use crate::constants::search::{SAMPLE_LATITUDE, SAMPLE_LONGITUDE};
use crate::error::Error;
use crate::geo::Coordinates;
use crate::provider::SearchItem;
use crate::server::session::DbSession;
use crate::server::state::AppState;
use crate::store;
use crate::zones::{check_eligibility, restricted_zones, Geometry};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/", get(root_handler))
        .route("/check-location/:latitude/:longitude", get(check_location_handler))
        .route("/restricted-zones", get(restricted_zones_handler))
        .route("/geocode", get(geocode_preview_handler))
        .route("/getcoordinates/toORS", get(export_coordinates_handler))
        .route("/building/nearby-buildings", get(nearby_buildings_handler))
        .route("/building/test/gangnam", get(gangnam_test_handler))
        .route("/building/test/search-only", get(search_only_handler))
        .route("/admin/backfill", get(backfill_status_handler).post(backfill_trigger_handler))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_COORDINATES" | "INELIGIBLE" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "PROVIDER_ERROR" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Ineligible(_) => "INELIGIBLE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Provider(_) => "PROVIDER_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Simple message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Welcome endpoint
///
/// GET /
async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Retail Siting API!".to_string(),
    })
}

/// Eligibility response
#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub status: String,
    pub message: String,
}

/// Check whether a location is eligible for a new retailer
///
/// GET /check-location/:latitude/:longitude
async fn check_location_handler(
    Path((latitude, longitude)): Path<(f64, f64)>,
    _session: DbSession,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let point = Coordinates::new(latitude, longitude);
    info!(lat = latitude, lon = longitude, "Checking location eligibility");

    check_eligibility(point)?;

    Ok(Json(EligibilityResponse {
        status: "Access".to_string(),
        message: "해당 위치는 입점 가능합니다.".to_string(),
    }))
}

/// Restricted zones response
#[derive(Debug, Serialize, Deserialize)]
pub struct ZonesResponse {
    pub status: String,
    pub zones: Vec<Geometry>,
}

/// List restricted zones
///
/// GET /restricted-zones
async fn restricted_zones_handler(_session: DbSession) -> Json<ZonesResponse> {
    Json(ZonesResponse {
        status: "success".to_string(),
        zones: restricted_zones(),
    })
}

/// One geocoded address in the preview
#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodePreview {
    pub landlot_address: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Geocode preview response
#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodePreviewResponse {
    pub count: usize,
    pub results: Vec<GeocodePreview>,
}

/// Geocode the first few stored addresses without saving the results
///
/// GET /geocode
async fn geocode_preview_handler(
    State(state): State<Arc<AppState>>,
    mut session: DbSession,
) -> Result<Json<GeocodePreviewResponse>, ApiError> {
    let records = store::sample(&mut session, PREVIEW_BATCH_SIZE).await?;
    let delay = Duration::from_millis(state.config.backfill.delay_ms);

    let mut results = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        let query = lookup_address(record);
        let preview = match state.providers.geocoder.geocode(query).await {
            Ok(coords) => GeocodePreview {
                landlot_address: record.landlot_address.clone(),
                query: query.to_string(),
                longitude: Some(coords.lon),
                latitude: Some(coords.lat),
                error: None,
            },
            Err(e) => GeocodePreview {
                landlot_address: record.landlot_address.clone(),
                query: query.to_string(),
                longitude: None,
                latitude: None,
                error: Some(e.to_string()),
            },
        };
        results.push(preview);
    }

    Ok(Json(GeocodePreviewResponse {
        count: results.len(),
        results,
    }))
}

/// One exported coordinate
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedCoordinate {
    pub landlot_address: String,
    pub road_name_address: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// Coordinate export response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub count: usize,
    pub coordinates: Vec<ExportedCoordinate>,
}

/// Export every address with resolved coordinates
///
/// GET /getcoordinates/toORS
async fn export_coordinates_handler(
    mut session: DbSession,
) -> Result<Json<ExportResponse>, ApiError> {
    let coordinates: Vec<ExportedCoordinate> = store::resolved(&mut session)
        .await?
        .into_iter()
        .map(|r| ExportedCoordinate {
            coordinates: [r.longitude, r.latitude],
            landlot_address: r.landlot_address,
            road_name_address: r.road_name_address,
        })
        .collect();

    Ok(Json(ExportResponse {
        count: coordinates.len(),
        coordinates,
    }))
}

/// Nearby-buildings query string
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// Buildings with shops within 50 m of a point
///
/// GET /building/nearby-buildings?latitude=..&longitude=..
async fn nearby_buildings_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyBuildings>, ApiError> {
    let origin = Coordinates::new(query.latitude, query.longitude);
    origin.validate()?;

    Ok(Json(state.finder.find(origin).await?))
}

/// Nearby buildings around Gangnam station
///
/// GET /building/test/gangnam
async fn gangnam_test_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NearbyBuildings>, ApiError> {
    let origin = Coordinates::new(SAMPLE_LATITUDE, SAMPLE_LONGITUDE);
    Ok(Json(state.finder.find(origin).await?))
}

/// Search-only query string
#[derive(Debug, Deserialize)]
pub struct SearchOnlyQuery {
    pub keyword: String,
}

/// Raw search provider response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchOnlyResponse {
    pub keyword: String,
    pub count: usize,
    pub items: Vec<SearchItem>,
}

/// Call the search provider directly
///
/// GET /building/test/search-only?keyword=..
async fn search_only_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchOnlyQuery>,
) -> Result<Json<SearchOnlyResponse>, ApiError> {
    let items = state
        .providers
        .search
        .search(&query.keyword)
        .await
        .map_err(Error::from)?;

    Ok(Json(SearchOnlyResponse {
        keyword: query.keyword,
        count: items.len(),
        items,
    }))
}

/// Backfill job status
///
/// GET /admin/backfill
async fn backfill_status_handler(State(state): State<Arc<AppState>>) -> Json<JobStatus> {
    Json(state.backfill.status().await)
}

/// Start a backfill run in the background
///
/// POST /admin/backfill
async fn backfill_trigger_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<JobStatus>), ApiError> {
    state.backfill.trigger().await?;
    Ok((StatusCode::ACCEPTED, Json(state.backfill.status().await)))
}
