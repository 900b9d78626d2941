//! Centralized constants for the retail-siting crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Stored in place of longitude/latitude until an address is geocoded
    pub const SENTINEL_COORDINATE: f64 = -1.0;
}

/// Address table constants
pub mod address {
    /// Stored in place of missing address text
    pub const EMPTY_PLACEHOLDER: &str = "EMPTY";
}

/// External API endpoints
pub mod api {
    /// Naver Cloud Platform map gateway (geocode + reverse geocode)
    pub const NCP_MAPS_URL: &str = "https://naveropenapi.apigw.ntruss.com";

    /// Naver open API (local keyword search)
    pub const NAVER_SEARCH_URL: &str = "https://openapi.naver.com";

    /// Connect/read timeout applied to every outbound call
    pub const CALL_TIMEOUT_SECS: u64 = 10;
}

/// Nearby-building search settings
pub mod search {
    /// Only places within this distance of the query point are kept
    pub const NEARBY_RADIUS_METERS: f64 = 50.0;

    /// Scale factor of the search provider's integer map coordinates
    pub const MAP_COORDINATE_SCALE: f64 = 10_000_000.0;

    /// Items requested per category search (provider maximum)
    pub const DISPLAY_SIZE: u32 = 5;

    /// Sort order passed to the search provider
    pub const SORT_ORDER: &str = "random";

    /// Category keywords searched around every query point
    pub const CATEGORIES: [&str; 6] = ["편의점", "카페", "음식점", "약국", "마트", "은행"];

    /// Gangnam station, used by the developer test endpoint
    pub const SAMPLE_LATITUDE: f64 = 37.498095;
    pub const SAMPLE_LONGITUDE: f64 = 127.027610;
}

/// Backfill worker settings
pub mod backfill {
    /// Delay between successive geocoding calls
    pub const CALL_DELAY_MS: u64 = 100;

    /// Number of addresses geocoded by the preview endpoint
    pub const PREVIEW_BATCH_SIZE: i64 = 5;
}
