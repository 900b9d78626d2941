//! retail-siting: backend for choosing retail store locations
//!
//! A library and HTTP service that keeps a table of Korean addresses with
//! WGS84 coordinates and answers siting questions around a point.
//!
//! ## Features
//!
//! - Bulk address import with Transverse Mercator grid to WGS84 conversion
//! - Background coordinate backfill through a forward geocoder
//! - Nearby shops grouped into buildings within 50 m of a point
//! - Great-circle distance helpers
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use retail_siting::geo::distance::haversine_distance;
//! use retail_siting::geo::projection::{to_wgs84, TransverseMercator};
//! use retail_siting::Coordinates;
//!
//! let gangnam = Coordinates::new(37.498095, 127.027610);
//! let yeoksam = Coordinates::new(37.500622, 127.036456);
//! println!("{:.0} m apart", haversine_distance(gangnam, yeoksam));
//!
//! // EPSG:5186 grid origin
//! let tm = TransverseMercator::default();
//! let origin = to_wgs84(&tm, Some(200_000.0), Some(600_000.0)).unwrap();
//! assert!((origin.lat - 38.0).abs() < 1e-9);
//! ```

pub mod backfill;
pub mod building;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod provider;
pub mod server;
pub mod store;
pub mod zones;

// Re-export commonly used types
pub use building::NearbyBuildings;
pub use config::Config;
pub use error::{Error, Result};
pub use geo::Coordinates;
pub use store::{AddressRecord, AddressStore};
