//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default directory for frontend static files
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Default SQLite database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite://retail-siting.db?mode=rwc";

/// Default bulk address file
pub const DEFAULT_CSV_PATH: &str = "data/address.csv";

/// Whether the bulk file carries projected (TM) coordinates by default
pub const DEFAULT_CSV_PROJECTED: bool = true;

/// Default outbound call timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = crate::constants::api::CALL_TIMEOUT_SECS;

/// Run the backfill worker when the server starts
pub const DEFAULT_RUN_ON_STARTUP: bool = true;

/// Default delay between backfill geocoding calls
pub const DEFAULT_DELAY_MS: u64 = crate::constants::backfill::CALL_DELAY_MS;

/// GRS80 semi-major axis in meters
pub const DEFAULT_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// GRS80 inverse flattening
pub const DEFAULT_INVERSE_FLATTENING: f64 = 298.257_222_101;

/// Korea 2000 / Central Belt 2010 latitude of origin
pub const DEFAULT_LATITUDE_OF_ORIGIN: f64 = 38.0;

/// Korea 2000 / Central Belt 2010 central meridian
pub const DEFAULT_CENTRAL_MERIDIAN: f64 = 127.0;

/// Korea 2000 / Central Belt 2010 scale factor
pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

/// Korea 2000 / Central Belt 2010 false easting
pub const DEFAULT_FALSE_EASTING: f64 = 200_000.0;

/// Korea 2000 / Central Belt 2010 false northing
pub const DEFAULT_FALSE_NORTHING: f64 = 600_000.0;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "retail-siting";
