//! Bulk address import from CSV
//!
//! Expected header (Korean public-data column names are accepted as aliases):
//!
//! ```text
//! landlot_address,road_name_address,x,y
//! ```
//!
//! `x`/`y` are projected grid coordinates by default, or longitude/latitude
//! when the import is configured as geographic. Missing or unusable
//! coordinates are stored as the sentinel pair; missing address text is
//! stored as the empty placeholder.

use crate::config::Config;
use crate::constants::address::EMPTY_PLACEHOLDER;
use crate::error::{Error, Result};
use crate::geo::projection::{to_wgs84, TransverseMercator};
use crate::geo::{is_sentinel, Coordinates};
use crate::store::{self, AddressRecord, AddressStore};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// How the x/y columns should be interpreted
#[derive(Debug, Clone, Copy)]
pub enum CoordinateColumns {
    /// Grid coordinates in the given projection
    Projected(TransverseMercator),
    /// x = longitude, y = latitude in degrees
    Geographic,
}

impl CoordinateColumns {
    /// Interpretation configured for the bulk address file
    pub fn from_config(config: &Config) -> Self {
        if config.database.csv_projected {
            CoordinateColumns::Projected(TransverseMercator::new(&config.projection))
        } else {
            CoordinateColumns::Geographic
        }
    }
}

/// One CSV row before normalization
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default, alias = "지번주소", alias = "소재지전체주소")]
    landlot_address: Option<String>,
    #[serde(default, alias = "도로명주소", alias = "도로명전체주소")]
    road_name_address: Option<String>,
    #[serde(default, alias = "좌표정보(x)", alias = "longitude", deserialize_with = "csv::invalid_option")]
    x: Option<f64>,
    #[serde(default, alias = "좌표정보(y)", alias = "latitude", deserialize_with = "csv::invalid_option")]
    y: Option<f64>,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    /// Rows read from the file
    pub read: usize,
    /// Rows inserted into the table
    pub inserted: u64,
    /// Rows stored without coordinates
    pub without_coordinates: usize,
}

fn text_or_placeholder(value: Option<String>) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string())
}

fn normalize(row: CsvRow, columns: &CoordinateColumns) -> AddressRecord {
    let coords = match columns {
        CoordinateColumns::Projected(tm) => to_wgs84(tm, row.x, row.y),
        CoordinateColumns::Geographic => match (row.x, row.y) {
            (Some(lon), Some(lat)) if !is_sentinel(lon) && !is_sentinel(lat) => {
                let c = Coordinates::new(lat, lon);
                c.validate().ok().map(|_| c)
            }
            _ => None,
        },
    };

    let landlot = text_or_placeholder(row.landlot_address);
    let road = text_or_placeholder(row.road_name_address);

    match coords {
        Some(c) => AddressRecord::resolved(landlot, road, c),
        None => AddressRecord::pending(landlot, road),
    }
}

/// Parse address records from CSV data
pub fn read_records<R: Read>(reader: R, columns: &CoordinateColumns) -> Result<Vec<AddressRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CsvRow>() {
        records.push(normalize(row?, columns));
    }
    Ok(records)
}

/// Load a CSV file into the store
///
/// Rows whose land-lot address already exists are skipped; since the
/// placeholder is itself a key, at most one row without a land-lot address
/// is kept.
pub async fn import_file(
    store: &AddressStore,
    path: &Path,
    columns: &CoordinateColumns,
) -> Result<ImportSummary> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Config(format!("Failed to open address file {}: {}", path.display(), e))
    })?;
    let records = read_records(std::io::BufReader::new(file), columns)?;

    let without_coordinates = records.iter().filter(|r| r.needs_geocoding()).count();

    let mut tx = store.begin().await?;
    let inserted = store::insert_all(&mut tx, &records).await?;
    tx.commit().await?;

    let summary = ImportSummary {
        read: records.len(),
        inserted,
        without_coordinates,
    };

    if summary.inserted < summary.read as u64 {
        warn!(
            duplicates = summary.read as u64 - summary.inserted,
            "Skipped rows with duplicate land-lot addresses"
        );
    }
    info!(
        path = %path.display(),
        read = summary.read,
        inserted = summary.inserted,
        without_coordinates = summary.without_coordinates,
        "Imported address file"
    );

    Ok(summary)
}

/// Seed the store from `path` only if the table is empty
///
/// A missing file is not an error here: the service starts with whatever the
/// table already holds.
pub async fn import_if_empty(
    store: &AddressStore,
    path: &Path,
    columns: &CoordinateColumns,
) -> Result<Option<ImportSummary>> {
    let existing = {
        let mut conn = store.session().await?;
        store::count(&mut conn).await?
    };

    if existing > 0 {
        info!(rows = existing, "Address table already populated, skipping import");
        return Ok(None);
    }

    if !path.exists() {
        warn!(path = %path.display(), "Address file not found, starting with an empty table");
        return Ok(None);
    }

    import_file(store, path, columns).await.map(Some)
}
