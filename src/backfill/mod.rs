//! Coordinate backfill worker
//!
//! Geocodes every address still holding sentinel coordinates and writes the
//! result back, one committed transaction per address. Calls are spaced by a
//! fixed delay to respect the provider's rate limit and are never retried; an
//! address whose lookup fails stays pending until the next run.
//!
//! [`BackfillJob`] supervises runs: it refuses to start a second run while one
//! is active and keeps a [`JobStatus`] operators can query.

use crate::constants::address::EMPTY_PLACEHOLDER;
use crate::error::{Error, Result};
use crate::provider::ForwardGeocoder;
use crate::store::{self, AddressRecord, AddressStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of the backfill job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Counters of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSummary {
    /// Pending records found
    pub scanned: usize,
    /// Records geocoded and written back
    pub updated: usize,
    /// Records whose lookup failed
    pub failed: usize,
}

/// Observable status of the backfill job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    /// Id of the current or last run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    /// Number of runs started since the process began
    pub runs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Counters of the last finished run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<BackfillSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Text sent to the geocoder for a record
///
/// The land-lot address is preferred; the road-name address is used when the
/// land-lot address is the empty placeholder.
pub fn lookup_address(record: &AddressRecord) -> &str {
    if record.landlot_address == EMPTY_PLACEHOLDER {
        &record.road_name_address
    } else {
        &record.landlot_address
    }
}

/// Geocode every pending record once
///
/// Stops at the first persistence error; rows committed before it stay.
pub async fn run_once(
    store: &AddressStore,
    geocoder: &dyn ForwardGeocoder,
    delay: Duration,
) -> Result<BackfillSummary> {
    let records = {
        let mut conn = store.session().await?;
        store::pending(&mut conn).await?
    };

    let mut summary = BackfillSummary {
        scanned: records.len(),
        ..BackfillSummary::default()
    };
    info!(pending = summary.scanned, "Starting coordinate backfill");

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }

        let query = lookup_address(record);
        let coords = match geocoder.geocode(query).await {
            Ok(coords) if coords.validate().is_ok() => coords,
            Ok(coords) => {
                warn!(address = query, lat = coords.lat, lon = coords.lon, "Geocoder returned out-of-range coordinates");
                summary.failed += 1;
                continue;
            }
            Err(e) => {
                warn!(address = query, error = %e, "Geocoding failed, leaving record pending");
                summary.failed += 1;
                continue;
            }
        };

        let mut tx = store.begin().await?;
        match store::update_coordinates(&mut tx, &record.landlot_address, coords).await {
            Ok(true) => tx.commit().await?,
            Ok(false) => {
                tx.rollback().await?;
                warn!(address = %record.landlot_address, "Record disappeared before its coordinates were stored");
                summary.failed += 1;
                continue;
            }
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        }

        debug!(address = query, lat = coords.lat, lon = coords.lon, "Stored coordinates");
        summary.updated += 1;
    }

    info!(
        scanned = summary.scanned,
        updated = summary.updated,
        failed = summary.failed,
        "Coordinate backfill finished"
    );
    Ok(summary)
}

/// Supervised backfill job
#[derive(Clone)]
pub struct BackfillJob {
    store: AddressStore,
    geocoder: Arc<dyn ForwardGeocoder>,
    delay: Duration,
    status: Arc<RwLock<JobStatus>>,
}

impl BackfillJob {
    /// Create a job that has not run yet
    pub fn new(store: AddressStore, geocoder: Arc<dyn ForwardGeocoder>, delay: Duration) -> Self {
        Self {
            store,
            geocoder,
            delay,
            status: Arc::new(RwLock::new(JobStatus::default())),
        }
    }

    /// Snapshot of the current status
    pub async fn status(&self) -> JobStatus {
        self.status.read().await.clone()
    }

    /// Mark a run as started, or fail if one is already running
    async fn start(&self) -> Result<Uuid> {
        let mut status = self.status.write().await;
        if status.state == JobState::Running {
            return Err(Error::Conflict("Backfill is already running".to_string()));
        }

        let run_id = Uuid::new_v4();
        status.state = JobState::Running;
        status.run_id = Some(run_id);
        status.runs += 1;
        status.started_at = Some(Utc::now());
        status.finished_at = None;
        status.last_error = None;
        Ok(run_id)
    }

    async fn finish(&self, run_id: Uuid, result: &Result<BackfillSummary>) {
        let mut status = self.status.write().await;
        status.finished_at = Some(Utc::now());
        match result {
            Ok(summary) => {
                status.state = JobState::Completed;
                status.last_summary = Some(*summary);
                info!(%run_id, "Backfill run completed");
            }
            Err(e) => {
                status.state = JobState::Failed;
                status.last_error = Some(e.to_string());
                error!(%run_id, error = %e, "Backfill run failed");
            }
        }
    }

    /// Run in the foreground and return the summary
    pub async fn run(&self) -> Result<BackfillSummary> {
        let run_id = self.start().await?;
        let result = run_once(&self.store, self.geocoder.as_ref(), self.delay).await;
        self.finish(run_id, &result).await;
        result
    }

    /// Start a run in the background
    ///
    /// Returns [`Error::Conflict`] if a run is already in progress.
    pub async fn trigger(&self) -> Result<JoinHandle<()>> {
        let run_id = self.start().await?;
        info!(%run_id, "Backfill run scheduled");

        let job = self.clone();
        Ok(tokio::spawn(async move {
            let result = run_once(&job.store, job.geocoder.as_ref(), job.delay).await;
            job.finish(run_id, &result).await;
        }))
    }
}
