//! Per-request persistence session
//!
//! Handlers that touch the database take a [`DbSession`] argument. The
//! pooled connection is acquired before the handler runs and returned to the
//! pool when the handler's future is dropped, whether it succeeded or not.

use crate::server::routes::ApiError;
use crate::server::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A pooled database connection scoped to one request
pub struct DbSession(PoolConnection<Sqlite>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let conn = state.store.session().await.map_err(ApiError::from)?;
        Ok(DbSession(conn))
    }
}

impl Deref for DbSession {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
