//! HTTP trigger for the cleanup pass
//!
//! Single endpoint: `GET /accountcleanup?key=<secret>`. The secret is
//! checked in constant time before any identity enumeration happens;
//! a mismatch is a 403 with zero provider calls.

use crate::cleanup::AccountCleanup;
use crate::directory::AccountDirectory;
use crate::secret::secret_matches;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct CleanupQuery {
    key: Option<String>,
}

/// The `accountcleanup` route
#[must_use]
pub fn cleanup_route<D: AccountDirectory>(
    cleanup: Arc<AccountCleanup<D>>,
    secret: Arc<str>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let cleanup = warp::any().map(move || Arc::clone(&cleanup));
    let secret = warp::any().map(move || Arc::clone(&secret));

    warp::path("accountcleanup")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<CleanupQuery>())
        .and(cleanup)
        .and(secret)
        .and_then(handle_cleanup)
}

async fn handle_cleanup<D: AccountDirectory>(
    query: CleanupQuery,
    cleanup: Arc<AccountCleanup<D>>,
    secret: Arc<str>,
) -> Result<impl Reply, Infallible> {
    let provided = query.key.unwrap_or_default();
    if !secret_matches(&provided, &secret) {
        tracing::warn!("cleanup request key does not match the configured secret");
        return Ok(warp::reply::with_status(
            "Security key does not match. Make sure your \"key\" URL query parameter \
             matches the configured cleanup secret."
                .to_string(),
            StatusCode::FORBIDDEN,
        ));
    }

    match cleanup.run().await {
        Ok(report) => Ok(warp::reply::with_status(
            format!(
                "User cleanup finished: {} deleted, {} failed, {} scanned",
                report.deleted, report.failed, report.scanned
            ),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!(%err, "cleanup pass failed");
            Ok(warp::reply::with_status(
                "User cleanup failed".to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
