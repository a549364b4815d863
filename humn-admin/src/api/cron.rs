//! Scheduled referral count refresh

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::services::referrals::referral_counts;
use crate::store::CronLog;
use crate::{AppState, Result};

const UPDATE_REFERRALS: &str = "update-referrals";
const DEFAULT_LOG_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_processed: Option<u64>,
}

/// GET /api/cron/update-referrals
///
/// Recounts referrals for every person. Each run is recorded in the cron
/// log whether it succeeds or not.
pub async fn update_referrals(State(state): State<AppState>) -> Response {
    info!("Starting referral count update");

    let outcome = refresh_referral_counts(&state).await;
    let timestamp = humn_common::time::now();

    let log = match &outcome {
        Ok(processed) => CronLog {
            operation: UPDATE_REFERRALS.to_string(),
            timestamp,
            success: true,
            users_processed: Some(*processed),
            error: None,
        },
        Err(e) => CronLog {
            operation: UPDATE_REFERRALS.to_string(),
            timestamp,
            success: false,
            users_processed: None,
            error: Some(e.to_string()),
        },
    };
    if let Err(e) = state.store.record_cron_run(log).await {
        error!("Failed to record cron run: {}", e);
    }

    match outcome {
        Ok(processed) => {
            info!("Referral counts updated for {} people", processed);
            Json(CronResponse {
                success: true,
                message: Some("Referral counts updated successfully".to_string()),
                error: None,
                timestamp,
                users_processed: Some(processed),
            })
            .into_response()
        }
        Err(e) => {
            error!("Referral count update failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CronResponse {
                    success: false,
                    message: None,
                    error: Some("Failed to update referral counts".to_string()),
                    timestamp,
                    users_processed: None,
                }),
            )
                .into_response()
        }
    }
}

async fn refresh_referral_counts(state: &AppState) -> Result<u64> {
    let people = state.store.list_people().await?;
    let counts = referral_counts(&people);
    state.store.set_referral_counts(&counts).await?;
    Ok(people.len() as u64)
}

#[derive(Debug, Deserialize)]
pub struct CronLogQuery {
    limit: Option<u32>,
}

/// GET /api/admin/cron-logs?limit=<n>
pub async fn list_cron_logs(
    State(state): State<AppState>,
    Query(query): Query<CronLogQuery>,
) -> Result<Json<Vec<CronLog>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, 500);
    Ok(Json(state.store.recent_cron_runs(limit).await?))
}
