use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::parse_date;
use super::{ApiError, ApiResponse, AppState, AvailabilityRowDto};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Defaults to today when absent.
    pub date: Option<String>,
}

/// GET /availability
/// The public board: every catalog machine with its spec and whether an
/// approved reservation covers the requested date. Date-only; the daily
/// time window is not consulted for this summary view.
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<Vec<AvailabilityRowDto>>>, ApiError> {
    let as_of = match query.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let board = state.engine().availability(as_of).await?;

    let rows = board
        .into_iter()
        .filter_map(|(machine_id, availability)| {
            state
                .catalog()
                .get(&machine_id)
                .map(|machine| AvailabilityRowDto::new(machine, availability))
        })
        .collect();

    Ok(Json(ApiResponse::success(rows)))
}
