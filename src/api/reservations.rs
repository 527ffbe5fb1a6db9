use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthedUser;
use super::validation::{parse_date, parse_time};
use super::{ApiError, ApiResponse, AppState, ReservationDto};
use crate::engine::slot::{DateRange, Slot, TimeWindow};
use crate::models::reservation::{ListFilter, ReservationStatus};

#[derive(Debug, Deserialize)]
pub struct SubmitReservationRequest {
    pub machine_id: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub status: Option<String>,
    pub machine: Option<String>,
    pub requester: Option<String>,
}

/// POST /reservations
/// Submit a reservation request. The requester is always the
/// authenticated user; the payload cannot reserve on someone's behalf.
pub async fn submit_reservation(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Json(payload): Json<SubmitReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationDto>>), ApiError> {
    let slot = Slot::new(
        DateRange::new(
            parse_date("start_date", &payload.start_date)?,
            parse_date("end_date", &payload.end_date)?,
        ),
        TimeWindow::new(
            parse_time("start_time", &payload.start_time)?,
            parse_time("end_time", &payload.end_time)?,
        ),
    );

    let reservation = state
        .engine()
        .submit(&authed.username, &payload.machine_id, slot)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}

/// GET /reservations
/// Admins see the whole ledger with optional filters. Other users see
/// their own requests, or the full board of a single machine (the board
/// is what tells a requester which slots are already taken).
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<ApiResponse<Vec<ReservationDto>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            ReservationStatus::parse(s)
                .ok_or_else(|| ApiError::validation(format!("Unknown status: {s}")))
        })
        .transpose()?;

    let mut filter = ListFilter {
        requester: query.requester,
        status,
        machine_id: query.machine,
    };

    if !authed.role.is_admin() {
        if filter.machine_id.is_none() {
            filter.requester = Some(authed.username.clone());
        } else {
            // Machine board: visible to everyone, but a non-admin cannot
            // combine it with someone else's requester filter.
            if filter.requester.as_deref().is_some_and(|r| r != authed.username) {
                return Err(ApiError::forbidden(
                    "Only administrators can filter by other requesters",
                ));
            }
        }
    }

    let reservations = state.engine().list(&filter).await?;

    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

/// POST /reservations/{id}/approve (admin)
/// Fails with 409 and the competing ids when the slot is already taken.
pub async fn approve_reservation(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    authed.require_admin()?;

    state.engine().approve(id).await?;

    let reservation = state
        .store()
        .get_reservation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    Ok(Json(ApiResponse::success(reservation.into())))
}

/// POST /reservations/{id}/reject (admin)
pub async fn reject_reservation(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    authed.require_admin()?;

    state.engine().reject(id).await?;

    let reservation = state
        .store()
        .get_reservation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

    Ok(Json(ApiResponse::success(reservation.into())))
}

/// DELETE /reservations/{id} (admin)
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    authed.require_admin()?;

    state.engine().delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
