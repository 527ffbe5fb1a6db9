use serde::Serialize;

use crate::catalog::Machine;
use crate::engine::Availability;
use crate::models::reservation::Reservation;
use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationDto {
    pub id: i32,
    pub requester: String,
    pub machine_id: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub created_at: String,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            requester: r.requester,
            machine_id: r.machine_id,
            start_date: r.slot.dates.start.to_string(),
            end_date: r.slot.dates.end.to_string(),
            start_time: r.slot.window.start.format("%H:%M").to_string(),
            end_time: r.slot.window.end.format("%H:%M").to_string(),
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityRowDto {
    pub machine_id: String,
    pub specification: String,
    pub status: String,
}

impl AvailabilityRowDto {
    pub fn new(machine: &Machine, availability: Availability) -> Self {
        Self {
            machine_id: machine.id.clone(),
            specification: machine.specification.clone(),
            status: availability.as_str().to_string(),
        }
    }
}

/// Roster entry as exposed over the API. Credentials never leave the
/// server; only the owner sees their API key via the auth endpoints.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatusDto {
    pub version: String,
    pub uptime_seconds: u64,
    pub machines: usize,
    pub database: String,
}
