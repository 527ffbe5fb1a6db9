use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::slot::Slot;

/// A single entry in the reservation ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: i32,
    pub requester: String,
    pub machine_id: String,
    pub slot: Slot,
    pub status: ReservationStatus,
    pub created_at: String,
}

/// Closed set of reservation states. Stored as uppercase text in the
/// database; anything else in the column is a data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReservationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger listing filter. Fields combine with AND; the default matches
/// every reservation.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub requester: Option<String>,
    pub status: Option<ReservationStatus>,
    pub machine_id: Option<String>,
}

impl ListFilter {
    #[must_use]
    pub fn by_requester(username: impl Into<String>) -> Self {
        Self {
            requester: Some(username.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_status(status: ReservationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_machine(machine_id: impl Into<String>) -> Self {
        Self {
            machine_id: Some(machine_id.into()),
            ..Self::default()
        }
    }
}
