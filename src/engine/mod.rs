//! Reservation engine: owns the ledger semantics.
//!
//! Submission never checks for conflicts (pending requests may coexist so
//! an admin can arbitrate between competitors); approval is the binding
//! commitment and is the only place the no-overlap invariant is enforced.
//! First approval wins; a later approval of a competing request fails with
//! [`EngineError::Conflict`] naming the winners.

pub mod slot;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::catalog::MachineCatalog;
use crate::db::Store;
use crate::models::reservation::{ListFilter, Reservation, ReservationStatus};
use slot::Slot;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid date/time range")]
    InvalidRange,

    #[error("Unknown machine: {0}")]
    UnknownMachine(String),

    #[error("Reservation {0} not found")]
    NotFound(i32),

    #[error("Overlaps approved reservation(s): {0:?}")]
    Conflict(Vec<i32>),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Availability of one machine on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Booked,
}

impl Availability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Booked => "BOOKED",
        }
    }
}

pub struct Engine {
    store: Store,
    catalog: MachineCatalog,
    // Serializes all mutating operations so the conflict check in
    // `approve` is atomic with its status write. Reads go through the
    // pool without the lock.
    write_lock: Mutex<()>,
}

impl Engine {
    #[must_use]
    pub fn new(store: Store, catalog: MachineCatalog) -> Self {
        Self {
            store,
            catalog,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &MachineCatalog {
        &self.catalog
    }

    /// Create a PENDING reservation. The date range must be ordered; a
    /// single-day range additionally needs a non-empty time window.
    pub async fn submit(
        &self,
        requester: &str,
        machine_id: &str,
        slot: Slot,
    ) -> Result<Reservation, EngineError> {
        if !slot.dates.is_ordered() {
            return Err(EngineError::InvalidRange);
        }
        if slot.dates.start == slot.dates.end && slot.window.start >= slot.window.end {
            return Err(EngineError::InvalidRange);
        }
        if !self.catalog.contains(machine_id) {
            return Err(EngineError::UnknownMachine(machine_id.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let reservation = self
            .store
            .insert_reservation(requester, machine_id, &slot)
            .await?;

        info!(
            "Reservation {} submitted by {} for {}",
            reservation.id, requester, machine_id
        );
        Ok(reservation)
    }

    /// Approve a reservation unless it overlaps another APPROVED one on
    /// the same machine. Approving an already-approved reservation with
    /// no new conflicts is a no-op success.
    pub async fn approve(&self, id: i32) -> Result<(), EngineError> {
        let _guard = self.write_lock.lock().await;

        let target = self
            .store
            .get_reservation(id)
            .await?
            .ok_or(EngineError::NotFound(id))?;

        let approved = self.store.approved_on_machine(&target.machine_id).await?;
        let conflicts: Vec<i32> = approved
            .iter()
            .filter(|r| r.id != id && r.slot.overlaps(&target.slot))
            .map(|r| r.id)
            .collect();

        if !conflicts.is_empty() {
            return Err(EngineError::Conflict(conflicts));
        }

        if target.status != ReservationStatus::Approved {
            self.store
                .set_reservation_status(id, ReservationStatus::Approved)
                .await?;
            info!("Reservation {} approved", id);
        }
        Ok(())
    }

    /// Reject a reservation. Idempotent; rejecting never creates a
    /// conflict, so no guard is needed beyond existence.
    pub async fn reject(&self, id: i32) -> Result<(), EngineError> {
        let _guard = self.write_lock.lock().await;

        if !self
            .store
            .set_reservation_status(id, ReservationStatus::Rejected)
            .await?
        {
            return Err(EngineError::NotFound(id));
        }
        info!("Reservation {} rejected", id);
        Ok(())
    }

    /// Remove a reservation from the ledger regardless of status.
    pub async fn delete(&self, id: i32) -> Result<(), EngineError> {
        let _guard = self.write_lock.lock().await;

        if !self.store.delete_reservation(id).await? {
            return Err(EngineError::NotFound(id));
        }
        info!("Reservation {} deleted", id);
        Ok(())
    }

    /// Date-only availability board: a machine is BOOKED iff some
    /// APPROVED reservation's date range contains `as_of`.
    pub async fn availability(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<(String, Availability)>, EngineError> {
        let booked = self.store.approved_machine_ids_on(as_of).await?;

        Ok(self
            .catalog
            .iter()
            .map(|machine| {
                let status = if booked.iter().any(|id| *id == machine.id) {
                    Availability::Booked
                } else {
                    Availability::Available
                };
                (machine.id.clone(), status)
            })
            .collect())
    }

    /// List the ledger, ordered by start date then id.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Reservation>, EngineError> {
        Ok(self.store.list_reservations(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::slot::{DateRange, Slot, TimeWindow};
    use super::*;
    use crate::config::Config;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn slot(sd: &str, ed: &str, st: &str, et: &str) -> Slot {
        Slot::new(
            DateRange::new(date(sd), date(ed)),
            TimeWindow::new(
                chrono::NaiveTime::parse_from_str(st, "%H:%M").unwrap(),
                chrono::NaiveTime::parse_from_str(et, "%H:%M").unwrap(),
            ),
        )
    }

    async fn engine() -> Engine {
        // Single connection so the in-memory database is shared.
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store");
        let catalog = MachineCatalog::from_config(&Config::default().machines);
        Engine::new(store, catalog)
    }

    async fn assert_no_approved_overlap(engine: &Engine) {
        let approved = engine
            .list(&ListFilter::by_status(ReservationStatus::Approved))
            .await
            .unwrap();
        for a in &approved {
            for b in &approved {
                if a.id != b.id && a.machine_id == b.machine_id {
                    assert!(
                        !a.slot.overlaps(&b.slot),
                        "approved reservations {} and {} overlap on {}",
                        a.id,
                        b.id,
                        a.machine_id
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_reservation() {
        let engine = engine().await;

        let res = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();

        assert_eq!(res.status, ReservationStatus::Pending);
        assert_eq!(res.requester, "alice");
        assert_eq!(res.machine_id, "S2IF-1");

        let pending = engine
            .list(&ListFilter::by_status(ReservationStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], res);
    }

    #[tokio::test]
    async fn submit_rejects_unordered_dates() {
        let engine = engine().await;

        let err = engine
            .submit("alice", "S2IF-1", slot("2024-01-11", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange));
    }

    #[tokio::test]
    async fn submit_rejects_empty_window_on_single_day() {
        let engine = engine().await;

        let err = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_machine() {
        let engine = engine().await;

        let err = engine
            .submit("alice", "S2IF-404", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownMachine(m) if m == "S2IF-404"));
    }

    #[tokio::test]
    async fn first_approved_wins() {
        let engine = engine().await;

        let first = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        let second = engine
            .submit("bob", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:30", "10:30"))
            .await
            .unwrap();

        engine.approve(first.id).await.unwrap();

        let err = engine.approve(second.id).await.unwrap_err();
        match err {
            EngineError::Conflict(ids) => assert_eq!(ids, vec![first.id]),
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Rejecting the winner frees the slot for the competitor.
        engine.reject(first.id).await.unwrap();
        engine.approve(second.id).await.unwrap();

        assert_no_approved_overlap(&engine).await;
    }

    #[tokio::test]
    async fn pending_competitors_do_not_block_approval() {
        let engine = engine().await;

        let first = engine
            .submit("alice", "S2IF-2", slot("2024-02-01", "2024-02-03", "08:00", "18:00"))
            .await
            .unwrap();
        engine
            .submit("bob", "S2IF-2", slot("2024-02-02", "2024-02-02", "09:00", "11:00"))
            .await
            .unwrap();

        // Only APPROVED reservations count against the target.
        engine.approve(first.id).await.unwrap();
    }

    #[tokio::test]
    async fn approvals_on_different_machines_never_conflict() {
        let engine = engine().await;

        let a = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        let b = engine
            .submit("bob", "S2IF-2", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();

        engine.approve(a.id).await.unwrap();
        engine.approve(b.id).await.unwrap();
        assert_no_approved_overlap(&engine).await;
    }

    #[tokio::test]
    async fn approve_is_idempotent() {
        let engine = engine().await;

        let res = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        engine.approve(res.id).await.unwrap();
        engine.approve(res.id).await.unwrap();

        let approved = engine
            .list(&ListFilter::by_status(ReservationStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
    }

    #[tokio::test]
    async fn reject_is_idempotent_and_reapproval_is_guarded() {
        let engine = engine().await;

        let first = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        let second = engine
            .submit("bob", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:30", "10:30"))
            .await
            .unwrap();

        engine.reject(first.id).await.unwrap();
        engine.reject(first.id).await.unwrap();

        engine.approve(second.id).await.unwrap();

        // Re-approving the rejected one must hit the conflict guard.
        let err = engine.approve(first.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict(ids) if ids == vec![second.id]));
        assert_no_approved_overlap(&engine).await;
    }

    #[tokio::test]
    async fn missing_ids_are_reported() {
        let engine = engine().await;

        assert!(matches!(
            engine.approve(999).await.unwrap_err(),
            EngineError::NotFound(999)
        ));
        assert!(matches!(
            engine.reject(999).await.unwrap_err(),
            EngineError::NotFound(999)
        ));
        assert!(matches!(
            engine.delete(999).await.unwrap_err(),
            EngineError::NotFound(999)
        ));
    }

    #[tokio::test]
    async fn delete_removes_any_status() {
        let engine = engine().await;

        let res = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        engine.approve(res.id).await.unwrap();
        engine.delete(res.id).await.unwrap();

        let all = engine.list(&ListFilter::default()).await.unwrap();
        assert!(all.is_empty());

        // The slot is free again.
        let next = engine
            .submit("bob", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        engine.approve(next.id).await.unwrap();
    }

    #[tokio::test]
    async fn availability_reflects_approved_date_ranges() {
        let engine = engine().await;

        let first = engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        let second = engine
            .submit("bob", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:30", "10:30"))
            .await
            .unwrap();

        engine.approve(first.id).await.unwrap();
        engine.reject(first.id).await.unwrap();
        engine.approve(second.id).await.unwrap();

        let board = engine.availability(date("2024-01-10")).await.unwrap();
        for (machine, status) in board {
            if machine == "S2IF-1" {
                assert_eq!(status, Availability::Booked);
            } else {
                assert_eq!(status, Availability::Available);
            }
        }

        // Outside the reserved range everything is free.
        let board = engine.availability(date("2024-01-11")).await.unwrap();
        assert!(board.iter().all(|(_, s)| *s == Availability::Available));
    }

    #[tokio::test]
    async fn list_orders_by_start_date_then_id() {
        let engine = engine().await;

        let late = engine
            .submit("alice", "S2IF-1", slot("2024-03-01", "2024-03-01", "09:00", "10:00"))
            .await
            .unwrap();
        let early_a = engine
            .submit("bob", "S2IF-2", slot("2024-01-05", "2024-01-05", "09:00", "10:00"))
            .await
            .unwrap();
        let early_b = engine
            .submit("carol", "S2IF-5", slot("2024-01-05", "2024-01-05", "11:00", "12:00"))
            .await
            .unwrap();

        let all = engine.list(&ListFilter::default()).await.unwrap();
        let ids: Vec<i32> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![early_a.id, early_b.id, late.id]);
    }

    #[tokio::test]
    async fn list_filters_by_requester_and_machine() {
        let engine = engine().await;

        engine
            .submit("alice", "S2IF-1", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();
        engine
            .submit("bob", "S2IF-2", slot("2024-01-10", "2024-01-10", "09:00", "10:00"))
            .await
            .unwrap();

        let mine = engine.list(&ListFilter::by_requester("alice")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].requester, "alice");

        let on_two = engine.list(&ListFilter::by_machine("S2IF-2")).await.unwrap();
        assert_eq!(on_two.len(), 1);
        assert_eq!(on_two[0].machine_id, "S2IF-2");
    }
}
