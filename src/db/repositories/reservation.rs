use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::engine::slot::{DateRange, Slot, TimeWindow};
use crate::entities::{prelude::*, reservations};
use crate::models::reservation::{ListFilter, Reservation, ReservationStatus};

/// Stored format for the daily window columns
const TIME_FORMAT: &str = "%H:%M";

/// Repository for the reservation ledger
pub struct ReservationRepository {
    conn: DatabaseConnection,
}

impl ReservationRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model(r: reservations::Model) -> Result<Reservation> {
        let start_date: NaiveDate = r
            .start_date
            .parse()
            .with_context(|| format!("Bad start_date in reservation {}", r.id))?;
        let end_date: NaiveDate = r
            .end_date
            .parse()
            .with_context(|| format!("Bad end_date in reservation {}", r.id))?;
        let start_time = NaiveTime::parse_from_str(&r.start_time, TIME_FORMAT)
            .with_context(|| format!("Bad start_time in reservation {}", r.id))?;
        let end_time = NaiveTime::parse_from_str(&r.end_time, TIME_FORMAT)
            .with_context(|| format!("Bad end_time in reservation {}", r.id))?;
        let status = ReservationStatus::parse(&r.status)
            .with_context(|| format!("Bad status '{}' in reservation {}", r.status, r.id))?;

        Ok(Reservation {
            id: r.id,
            requester: r.requester,
            machine_id: r.machine_id,
            slot: Slot::new(
                DateRange::new(start_date, end_date),
                TimeWindow::new(start_time, end_time),
            ),
            status,
            created_at: r.created_at,
        })
    }

    // ========================================================================
    // Ledger Operations
    // ========================================================================

    pub async fn insert(&self, requester: &str, machine_id: &str, slot: &Slot) -> Result<Reservation> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = reservations::ActiveModel {
            requester: Set(requester.to_string()),
            machine_id: Set(machine_id.to_string()),
            start_date: Set(slot.dates.start.to_string()),
            end_date: Set(slot.dates.end.to_string()),
            start_time: Set(slot.window.start.format(TIME_FORMAT).to_string()),
            end_time: Set(slot.window.end.format(TIME_FORMAT).to_string()),
            status: Set(ReservationStatus::Pending.as_str().to_string()),
            created_at: Set(now.clone()),
            ..Default::default()
        };

        let res = Reservations::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert reservation")?;

        Ok(Reservation {
            id: res.last_insert_id,
            requester: requester.to_string(),
            machine_id: machine_id.to_string(),
            slot: *slot,
            status: ReservationStatus::Pending,
            created_at: now,
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Reservation>> {
        let row = Reservations::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query reservation by id")?;

        row.map(Self::map_model).transpose()
    }

    /// List the ledger ordered by start date, ties broken by id so the
    /// ordering is deterministic.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Reservation>> {
        let mut query = Reservations::find();

        if let Some(requester) = &filter.requester {
            query = query.filter(reservations::Column::Requester.eq(requester));
        }
        if let Some(status) = filter.status {
            query = query.filter(reservations::Column::Status.eq(status.as_str()));
        }
        if let Some(machine_id) = &filter.machine_id {
            query = query.filter(reservations::Column::MachineId.eq(machine_id));
        }

        let rows = query
            .order_by_asc(reservations::Column::StartDate)
            .order_by_asc(reservations::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list reservations")?;

        rows.into_iter().map(Self::map_model).collect()
    }

    /// Returns false when no reservation has that id.
    pub async fn set_status(&self, id: i32, status: ReservationStatus) -> Result<bool> {
        let Some(row) = Reservations::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query reservation for status update")?
        else {
            return Ok(false);
        };

        let mut active: reservations::ActiveModel = row.into();
        active.status = Set(status.as_str().to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update reservation status")?;

        Ok(true)
    }

    /// Returns false when no reservation has that id.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = Reservations::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete reservation")?;

        Ok(res.rows_affected > 0)
    }

    /// All APPROVED reservations on one machine.
    pub async fn approved_on_machine(&self, machine_id: &str) -> Result<Vec<Reservation>> {
        let rows = Reservations::find()
            .filter(reservations::Column::MachineId.eq(machine_id))
            .filter(reservations::Column::Status.eq(ReservationStatus::Approved.as_str()))
            .all(&self.conn)
            .await
            .context("Failed to query approved reservations for machine")?;

        rows.into_iter().map(Self::map_model).collect()
    }

    /// Machine ids with an APPROVED reservation whose date range covers
    /// the given date. ISO dates sort as text, so the comparison can run
    /// on the stored columns directly.
    pub async fn approved_machine_ids_on(&self, date: NaiveDate) -> Result<Vec<String>> {
        let date = date.to_string();

        let rows = Reservations::find()
            .filter(reservations::Column::Status.eq(ReservationStatus::Approved.as_str()))
            .filter(reservations::Column::StartDate.lte(date.clone()))
            .filter(reservations::Column::EndDate.gte(date))
            .all(&self.conn)
            .await
            .context("Failed to query approved reservations for date")?;

        Ok(rows.into_iter().map(|r| r.machine_id).collect())
    }
}
