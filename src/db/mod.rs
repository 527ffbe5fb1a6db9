use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::RosterError;

use crate::config::SecurityConfig;
use crate::engine::slot::Slot;
use crate::models::reservation::{ListFilter, Reservation, ReservationStatus};
use crate::models::user::{Role, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn reservation_repo(&self) -> repositories::reservation::ReservationRepository {
        repositories::reservation::ReservationRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Reservation Ledger
    // ========================================================================

    pub async fn insert_reservation(
        &self,
        requester: &str,
        machine_id: &str,
        slot: &Slot,
    ) -> Result<Reservation> {
        self.reservation_repo()
            .insert(requester, machine_id, slot)
            .await
    }

    pub async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>> {
        self.reservation_repo().get(id).await
    }

    pub async fn list_reservations(&self, filter: &ListFilter) -> Result<Vec<Reservation>> {
        self.reservation_repo().list(filter).await
    }

    pub async fn set_reservation_status(
        &self,
        id: i32,
        status: ReservationStatus,
    ) -> Result<bool> {
        self.reservation_repo().set_status(id, status).await
    }

    pub async fn delete_reservation(&self, id: i32) -> Result<bool> {
        self.reservation_repo().delete(id).await
    }

    pub async fn approved_on_machine(&self, machine_id: &str) -> Result<Vec<Reservation>> {
        self.reservation_repo().approved_on_machine(machine_id).await
    }

    pub async fn approved_machine_ids_on(&self, date: NaiveDate) -> Result<Vec<String>> {
        self.reservation_repo().approved_machine_ids_on(date).await
    }

    // ========================================================================
    // User Roster
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<User, RosterError> {
        self.user_repo()
            .create(username, password, role, config)
            .await
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), RosterError> {
        self.user_repo().delete(username).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<(), RosterError> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }
}
