use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key for the first seeded admin (regenerate on first use)
pub const DEFAULT_API_KEY: &str = "labres_default_api_key_please_regenerate";

/// Hash a seed password using Argon2id
fn hash_seed_password(password: &str) -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash seed password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Reservations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed the two program administrators. Their initial password is
        // their username; both are expected to rotate it after first login.
        let now = chrono::Utc::now().to_rfc3339();
        let admins = [
            ("rana", DEFAULT_API_KEY.to_string()),
            ("bintang", crate::db::repositories::user::generate_api_key()),
        ];

        for (username, api_key) in admins {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Users)
                .columns([
                    crate::entities::users::Column::Username,
                    crate::entities::users::Column::PasswordHash,
                    crate::entities::users::Column::ApiKey,
                    crate::entities::users::Column::Role,
                    crate::entities::users::Column::CreatedAt,
                ])
                .values_panic([
                    username.into(),
                    hash_seed_password(username).into(),
                    api_key.into(),
                    "admin".into(),
                    now.clone().into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservations).to_owned())
            .await?;

        Ok(())
    }
}
