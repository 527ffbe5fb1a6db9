use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Username of the requesting user
    pub requester: String,

    /// Machine code from the catalog (e.g. "S2IF-1")
    pub machine_id: String,

    /// ISO-8601 date (YYYY-MM-DD), sortable as text
    pub start_date: String,

    pub end_date: String,

    /// Daily window in HH:MM, applies to every date in the range
    pub start_time: String,

    pub end_time: String,

    /// PENDING | APPROVED | REJECTED
    pub status: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
