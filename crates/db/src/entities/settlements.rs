//! `SeaORM` Entity for settlements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub counterparty_id: Uuid,
    pub document_id: Option<Uuid>,
    pub amount: i64,
    pub paid_at: DateTimeWithTimeZone,
    pub method: String,
    pub reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counterparties::Entity",
        from = "Column::CounterpartyId",
        to = "super::counterparties::Column::Id"
    )]
    Counterparties,
    #[sea_orm(
        belongs_to = "super::billing_documents::Entity",
        from = "Column::DocumentId",
        to = "super::billing_documents::Column::Id"
    )]
    BillingDocuments,
}

impl Related<super::counterparties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparties.def()
    }
}

impl Related<super::billing_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
