//! Billing schema for the aging reports.
//!
//! Suppliers and customers, their purchase/sales documents, and settlements
//! recorded against them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(COUNTERPARTIES_SQL).await?;
        db.execute_unprepared(BILLING_DOCUMENTS_SQL).await?;
        db.execute_unprepared(SETTLEMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE counterparty_kind AS ENUM ('supplier', 'customer');

CREATE TYPE document_kind AS ENUM ('payable', 'receivable');

CREATE TYPE document_status AS ENUM (
    'draft',
    'submitted',
    'received',
    'completed',
    'cancelled'
);
";

const COUNTERPARTIES_SQL: &str = r"
CREATE TABLE counterparties (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind counterparty_kind NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_counterparties_kind ON counterparties(kind) WHERE deleted_at IS NULL;
";

const BILLING_DOCUMENTS_SQL: &str = r"
CREATE TABLE billing_documents (
    id UUID PRIMARY KEY,
    number VARCHAR(64) NOT NULL,
    kind document_kind NOT NULL,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id),
    branch_id UUID,
    document_date TIMESTAMPTZ NOT NULL,
    total_amount BIGINT NOT NULL,
    paid_amount BIGINT NOT NULL DEFAULT 0,
    outstanding_amount BIGINT NOT NULL,
    status document_status NOT NULL DEFAULT 'draft',
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_billing_documents_number UNIQUE (kind, number),
    CONSTRAINT chk_billing_amounts CHECK (
        total_amount >= 0 AND paid_amount >= 0 AND outstanding_amount = total_amount - paid_amount
    )
);

-- Aging scans open documents by kind and date
CREATE INDEX idx_billing_documents_aging
    ON billing_documents(kind, status, document_date)
    WHERE deleted_at IS NULL AND outstanding_amount > 0;

CREATE INDEX idx_billing_documents_counterparty ON billing_documents(counterparty_id);
";

const SETTLEMENTS_SQL: &str = r"
CREATE TABLE settlements (
    id UUID PRIMARY KEY,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id),
    document_id UUID REFERENCES billing_documents(id),
    amount BIGINT NOT NULL CHECK (amount > 0),
    paid_at TIMESTAMPTZ NOT NULL,
    method VARCHAR(32) NOT NULL,
    reference VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_settlements_counterparty ON settlements(counterparty_id, paid_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS settlements CASCADE;
DROP TABLE IF EXISTS billing_documents CASCADE;
DROP TABLE IF EXISTS counterparties CASCADE;
DROP TYPE IF EXISTS document_status;
DROP TYPE IF EXISTS document_kind;
DROP TYPE IF EXISTS counterparty_kind;
";
