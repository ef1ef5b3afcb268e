//! Ledger schema.
//!
//! Creates the chart of accounts, journal entries and journal lines, the
//! journal number sequence, and the triggers that keep posted entries
//! balanced and immutable.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');

CREATE TYPE account_category AS ENUM (
    'current_asset',
    'fixed_asset',
    'other_asset',
    'current_liability',
    'long_term_liability',
    'owner_equity',
    'retained_earnings',
    'operating_revenue',
    'other_revenue',
    'cost_of_goods_sold',
    'operating_expense',
    'other_expense'
);

CREATE TYPE normal_balance AS ENUM ('debit', 'credit');

CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'void');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    category account_category NOT NULL,
    normal_balance normal_balance NOT NULL,
    is_header BOOLEAN NOT NULL DEFAULT false,
    parent_id UUID REFERENCES accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    deleted_at TIMESTAMPTZ,
    created_by UUID,
    updated_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

-- Codes are unique among live accounts; a deleted code may be reused
CREATE UNIQUE INDEX idx_accounts_code_live ON accounts(code) WHERE deleted_at IS NULL;

CREATE INDEX idx_accounts_parent ON accounts(parent_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE SEQUENCE journal_number_seq START 1;

CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    number VARCHAR(32) NOT NULL UNIQUE,
    entry_date TIMESTAMPTZ NOT NULL,
    description TEXT NOT NULL,
    status journal_status NOT NULL DEFAULT 'draft',
    branch_id UUID,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    voided_by UUID,
    voided_at TIMESTAMPTZ,
    void_reason TEXT,
    CONSTRAINT chk_posted_fields CHECK (
        status = 'draft' OR (posted_by IS NOT NULL AND posted_at IS NOT NULL)
    ),
    CONSTRAINT chk_void_fields CHECK (
        status <> 'void' OR (voided_by IS NOT NULL AND voided_at IS NOT NULL AND void_reason IS NOT NULL)
    )
);

CREATE INDEX idx_journal_entries_status_date ON journal_entries(status, entry_date);
CREATE INDEX idx_journal_entries_branch ON journal_entries(branch_id) WHERE branch_id IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL CHECK (line_no > 0),
    account_id UUID NOT NULL REFERENCES accounts(id),
    branch_id UUID,
    debit BIGINT NOT NULL DEFAULT 0,
    credit BIGINT NOT NULL DEFAULT 0,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_journal_lines_entry_line UNIQUE (entry_id, line_no),
    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_max_amount CHECK (debit <= 1000000000000000 AND credit <= 1000000000000000),
    CONSTRAINT chk_line_one_side CHECK ((debit = 0) <> (credit = 0))
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
CREATE INDEX idx_journal_lines_entry ON journal_lines(entry_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: assert_journal_balanced
-- Posted and void entries must have equal debit and credit totals
-- ============================================================
CREATE OR REPLACE FUNCTION assert_journal_balanced(p_entry_id UUID)
RETURNS VOID AS $$
DECLARE
    total_debit NUMERIC;
    total_credit NUMERIC;
    entry_status journal_status;
BEGIN
    SELECT status INTO entry_status
    FROM journal_entries
    WHERE id = p_entry_id;

    IF entry_status IS NOT NULL AND entry_status <> 'draft' THEN
        SELECT
            COALESCE(SUM(debit), 0),
            COALESCE(SUM(credit), 0)
        INTO total_debit, total_credit
        FROM journal_lines
        WHERE entry_id = p_entry_id;

        IF total_debit <> total_credit OR total_debit = 0 THEN
            RAISE EXCEPTION 'Journal entry % is not balanced. Debit: %, Credit: %',
                p_entry_id, total_debit, total_credit;
        END IF;
    END IF;
END;
$$ LANGUAGE plpgsql;

CREATE OR REPLACE FUNCTION check_entry_balance()
RETURNS TRIGGER AS $$
BEGIN
    PERFORM assert_journal_balanced(NEW.id);
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_entry_balance
AFTER INSERT OR UPDATE ON journal_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

-- ============================================================
-- FUNCTION: prevent_posted_entry_modification
-- Posted entries may only move to void; void entries are frozen
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_entry_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        IF OLD.status <> 'draft' THEN
            RAISE EXCEPTION 'Only draft journal entries can be deleted.';
        END IF;
        RETURN OLD;
    END IF;

    IF OLD.status = 'posted' AND NEW.status <> 'void' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry. Void it instead.';
    END IF;

    IF OLD.status = 'void' THEN
        RAISE EXCEPTION 'Cannot modify void journal entry.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_entry_mod
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_entry_modification();

-- ============================================================
-- FUNCTION: prevent_posted_line_modification
-- Lines can only be written while their entry is a draft
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_line_modification()
RETURNS TRIGGER AS $$
DECLARE
    entry_status journal_status;
    target_entry UUID;
BEGIN
    IF TG_OP = 'DELETE' THEN
        target_entry := OLD.entry_id;
    ELSE
        target_entry := NEW.entry_id;
    END IF;

    SELECT status INTO entry_status
    FROM journal_entries
    WHERE id = target_entry;

    -- A cascading delete runs after the parent row is gone
    IF entry_status IS NOT NULL AND entry_status <> 'draft' THEN
        RAISE EXCEPTION 'Lines of a % journal entry cannot be changed.', entry_status;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_line_mod
BEFORE INSERT OR UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_line_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP SEQUENCE IF EXISTS journal_number_seq;
DROP FUNCTION IF EXISTS prevent_posted_line_modification();
DROP FUNCTION IF EXISTS prevent_posted_entry_modification();
DROP FUNCTION IF EXISTS check_entry_balance();
DROP FUNCTION IF EXISTS assert_journal_balanced(UUID);
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_category;
DROP TYPE IF EXISTS account_type;
";
