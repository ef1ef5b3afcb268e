//! Journal entry repository.
//!
//! Every mutation runs in one database transaction that holds a row lock on
//! the entry (`SELECT ... FOR UPDATE`), applies the core lifecycle rule to
//! the loaded aggregate, and writes back the difference. Posting and voiding
//! clear the balance cache after commit.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use petledger_core::accounts::{AccountError, ChartOfAccounts};
use petledger_core::cache::BalanceCache;
use petledger_core::journal::{
    JournalEntry, JournalError, JournalHeaderUpdate, JournalLine, JournalNumber, JournalService,
    JournalStatus, LineInput, NewJournalEntry,
};
use petledger_shared::types::{
    BranchId, JournalEntryId, JournalLineId, PageRequest, PageResponse, UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait,
};
use uuid::Uuid;

use super::account::load_chart;
use super::convert::{entry_to_core, to_db_time};
use crate::entities::{journal_entries, journal_lines};

/// Blocks account maintenance while an entry is validated against the chart.
/// Concurrent journal writers share the lock.
const LOCK_CHART_SQL: &str = "LOCK TABLE accounts IN SHARE MODE";

const NEXT_NUMBER_SQL: &str = "SELECT nextval('journal_number_seq') AS seq";

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalFilter {
    /// Only entries in this status.
    pub status: Option<JournalStatus>,
    /// Entries dated on or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Entries dated on or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Entries whose header carries this branch.
    pub branch_id: Option<BranchId>,
}

fn db_error(err: impl std::fmt::Display) -> JournalError {
    JournalError::Database(err.to_string())
}

fn chart_error(err: AccountError) -> JournalError {
    JournalError::Database(format!("Failed to load chart of accounts: {err}"))
}

/// Journal entry repository.
#[derive(Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    cache: BalanceCache,
}

impl JournalRepository {
    /// Creates a new journal repository sharing `cache` with the ledger reads.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: BalanceCache) -> Self {
        Self { db, cache }
    }

    /// Creates an entry as a draft, or posted in the same transaction when
    /// `post` is set.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`JournalService::create_draft`] and,
    /// with `post`, of [`JournalService::post`].
    pub async fn create(
        &self,
        input: NewJournalEntry,
        post: bool,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let chart = Self::lock_chart(&txn).await?;

        let now = Utc::now();
        let seq = Self::next_sequence(&txn).await?;
        let number = JournalNumber::format(input.date.year(), seq);
        let mut entry =
            JournalService::create_draft(&chart, JournalEntryId::new(), number, input, actor, now)?;

        Self::insert_header(&txn, &entry).await?;
        Self::insert_lines(&txn, entry.id, &entry.lines).await?;

        if post {
            let totals = JournalService::post(&mut entry, &chart, actor, now)?;
            Self::write_header(&txn, &entry).await?;
            tracing::info!(
                entry_id = %entry.id,
                number = %entry.number,
                total = %totals.debit,
                actor = %actor,
                "Journal entry created and posted"
            );
        } else {
            tracing::info!(
                entry_id = %entry.id,
                number = %entry.number,
                actor = %actor,
                "Journal entry drafted"
            );
        }

        txn.commit().await.map_err(db_error)?;
        if post {
            self.cache.invalidate_all();
        }
        Ok(entry)
    }

    /// Returns an entry in any status, void included.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry has this ID.
    pub async fn get(&self, id: JournalEntryId) -> Result<JournalEntry, JournalError> {
        let header = journal_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(JournalError::EntryNotFound(id))?;
        let lines = Self::load_lines(&self.db, &[header.id]).await?;
        Ok(entry_to_core(header, lines))
    }

    /// Lists entries newest first.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: JournalFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<JournalEntry>, JournalError> {
        let mut query = journal_entries::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(
                crate::entities::sea_orm_active_enums::JournalStatus::from(status),
            ));
        }
        if let Some(from) = filter.from {
            query = query.filter(journal_entries::Column::EntryDate.gte(to_db_time(from)));
        }
        if let Some(to) = filter.to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to_db_time(to)));
        }
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(journal_entries::Column::BranchId.eq(branch_id.into_inner()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_error)?;
        let headers = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::Number)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut lines_by_entry: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
        for line in Self::load_lines(&self.db, &ids).await? {
            lines_by_entry.entry(line.entry_id).or_default().push(line);
        }

        let entries = headers
            .into_iter()
            .map(|header| {
                let lines = lines_by_entry.remove(&header.id).unwrap_or_default();
                entry_to_core(header, lines)
            })
            .collect();

        Ok(PageResponse::new(entries, page.page, page.per_page, total))
    }

    /// Posts a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `Unbalanced`, `AlreadyPosted`, `EntryVoided`, or an account
    /// error if a line's account was deactivated since drafting.
    pub async fn post(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        let entry = self
            .mutate(id, |entry, chart, now| {
                JournalService::post(entry, chart, actor, now).map(|_| ())
            })
            .await?;
        self.cache.invalidate_all();

        tracing::info!(
            entry_id = %entry.id,
            number = %entry.number,
            actor = %actor,
            "Journal entry posted"
        );
        Ok(entry)
    }

    /// Voids a posted entry, keeping it and its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotPosted` or `VoidReasonRequired`.
    pub async fn void(
        &self,
        id: JournalEntryId,
        reason: &str,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        let entry = self
            .mutate(id, |entry, _, now| JournalService::void(entry, reason, actor, now))
            .await?;
        self.cache.invalidate_all();

        tracing::info!(
            entry_id = %entry.id,
            number = %entry.number,
            reason = %reason.trim(),
            actor = %actor,
            "Journal entry voided"
        );
        Ok(entry)
    }

    /// Appends a line to a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotDraft` or a line validation error.
    pub async fn add_line(
        &self,
        id: JournalEntryId,
        line: LineInput,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        self.mutate(id, |entry, chart, now| {
            JournalService::add_line(entry, chart, line, actor, now).map(|_| ())
        })
        .await
    }

    /// Removes a line from a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotDraft`, `LineNotFound`, or `NoLines` for the last line.
    pub async fn remove_line(
        &self,
        id: JournalEntryId,
        line_id: JournalLineId,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        self.mutate(id, |entry, _, now| {
            JournalService::remove_line(entry, line_id, actor, now).map(|_| ())
        })
        .await
    }

    /// Changes the date, description or branch of a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotDraft` or `DescriptionRequired`.
    pub async fn update_header(
        &self,
        id: JournalEntryId,
        update: JournalHeaderUpdate,
        actor: UserId,
    ) -> Result<JournalEntry, JournalError> {
        self.mutate(id, |entry, _, now| {
            JournalService::update_header(entry, update, actor, now)
        })
        .await
    }

    /// Deletes a draft entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` or `EntryNotDraft`.
    pub async fn delete_draft(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<(), JournalError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let entry = Self::lock_entry(&txn, id).await?;
        JournalService::validate_can_delete(&entry)?;

        journal_entries::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            entry_id = %id,
            number = %entry.number,
            actor = %actor,
            "Draft entry deleted"
        );
        Ok(())
    }

    /// Runs `apply` against the locked entry and persists what changed.
    async fn mutate<F>(&self, id: JournalEntryId, apply: F) -> Result<JournalEntry, JournalError>
    where
        F: FnOnce(&mut JournalEntry, &ChartOfAccounts, DateTime<Utc>) -> Result<(), JournalError>,
    {
        let txn = self.db.begin().await.map_err(db_error)?;
        let chart = Self::lock_chart(&txn).await?;
        let before = Self::lock_entry(&txn, id).await?;

        let mut after = before.clone();
        apply(&mut after, &chart, Utc::now())?;

        Self::sync_lines(&txn, &before, &after).await?;
        Self::write_header(&txn, &after).await?;
        txn.commit().await.map_err(db_error)?;
        Ok(after)
    }

    async fn lock_chart(txn: &DatabaseTransaction) -> Result<ChartOfAccounts, JournalError> {
        txn.execute_unprepared(LOCK_CHART_SQL).await.map_err(db_error)?;
        load_chart(txn).await.map_err(chart_error)
    }

    async fn lock_entry(
        txn: &DatabaseTransaction,
        id: JournalEntryId,
    ) -> Result<JournalEntry, JournalError> {
        let header = journal_entries::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_error)?
            .ok_or(JournalError::EntryNotFound(id))?;
        let lines = Self::load_lines(txn, &[header.id]).await?;
        Ok(entry_to_core(header, lines))
    }

    async fn load_lines<C: ConnectionTrait>(
        db: &C,
        entry_ids: &[Uuid],
    ) -> Result<Vec<journal_lines::Model>, JournalError> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.is_in(entry_ids.iter().copied()))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(db)
            .await
            .map_err(db_error)
    }

    async fn next_sequence(txn: &DatabaseTransaction) -> Result<i64, JournalError> {
        let row = txn
            .query_one(Statement::from_string(DbBackend::Postgres, NEXT_NUMBER_SQL))
            .await
            .map_err(db_error)?
            .ok_or_else(|| db_error("journal_number_seq returned no row"))?;
        row.try_get::<i64>("", "seq").map_err(db_error)
    }

    /// Inserts the header as a draft; posting is a later status update so
    /// the line triggers see a draft while lines are written.
    async fn insert_header(
        txn: &DatabaseTransaction,
        entry: &JournalEntry,
    ) -> Result<(), JournalError> {
        let model = journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            number: Set(entry.number.clone()),
            entry_date: Set(to_db_time(entry.date)),
            description: Set(entry.description.clone()),
            status: Set(JournalStatus::Draft.into()),
            branch_id: Set(entry.branch_id.map(BranchId::into_inner)),
            created_by: Set(entry.created_by.into_inner()),
            created_at: Set(to_db_time(entry.created_at)),
            updated_by: Set(entry.updated_by.into_inner()),
            updated_at: Set(to_db_time(entry.updated_at)),
            posted_by: Set(None),
            posted_at: Set(None),
            voided_by: Set(None),
            voided_at: Set(None),
            void_reason: Set(None),
        };
        model.insert(txn).await.map_err(db_error)?;
        Ok(())
    }

    async fn write_header(
        txn: &DatabaseTransaction,
        entry: &JournalEntry,
    ) -> Result<(), JournalError> {
        let model = journal_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            number: Set(entry.number.clone()),
            entry_date: Set(to_db_time(entry.date)),
            description: Set(entry.description.clone()),
            status: Set(entry.status.into()),
            branch_id: Set(entry.branch_id.map(BranchId::into_inner)),
            updated_by: Set(entry.updated_by.into_inner()),
            updated_at: Set(to_db_time(entry.updated_at)),
            posted_by: Set(entry.posted_by.map(UserId::into_inner)),
            posted_at: Set(entry.posted_at.map(to_db_time)),
            voided_by: Set(entry.voided_by.map(UserId::into_inner)),
            voided_at: Set(entry.voided_at.map(to_db_time)),
            void_reason: Set(entry.void_reason.clone()),
            ..Default::default()
        };
        model.update(txn).await.map_err(db_error)?;
        Ok(())
    }

    async fn insert_lines(
        txn: &DatabaseTransaction,
        entry_id: JournalEntryId,
        lines: &[JournalLine],
    ) -> Result<(), JournalError> {
        if lines.is_empty() {
            return Ok(());
        }
        let now = to_db_time(Utc::now());
        let models = lines
            .iter()
            .map(|line| {
                let line_no = i32::try_from(line.line_no).map_err(db_error)?;
                Ok(journal_lines::ActiveModel {
                    id: Set(line.id.into_inner()),
                    entry_id: Set(entry_id.into_inner()),
                    line_no: Set(line_no),
                    account_id: Set(line.account_id.into_inner()),
                    branch_id: Set(line.branch_id.map(BranchId::into_inner)),
                    debit: Set(line.debit.minor()),
                    credit: Set(line.credit.minor()),
                    description: Set(line.description.clone()),
                    created_at: Set(now),
                })
            })
            .collect::<Result<Vec<_>, JournalError>>()?;

        journal_lines::Entity::insert_many(models)
            .exec(txn)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Lines are never edited in place: removed IDs are deleted and new IDs
    /// inserted.
    async fn sync_lines(
        txn: &DatabaseTransaction,
        before: &JournalEntry,
        after: &JournalEntry,
    ) -> Result<(), JournalError> {
        let kept: HashSet<JournalLineId> = after.lines.iter().map(|l| l.id).collect();
        let existing: HashSet<JournalLineId> = before.lines.iter().map(|l| l.id).collect();

        let removed: Vec<Uuid> = before
            .lines
            .iter()
            .filter(|l| !kept.contains(&l.id))
            .map(|l| l.id.into_inner())
            .collect();
        if !removed.is_empty() {
            journal_lines::Entity::delete_many()
                .filter(journal_lines::Column::Id.is_in(removed))
                .exec(txn)
                .await
                .map_err(db_error)?;
        }

        let added: Vec<JournalLine> = after
            .lines
            .iter()
            .filter(|l| !existing.contains(&l.id))
            .cloned()
            .collect();
        Self::insert_lines(txn, after.id, &added).await
    }
}
