//! Account repository for chart of accounts persistence.
//!
//! Every rule lives in `petledger_core::accounts`; this module loads the
//! chart, asks the core service for the changed account and writes it back.

use chrono::Utc;
use petledger_core::accounts::{
    Account, AccountError, AccountService, AccountUpdate, ChartOfAccounts, NewAccount,
};
use petledger_shared::types::{AccountId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};

use super::convert::{account_to_core, to_db_time};
use crate::entities::{
    accounts, journal_entries, journal_lines, sea_orm_active_enums::JournalStatus,
};

/// Serializes chart maintenance so code uniqueness and acyclicity are
/// checked against a stable chart.
const LOCK_ACCOUNTS_SQL: &str = "LOCK TABLE accounts IN SHARE ROW EXCLUSIVE MODE";

/// Loads every account, deleted ones included, into a chart.
pub(crate) async fn load_chart<C: ConnectionTrait>(
    db: &C,
) -> Result<ChartOfAccounts, AccountError> {
    let accounts = accounts::Entity::find()
        .all(db)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

    ChartOfAccounts::new(accounts.into_iter().map(account_to_core).collect())
}

fn map_write_error(err: DbErr, code: &str) -> AccountError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::DuplicateCode(code.to_string()),
        _ => AccountError::Database(err.to_string()),
    }
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the full chart of accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Database` if the query fails.
    pub async fn load_chart(&self) -> Result<ChartOfAccounts, AccountError> {
        load_chart(&self.db).await
    }

    /// Finds an account by ID, deleted accounts included.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such account exists.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Account, AccountError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .map(account_to_core)
            .ok_or(AccountError::NotFound(id))
    }

    /// Finds a live account by code.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundByCode` if no live account carries this code.
    pub async fn get_by_code(&self, code: &str) -> Result<Account, AccountError> {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .map(account_to_core)
            .ok_or_else(|| AccountError::NotFoundByCode(code.to_string()))
    }

    /// Lists the live children of `parent` ordered by code; `None` lists roots.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `parent` is unknown.
    pub async fn list_children(
        &self,
        parent: Option<AccountId>,
    ) -> Result<Vec<Account>, AccountError> {
        let chart = self.load_chart().await?;
        if let Some(parent_id) = parent {
            chart.get(parent_id)?;
        }
        Ok(chart.list_children(parent).into_iter().cloned().collect())
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`AccountService::validate_new`], or
    /// `DuplicateCode` if a concurrent insert took the code first.
    pub async fn create(&self, input: NewAccount, actor: UserId) -> Result<Account, AccountError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;
        txn.execute_unprepared(LOCK_ACCOUNTS_SQL)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let chart = load_chart(&txn).await?;
        let account = AccountService::validate_new(&chart, AccountId::new(), &input, actor)?;

        let now = to_db_time(Utc::now());
        let model = accounts::ActiveModel {
            id: Set(account.id.into_inner()),
            code: Set(account.code.clone()),
            name: Set(account.name.clone()),
            account_type: Set(account.account_type.into()),
            category: Set(account.category.into()),
            normal_balance: Set(account.normal_balance.into()),
            is_header: Set(account.is_header),
            parent_id: Set(account.parent_id.map(AccountId::into_inner)),
            is_active: Set(account.is_active),
            deleted_at: Set(None),
            created_by: Set(Some(actor.into_inner())),
            updated_by: Set(Some(actor.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model
            .insert(&txn)
            .await
            .map_err(|e| map_write_error(e, &account.code))?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        tracing::info!(
            account_id = %account.id,
            code = %account.code,
            actor = %actor,
            "Account created"
        );
        Ok(account)
    }

    /// Renames, re-parents, activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`AccountService::apply_update`].
    pub async fn update(
        &self,
        id: AccountId,
        update: AccountUpdate,
        actor: UserId,
    ) -> Result<Account, AccountError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;
        txn.execute_unprepared(LOCK_ACCOUNTS_SQL)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let chart = load_chart(&txn).await?;
        let account = AccountService::apply_update(&chart, id, &update, actor)?;
        Self::write_back(&txn, &account, None).await?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        tracing::info!(account_id = %id, actor = %actor, "Account updated");
        Ok(account)
    }

    /// Soft-deletes an account.
    ///
    /// Lines already posted keep referencing the account, so its balance
    /// stays visible in ledger queries.
    ///
    /// # Errors
    ///
    /// Returns `HasChildren` for headers with live children and
    /// `HasPostings` if a draft entry still uses the account.
    pub async fn soft_delete(&self, id: AccountId, actor: UserId) -> Result<Account, AccountError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;
        txn.execute_unprepared(LOCK_ACCOUNTS_SQL)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let chart = load_chart(&txn).await?;
        AccountService::validate_soft_delete(&chart, id)?;
        if Self::count_draft_lines(&txn, id).await? > 0 {
            return Err(AccountError::HasPostings(id));
        }

        let now = Utc::now();
        let account = AccountService::soft_delete(&chart, id, actor, now)?;
        Self::write_back(&txn, &account, Some(now)).await?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        tracing::info!(account_id = %id, actor = %actor, "Account soft-deleted");
        Ok(account)
    }

    async fn write_back<C: ConnectionTrait>(
        db: &C,
        account: &Account,
        deleted_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<(), AccountError> {
        let model = accounts::Entity::find_by_id(account.id.into_inner())
            .one(db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(account.id))?;

        let mut active: accounts::ActiveModel = model.into();
        active.name = Set(account.name.clone());
        active.parent_id = Set(account.parent_id.map(AccountId::into_inner));
        active.is_active = Set(account.is_active);
        active.updated_by = Set(account.updated_by.map(UserId::into_inner));
        active.updated_at = Set(to_db_time(Utc::now()));
        if let Some(at) = deleted_at {
            active.deleted_at = Set(Some(to_db_time(at)));
        }

        active
            .update(db)
            .await
            .map_err(|e| map_write_error(e, &account.code))?;
        Ok(())
    }

    async fn count_draft_lines<C: ConnectionTrait>(
        db: &C,
        id: AccountId,
    ) -> Result<u64, AccountError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id.into_inner()))
            .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
            .filter(journal_entries::Column::Status.eq(JournalStatus::Draft))
            .count(db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))
    }
}
