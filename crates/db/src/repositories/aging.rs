//! Aging repository for payables and receivables.
//!
//! Read-only: loads counterparties, open billing documents and settlements,
//! then delegates bucketing to [`AgingService`].

use chrono::{DateTime, Utc};
use petledger_core::aging::{
    AgingError, AgingReport, AgingService, CounterpartyOutstanding, DocumentKind,
};
use petledger_core::ledger::BranchFilter;
use petledger_shared::types::CounterpartyId;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::convert::{counterparty_to_core, document_to_core, settlement_to_core, to_db_time};
use crate::entities::{
    billing_documents, counterparties, sea_orm_active_enums as db_enums, settlements,
};

fn db_error(err: impl std::fmt::Display) -> AgingError {
    AgingError::Database(err.to_string())
}

/// Open statuses for `kind` as stored enum values.
fn open_statuses(kind: DocumentKind) -> Vec<db_enums::DocumentStatus> {
    kind.open_statuses().iter().map(|&s| s.into()).collect()
}

/// Aging repository.
#[derive(Debug, Clone)]
pub struct AgingRepository {
    db: DatabaseConnection,
}

impl AgingRepository {
    /// Creates a new aging repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Aging report for one side of the books as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `AgingError::Database` if a query fails.
    pub async fn report(
        &self,
        kind: DocumentKind,
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<AgingReport, AgingError> {
        let parties = counterparties::Entity::find()
            .filter(counterparties::Column::Kind.eq(db_enums::CounterpartyKind::from(
                kind.counterparty_kind(),
            )))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        // Pre-filter in SQL; the service re-applies every rule.
        let documents = billing_documents::Entity::find()
            .filter(billing_documents::Column::Kind.eq(db_enums::DocumentKind::from(kind)))
            .filter(billing_documents::Column::Status.is_in(open_statuses(kind)))
            .filter(billing_documents::Column::DeletedAt.is_null())
            .filter(billing_documents::Column::OutstandingAmount.gt(0))
            .filter(billing_documents::Column::DocumentDate.lte(to_db_time(as_of)))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let parties: Vec<_> = parties.into_iter().map(counterparty_to_core).collect();
        let documents: Vec<_> = documents.into_iter().map(document_to_core).collect();

        let report = AgingService::report(kind, &parties, &documents, as_of, branch)?;
        tracing::debug!(
            kind = %kind,
            as_of = %as_of,
            counterparties = report.summary.counterparties_with_balance,
            total = %report.summary.total_outstanding,
            "Aging report built"
        );
        Ok(report)
    }

    /// Open bills of one counterparty aged against the current time.
    ///
    /// # Errors
    ///
    /// Returns `CounterpartyNotFound` if no non-deleted counterparty of the
    /// kind has this ID.
    pub async fn counterparty_outstanding(
        &self,
        kind: DocumentKind,
        counterparty_id: CounterpartyId,
        include_history: bool,
    ) -> Result<CounterpartyOutstanding, AgingError> {
        let party = counterparties::Entity::find_by_id(counterparty_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(AgingError::CounterpartyNotFound(counterparty_id))?;

        let documents = billing_documents::Entity::find()
            .filter(billing_documents::Column::CounterpartyId.eq(counterparty_id.into_inner()))
            .filter(billing_documents::Column::Kind.eq(db_enums::DocumentKind::from(kind)))
            .filter(billing_documents::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let history = if include_history {
            settlements::Entity::find()
                .filter(settlements::Column::CounterpartyId.eq(counterparty_id.into_inner()))
                .order_by_desc(settlements::Column::PaidAt)
                .all(&self.db)
                .await
                .map_err(db_error)?
        } else {
            Vec::new()
        };

        let parties = [counterparty_to_core(party)];
        let documents: Vec<_> = documents.into_iter().map(document_to_core).collect();
        let history: Vec<_> = history.into_iter().map(settlement_to_core).collect();

        AgingService::counterparty_outstanding(
            kind,
            counterparty_id,
            &parties,
            &documents,
            &history,
            include_history,
            Utc::now(),
        )
    }
}
