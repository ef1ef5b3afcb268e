//! Aging report generation.
//!
//! Read-only: documents and settlements are only inspected.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petledger_shared::types::{CounterpartyId, Money, time::elapsed_days};

use super::error::AgingError;
use super::types::{
    AgingBucket, AgingReport, AgingSummary, BucketTotals, Counterparty, CounterpartyAging,
    CounterpartyOutstanding, DocumentKind, OutstandingBill, OutstandingDocument,
    OutstandingSummary, Settlement,
};
use crate::ledger::BranchFilter;

/// Aging report service.
pub struct AgingService;

impl AgingService {
    /// Builds the aging report for one side of the books.
    ///
    /// A document is included when it is not deleted, its status is open for
    /// `kind`, it still owes money, it is dated on or before `as_of`, and its
    /// branch passes `branch`. Age is whole days from the document date to
    /// `as_of`, floored.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a counterparty's or the report's totals
    /// leave the `Money` range.
    pub fn report(
        kind: DocumentKind,
        counterparties: &[Counterparty],
        documents: &[OutstandingDocument],
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<AgingReport, AgingError> {
        let names: HashMap<CounterpartyId, &str> = counterparties
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut rows: HashMap<CounterpartyId, CounterpartyAging> = HashMap::new();
        for doc in documents.iter().filter(|doc| {
            doc.kind == kind
                && doc.is_open()
                && doc.document_date <= as_of
                && branch.matches(doc.branch_id)
        }) {
            let bucket = AgingBucket::classify(elapsed_days(doc.document_date, as_of));
            let row = rows.entry(doc.counterparty_id).or_insert_with(|| CounterpartyAging {
                counterparty_id: doc.counterparty_id,
                name: names
                    .get(&doc.counterparty_id)
                    .map_or_else(|| doc.counterparty_id.to_string(), |name| (*name).to_string()),
                buckets: BucketTotals::default(),
                total_outstanding: Money::ZERO,
                oldest_document_date: doc.document_date,
                document_count: 0,
            });
            row.buckets = row
                .buckets
                .checked_add(bucket, doc.outstanding_amount)
                .ok_or_else(|| Self::overflow(doc.counterparty_id))?;
            row.total_outstanding = row
                .total_outstanding
                .checked_add(doc.outstanding_amount)
                .ok_or_else(|| Self::overflow(doc.counterparty_id))?;
            row.oldest_document_date = row.oldest_document_date.min(doc.document_date);
            row.document_count += 1;
        }

        let mut counterparty_rows: Vec<CounterpartyAging> = rows.into_values().collect();
        counterparty_rows.sort_by(|a, b| {
            b.total_outstanding
                .cmp(&a.total_outstanding)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut summary = AgingSummary {
            total_counterparties: Self::count_u32(
                counterparties
                    .iter()
                    .filter(|c| c.kind == kind.counterparty_kind() && c.is_live()),
            ),
            counterparties_with_balance: Self::count_u32(counterparty_rows.iter()),
            ..AgingSummary::default()
        };
        for row in &counterparty_rows {
            summary.buckets = summary
                .buckets
                .checked_merge(&row.buckets)
                .ok_or_else(|| Self::overflow(row.counterparty_id))?;
            summary.total_outstanding = summary
                .total_outstanding
                .checked_add(row.total_outstanding)
                .ok_or_else(|| Self::overflow(row.counterparty_id))?;
        }

        Ok(AgingReport {
            kind,
            as_of,
            branch_id: branch.branch_id(),
            summary,
            counterparties: counterparty_rows,
        })
    }

    /// Open bills and optional payment history for one counterparty.
    ///
    /// `days_outstanding` is measured against `now` rather than a report
    /// `as_of`, and no date cut-off is applied.
    ///
    /// # Errors
    ///
    /// Returns `CounterpartyNotFound` if no non-deleted counterparty of the
    /// matching kind has this ID. Inactive counterparties still resolve.
    pub fn counterparty_outstanding(
        kind: DocumentKind,
        counterparty_id: CounterpartyId,
        counterparties: &[Counterparty],
        documents: &[OutstandingDocument],
        settlements: &[Settlement],
        include_history: bool,
        now: DateTime<Utc>,
    ) -> Result<CounterpartyOutstanding, AgingError> {
        let counterparty = counterparties
            .iter()
            .find(|c| {
                c.id == counterparty_id
                    && c.kind == kind.counterparty_kind()
                    && c.deleted_at.is_none()
            })
            .cloned()
            .ok_or(AgingError::CounterpartyNotFound(counterparty_id))?;

        let mut open: Vec<&OutstandingDocument> = documents
            .iter()
            .filter(|doc| {
                doc.counterparty_id == counterparty_id && doc.kind == kind && doc.is_open()
            })
            .collect();
        open.sort_by(|a, b| {
            a.document_date
                .cmp(&b.document_date)
                .then_with(|| a.number.cmp(&b.number))
        });

        let mut summary = OutstandingSummary::default();
        let mut outstanding_bills = Vec::with_capacity(open.len());
        for doc in open {
            let overflow = || Self::overflow(counterparty_id);
            summary.total_outstanding = summary
                .total_outstanding
                .checked_add(doc.outstanding_amount)
                .ok_or_else(overflow)?;
            summary.total_billed = summary
                .total_billed
                .checked_add(doc.total_amount)
                .ok_or_else(overflow)?;
            summary.total_paid = summary
                .total_paid
                .checked_add(doc.paid_amount)
                .ok_or_else(overflow)?;
            summary.bill_count += 1;
            summary.oldest_document_date.get_or_insert(doc.document_date);

            let days_outstanding = elapsed_days(doc.document_date, now);
            outstanding_bills.push(OutstandingBill {
                document_id: doc.id,
                number: doc.number.clone(),
                document_date: doc.document_date,
                total_amount: doc.total_amount,
                paid_amount: doc.paid_amount,
                outstanding_amount: doc.outstanding_amount,
                status: doc.status,
                days_outstanding,
                bucket: AgingBucket::classify(days_outstanding),
            });
        }

        let payment_history = include_history.then(|| {
            let mut history: Vec<Settlement> = settlements
                .iter()
                .filter(|s| s.counterparty_id == counterparty_id)
                .cloned()
                .collect();
            history.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
            history
        });

        Ok(CounterpartyOutstanding {
            counterparty,
            now,
            summary,
            outstanding_bills,
            payment_history,
        })
    }

    fn overflow(counterparty_id: CounterpartyId) -> AgingError {
        tracing::error!(counterparty_id = %counterparty_id, "Outstanding totals overflow");
        AgingError::AmountOverflow(counterparty_id)
    }

    fn count_u32<T>(items: impl Iterator<Item = T>) -> u32 {
        u32::try_from(items.count()).unwrap_or(u32::MAX)
    }
}
