//! Journal entry lifecycle.
//!
//! This service contains pure business logic with no database dependencies.
//! It mutates the `JournalEntry` aggregate in memory; the repository loads the
//! entry under a row lock, calls into here, and persists the result in the
//! same transaction.

use chrono::{DateTime, Datelike, Utc};
use petledger_shared::types::{JournalEntryId, JournalLineId, UserId};

use super::error::JournalError;
use super::number::JournalNumber;
use super::types::{
    JournalEntry, JournalHeaderUpdate, JournalLine, JournalStatus, JournalTotals, LineInput,
    NewJournalEntry,
};
use super::validation;
use crate::accounts::ChartOfAccounts;

/// Journal entry lifecycle service.
pub struct JournalService;

impl JournalService {
    /// Builds a draft entry.
    ///
    /// Balance is not required for drafts.
    ///
    /// # Errors
    ///
    /// Returns `JournalError` if the description is empty, there are no
    /// lines, or any line breaks a line rule.
    pub fn create_draft(
        chart: &ChartOfAccounts,
        id: JournalEntryId,
        number: String,
        input: NewJournalEntry,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalEntry, JournalError> {
        let description = Self::required_description(&input.description)?;
        if input.lines.is_empty() {
            return Err(JournalError::NoLines);
        }
        validation::validate_line_count(input.lines.len())?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (line_no, line) in (1u32..).zip(input.lines) {
            validation::validate_line(chart, line_no, &line)?;
            lines.push(Self::build_line(line_no, line));
        }

        Ok(JournalEntry {
            id,
            number,
            date: input.date,
            description,
            status: JournalStatus::Draft,
            branch_id: input.branch_id,
            lines,
            created_by: actor,
            created_at: now,
            updated_by: actor,
            updated_at: now,
            posted_by: None,
            posted_at: None,
            voided_by: None,
            voided_at: None,
            void_reason: None,
        })
    }

    /// Builds an entry and posts it in one step.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::create_draft`] or [`Self::post`].
    pub fn create_posted(
        chart: &ChartOfAccounts,
        id: JournalEntryId,
        number: String,
        input: NewJournalEntry,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalEntry, JournalError> {
        let mut entry = Self::create_draft(chart, id, number, input, actor, now)?;
        Self::post(&mut entry, chart, actor, now)?;
        Ok(entry)
    }

    /// Posts a draft.
    ///
    /// Every line's account is validated again, so an account deactivated
    /// after drafting blocks posting.
    ///
    /// # Errors
    ///
    /// - `AlreadyPosted` / `EntryVoided` for non-drafts
    /// - `NoLines` or a line rule failure
    /// - `Unbalanced { debit, credit }` if the sides differ
    pub fn post(
        entry: &mut JournalEntry,
        chart: &ChartOfAccounts,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalTotals, JournalError> {
        match entry.status {
            JournalStatus::Draft => {}
            JournalStatus::Posted => return Err(JournalError::AlreadyPosted(entry.id)),
            JournalStatus::Void => return Err(JournalError::EntryVoided(entry.id)),
        }
        if entry.lines.is_empty() {
            return Err(JournalError::NoLines);
        }
        validation::validate_line_count(entry.lines.len())?;

        for line in &entry.lines {
            validation::validate_amounts(line.line_no, line.debit, line.credit)?;
            chart
                .validate_for_posting(line.account_id)
                .map_err(|source| JournalError::Account {
                    line_no: line.line_no,
                    source,
                })?;
        }

        let totals = validation::checked_totals(&entry.lines)?;
        validation::validate_balanced(&totals)?;

        entry.status = JournalStatus::Posted;
        entry.posted_by = Some(actor);
        entry.posted_at = Some(now);
        Self::touch(entry, actor, now);
        Ok(totals)
    }

    /// Voids a posted entry. Lines are kept for audit.
    ///
    /// # Errors
    ///
    /// `NotPosted` unless the entry is posted; `VoidReasonRequired` for a
    /// blank reason.
    pub fn void(
        entry: &mut JournalEntry,
        reason: &str,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), JournalError> {
        if entry.status != JournalStatus::Posted {
            return Err(JournalError::NotPosted(entry.id));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(JournalError::VoidReasonRequired);
        }

        entry.status = JournalStatus::Void;
        entry.voided_by = Some(actor);
        entry.voided_at = Some(now);
        entry.void_reason = Some(reason.to_string());
        Self::touch(entry, actor, now);
        Ok(())
    }

    /// Appends a line to a draft and returns it.
    ///
    /// # Errors
    ///
    /// `EntryNotDraft`, or a line rule failure.
    pub fn add_line(
        entry: &mut JournalEntry,
        chart: &ChartOfAccounts,
        line: LineInput,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalLine, JournalError> {
        Self::ensure_draft(entry)?;
        validation::validate_line_count(entry.lines.len() + 1)?;
        let line_no = entry.next_line_no();
        validation::validate_line(chart, line_no, &line)?;

        let line = Self::build_line(line_no, line);
        entry.lines.push(line.clone());
        Self::touch(entry, actor, now);
        Ok(line)
    }

    /// Removes a line from a draft and returns it.
    ///
    /// # Errors
    ///
    /// `EntryNotDraft`, `LineNotFound`, or `NoLines` when it is the last line.
    pub fn remove_line(
        entry: &mut JournalEntry,
        line_id: JournalLineId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalLine, JournalError> {
        Self::ensure_draft(entry)?;
        let position = entry
            .lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or(JournalError::LineNotFound(line_id))?;
        if entry.lines.len() == 1 {
            return Err(JournalError::NoLines);
        }

        let removed = entry.lines.remove(position);
        Self::touch(entry, actor, now);
        Ok(removed)
    }

    /// Changes a draft's date, description or default branch.
    ///
    /// Moving the date into another year re-derives the number's year
    /// prefix; the sequence part is kept, so the number stays unique.
    ///
    /// # Errors
    ///
    /// `EntryNotDraft`, or `DescriptionRequired` for a blank description.
    pub fn update_header(
        entry: &mut JournalEntry,
        update: JournalHeaderUpdate,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), JournalError> {
        Self::ensure_draft(entry)?;

        if let Some(description) = &update.description {
            entry.description = Self::required_description(description)?;
        }
        if let Some(date) = update.date {
            if date.year() != entry.date.year()
                && let Some(number) = JournalNumber::with_year(&entry.number, date.year())
            {
                entry.number = number;
            }
            entry.date = date;
        }
        if let Some(branch_id) = update.branch_id {
            entry.branch_id = branch_id;
        }

        Self::touch(entry, actor, now);
        Ok(())
    }

    /// Checks that an entry may be hard-deleted.
    ///
    /// # Errors
    ///
    /// `EntryNotDraft` for posted or void entries.
    pub fn validate_can_delete(entry: &JournalEntry) -> Result<(), JournalError> {
        Self::ensure_draft(entry)
    }

    fn ensure_draft(entry: &JournalEntry) -> Result<(), JournalError> {
        if entry.status.is_editable() {
            Ok(())
        } else {
            Err(JournalError::EntryNotDraft(entry.id))
        }
    }

    fn required_description(description: &str) -> Result<String, JournalError> {
        let description = description.trim();
        if description.is_empty() {
            Err(JournalError::DescriptionRequired)
        } else {
            Ok(description.to_string())
        }
    }

    fn build_line(line_no: u32, input: LineInput) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            line_no,
            account_id: input.account_id,
            branch_id: input.branch_id,
            debit: input.debit,
            credit: input.credit,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    fn touch(entry: &mut JournalEntry, actor: UserId, now: DateTime<Utc>) {
        entry.updated_by = actor;
        entry.updated_at = now;
    }
}
