//! In-memory chart of accounts.
//!
//! Accounts live in a single arena sorted by code. Lookups by ID, by code
//! and by parent go through index maps into that arena, so the hierarchy is
//! never represented with owning pointers.

use std::collections::{HashMap, HashSet};

use petledger_shared::types::AccountId;

use super::error::AccountError;
use super::types::Account;

/// Loaded chart of accounts with lookup indexes.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
    by_id: HashMap<AccountId, usize>,
    by_code: HashMap<String, usize>,
    children: HashMap<Option<AccountId>, Vec<usize>>,
}

impl ChartOfAccounts {
    /// Builds the registry from a loaded account list.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateCode` if two live accounts share a
    /// code or the same ID appears twice.
    pub fn new(mut accounts: Vec<Account>) -> Result<Self, AccountError> {
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut by_id = HashMap::with_capacity(accounts.len());
        let mut by_code = HashMap::with_capacity(accounts.len());
        let mut children: HashMap<Option<AccountId>, Vec<usize>> = HashMap::new();

        for (idx, account) in accounts.iter().enumerate() {
            if by_id.insert(account.id, idx).is_some() {
                return Err(AccountError::DuplicateCode(account.code.clone()));
            }
            if !account.is_deleted() && by_code.insert(account.code.clone(), idx).is_some() {
                return Err(AccountError::DuplicateCode(account.code.clone()));
            }
            // Arena is sorted, so every child list comes out in code order.
            children.entry(account.parent_id).or_default().push(idx);
        }

        Ok(Self {
            accounts,
            by_id,
            by_code,
            children,
        })
    }

    /// Number of accounts, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart holds no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// All accounts in code order, deleted ones included.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Looks up an account by ID.
    ///
    /// Soft-deleted accounts are still returned so historical ledgers resolve.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the ID is unknown.
    pub fn get(&self, id: AccountId) -> Result<&Account, AccountError> {
        self.by_id
            .get(&id)
            .map(|&idx| &self.accounts[idx])
            .ok_or(AccountError::NotFound(id))
    }

    /// Looks up a live (not deleted) account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFoundByCode` if no live account has the code.
    pub fn get_by_code(&self, code: &str) -> Result<&Account, AccountError> {
        self.by_code
            .get(code)
            .map(|&idx| &self.accounts[idx])
            .ok_or_else(|| AccountError::NotFoundByCode(code.to_string()))
    }

    /// Direct children of `parent` ordered by code; `None` lists the roots.
    ///
    /// Soft-deleted accounts are omitted.
    #[must_use]
    pub fn list_children(&self, parent: Option<AccountId>) -> Vec<&Account> {
        let mut children = self.all_children(parent);
        children.retain(|account| !account.is_deleted());
        children
    }

    /// Direct children of `parent` ordered by code, deleted ones included.
    #[must_use]
    pub fn all_children(&self, parent: Option<AccountId>) -> Vec<&Account> {
        self.children
            .get(&parent)
            .map(|indexes| indexes.iter().map(|&idx| &self.accounts[idx]).collect())
            .unwrap_or_default()
    }

    /// Returns true if `id` has at least one child that is not deleted.
    #[must_use]
    pub fn has_live_children(&self, id: AccountId) -> bool {
        !self.list_children(Some(id)).is_empty()
    }

    /// Checks that a journal line may reference the account.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ID is unknown
    /// - `Header` if the account is a header
    /// - `Inactive` if the account is inactive or soft-deleted
    pub fn validate_for_posting(&self, id: AccountId) -> Result<&Account, AccountError> {
        let account = self.get(id)?;
        if account.is_header {
            return Err(AccountError::Header(id));
        }
        if !account.is_live() {
            return Err(AccountError::Inactive(id));
        }
        Ok(account)
    }

    /// Parent chain of `id`, nearest parent first.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` is unknown
    /// - `ParentNotFound` if a parent reference dangles
    /// - `CyclicHierarchy` if the chain loops
    pub fn ancestors(&self, id: AccountId) -> Result<Vec<&Account>, AccountError> {
        let mut current = self.get(id)?;
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);

        while let Some(parent_id) = current.parent_id {
            if !seen.insert(parent_id) {
                return Err(AccountError::CyclicHierarchy(parent_id));
            }
            let parent = self
                .get(parent_id)
                .map_err(|_| AccountError::ParentNotFound(parent_id))?;
            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }

    /// Returns an account that sits on a parent cycle, if any exists.
    #[must_use]
    pub fn find_cycle(&self) -> Option<AccountId> {
        // 0 = unvisited, 1 = on current path, 2 = known acyclic
        let mut state = vec![0u8; self.accounts.len()];

        for start in 0..self.accounts.len() {
            let mut path = Vec::new();
            let mut idx = Some(start);

            while let Some(i) = idx {
                match state[i] {
                    2 => break,
                    1 => return Some(self.accounts[i].id),
                    _ => {}
                }
                state[i] = 1;
                path.push(i);
                idx = self.accounts[i]
                    .parent_id
                    .and_then(|parent| self.by_id.get(&parent).copied());
            }

            for i in path {
                state[i] = 2;
            }
        }

        None
    }

    /// Returns true if making `new_parent` the parent of `id` would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, id: AccountId, new_parent: AccountId) -> bool {
        if id == new_parent {
            return true;
        }
        match self.ancestors(new_parent) {
            Ok(chain) => chain.iter().any(|account| account.id == id),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::AccountCategory;
    use crate::fixtures::{detail, header};
    use chrono::Utc;

    fn sample_chart() -> (ChartOfAccounts, AccountId, AccountId, AccountId) {
        let assets = header("1-000", "Assets", AccountCategory::CurrentAsset, None);
        let cash = detail("1-100", "Cash", AccountCategory::CurrentAsset, Some(assets.id));
        let bank = detail("1-200", "Bank", AccountCategory::CurrentAsset, Some(assets.id));
        let ids = (assets.id, cash.id, bank.id);
        // Insert out of order; the registry sorts by code.
        let chart = ChartOfAccounts::new(vec![bank, assets, cash]).unwrap();
        (chart, ids.0, ids.1, ids.2)
    }

    fn ids(accounts: &[&Account]) -> Vec<AccountId> {
        accounts.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_get_by_code() {
        let (chart, _, cash, _) = sample_chart();
        assert_eq!(chart.get_by_code("1-100").unwrap().id, cash);
        assert_eq!(
            chart.get_by_code("9-999"),
            Err(AccountError::NotFoundByCode("9-999".to_string()))
        );
    }

    #[test]
    fn test_list_children_ordered_by_code() {
        let (chart, assets, cash, bank) = sample_chart();
        assert_eq!(ids(&chart.list_children(None)), vec![assets]);
        assert_eq!(ids(&chart.list_children(Some(assets))), vec![cash, bank]);
        assert!(chart.list_children(Some(cash)).is_empty());
    }

    #[test]
    fn test_validate_for_posting() {
        let (chart, assets, cash, _) = sample_chart();
        assert!(chart.validate_for_posting(cash).is_ok());
        assert_eq!(
            chart.validate_for_posting(assets),
            Err(AccountError::Header(assets))
        );

        let missing = AccountId::new();
        assert_eq!(
            chart.validate_for_posting(missing),
            Err(AccountError::NotFound(missing))
        );
    }

    #[test]
    fn test_inactive_and_deleted_reject_posting() {
        let mut inactive = detail("5-100", "Rent", AccountCategory::OperatingExpense, None);
        inactive.is_active = false;
        let mut deleted = detail("5-200", "Old Rent", AccountCategory::OperatingExpense, None);
        deleted.deleted_at = Some(Utc::now());
        let (inactive_id, deleted_id) = (inactive.id, deleted.id);
        let chart = ChartOfAccounts::new(vec![inactive, deleted]).unwrap();

        assert_eq!(
            chart.validate_for_posting(inactive_id),
            Err(AccountError::Inactive(inactive_id))
        );
        assert_eq!(
            chart.validate_for_posting(deleted_id),
            Err(AccountError::Inactive(deleted_id))
        );
        assert!(chart.get_by_code("5-200").is_err());
        assert!(chart.get(deleted_id).is_ok());
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let a = detail("1-100", "Cash", AccountCategory::CurrentAsset, None);
        let b = detail("1-100", "Petty Cash", AccountCategory::CurrentAsset, None);
        assert_eq!(
            ChartOfAccounts::new(vec![a, b]).unwrap_err(),
            AccountError::DuplicateCode("1-100".to_string())
        );
    }

    #[test]
    fn test_ancestors() {
        let root = header("4-000", "Revenue", AccountCategory::OperatingRevenue, None);
        let mid = header("4-100", "Services", AccountCategory::OperatingRevenue, Some(root.id));
        let leaf = detail("4-110", "Grooming", AccountCategory::OperatingRevenue, Some(mid.id));
        let (root_id, mid_id, leaf_id) = (root.id, mid.id, leaf.id);
        let chart = ChartOfAccounts::new(vec![root, mid, leaf]).unwrap();

        assert_eq!(ids(&chart.ancestors(leaf_id).unwrap()), vec![mid_id, root_id]);
        assert!(chart.ancestors(root_id).unwrap().is_empty());
        assert!(chart.would_create_cycle(root_id, leaf_id));
        assert!(!chart.would_create_cycle(leaf_id, root_id));
    }

    #[test]
    fn test_cycle_detected_not_looped() {
        let mut a = header("2-000", "A", AccountCategory::CurrentLiability, None);
        let mut b = header("2-100", "B", AccountCategory::CurrentLiability, None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let a_id = a.id;
        let chart = ChartOfAccounts::new(vec![a, b]).unwrap();

        assert!(chart.find_cycle().is_some());
        assert!(matches!(chart.ancestors(a_id), Err(AccountError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_acyclic_chart_has_no_cycle() {
        let (chart, ..) = sample_chart();
        assert_eq!(chart.find_cycle(), None);
    }
}
