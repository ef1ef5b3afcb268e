//! Header account rollup.
//!
//! Detail balances come from the ledger's signed rule; a header's balance is
//! the sum of its children's, resolved post-order. The tree is built from the
//! chart's parent → children index, never by following parent pointers, and
//! acyclicity is checked before any recursion.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petledger_shared::types::{AccountId, Money};
use serde::{Deserialize, Serialize};

use crate::accounts::{Account, AccountType, ChartOfAccounts};
use crate::ledger::query::balance_overflow;
use crate::ledger::{
    BranchFilter, IntegrityError, LedgerError, LedgerQueryEngine, PostedLine, SideTotals,
};

/// One node of the balance tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceNode {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Header flag.
    pub is_header: bool,
    /// Detail: signed ledger balance. Header: sum of children.
    pub balance: Money,
    /// Children ordered by code.
    pub children: Vec<BalanceNode>,
}

impl BalanceNode {
    /// Depth-first iterator over this node and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Hierarchy rollup calculator.
pub struct HierarchyRollup;

impl HierarchyRollup {
    /// Balance tree as of `as_of`, ordered by code at every level.
    ///
    /// With `account_type`, only roots of that type are returned. Accounts
    /// that are inactive or deleted are dropped unless they still carry a
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `Integrity(CyclicHierarchy)` if the parent graph loops, or
    /// `Integrity(BalanceOverflow)` if a detail or header sum leaves `i64`.
    pub fn account_balances(
        chart: &ChartOfAccounts,
        lines: &[PostedLine],
        account_type: Option<AccountType>,
        as_of: DateTime<Utc>,
        branch: BranchFilter,
    ) -> Result<Vec<BalanceNode>, LedgerError> {
        if let Some(account_id) = chart.find_cycle() {
            tracing::error!(
                account_id = %account_id,
                as_of = %as_of,
                "Account hierarchy contains a cycle"
            );
            return Err(IntegrityError::CyclicHierarchy { account_id }.into());
        }

        let sums = LedgerQueryEngine::side_totals(lines, as_of, branch)?;

        Ok(Self::children_of(chart, None, &sums)?
            .into_iter()
            .filter(|node| account_type.is_none_or(|t| node.account_type == t))
            .collect())
    }

    fn children_of(
        chart: &ChartOfAccounts,
        parent: Option<AccountId>,
        sums: &HashMap<AccountId, SideTotals>,
    ) -> Result<Vec<BalanceNode>, LedgerError> {
        let mut nodes = Vec::new();
        for account in chart.all_children(parent) {
            let node = Self::build_node(chart, account, sums)?;
            if node.balance != Money::ZERO || Self::is_live(chart, node.account_id) {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn build_node(
        chart: &ChartOfAccounts,
        account: &Account,
        sums: &HashMap<AccountId, SideTotals>,
    ) -> Result<BalanceNode, LedgerError> {
        let (balance, children) = if account.is_header {
            let children = Self::children_of(chart, Some(account.id), sums)?;
            let balance = Money::checked_sum(children.iter().map(|child| child.balance))
                .ok_or_else(|| balance_overflow(account.id))?;
            (balance, children)
        } else {
            let balance = sums
                .get(&account.id)
                .copied()
                .unwrap_or_default()
                .balance(account.normal_balance);
            (balance, Vec::new())
        };

        Ok(BalanceNode {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            is_header: account.is_header,
            balance,
            children,
        })
    }

    fn is_live(chart: &ChartOfAccounts, id: AccountId) -> bool {
        chart.get(id).is_ok_and(Account::is_live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountCategory;
    use crate::fixtures::{PetshopChart, detail, header, jan};
    use proptest::prelude::*;

    fn m(v: i64) -> Money {
        Money::from_minor(v)
    }

    fn balances(
        chart: &ChartOfAccounts,
        lines: &[PostedLine],
        as_of: DateTime<Utc>,
    ) -> Vec<BalanceNode> {
        HierarchyRollup::account_balances(chart, lines, None, as_of, BranchFilter::All).unwrap()
    }

    fn assert_consistent(node: &BalanceNode) {
        for n in node.iter().filter(|n| n.is_header) {
            let sum: Money = n.children.iter().map(|c| c.balance).sum();
            assert_eq!(n.balance, sum, "header {} disagrees with its children", n.code);
        }
    }

    #[test]
    fn test_rollup_sums_children() {
        let chart = PetshopChart::build();
        let entries = [
            chart.posted(1, jan(1), chart.cash, chart.sales, 100_000, None),
            chart.posted(2, jan(2), chart.bank, chart.grooming, 40_000, None),
            chart.posted(3, jan(5), chart.rent, chart.cash, 30_000, None),
        ];
        let lines = PostedLine::from_entries(&entries);

        let tree = balances(&chart.chart, &lines, jan(31));
        let codes: Vec<_> = tree.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["1-000", "2-000", "3-100", "4-000", "5-000"]);

        let assets = &tree[0];
        assert_eq!(assets.balance, m(110_000));
        let children: Vec<_> = assets.children.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(children, vec!["1-100", "1-200", "1-300"]);
        assert_eq!(tree[3].balance, m(140_000));
        for root in &tree {
            assert_consistent(root);
        }
    }

    #[test]
    fn test_rollup_type_filter() {
        let chart = PetshopChart::build();
        let sale = chart.posted(1, jan(1), chart.cash, chart.sales, 500, None);
        let lines = PostedLine::from_entry(&sale);

        let revenue = HierarchyRollup::account_balances(
            &chart.chart,
            &lines,
            Some(AccountType::Revenue),
            jan(31),
            BranchFilter::All,
        )
        .unwrap();
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].code, "4-000");
        assert_eq!(revenue[0].balance, m(500));
    }

    #[test]
    fn test_rollup_respects_as_of() {
        let chart = PetshopChart::build();
        let sale = chart.posted(1, jan(10), chart.cash, chart.sales, 500, None);
        let lines = PostedLine::from_entry(&sale);
        let tree = balances(&chart.chart, &lines, jan(9));
        assert!(tree.iter().all(|n| n.balance.is_zero()));
    }

    #[test]
    fn test_rollup_cycle_is_integrity_error() {
        let mut a = header("1-000", "A", AccountCategory::CurrentAsset, None);
        let mut b = header("1-100", "B", AccountCategory::CurrentAsset, None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let chart = ChartOfAccounts::new(vec![a, b]).unwrap();

        let err = HierarchyRollup::account_balances(&chart, &[], None, jan(1), BranchFilter::All)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Integrity(IntegrityError::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_rollup_skips_inactive_without_balance() {
        let mut chart = PetshopChart::build();
        chart.deactivate(chart.inventory);
        let tree = balances(&chart.chart, &[], jan(31));
        assert!(tree[0].children.iter().all(|c| c.account_id != chart.inventory));
    }

    #[test]
    fn test_rollup_keeps_deleted_account_with_balance() {
        let mut chart = PetshopChart::build();
        let purchase = chart.posted(1, jan(1), chart.inventory, chart.payables, 700, None);
        let lines = PostedLine::from_entry(&purchase);
        chart.modify(chart.inventory, |account| account.deleted_at = Some(jan(2)));

        let tree = balances(&chart.chart, &lines, jan(31));
        assert!(tree[0].children.iter().any(|c| c.account_id == chart.inventory));
        assert_eq!(tree[0].balance, m(700));
    }

    #[test]
    fn test_rollup_header_overflow_is_integrity_error() {
        let chart = PetshopChart::build();
        let mut lines = PostedLine::from_entries([
            &chart.posted(1, jan(1), chart.cash, chart.sales, 1, None),
            &chart.posted(2, jan(2), chart.bank, chart.grooming, 1, None),
        ]);
        let half = m(i64::MAX / 2 + 1);
        for line in lines.iter_mut().filter(|l| l.debit.is_positive()) {
            line.debit = half;
        }
        for line in lines.iter_mut().filter(|l| l.credit.is_positive()) {
            line.credit = Money::ZERO;
        }

        let err = HierarchyRollup::account_balances(
            &chart.chart,
            &lines,
            None,
            jan(31),
            BranchFilter::All,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Integrity(IntegrityError::BalanceOverflow { account_id: chart.assets })
        );
    }

    /// Builds a chain of `depth` nested headers with one detail leaf per
    /// level, all under a single root.
    fn deep_chart(depth: usize) -> (ChartOfAccounts, Vec<AccountId>) {
        let mut accounts = Vec::new();
        let mut leaves = Vec::new();
        let mut parent = None;
        for level in 0..depth {
            let h =
                header(&format!("1-{level:02}0"), "Group", AccountCategory::CurrentAsset, parent);
            let d = detail(
                &format!("1-{level:02}1"),
                "Leaf",
                AccountCategory::CurrentAsset,
                Some(h.id),
            );
            parent = Some(h.id);
            leaves.push(d.id);
            accounts.push(h);
            accounts.push(d);
        }
        (ChartOfAccounts::new(accounts).unwrap(), leaves)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Every header equals the sum of its direct children at any depth,
        /// and the root equals the sum of all leaves.
        #[test]
        fn prop_rollup_consistency(
            amounts in prop::collection::vec(-1_000_000i64..1_000_000, 1..8),
        ) {
            let (chart, leaves) = deep_chart(amounts.len());
            let lines: Vec<PostedLine> = leaves
                .iter()
                .zip(&amounts)
                .enumerate()
                .map(|(i, (&account_id, &amount))| PostedLine {
                    entry_id: petledger_shared::types::JournalEntryId::new(),
                    entry_number: format!("JE-2026-{i:06}"),
                    date: jan(1),
                    entry_description: "Generated".to_string(),
                    line_no: 1,
                    account_id,
                    branch_id: None,
                    debit: if amount >= 0 { m(amount) } else { Money::ZERO },
                    credit: if amount < 0 { m(-amount) } else { Money::ZERO },
                    description: None,
                })
                .collect();

            let tree = balances(&chart, &lines, jan(31));
            prop_assert_eq!(tree.len(), 1);
            for n in tree[0].iter().filter(|n| n.is_header) {
                let sum: Money = n.children.iter().map(|c| c.balance).sum();
                prop_assert_eq!(n.balance, sum);
            }
            prop_assert_eq!(tree[0].balance, m(amounts.iter().sum()));
        }
    }
}
