//! Hold distribution
//!
//! Turns staff-selected holds into item-level hold requests against the
//! ILS. Holds still pointing at the sentinel branch were never given a
//! destination and are left alone.

use std::sync::Arc;

use crate::{error::AppResult, repository::Repository};

use super::ils::{IlsHold, IlsService};

/// Outcome of one distribution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    pub holds_placed: usize,
    pub holds_skipped: usize,
}

#[derive(Clone)]
pub struct DistributionService {
    repository: Repository,
    ils: Arc<dyn IlsService>,
    account_id: i64,
}

impl DistributionService {
    pub fn new(repository: Repository, ils: Arc<dyn IlsService>, account_id: i64) -> Self {
        Self {
            repository,
            ils,
            account_id,
        }
    }

    /// Place holds for a cart's staff-selected items; defaults to the
    /// latest cart.
    pub async fn issue_holds(&self, cart_id: Option<i64>) -> AppResult<DistributionReport> {
        let cart = match cart_id {
            Some(id) => self.repository.carts.cart_by_id(id).await?,
            None => self.repository.carts.latest_cart().await?,
        };

        let mut report = DistributionReport::default();
        for hold in self.repository.carts.holds_ready(cart.rid).await? {
            let branch = self.repository.codes.branch_by_id(hold.dst_branch_id).await?;
            let Some(branch_code) = branch.code else {
                tracing::info!(item_id = hold.item_id, "no destination selected, skipping");
                report.holds_skipped += 1;
                continue;
            };

            self.ils
                .place_hold_on_item(self.account_id, hold.item_id, &branch_code)
                .await?;
            self.repository.carts.mark_outstanding(hold.rid).await?;
            tracing::info!(
                item_id = hold.item_id,
                branch = %branch_code,
                "hold placed"
            );
            report.holds_placed += 1;
        }

        tracing::info!(
            cart_id = cart.rid,
            holds_placed = report.holds_placed,
            holds_skipped = report.holds_skipped,
            "distribution complete"
        );
        Ok(report)
    }

    /// Holds currently on the batch account
    pub async fn account_holds(&self, limit: usize) -> AppResult<Vec<IlsHold>> {
        self.ils.list_holds(self.account_id, limit).await
    }

    /// Clear every hold from the batch account
    pub async fn clear_account_holds(&self) -> AppResult<()> {
        self.ils.delete_all_holds(self.account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SourceSystem;
    use crate::services::ils::MockIlsService;
    use crate::testutil;

    #[tokio::test]
    async fn selected_holds_are_placed_and_sentinel_holds_skipped() {
        let pool = testutil::test_pool().await;
        testutil::add_branch(&pool, SourceSystem::Nyp, "14", "Mid-Manhattan").await;
        let repository = Repository::new(pool.clone());

        let cart_id = repository
            .carts
            .insert_cart(SourceSystem::Nyp, "sheet-1")
            .await
            .expect("cart");
        let sentinel = repository
            .codes
            .branch_id_for_code(SourceSystem::Nyp, None)
            .await
            .expect("sentinel");
        let branch_id = repository
            .codes
            .branch_id_for_code(SourceSystem::Nyp, Some("14"))
            .await
            .expect("branch");

        let selected = repository
            .carts
            .insert_hold(cart_id, 37102791, sentinel)
            .await
            .expect("hold");
        repository
            .carts
            .mark_selected(selected, branch_id)
            .await
            .expect("select");

        // issued but never given a destination
        let unselected = repository
            .carts
            .insert_hold(cart_id, 5555, sentinel)
            .await
            .expect("hold");
        repository
            .carts
            .mark_selected(unselected, sentinel)
            .await
            .expect("select");

        let mut ils = MockIlsService::new();
        ils.expect_place_hold_on_item()
            .withf(|account_id, item_id, branch_code| {
                *account_id == 123 && *item_id == 37102791 && branch_code == "14"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = DistributionService::new(repository.clone(), Arc::new(ils), 123);
        let report = service.issue_holds(Some(cart_id)).await.expect("issue");

        assert_eq!(report.holds_placed, 1);
        assert_eq!(report.holds_skipped, 1);

        // the placed hold is now outstanding; the sentinel one stays ready
        let ready = repository.carts.holds_ready(cart_id).await.expect("ready");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].item_id, 5555);
    }
}
