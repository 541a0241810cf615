//! Selection feedback
//!
//! Reads staff destination annotations back out of a shopping cart and
//! applies them to the open hold rows. Heading rows and rows without an
//! item number are structural, not errors; destination codes the branch
//! table does not know collapse to the sentinel branch.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    ingest::SourceSystem,
    repository::Repository,
};

use super::cart::{CartTab, DESTINATION_COLUMN, ITEM_ID_COLUMN};
use super::sheets::SheetService;

/// Outcome of one selection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    pub rows_seen: usize,
    pub holds_updated: usize,
    pub unmatched_items: usize,
}

#[derive(Clone)]
pub struct SelectionService {
    repository: Repository,
    sheets: Arc<dyn SheetService>,
}

impl SelectionService {
    pub fn new(repository: Repository, sheets: Arc<dyn SheetService>) -> Self {
        Self { repository, sheets }
    }

    /// Pull selections for a cart; defaults to the latest published cart.
    pub async fn pull_selections(&self, cart_id: Option<i64>) -> AppResult<SelectionReport> {
        let cart = match cart_id {
            Some(id) => self.repository.carts.cart_by_id(id).await?,
            None => self.repository.carts.latest_cart().await?,
        };
        let system = SourceSystem::from_id(cart.system_id).ok_or_else(|| {
            AppError::Internal(format!("cart {} has unknown system id", cart.rid))
        })?;

        let mut report = SelectionReport::default();
        for tab in CartTab::ALL {
            let rows = self.sheets.read_rows(&cart.sheet_id, tab.title()).await?;
            // first row is the header
            for row in rows.into_iter().skip(1) {
                report.rows_seen += 1;
                let Some(item_id) = row
                    .get(ITEM_ID_COLUMN)
                    .and_then(|v| v.trim().parse::<i64>().ok())
                else {
                    // heading row or blank spacer
                    continue;
                };

                let dst_code = row
                    .get(DESTINATION_COLUMN)
                    .map(|v| v.trim().to_lowercase())
                    .filter(|v| !v.is_empty());
                let dst_branch_id = self
                    .repository
                    .codes
                    .branch_id_for_code(system, dst_code.as_deref())
                    .await?;

                match self.repository.carts.open_hold_for_item(item_id).await? {
                    Some(hold) => {
                        self.repository
                            .carts
                            .mark_selected(hold.rid, dst_branch_id)
                            .await?;
                        report.holds_updated += 1;
                    }
                    None => {
                        tracing::warn!(item_id, "selection for item without an open hold");
                        report.unmatched_items += 1;
                    }
                }
            }
        }

        tracing::info!(
            cart_id = cart.rid,
            rows_seen = report.rows_seen,
            holds_updated = report.holds_updated,
            unmatched_items = report.unmatched_items,
            "selections pulled"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sheets::MockSheetService;
    use crate::testutil;

    #[tokio::test]
    async fn selections_move_holds_to_the_chosen_branch() {
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
        repository
            .carts
            .insert_hold(cart_id, 37102791, sentinel)
            .await
            .expect("hold");

        let mut sheets = MockSheetService::new();
        sheets.expect_read_rows().returning(|_, tab| {
            if tab == "Adults" {
                Ok(vec![
                    vec!["".into(), "Author".into()],
                    vec!["Mystery Fiction".into()],
                    vec![
                        "".into(),
                        "Christie, Agatha".into(),
                        "The clocks".into(),
                        "MYSTERY CHRISTIE".into(),
                        "1963".into(),
                        "link".into(),
                        "37102791".into(),
                        "14".into(),
                    ],
                ])
            } else {
                Ok(vec![])
            }
        });

        let service = SelectionService::new(repository.clone(), Arc::new(sheets));
        let report = service.pull_selections(None).await.expect("pull");

        assert_eq!(report.rows_seen, 2);
        assert_eq!(report.holds_updated, 1);
        assert_eq!(report.unmatched_items, 0);

        let ready = repository.carts.holds_ready(cart_id).await.expect("ready");
        assert_eq!(ready.len(), 1);
        let dst = repository
            .codes
            .branch_by_id(ready[0].dst_branch_id)
            .await
            .expect("branch");
        assert_eq!(dst.code.as_deref(), Some("14"));
    }

    #[tokio::test]
    async fn unknown_destination_collapses_to_the_sentinel() {
        let pool = testutil::test_pool().await;
        let repository = Repository::new(pool.clone());

        let cart_id = repository
            .carts
            .insert_cart(SourceSystem::Bkl, "sheet-2")
            .await
            .expect("cart");
        let sentinel = repository
            .codes
            .branch_id_for_code(SourceSystem::Bkl, None)
            .await
            .expect("sentinel");
        repository
            .carts
            .insert_hold(cart_id, 5555, sentinel)
            .await
            .expect("hold");

        let mut sheets = MockSheetService::new();
        sheets.expect_read_rows().returning(|_, tab| {
            if tab == "Kids" {
                Ok(vec![
                    vec!["".into()],
                    vec![
                        "".into(),
                        "".into(),
                        "".into(),
                        "".into(),
                        "".into(),
                        "".into(),
                        "5555".into(),
                        "zz".into(),
                    ],
                ])
            } else {
                Ok(vec![])
            }
        });

        let service = SelectionService::new(repository.clone(), Arc::new(sheets));
        let report = service.pull_selections(Some(cart_id)).await.expect("pull");

        assert_eq!(report.holds_updated, 1);
        let ready = repository.carts.holds_ready(cart_id).await.expect("ready");
        assert_eq!(ready[0].dst_branch_id, sentinel);
    }
}
