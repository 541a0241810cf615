//! Shopping-cart population
//!
//! Renders uncarted overflow items into a spreadsheet staff can annotate:
//! one tab per audience plus a World Lang tab grouped by language and a
//! validation tab of branch codes. Every listed item is assigned to the
//! cart and gets an open hold row awaiting a destination selection.

use std::sync::Arc;

use chrono::Local;

use crate::{
    error::AppResult,
    ingest::SourceSystem,
    models::{CartRow, MatCat},
    repository::Repository,
};

use super::sheets::SheetService;

/// Row layout shared with the selection reader: item id in column 6,
/// staff-entered destination branch in column 7.
pub const ITEM_ID_COLUMN: usize = 6;
pub const DESTINATION_COLUMN: usize = 7;

const BRANCH_CODES_TAB: &str = "branch codes";

/// The audience tabs of a shopping cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartTab {
    Adults,
    Teens,
    Kids,
    WorldLang,
}

impl CartTab {
    pub const ALL: [CartTab; 4] = [
        CartTab::Adults,
        CartTab::Teens,
        CartTab::Kids,
        CartTab::WorldLang,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            CartTab::Adults => "Adults",
            CartTab::Teens => "Teens",
            CartTab::Kids => "Kids",
            CartTab::WorldLang => "World Lang",
        }
    }

    /// Audience the tab shows; World Lang spans all audiences
    fn audience_code(&self) -> Option<&'static str> {
        match self {
            CartTab::Adults => Some("a"),
            CartTab::Teens => Some("y"),
            CartTab::Kids => Some("j"),
            CartTab::WorldLang => None,
        }
    }

    fn order_column(&self) -> &'static str {
        match self {
            CartTab::Adults => "adult_order",
            CartTab::Teens => "teen_order",
            CartTab::Kids => "kids_order",
            CartTab::WorldLang => "wl_order",
        }
    }
}

/// Outcome of one cart publication
#[derive(Debug, Clone)]
pub struct PublishedCart {
    pub cart_id: i64,
    pub sheet_id: String,
    pub items_listed: usize,
}

#[derive(Clone)]
pub struct CartService {
    repository: Repository,
    sheets: Arc<dyn SheetService>,
    folder_id: String,
}

impl CartService {
    pub fn new(repository: Repository, sheets: Arc<dyn SheetService>, folder_id: String) -> Self {
        Self {
            repository,
            sheets,
            folder_id,
        }
    }

    fn cart_name() -> String {
        format!("Rebalancing Cart {}", Local::now().format("%B %Y"))
    }

    fn header_row() -> Vec<String> {
        ["", "Author", "Title", "Call No", "Pub Date", "View", "Item #", "Destination"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn item_row(system: SourceSystem, item: &CartRow) -> Vec<String> {
        let link = format!("=HYPERLINK(\"{}{}\", \"see\")", system.catalog_url(), item.bib_id);
        vec![
            String::new(),
            item.author.clone().unwrap_or_default(),
            item.title.clone().unwrap_or_default(),
            item.call_no.clone().unwrap_or_default(),
            item.pub_date.clone().unwrap_or_default(),
            link,
            item.item_id.to_string(),
        ]
    }

    /// Create and populate a shopping cart for one system.
    pub async fn create_cart(&self, system: SourceSystem) -> AppResult<PublishedCart> {
        let mut tabs: Vec<String> = CartTab::ALL.iter().map(|t| t.title().to_string()).collect();
        tabs.push(BRANCH_CODES_TAB.to_string());

        let name = Self::cart_name();
        let sheet_id = self.sheets.create_spreadsheet(&name, &tabs).await?;
        self.sheets.move_to_folder(&sheet_id, &self.folder_id).await?;

        let cart_id = self.repository.carts.insert_cart(system, &sheet_id).await?;
        let sentinel_branch = self.repository.codes.branch_id_for_code(system, None).await?;

        let mut items_listed = 0;
        for tab in CartTab::ALL {
            items_listed += self
                .populate_tab(system, cart_id, &sheet_id, tab, sentinel_branch)
                .await?;
        }
        self.populate_branch_tab(system, &sheet_id).await?;

        tracing::info!(%system, cart_id, sheet_id, items_listed, "shopping cart published");
        Ok(PublishedCart {
            cart_id,
            sheet_id,
            items_listed,
        })
    }

    /// One data tab: heading row per category (or language), item rows
    /// beneath it. Returns the number of items listed.
    async fn populate_tab(
        &self,
        system: SourceSystem,
        cart_id: i64,
        sheet_id: &str,
        tab: CartTab,
        sentinel_branch: i64,
    ) -> AppResult<usize> {
        let mut rows = vec![Self::header_row()];
        let mut listed = Vec::new();

        match tab.audience_code() {
            Some(audn_code) => {
                let audn_id = self
                    .repository
                    .codes
                    .audience_id_for_code(Some(audn_code))
                    .await?;
                let cats: Vec<MatCat> = self
                    .repository
                    .codes
                    .mat_cats_ordered(system, tab.order_column())
                    .await?;
                for cat in cats {
                    let items = self
                        .repository
                        .items
                        .for_category(system, audn_id, cat.rid, "eng")
                        .await?;
                    if items.is_empty() {
                        continue;
                    }
                    rows.push(vec![cat.label.clone()]);
                    for item in items {
                        rows.push(Self::item_row(system, &item));
                        listed.push(item);
                    }
                }
            }
            None => {
                let langs = self.repository.codes.languages_with_items(system).await?;
                for lang in langs {
                    let Some(code) = lang.code else { continue };
                    let items = self.repository.items.for_language(system, &code).await?;
                    if items.is_empty() {
                        continue;
                    }
                    rows.push(vec![lang.label.clone()]);
                    for item in items {
                        rows.push(Self::item_row(system, &item));
                        listed.push(item);
                    }
                }
            }
        }

        if listed.is_empty() {
            return Ok(0);
        }

        self.sheets.append_rows(sheet_id, tab.title(), rows).await?;
        for item in &listed {
            self.repository.items.assign_cart(item.rid, cart_id).await?;
            self.repository
                .carts
                .insert_hold(cart_id, item.item_id, sentinel_branch)
                .await?;
        }
        Ok(listed.len())
    }

    /// Validation list staff pick destination codes from
    async fn populate_branch_tab(&self, system: SourceSystem, sheet_id: &str) -> AppResult<()> {
        let branches = self.repository.codes.branches(system).await?;
        let rows: Vec<Vec<String>> = branches
            .into_iter()
            .filter_map(|b| b.code)
            .map(|code| vec![code])
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        self.sheets.append_rows(sheet_id, BRANCH_CODES_TAB, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sheets::MockSheetService;
    use crate::testutil;

    #[tokio::test]
    async fn cart_lists_uncarted_items_and_opens_holds() {
        let pool = testutil::test_pool().await;
        testutil::add_branch(&pool, SourceSystem::Nyp, "14", "Mid-Manhattan").await;
        testutil::add_item(
            &pool,
            SourceSystem::Nyp,
            21800029,
            37102791,
            "The clocks",
            "a",
            "my",
            "eng",
            "14",
        )
        .await;
        let repository = Repository::new(pool.clone());

        let mut sheets = MockSheetService::new();
        sheets
            .expect_create_spreadsheet()
            .withf(|_, tabs| tabs.len() == 5)
            .returning(|_, _| Ok("sheet-1".to_string()));
        sheets.expect_move_to_folder().returning(|_, _| Ok(()));
        // Adults data plus the branch-code list; empty tabs are not appended
        sheets
            .expect_append_rows()
            .times(2)
            .returning(|_, _, _| Ok(()));

        let service =
            CartService::new(repository.clone(), Arc::new(sheets), "folder-1".to_string());
        let published = service.create_cart(SourceSystem::Nyp).await.expect("cart");

        assert_eq!(published.sheet_id, "sheet-1");
        assert_eq!(published.items_listed, 1);

        let open = repository
            .carts
            .open_hold_for_item(37102791)
            .await
            .expect("query");
        assert!(open.is_some());

        let (carted,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM overflow_item WHERE cart_id IS NOT NULL")
                .fetch_one(&pool)
                .await
                .expect("count");
        assert_eq!(carted, 1);
    }

    #[tokio::test]
    async fn item_row_links_to_the_staff_catalog() {
        let row = CartRow {
            rid: 1,
            bib_id: 21800029,
            item_id: 37102791,
            title: Some("The clocks".to_string()),
            author: Some("Christie, Agatha".to_string()),
            call_no: Some("MYSTERY CHRISTIE".to_string()),
            pub_date: Some("1963".to_string()),
        };
        let cells = CartService::item_row(SourceSystem::Nyp, &row);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[ITEM_ID_COLUMN], "37102791");
        assert!(cells[5].contains("ilsstaff.nypl.org/record=b21800029"));
    }
}
