//! Ingestion pipeline
//!
//! Streams one export file into the store: one pass, file order, one
//! transaction per run. Field problems degrade per-field; a row missing a
//! usable bib or item record number is skipped and counted; a storage fault
//! aborts and rolls back the whole run.

use std::path::Path;

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::NewOverflowItem,
    repository::{codes, items},
};

use super::{
    classify::{
        resolve_audience, resolve_branch, resolve_item_type, resolve_language, resolve_mat_cat,
    },
    index::CodeIndex,
    prepare::{
        parse_count, parse_date, parse_pub_date, parse_shelfcode, prep_author, prep_record_id,
        prep_title,
    },
    reader::{ExportLayout, ExportReader, RawRow},
    SourceSystem,
};

/// Outcome of one ingest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub new_shelf_codes: usize,
}

/// Cross-row state for one run: the code indexes, owned by the run and
/// never shared.
struct RunIndexes {
    branch: CodeIndex,
    mat_cat: CodeIndex,
    audience: CodeIndex,
    language: CodeIndex,
    item_type: CodeIndex,
}

impl RunIndexes {
    async fn load(conn: &mut SqliteConnection, system: SourceSystem) -> AppResult<Self> {
        Ok(Self {
            branch: codes::branch_idx(conn, system).await?,
            mat_cat: codes::mat_cat_idx(conn, system).await?,
            audience: codes::audience_idx(conn).await?,
            language: codes::language_idx(conn).await?,
            item_type: codes::item_type_idx(conn, system).await?,
        })
    }
}

pub struct Ingester {
    pool: Pool<Sqlite>,
    system: SourceSystem,
    layout: ExportLayout,
}

impl Ingester {
    pub fn new(pool: Pool<Sqlite>, system: SourceSystem) -> Self {
        Self {
            pool,
            system,
            layout: ExportLayout::for_system(system),
        }
    }

    /// Layout override for export variants whose location offsets differ
    /// from the current defaults.
    pub fn with_layout(mut self, layout: ExportLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Ingest one export file. All inserts happen inside a single
    /// transaction; an error rolls the run back and leaves the store
    /// untouched.
    pub async fn ingest_file(&self, path: &Path) -> AppResult<IngestReport> {
        let reader = ExportReader::open(path, self.layout)?;
        let mut tx = self.pool.begin().await?;
        let indexes = RunIndexes::load(&mut tx, self.system).await?;

        let mut report = IngestReport::default();
        let shelf_codes_before = self.count_shelf_codes(&mut tx).await?;

        for row in reader {
            let row = row?;
            report.rows_read += 1;
            match self.normalize(&mut tx, &indexes, &row).await? {
                Some(item) => {
                    items::insert_overflow_item(&mut tx, &item).await?;
                    report.rows_inserted += 1;
                }
                None => {
                    tracing::warn!(
                        bib_id = %row.bib_id,
                        item_id = %row.item_id,
                        "skipping row without usable record numbers"
                    );
                    report.rows_skipped += 1;
                }
            }
        }

        report.new_shelf_codes =
            (self.count_shelf_codes(&mut tx).await? - shelf_codes_before) as usize;
        tx.commit().await?;

        tracing::info!(
            system = %self.system,
            rows_read = report.rows_read,
            rows_inserted = report.rows_inserted,
            rows_skipped = report.rows_skipped,
            new_shelf_codes = report.new_shelf_codes,
            "ingest run complete"
        );
        Ok(report)
    }

    async fn count_shelf_codes(&self, conn: &mut SqliteConnection) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM shelf_code WHERE system_id = ?")
                .bind(self.system.id())
                .fetch_one(conn)
                .await?;
        Ok(count)
    }

    /// Compose preparers, classifier and index resolution for one row.
    /// Returns `None` when the row has no usable record numbers.
    async fn normalize(
        &self,
        conn: &mut SqliteConnection,
        indexes: &RunIndexes,
        row: &RawRow,
    ) -> AppResult<Option<NewOverflowItem>> {
        let (bib_id, item_id) = match (
            prep_record_id(Some(&row.bib_id)),
            prep_record_id(Some(&row.item_id)),
        ) {
            (Some(b), Some(i)) => (b, i),
            _ => return Ok(None),
        };

        let shelfcode = parse_shelfcode(&row.location, self.layout.shelf_offset);
        let src_shelf_id =
            codes::resolve_or_create_shelf_code(conn, self.system, shelfcode.as_deref()).await?;

        let item = NewOverflowItem {
            system_id: self.system.id(),
            bib_id,
            item_id,
            title: Some(prep_title(&row.title)),
            author: prep_author(&row.author),
            call_no: Some(row.call_no.trim().to_string()),
            src_branch_id: required(
                resolve_branch(&row.location, &indexes.branch),
                "branch sentinel",
            )?,
            src_shelf_id,
            pub_date: parse_pub_date(Some(&row.pub_info)),
            bib_created_date: parse_date(Some(&row.bib_created_date)),
            item_created_date: parse_date(Some(&row.item_created_date)),
            mat_cat_id: required(
                resolve_mat_cat(
                    self.system,
                    &row.call_no,
                    &row.location,
                    row.opac_msg.as_deref(),
                    self.layout.shelf_offset,
                    &indexes.mat_cat,
                ),
                "material category sentinel",
            )?,
            audn_id: required(
                resolve_audience(&row.location, self.layout.audience_offset, &indexes.audience),
                "audience sentinel",
            )?,
            lang_id: required(
                resolve_language(&row.call_no, &indexes.language),
                "language default",
            )?,
            item_type_id: required(
                resolve_item_type(&row.item_type, &indexes.item_type),
                "item type default",
            )?,
            last_out_date: parse_date(row.last_out_date.as_deref()),
            total_checkouts: parse_count(&row.total_checkouts),
            total_renewals: parse_count(&row.total_renewals),
        };
        Ok(Some(item))
    }
}

/// A missing resolution here means the store was never seeded; that is a
/// setup fault, not a data problem.
fn required(id: Option<i64>, what: &str) -> AppResult<i64> {
    id.ok_or_else(|| AppError::Internal(format!("store not seeded: missing {what}")))
}
