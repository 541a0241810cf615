//! Export file readers
//!
//! Each source system ships a different flat-file layout; the layout struct
//! carries the delimiter, quoting rule and column positions so the rest of
//! the pipeline never indexes a record directly. Rows stream lazily and a
//! short row degrades to empty fields instead of failing the run.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::AppResult;

use super::SourceSystem;

/// Column positions within one export layout.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub bib_id: usize,
    pub bib_created_date: usize,
    pub title: usize,
    pub author: usize,
    pub pub_info: usize,
    pub call_no: usize,
    pub item_id: usize,
    pub item_created_date: usize,
    pub location: usize,
    pub item_type: usize,
    pub opac_msg: Option<usize>,
    pub last_out_date: Option<usize>,
    pub total_checkouts: usize,
    pub total_renewals: usize,
}

/// Per-system export format description.
///
/// Offsets into the location string are configuration rather than code:
/// source revisions of these exports have disagreed about where the shelf
/// sub-code starts, so the layout owns the numbers.
#[derive(Debug, Clone, Copy)]
pub struct ExportLayout {
    pub delimiter: u8,
    pub quote: Option<u8>,
    pub columns: usize,
    pub audience_offset: usize,
    pub shelf_offset: usize,
    pub map: ColumnMap,
}

impl ExportLayout {
    /// BKL: pipe-delimited, double-quote qualified, 14 columns.
    pub fn bkl() -> Self {
        Self {
            delimiter: b'|',
            quote: Some(b'"'),
            columns: 14,
            audience_offset: 2,
            shelf_offset: 3,
            map: ColumnMap {
                bib_id: 0,
                bib_created_date: 1,
                title: 2,
                author: 3,
                pub_info: 4,
                call_no: 5,
                item_id: 6,
                item_created_date: 7,
                location: 8,
                item_type: 9,
                opac_msg: Some(10),
                last_out_date: Some(11),
                total_checkouts: 12,
                total_renewals: 13,
            },
        }
    }

    /// NYP: caret-delimited, unquoted, 12 columns; no OPAC message and no
    /// last-checkout column, item fields grouped after the bib fields.
    pub fn nyp() -> Self {
        Self {
            delimiter: b'^',
            quote: None,
            columns: 12,
            audience_offset: 2,
            shelf_offset: 3,
            map: ColumnMap {
                bib_id: 0,
                item_id: 1,
                bib_created_date: 2,
                item_created_date: 3,
                title: 4,
                author: 5,
                call_no: 6,
                pub_info: 7,
                location: 8,
                item_type: 9,
                opac_msg: None,
                last_out_date: None,
                total_checkouts: 10,
                total_renewals: 11,
            },
        }
    }

    pub fn for_system(system: SourceSystem) -> Self {
        match system {
            SourceSystem::Bkl => Self::bkl(),
            SourceSystem::Nyp => Self::nyp(),
        }
    }
}

/// One export row with fields already pulled into their logical positions.
/// Consumed immediately by the pipeline and dropped; never retained.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub bib_id: String,
    pub bib_created_date: String,
    pub title: String,
    pub author: String,
    pub pub_info: String,
    pub call_no: String,
    pub item_id: String,
    pub item_created_date: String,
    pub location: String,
    pub item_type: String,
    pub opac_msg: Option<String>,
    pub last_out_date: Option<String>,
    pub total_checkouts: String,
    pub total_renewals: String,
}

impl RawRow {
    fn from_record(record: &StringRecord, map: &ColumnMap) -> Self {
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let opt_field = |i: Option<usize>| i.and_then(|i| record.get(i)).map(str::to_string);
        Self {
            bib_id: field(map.bib_id),
            bib_created_date: field(map.bib_created_date),
            title: field(map.title),
            author: field(map.author),
            pub_info: field(map.pub_info),
            call_no: field(map.call_no),
            item_id: field(map.item_id),
            item_created_date: field(map.item_created_date),
            location: field(map.location),
            item_type: field(map.item_type),
            opac_msg: opt_field(map.opac_msg),
            last_out_date: opt_field(map.last_out_date),
            total_checkouts: field(map.total_checkouts),
            total_renewals: field(map.total_renewals),
        }
    }
}

/// Streaming reader over one export file. The header row is consumed by the
/// csv reader and never yielded.
pub struct ExportReader {
    inner: csv::Reader<File>,
    layout: ExportLayout,
}

impl ExportReader {
    pub fn open(path: &Path, layout: ExportLayout) -> AppResult<Self> {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(layout.delimiter)
            .has_headers(true)
            .flexible(true);
        match layout.quote {
            Some(q) => builder.quote(q),
            None => builder.quoting(false),
        };
        let inner = builder.from_path(path)?;
        Ok(Self { inner, layout })
    }

    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }
}

impl Iterator for ExportReader {
    type Item = AppResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.inner.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => Some(Ok(RawRow::from_record(&record, &self.layout.map))),
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(content.as_bytes()).expect("write fixture");
        f
    }

    #[test]
    fn bkl_reader_skips_header_and_maps_columns() {
        let f = write_export(concat!(
            "RECORD #(BIBLIO)|CREATED(BIBLIO)|TITLE|AUTHOR|PUBLISHER|CALL #|",
            "RECORD #(ITEM)|CREATED(ITEM)|LOCATION|I TYPE|OPACMSG|LOUTDATE|TOT CHKOUT|TOT RENEW\n",
            "\"b218000297\"|\"03-02-2019 11:37\"|\"Becoming / Michelle Obama.\"|\"Obama, Michelle, author.\"|",
            "\"New York : Crown, 2018.\"|\"B OBAMA O\"|\"i371027913\"|\"03-04-2019 09:00\"|\"02abi\"|\"55\"|\"t\"|",
            "\"01-15-2020 14:02\"|\"23\"|\"4\"\n",
        ));
        let rows: Vec<RawRow> = ExportReader::open(f.path(), ExportLayout::bkl())
            .expect("open")
            .map(|r| r.expect("row"))
            .collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.bib_id, "b218000297");
        assert_eq!(row.call_no, "B OBAMA O");
        assert_eq!(row.location, "02abi");
        assert_eq!(row.opac_msg.as_deref(), Some("t"));
        assert_eq!(row.total_renewals, "4");
    }

    #[test]
    fn nyp_reader_handles_caret_layout() {
        let f = write_export(concat!(
            "BIB^ITEM^BCREATED^ICREATED^TITLE^AUTHOR^CALL^PUB^LOCATION^ITYPE^CHKOUT^RENEW\n",
            "b218000297^i371027913^03-02-2019 11:37^03-04-2019 09:00^Some title^",
            "Adams, Jane^MYSTERY ADAMS^New York : Crown, 2018.^14amy^101^7^0\n",
        ));
        let rows: Vec<RawRow> = ExportReader::open(f.path(), ExportLayout::nyp())
            .expect("open")
            .map(|r| r.expect("row"))
            .collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.item_id, "i371027913");
        assert_eq!(row.call_no, "MYSTERY ADAMS");
        assert_eq!(row.opac_msg, None);
        assert_eq!(row.last_out_date, None);
    }

    #[test]
    fn short_rows_degrade_to_empty_fields() {
        let f = write_export("H1^H2^H3^H4^H5^H6^H7^H8^H9^H10^H11^H12\nb123456789^i987654321\n");
        let rows: Vec<RawRow> = ExportReader::open(f.path(), ExportLayout::nyp())
            .expect("open")
            .map(|r| r.expect("row"))
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bib_id, "b123456789");
        assert_eq!(rows[0].call_no, "");
        assert_eq!(rows[0].total_renewals, "");
    }
}
