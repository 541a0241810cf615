//! Export ingestion and classification
//!
//! Turns a raw ILS export row into a normalized overflow-item record: field
//! preparers clean individual values, the classifier deduces material
//! category / audience / language / shelf code, and the pipeline resolves
//! everything against the persisted code tables.

pub mod classify;
pub mod index;
pub mod pipeline;
pub mod prepare;
pub mod reader;

pub use index::CodeIndex;
pub use pipeline::{IngestReport, Ingester};
pub use reader::{ExportLayout, ExportReader, RawRow};

use serde::{Deserialize, Serialize};

/// The two ILS export conventions the tool understands.
///
/// The numeric value is the seeded `system.rid` in the store; every
/// system-scoped code table (branches, shelf codes, item types, material
/// categories) is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum SourceSystem {
    /// Brooklyn — OPAC-message-first categorization, pipe-delimited export
    Bkl,
    /// New York — call-number-pattern categorization, caret-delimited export
    Nyp,
}

impl SourceSystem {
    pub fn id(&self) -> i64 {
        match self {
            SourceSystem::Bkl => 1,
            SourceSystem::Nyp => 2,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(SourceSystem::Bkl),
            2 => Some(SourceSystem::Nyp),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SourceSystem::Bkl => "BKL",
            SourceSystem::Nyp => "NYP",
        }
    }

    /// Staff-facing catalog URL prefix used for hyperlinks in cart sheets
    pub fn catalog_url(&self) -> &'static str {
        match self {
            SourceSystem::Bkl => "http://iii.brooklynpubliclibrary.org/record=b",
            SourceSystem::Nyp => "http://ilsstaff.nypl.org/record=b",
        }
    }
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
