//! Code table seeds
//!
//! Pre-seeded enumerations the classifier resolves against. Inserts are
//! `OR IGNORE` so re-running `init-store` against an existing store is
//! harmless. Branches come from an operator-maintained JSON file instead
//! of a built-in list; only the per-system sentinel rows are seeded here.

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    ingest::SourceSystem,
    models::codes::BranchSeed,
};

const AUDIENCES: [(Option<&str>, &str); 4] = [
    (None, "Error"),
    (Some("a"), "Adult"),
    (Some("j"), "Juvenile"),
    (Some("y"), "Young adult"),
];

const LANGUAGES: [(Option<&str>, &str); 25] = [
    (None, "Error"),
    (Some("ara"), "Arabic"),
    (Some("ben"), "Bengali"),
    (Some("chi"), "Chinese"),
    (Some("eng"), "English"),
    (Some("fre"), "French"),
    (Some("ger"), "German"),
    (Some("heb"), "Hebrew"),
    (Some("hin"), "Hindi"),
    (Some("hun"), "Hungarian"),
    (Some("ita"), "Italian"),
    (Some("jpn"), "Japanese"),
    (Some("kor"), "Korean"),
    (Some("pan"), "Panjabi"),
    (Some("pol"), "Polish"),
    (Some("por"), "Portuguese"),
    (Some("rus"), "Russian"),
    (Some("san"), "Sanskrit"),
    (Some("spa"), "Spanish"),
    (Some("ukr"), "Ukrainian"),
    (Some("und"), "Undetermined"),
    (Some("urd"), "Urdu"),
    (Some("yid"), "Yiddish"),
    (Some("hat"), "Haitian French Creole"),
    (Some("alb"), "Albanian"),
];

const STATUSES: [(Option<&str>, &str); 30] = [
    (None, "error"),
    (Some("-"), "available"),
    (Some("i"), "at bindery"),
    (Some("f"), "being filmed"),
    (Some("n"), "billed"),
    (Some("k"), "check w/staff"),
    (Some("c"), "closed branch"),
    (Some("d"), "damaged"),
    (Some("z"), "disputed item"),
    (Some("s"), "en route"),
    (Some("%"), "ILL returned"),
    (Some("t"), "in transit"),
    (Some("$"), "lost and paid"),
    (Some("l"), "lost inventory"),
    (Some("m"), "missing"),
    (Some("x"), "MML request"),
    (Some("b"), "new-in process"),
    (Some("p"), "non-circulating"),
    (Some("e"), "on exhibit"),
    (Some("!"), "on holdshelf"),
    (Some("j"), "overflow"),
    (Some("h"), "phone request"),
    (Some("v"), "preservation"),
    (Some("y"), "staff outreach"),
    (Some("~"), "staff use"),
    (Some("g"), "storage"),
    (Some("u"), "temporarily unavailable"),
    (Some("o"), "use in library"),
    (Some("w"), "withdrawn"),
    (Some("r"), "repair"),
];

struct CatSeed {
    code: Option<&'static str>,
    label: &'static str,
    adult: Option<i64>,
    teen: Option<i64>,
    kids: Option<i64>,
}

const fn cat(
    code: Option<&'static str>,
    label: &'static str,
    adult: Option<i64>,
    teen: Option<i64>,
    kids: Option<i64>,
) -> CatSeed {
    CatSeed {
        code,
        label,
        adult,
        teen,
        kids,
    }
}

/// Categories both systems shelve
const SHARED_CATS: [CatSeed; 25] = [
    cat(None, "Unidentified", None, None, None),
    cat(Some("fi"), "General Fiction", Some(1), Some(1), None),
    cat(Some("my"), "Mystery Fiction", Some(2), Some(2), None),
    cat(Some("sf"), "Sci-fi Fiction", Some(3), Some(3), None),
    cat(Some("rm"), "Romance Fiction", Some(4), None, None),
    cat(Some("gn"), "Graphic Novels", Some(5), Some(4), Some(5)),
    cat(Some("lp"), "Large Print", Some(6), None, None),
    cat(Some("bi"), "Biography", Some(7), Some(5), Some(6)),
    cat(Some("pi"), "Picture Books", None, None, Some(1)),
    cat(Some("er"), "Easy Readers", None, None, Some(2)),
    cat(Some("yr"), "Young Readers", None, None, Some(3)),
    cat(Some("d0"), "Dewey 0xx", Some(8), Some(6), Some(7)),
    cat(Some("d1"), "Dewey 1xx", Some(9), Some(7), Some(8)),
    cat(Some("d2"), "Dewey 2xx", Some(10), Some(8), Some(9)),
    cat(Some("d3"), "Dewey 3xx", Some(11), Some(9), Some(10)),
    cat(Some("d4"), "Dewey 4xx", Some(12), Some(10), Some(11)),
    cat(Some("d5"), "Dewey 5xx", Some(13), Some(11), Some(12)),
    cat(Some("d6"), "Dewey 6xx", Some(14), Some(12), Some(13)),
    cat(Some("d7"), "Dewey 7xx", Some(15), Some(13), Some(14)),
    cat(Some("d8"), "Dewey 8xx", Some(16), Some(14), Some(15)),
    cat(Some("d9"), "Dewey 9xx", Some(17), Some(15), Some(16)),
    cat(Some("dv"), "DVD", Some(18), Some(16), Some(17)),
    cat(Some("cd"), "CD", Some(19), Some(17), Some(18)),
    cat(Some("pe"), "Periodicals", None, None, None),
    cat(Some("ho"), "Holiday Picture Books", None, None, Some(4)),
];

/// BKL-only vocabulary (reachable through the OPAC message map)
const BKL_CATS: [CatSeed; 2] = [
    cat(Some("st"), "Short Stories", Some(20), None, None),
    cat(Some("hi"), "History", Some(21), None, None),
];

/// NYP-only shelving vocabulary
const NYP_CATS: [CatSeed; 3] = [
    cat(Some("ur"), "Urban Fiction", Some(20), Some(18), None),
    cat(Some("we"), "Westerns", Some(21), None, None),
    cat(Some("cl"), "Classics", Some(22), Some(19), None),
];

/// Seed systems, audiences, languages, statuses, material categories and
/// the per-system sentinel branch / item-type / shelf-code rows.
pub async fn seed_store(pool: &Pool<Sqlite>) -> AppResult<()> {
    for system in [SourceSystem::Bkl, SourceSystem::Nyp] {
        sqlx::query("INSERT OR IGNORE INTO system (rid, code, label) VALUES (?, ?, ?)")
            .bind(system.id())
            .bind(system.code())
            .bind(match system {
                SourceSystem::Bkl => "Brooklyn Public Library",
                SourceSystem::Nyp => "New York Public Library",
            })
            .execute(pool)
            .await?;
    }

    for (code, label) in AUDIENCES {
        insert_code_row(pool, "audience", code, label).await?;
    }

    for (code, label) in LANGUAGES {
        insert_code_row(pool, "language", code, label).await?;
    }

    for (code, label) in STATUSES {
        insert_code_row(pool, "status", code, label).await?;
    }

    for system in [SourceSystem::Bkl, SourceSystem::Nyp] {
        let extra: &[CatSeed] = match system {
            SourceSystem::Bkl => &BKL_CATS,
            SourceSystem::Nyp => &NYP_CATS,
        };
        for seed in SHARED_CATS.iter().chain(extra) {
            insert_cat(pool, system, seed).await?;
        }

        // sentinel rows every run relies on; a NULL code never collides in
        // a UNIQUE constraint, so guard these explicitly
        sqlx::query(
            "INSERT INTO branch (system_id, code, label) SELECT ?, NULL, 'Unknown' \
             WHERE NOT EXISTS (SELECT 1 FROM branch WHERE system_id = ? AND code IS NULL)",
        )
        .bind(system.id())
        .bind(system.id())
        .execute(pool)
        .await?;
        sqlx::query("INSERT OR IGNORE INTO item_type (system_id, code) VALUES (?, '0')")
            .bind(system.id())
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Insert into a shared (unscoped) code table, skipping codes already
/// present. The table name is one of our own literals, never user input.
async fn insert_code_row(
    pool: &Pool<Sqlite>,
    table: &str,
    code: Option<&str>,
    label: &str,
) -> AppResult<()> {
    let query = format!(
        "INSERT INTO {table} (code, label) SELECT ?, ? \
         WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE code IS ?)"
    );
    sqlx::query(&query)
        .bind(code)
        .bind(label)
        .bind(code)
        .execute(pool)
        .await?;
    Ok(())
}

async fn insert_cat(pool: &Pool<Sqlite>, system: SourceSystem, seed: &CatSeed) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO mat_cat \
         (system_id, code, label, adult_order, teen_order, kids_order, wl_order) \
         SELECT ?, ?, ?, ?, ?, ?, NULL \
         WHERE NOT EXISTS (SELECT 1 FROM mat_cat WHERE system_id = ? AND code IS ?)",
    )
    .bind(system.id())
    .bind(seed.code)
    .bind(seed.label)
    .bind(seed.adult)
    .bind(seed.teen)
    .bind(seed.kids)
    .bind(system.id())
    .bind(seed.code)
    .execute(pool)
    .await?;
    Ok(())
}

/// Import branch records from a JSON file (`[{system, code, label}, ...]`).
pub async fn load_branches(pool: &Pool<Sqlite>, path: &std::path::Path) -> AppResult<usize> {
    let raw = std::fs::read_to_string(path)?;
    let seeds: Vec<BranchSeed> = serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("invalid branch file: {e}")))?;

    let mut loaded = 0;
    for seed in seeds {
        let system = match seed.system.as_str() {
            "BKL" => SourceSystem::Bkl,
            "NYP" => SourceSystem::Nyp,
            other => {
                return Err(AppError::BadRequest(format!("unknown system code: {other}")));
            }
        };
        let result = sqlx::query(
            "INSERT OR IGNORE INTO branch (system_id, code, label) VALUES (?, ?, ?)",
        )
        .bind(system.id())
        .bind(seed.code.to_lowercase())
        .bind(&seed.label)
        .execute(pool)
        .await?;
        loaded += result.rows_affected() as usize;
    }
    Ok(loaded)
}
