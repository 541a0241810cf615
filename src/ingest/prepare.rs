//! Field preparers
//!
//! Pure cleanup of single raw export fields, independent of classification.
//! Every function is total: malformed input degrades to `None` (or a typed
//! default), never an error.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Linked-field marker some vendor records prefix titles/authors with.
const LINKED_FIELD_MARKER: &str = "880-";

static PUB_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("pub year pattern"));

/// Truncate to at most `max` characters without splitting a char.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Extract the numeric part of an ILS record number, dropping the one-letter
/// type prefix and the trailing check digit.
///
/// `prep_record_id(Some("b218000297")) == Some(21800029)`
pub fn prep_record_id(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    if raw.len() < 3 {
        return None;
    }
    raw.get(1..raw.len() - 1)?.parse().ok()
}

/// Normalize a title: strip the linked-field marker, drop the statement of
/// responsibility after the last `" / "`, cap at the storage limit.
pub fn prep_title(raw: &str) -> String {
    let mut title = raw.trim();
    if title.starts_with(LINKED_FIELD_MARKER) {
        // marker plus its 3-character occurrence tag
        title = title.get(7..).unwrap_or("");
    }
    if let Some(idx) = title.rfind(" / ") {
        title = &title[..idx];
    }
    truncate_chars(title, 200).to_string()
}

/// Normalize an author statement: strip the linked-field marker, remove role
/// words, trim trailing punctuation. Empty results become `None`.
pub fn prep_author(raw: &str) -> Option<String> {
    const ROLES: [&str; 3] = ["author", "artist", "illustrator"];

    let mut author = raw.trim().to_string();
    if author.starts_with(LINKED_FIELD_MARKER) {
        author = author.chars().skip(7).collect();
    }
    for role in ROLES {
        author = author.replace(role, "").trim().to_string();
    }
    loop {
        match author.chars().last() {
            Some(',') | Some('.') => {
                author.pop();
                author = author.trim_end().to_string();
            }
            Some(_) => break,
            None => return None,
        }
    }
    Some(truncate_chars(&author, 150).to_string())
}

/// First 4-consecutive-digit run in free-text publication info, kept as a
/// raw year token.
pub fn parse_pub_date(pub_info: Option<&str>) -> Option<String> {
    let pub_info = pub_info?;
    PUB_YEAR.find(pub_info).map(|m| m.as_str().to_string())
}

/// Parse the leading `MM-DD-YYYY` of an export date-time string.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    let head = truncate_chars(raw, 10);
    NaiveDate::parse_from_str(head, "%m-%d-%Y").ok()
}

/// Checkout/renewal counter; anything non-numeric counts as zero.
pub fn parse_count(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Shelving sub-code: the location string past the branch and audience
/// characters. Short or blank locations carry no shelf code.
pub fn parse_shelfcode(location: &str, offset: usize) -> Option<String> {
    let code: String = location.chars().skip(offset).collect();
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_strips_prefix_and_check_digit() {
        assert_eq!(prep_record_id(Some("b218000297")), Some(21800029));
        assert_eq!(prep_record_id(Some("i371027913")), Some(37102791));
    }

    #[test]
    fn record_id_handles_missing_and_garbage() {
        assert_eq!(prep_record_id(None), None);
        assert_eq!(prep_record_id(Some("some string")), None);
        assert_eq!(prep_record_id(Some("b1")), None);
    }

    #[test]
    fn title_keeps_clean_input() {
        assert_eq!(prep_title("Test title"), "Test title");
    }

    #[test]
    fn title_drops_linked_field_marker() {
        assert_eq!(prep_title("880-02 Bian cheng /"), "Bian cheng /");
    }

    #[test]
    fn title_drops_statement_of_responsibility() {
        assert_eq!(
            prep_title("The whole art of detection / Lyndsay Faye."),
            "The whole art of detection"
        );
    }

    #[test]
    fn title_truncates_at_storage_limit() {
        let long = "Test title".repeat(200);
        assert_eq!(prep_title(&long).chars().count(), 200);
    }

    #[test]
    fn author_strips_roles_and_trailing_punctuation() {
        assert_eq!(
            prep_author("Denning, G. S. (Gabriel), author.").as_deref(),
            Some("Denning, G. S. (Gabriel)")
        );
    }

    #[test]
    fn author_empty_becomes_none() {
        assert_eq!(prep_author(""), None);
        assert_eq!(prep_author("  ,. "), None);
    }

    #[test]
    fn pub_date_finds_first_year_run() {
        assert_eq!(
            parse_pub_date(Some("New York : Thomas Dunne Books, 2017.")).as_deref(),
            Some("2017")
        );
        assert_eq!(
            parse_pub_date(Some("New York : New York University, [2018]")).as_deref(),
            Some("2018")
        );
        assert_eq!(
            parse_pub_date(Some(
                "Indianapolis, Indiana : John Wiley & Sons, Inc., [2017]\"~\"©2018\""
            ))
            .as_deref(),
            Some("2017")
        );
    }

    #[test]
    fn pub_date_missing_year() {
        assert_eq!(parse_pub_date(Some("Wyandanch, NY : Urban Books")), None);
        assert_eq!(parse_pub_date(None), None);
    }

    #[test]
    fn date_parses_leading_ten_chars() {
        assert_eq!(
            parse_date(Some("03-02-2019 11:37")),
            NaiveDate::from_ymd_opt(2019, 3, 2)
        );
    }

    #[test]
    fn date_rejects_other_formats() {
        assert_eq!(parse_date(Some("2019-03-02")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count("17"), 17);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
    }

    #[test]
    fn shelfcode_reads_location_suffix() {
        assert_eq!(parse_shelfcode("14amy", 3).as_deref(), Some("my"));
        assert_eq!(parse_shelfcode("02jfc ", 3).as_deref(), Some("fc"));
        assert_eq!(parse_shelfcode("14a", 3), None);
        assert_eq!(parse_shelfcode("", 3), None);
    }
}
