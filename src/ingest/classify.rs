//! Item classification
//!
//! Deduces material category, audience and language for one export row.
//! Material category is the hard part: call numbers are free text with no
//! grammar, so each system gets a cascading first-match-wins rule list.
//! List order is a contract — several patterns overlap (a bare `B` for
//! biography appears inside many call numbers) and specificity lives in the
//! ordering, not in the patterns themselves. Do not reorder.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use super::index::CodeIndex;
use super::prepare::parse_shelfcode;
use super::SourceSystem;

fn pattern(re: &str) -> Regex {
    RegexBuilder::new(re)
        .case_insensitive(true)
        .build()
        .expect("call number pattern")
}

/// NYP rule list: pure call-number matching, most specific first, Dewey
/// centuries last.
static NYP_CALL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("lp", pattern(r"LG[\s,-]PRINT\s")),
        ("ur", pattern(r"URBAN\s")),
        ("my", pattern(r"MYSTERY\s")),
        ("we", pattern(r"WESTERN\s")),
        ("cl", pattern(r"CLASSICS\s")),
        ("ho", pattern(r"J\sHOLIDAY\s")),
        ("sf", pattern(r"SCI FI\s|SCI-FI\s")),
        ("rm", pattern(r"ROMANCE\s")),
        ("gn", pattern(r"GN\sFIC")),
        ("pi", pattern(r"\sPIC\s")),
        ("er", pattern(r"J\sE\s")),
        ("yr", pattern(r"J\sYR\s")),
        ("fi", pattern(r"FIC\s")),
        ("bi", pattern(r"^B\s|\sB\s")),
        ("dv", pattern(r"^DVD\s|\sDVD\s")),
        ("cd", pattern(r"^CD\s")),
        ("d0", pattern(r"^0\d{2}|\s0\d{2}")),
        ("d1", pattern(r"^1\d{2}|\s1\d{2}")),
        ("d2", pattern(r"^2\d{2}|\s2\d{2}")),
        ("d3", pattern(r"^3\d{2}|\s3\d{2}")),
        ("d4", pattern(r"^4\d{2}|\s4\d{2}")),
        ("d5", pattern(r"^5\d{2}|\s5\d{2}")),
        ("d6", pattern(r"^6\d{2}|\s6\d{2}")),
        ("d7", pattern(r"^7\d{2}|\s7\d{2}")),
        ("d8", pattern(r"^8\d{2}|\s8\d{2}")),
        ("d9", pattern(r"^9\d{2}|\s9\d{2}")),
    ]
});

/// BKL rule list: only consulted after the OPAC message and shelf code
/// steps come up empty.
static BKL_CALL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("fi", pattern(r"FIC\s")),
        ("pi", pattern(r"\sJ-E\s|J-E$|^J-E")),
        ("d0", pattern(r"^0\d{2}|\s0\d{2}")),
        ("d1", pattern(r"^1\d{2}|\s1\d{2}")),
        ("d2", pattern(r"^2\d{2}|\s2\d{2}")),
        ("d3", pattern(r"^3\d{2}|\s3\d{2}")),
        ("d4", pattern(r"^4\d{2}|\s4\d{2}")),
        ("d5", pattern(r"^5\d{2}|\s5\d{2}")),
        ("d6", pattern(r"^6\d{2}|\s6\d{2}")),
        ("d7", pattern(r"^7\d{2}|\s7\d{2}")),
        ("d8", pattern(r"^8\d{2}|\s8\d{2}")),
        ("d9", pattern(r"^9\d{2}|\s9\d{2}")),
        ("bi", pattern(r"^B\s|\sB\s")),
    ]
});

/// BKL shelves genre in a single-character OPAC message; when present it is
/// authoritative.
fn bkl_opac_category(opac_msg: &str) -> Option<&'static str> {
    match opac_msg {
        "l" => Some("lp"),
        "n" => Some("rm"),
        "y" => Some("st"),
        "k" => Some("yr"),
        "e" => Some("er"),
        "u" => Some("gn"),
        "m" => Some("my"),
        "t" => Some("hi"),
        "s" => Some("sf"),
        _ => None,
    }
}

/// BKL shelf sub-codes that map straight to a category.
fn bkl_shelfcode_category(shelfcode: &str) -> Option<&'static str> {
    match shelfcode {
        "fc" | "pb" => Some("fi"),
        "sf" => Some("sf"),
        "my" => Some("my"),
        "lp" => Some("lp"),
        "je" => Some("pi"),
        "er" => Some("er"),
        "bi" => Some("bi"),
        "dv" => Some("dv"),
        "cd" => Some("cd"),
        _ => None,
    }
}

fn first_match(patterns: &[(&'static str, Regex)], call_no: &str) -> Option<&'static str> {
    patterns
        .iter()
        .find(|(_, re)| re.is_match(call_no))
        .map(|(code, _)| *code)
}

/// BKL material category: OPAC message first, then literal shelf sub-codes,
/// then the ordered call-number rule list.
pub fn bkl_mat_cat(
    call_no: &str,
    location: &str,
    opac_msg: Option<&str>,
    shelf_offset: usize,
) -> Option<&'static str> {
    if let Some(cat) = opac_msg.and_then(bkl_opac_category) {
        return Some(cat);
    }
    if let Some(shelfcode) = parse_shelfcode(location, shelf_offset) {
        if let Some(cat) = bkl_shelfcode_category(&shelfcode) {
            return Some(cat);
        }
    }
    first_match(&BKL_CALL_PATTERNS, call_no)
}

/// NYP material category: call-number rule list only.
pub fn nyp_mat_cat(call_no: &str) -> Option<&'static str> {
    first_match(&NYP_CALL_PATTERNS, call_no)
}

/// Material category id for a row, dispatched on source system and resolved
/// against the system-scoped category index. Unmatched call numbers land on
/// the sentinel entry.
pub fn resolve_mat_cat(
    system: SourceSystem,
    call_no: &str,
    location: &str,
    opac_msg: Option<&str>,
    shelf_offset: usize,
    mat_cat_idx: &CodeIndex,
) -> Option<i64> {
    let cat = match system {
        SourceSystem::Bkl => bkl_mat_cat(call_no, location, opac_msg, shelf_offset),
        SourceSystem::Nyp => nyp_mat_cat(call_no),
    };
    mat_cat_idx.resolve(cat)
}

/// Audience id from the single-character token inside the location code.
/// Missing or unrecognized tokens collapse into the sentinel bucket.
pub fn resolve_audience(location: &str, offset: usize, audn_idx: &CodeIndex) -> Option<i64> {
    let token = location.chars().nth(offset).map(|c| c.to_string());
    audn_idx.resolve(token.as_deref())
}

/// Language id from the call number. The call number is lower-cased with
/// hyphens treated as separators and scanned token-wise; the first language
/// code (in index order) present as a whole token wins. Records without a
/// language token are English.
pub fn resolve_language(call_no: &str, lang_idx: &CodeIndex) -> Option<i64> {
    let normalized = call_no.replace('-', " ").to_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    for code in lang_idx.codes() {
        if tokens.contains(&code) {
            return lang_idx.get(code);
        }
    }
    lang_idx.get("eng")
}

/// Branch id from the two-character location prefix, system-scoped.
pub fn resolve_branch(location: &str, branch_idx: &CodeIndex) -> Option<i64> {
    let code: String = location.chars().take(2).collect();
    let code = code.to_lowercase();
    if code.len() == 2 {
        branch_idx.resolve(Some(&code))
    } else {
        branch_idx.resolve(None)
    }
}

/// Item-type id; non-numeric or unseeded types fall back to the default
/// `0` entry.
pub fn resolve_item_type(item_type: &str, itemtype_idx: &CodeIndex) -> Option<i64> {
    let normalized = item_type
        .trim()
        .parse::<i64>()
        .map(|n| n.to_string())
        .unwrap_or_default();
    itemtype_idx
        .get(&normalized)
        .or_else(|| itemtype_idx.get("0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audn_idx() -> CodeIndex {
        CodeIndex::from_iter([(None, 1), (Some("a"), 2), (Some("j"), 3), (Some("y"), 4)])
    }

    fn lang_idx() -> CodeIndex {
        CodeIndex::from_iter([
            (None, 1),
            (Some("ara"), 2),
            (Some("chi"), 4),
            (Some("eng"), 5),
            (Some("spa"), 19),
        ])
    }

    #[test]
    fn audience_reads_third_location_char() {
        assert_eq!(resolve_audience("vca0n", 2, &audn_idx()), Some(2));
        assert_eq!(resolve_audience("saj0y", 2, &audn_idx()), Some(3));
        assert_eq!(resolve_audience("mpy0n", 2, &audn_idx()), Some(4));
    }

    #[test]
    fn audience_unknown_token_collapses_to_sentinel() {
        // '3' is not an audience token; short strings have no token at all
        assert_eq!(resolve_audience("mm3an", 2, &audn_idx()), Some(1));
        assert_eq!(resolve_audience("mm", 2, &audn_idx()), Some(1));
    }

    #[test]
    fn language_matches_whole_tokens_only() {
        assert_eq!(resolve_language("J-Spa 630.78 R", &lang_idx()), Some(19));
        assert_eq!(resolve_language("SPA GRAPHIC GN FIC KISHIMOTO", &lang_idx()), Some(19));
        assert_eq!(resolve_language("CHI FIC GALBRAITH", &lang_idx()), Some(4));
        assert_eq!(resolve_language("ARA J-E ADAMS", &lang_idx()), Some(2));
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(resolve_language("J PIC ANDERSON", &lang_idx()), Some(5));
    }

    #[test]
    fn nyp_general_fiction() {
        for call_no in [
            "CHI FIC JIQIU",
            "FIC ALCOTT",
            "FIC C",
            "HAT FIC JEAN PIERRE",
            "J FIC ANDRI SNAER MAGNASON",
            "J READALONG FIC BERNSTROM",
        ] {
            assert_eq!(nyp_mat_cat(call_no), Some("fi"), "{call_no}");
        }
    }

    #[test]
    fn nyp_classics_beat_fiction() {
        assert_eq!(nyp_mat_cat("CLASSICS FIC BRADBURY"), Some("cl"));
    }

    #[test]
    fn nyp_graphic_novels() {
        for call_no in [
            "GN FIC SHULZ",
            "GRAPHIC GN FIC DHALIWAL",
            "GRAPHIC GN FIC C",
            "JPN GRAPHIC GN FIC OTOMO",
            "Spa GN FIC L",
            "J GRAPHIC GN FIC HOLM",
        ] {
            assert_eq!(nyp_mat_cat(call_no), Some("gn"), "{call_no}");
        }
    }

    #[test]
    fn nyp_biography() {
        for call_no in [
            "GRAPHIC B DAHMER D",
            "FRE B BUFFET PICABIA B",
            "RUS B VOLCHEK R",
            "B FRANCIS M",
            "J B Adams M",
        ] {
            assert_eq!(nyp_mat_cat(call_no), Some("bi"), "{call_no}");
        }
    }

    #[test]
    fn nyp_large_print_beats_everything() {
        for call_no in [
            "LG PRINT 362.14 B",
            "LG PRINT B CHARLES S",
            "LG PRINT FIC CUSSLER",
            "LG PRINT SCI FI ABRAHAM",
            "LG-PRINT FIC BRADBURY",
            "LG-PRINT MYSTERY CANADEO",
            "J LG PRINT FIC APPLEGATE",
        ] {
            assert_eq!(nyp_mat_cat(call_no), Some("lp"), "{call_no}");
        }
    }

    #[test]
    fn nyp_genre_shelves() {
        assert_eq!(nyp_mat_cat("MYSTERY ADAMS"), Some("my"));
        assert_eq!(nyp_mat_cat("ROMANCE B"), Some("rm"));
        assert_eq!(nyp_mat_cat("ROMANCE AUSTIN"), Some("rm"));
        assert_eq!(nyp_mat_cat("SCI FI COREY"), Some("sf"));
        assert_eq!(nyp_mat_cat("URBAN ARMSTEAD"), Some("ur"));
        assert_eq!(nyp_mat_cat("URBAN B"), Some("ur"));
        assert_eq!(nyp_mat_cat("WESTERN BRYANT"), Some("we"));
    }

    #[test]
    fn nyp_dewey_centuries() {
        assert_eq!(nyp_mat_cat("RUS 080.9 D"), Some("d0"));
        assert_eq!(nyp_mat_cat("005.1 G"), Some("d0"));
        assert_eq!(nyp_mat_cat("J 005.1 S"), Some("d0"));
        assert_eq!(nyp_mat_cat("RUS 153.42 M"), Some("d1"));
        assert_eq!(nyp_mat_cat("RUS 299.792 RUIZ, MIGUE"), Some("d2"));
        assert_eq!(nyp_mat_cat("RUS 345.07 K"), Some("d3"));
        assert_eq!(nyp_mat_cat("RUS 428.5 BONK, N A"), Some("d4"));
        assert_eq!(nyp_mat_cat("RUS 508.4955 DURRELL, GE"), Some("d5"));
        assert_eq!(nyp_mat_cat("J READALONG 597.95 S"), Some("d5"));
        assert_eq!(nyp_mat_cat("RUS 616.8 S"), Some("d6"));
        assert_eq!(nyp_mat_cat("J 641.51 S"), Some("d6"));
        assert_eq!(nyp_mat_cat("RUS 782.85 O"), Some("d7"));
        assert_eq!(nyp_mat_cat("RUS 818 SAROYAN, WI"), Some("d8"));
        assert_eq!(nyp_mat_cat("811 Forman"), Some("d8"));
        assert_eq!(nyp_mat_cat("818 HUGHES R~\"pjl CATBL\""), Some("d8"));
        assert_eq!(nyp_mat_cat("822.33-H P"), Some("d8"));
        assert_eq!(nyp_mat_cat("RUS 943.086 S"), Some("d9"));
    }

    #[test]
    fn nyp_graphic_format_nonfiction_stays_dewey() {
        // "GRAPHIC" alone is not a graphic novel; gn requires "GN FIC"
        assert_eq!(nyp_mat_cat("GRAPHIC 817 PATTERSON"), Some("d8"));
        assert_eq!(nyp_mat_cat("GRAPHIC 306.768 KAYE"), Some("d3"));
        assert_eq!(nyp_mat_cat("J GRAPHIC 560.17 H"), Some("d5"));
    }

    #[test]
    fn nyp_juvenile_shelves() {
        assert_eq!(nyp_mat_cat("J E B"), Some("er"));
        assert_eq!(nyp_mat_cat("J E CARLE"), Some("er"));
        assert_eq!(nyp_mat_cat("J FRE PIC ANTONY"), Some("pi"));
        assert_eq!(nyp_mat_cat("J PIC A"), Some("pi"));
        assert_eq!(nyp_mat_cat("J HOLIDAY PIC B"), Some("ho"));
        assert_eq!(nyp_mat_cat("J YR FIC A"), Some("yr"));
    }

    #[test]
    fn nyp_media() {
        assert_eq!(nyp_mat_cat("J FRE DVD TV ATCHOUM"), Some("dv"));
    }

    #[test]
    fn nyp_unclassifiable() {
        assert_eq!(nyp_mat_cat("PER"), None);
        assert_eq!(nyp_mat_cat("J PER"), None);
        assert_eq!(nyp_mat_cat(""), None);
    }

    #[test]
    fn bkl_opac_message_wins() {
        assert_eq!(bkl_mat_cat("FIC ADAMS", "02afi", Some("m"), 3), Some("my"));
        assert_eq!(bkl_mat_cat("741.5 K", "41jgn", Some("u"), 3), Some("gn"));
    }

    #[test]
    fn bkl_shelfcode_consulted_next() {
        assert_eq!(bkl_mat_cat("ADAMS", "02afc", None, 3), Some("fi"));
        assert_eq!(bkl_mat_cat("ADAMS", "02jje", None, 3), Some("pi"));
        assert_eq!(bkl_mat_cat("ADAMS", "02acd", None, 3), Some("cd"));
    }

    #[test]
    fn bkl_falls_back_to_call_number() {
        assert_eq!(bkl_mat_cat("FIC GALBRAITH", "02a0n", None, 3), Some("fi"));
        assert_eq!(bkl_mat_cat("J-E ADAMS", "02j0n", None, 3), Some("pi"));
        assert_eq!(bkl_mat_cat("973.3 M", "02a0n", None, 3), Some("d9"));
        assert_eq!(bkl_mat_cat("B LINCOLN A", "02a0n", None, 3), Some("bi"));
    }

    #[test]
    fn bkl_unclassifiable() {
        assert_eq!(bkl_mat_cat("PER", "02a0n", None, 3), None);
        assert_eq!(bkl_mat_cat("", "", None, 3), None);
    }

    #[test]
    fn branch_prefix_lookup() {
        let idx = CodeIndex::from_iter([(None, 9), (Some("14"), 40), (Some("02"), 41)]);
        assert_eq!(resolve_branch("14amy", &idx), Some(40));
        assert_eq!(resolve_branch("99xzz", &idx), Some(9));
        assert_eq!(resolve_branch("", &idx), Some(9));
    }

    #[test]
    fn item_type_defaults() {
        let idx = CodeIndex::from_iter([(Some("0"), 46), (Some("101"), 101)]);
        assert_eq!(resolve_item_type("101", &idx), Some(101));
        assert_eq!(resolve_item_type("55", &idx), Some(46));
        assert_eq!(resolve_item_type("junk", &idx), Some(46));
    }
}
