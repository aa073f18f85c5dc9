//! Channel-name matching.
//!
//! Decides whether a scraped channel label denotes the same logical channel as
//! a requested search keyword. Scraped labels are noisy: quality markers
//! ("CCTV1 高清", "湖南卫视 4K"), descriptive filler ("xx channel live"), and
//! numeric series where substring matching is actively wrong (CCTV1 must not
//! match CCTV10). Ties resolve to no-match; a false negative only costs us a
//! candidate, a false positive pollutes a channel with someone else's stream.

use lazy_static::lazy_static;
use regex::Regex;

/// Quality markers. Ignored for base-name comparison; order matters because
/// removal is plain substring replacement ("uhd" before "hd", "超高清" before
/// "高清").
const QUALITY_TOKENS: &[&str] = &[
    "4k", "uhd", "超高清", "超清", "高清", "hd", "1080p", "1080i", "720p", "fhd", "full hd",
    "fullhd", "标清", "sd", "480p", "蓝光", "bluray", "blu-ray",
];

/// Descriptive filler removed at word boundaries only. "tv" is deliberately
/// absent: it is part of core names like CCTV.
const DESCRIPTIVE_TOKENS: &[&str] = &[
    "频道", "channel", "电视台", "直播", "live", "在线", "官方", "official",
];

/// Synonym groups, keyed by canonical term. Matching is bidirectional: a
/// keyword equal to the key matches a name containing any alias, and a keyword
/// equal to an alias matches a name containing the key.
const ALIAS_GROUPS: &[(&str, &[&str])] = &[
    ("cctv", &["央视", "中央电视台", "中央台", "中央"]),
    ("央视", &["cctv", "中央电视台", "中央台", "中央"]),
    ("中央", &["cctv", "央视", "中央电视台", "中央台"]),
    ("湖南卫视", &["芒果tv", "芒果", "mango tv", "湖南台"]),
    ("芒果tv", &["湖南卫视", "湖南台"]),
    ("芒果", &["湖南卫视", "湖南台"]),
    ("东方卫视", &["上海卫视", "东方台", "上海台"]),
    ("上海卫视", &["东方卫视", "东方台", "上海台"]),
    ("体育", &["sports", "运动"]),
    ("新闻", &["news"]),
    ("卫视", &["satellite", "卫星"]),
    ("电影", &["movie", "cinema"]),
    ("音乐", &["music"]),
    ("综艺", &["variety"]),
    ("少儿", &["kids", "children", "儿童"]),
    ("财经", &["finance", "financial"]),
    ("科教", &["education", "science"]),
    ("文艺", &["arts", "culture"]),
    ("生活", &["life", "lifestyle"]),
];

/// Terms equivalent to the CCTV family as a whole (no series number implied).
const CCTV_FAMILY_TERMS: &[&str] = &["央视", "中央电视台", "中央台", "中央"];

lazy_static! {
    static ref PAREN_CONTENT: Regex = Regex::new(r"\([^)]*\)").unwrap();
    static ref BRACKET_CONTENT: Regex = Regex::new(r"\[[^\]]*\]").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_ALNUM: Regex = Regex::new(r"[^\w]").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
    /// Series identifier adjacent to the "cctv" prefix: digits with an
    /// optional '+', or a letter tag (e.g. cctv5+, cctv 13, cctvnews).
    static ref CCTV_IDENT: Regex = Regex::new(r"cctv\s*([0-9]+\+?|[a-z]+)").unwrap();
    /// One compiled word-boundary pattern per descriptive token.
    static ref DESCRIPTIVE_PATTERNS: Vec<Regex> = DESCRIPTIVE_TOKENS
        .iter()
        .map(|token| Regex::new(&format!(r"\b{}\b", regex::escape(token))).unwrap())
        .collect();
}

/// Strips parenthesized/bracketed content and descriptive filler from an
/// already lowercased label, collapsing leftover whitespace.
fn strip_descriptive(label: &str) -> String {
    let mut cleaned = PAREN_CONTENT.replace_all(label, "").into_owned();
    cleaned = BRACKET_CONTENT.replace_all(&cleaned, "").into_owned();
    cleaned = cleaned.replace("not 24/7", "");
    for pattern in DESCRIPTIVE_PATTERNS.iter() {
        // Word-boundary match so "live" is not carved out of "liverpool".
        // CJK tokens embedded in longer CJK runs have no word boundary and
        // survive, which keeps names like 中央电视台 intact.
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

/// Removes quality markers, for base-name comparison only.
fn strip_quality(label: &str) -> String {
    let mut cleaned = label.to_string();
    for token in QUALITY_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string()
}

fn alphanumeric_only(s: &str) -> String {
    NON_ALNUM.replace_all(s, "").into_owned()
}

fn digit_runs(s: &str) -> Vec<&str> {
    DIGIT_RUN.find_iter(s).map(|m| m.as_str()).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Substring search where neither neighbor is a word character; the token is
/// runtime data, so this replaces a per-call compiled \b-bounded pattern.
fn contains_whole_token(haystack: &str, token: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(token) {
        let begin = start + pos;
        let end = begin + token.len();
        let bounded_left = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let bounded_right = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if bounded_left && bounded_right {
            return true;
        }
        start = begin + 1;
    }
    false
}

/// Returns true when `declared_name` (a scraped channel label) denotes the
/// channel identified by `keyword`.
///
/// The two arguments are not interchangeable: the name side gets cleaned of
/// filler and quality markers, the keyword side is taken as the authoritative
/// channel identity.
pub fn matches(declared_name: &str, keyword: &str) -> bool {
    if declared_name.trim().is_empty() || keyword.trim().is_empty() {
        return false;
    }

    let name_lower = declared_name.to_lowercase().trim().to_string();
    let keyword_lower = keyword.to_lowercase().trim().to_string();

    let name_clean = strip_descriptive(&name_lower);
    let name_alnum = alphanumeric_only(&name_clean);
    let keyword_alnum = alphanumeric_only(&keyword_lower);

    // Exact match after normalization.
    if name_clean == keyword_lower || (!keyword_alnum.is_empty() && name_alnum == keyword_alnum) {
        return true;
    }

    // Numeric-series disambiguation for the CCTV family: the identifier after
    // the prefix must match exactly, and the presence of any other identifier
    // forbids the match (CCTV1 never matches a label carrying CCTV10).
    if keyword_lower.starts_with("cctv") && keyword_lower.len() > 4 {
        let wanted = &keyword_lower[4..];
        let found: Vec<&str> = CCTV_IDENT
            .captures_iter(&name_clean)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        if found.iter().any(|ident| *ident == wanted) {
            return true;
        }
        if !found.is_empty() {
            return false;
        }
    }

    // A trailing '+' is a distinct channel (CCTV5+ vs CCTV5): it must appear
    // on both sides or on neither.
    if keyword_lower.contains('+') != name_lower.contains('+') {
        return false;
    }

    // General numeric guard: a keyword with digits requires the same digit run
    // to appear in the label.
    let keyword_digits = digit_runs(&keyword_lower);
    if !keyword_digits.is_empty() {
        let name_digits = digit_runs(&name_clean);
        if !keyword_digits.iter().any(|d| name_digits.contains(d)) {
            return false;
        }
    }

    // Base-name comparison with quality markers stripped (e.g. "深圳卫视 4K").
    if QUALITY_TOKENS.iter().any(|q| name_lower.contains(q)) {
        let name_no_quality = strip_quality(&name_lower);
        if name_no_quality.contains(&keyword_lower)
            || (!keyword_alnum.is_empty()
                && alphanumeric_only(&name_no_quality).contains(&keyword_alnum))
        {
            return true;
        }
    }

    // Containment, with a whole-token requirement for purely numeric keywords
    // so "1" does not match inside "2019".
    if !keyword_alnum.is_empty() && name_clean.contains(&keyword_alnum) {
        if keyword_alnum.chars().all(|c| c.is_ascii_digit()) {
            return contains_whole_token(&name_clean, &keyword_alnum);
        }
        return true;
    }

    // Alias table, bidirectional.
    for (canonical, aliases) in ALIAS_GROUPS {
        if keyword_lower == *canonical {
            if aliases
                .iter()
                .any(|alias| name_clean.contains(alias) || name_alnum.contains(alias))
            {
                return true;
            }
        } else if aliases.contains(&keyword_lower.as_str())
            && (name_clean.contains(canonical) || name_alnum.contains(canonical))
        {
            return true;
        }
    }

    // CCTV family terms match labels from the other script.
    if CCTV_FAMILY_TERMS.contains(&keyword_lower.as_str()) && name_clean.contains("cctv") {
        return true;
    }
    if keyword_lower.starts_with("cctv")
        && CCTV_FAMILY_TERMS.iter().any(|term| name_clean.contains(term))
    {
        return true;
    }

    false
}
