//! FTS5 match-expression helpers.
//!
//! User text is treated as plain words: every term is quoted, so FTS5
//! operators typed by callers (`OR`, `NEAR`, `*`, column filters) match
//! literally instead of changing the query. Terms without any letter or
//! digit (`-`, `!!!`, `&`) carry no searchable word and are dropped, so a
//! punctuation-only query counts as blank and matches every record.

/// Builds an AND-joined FTS5 expression, or `None` when `text` has no terms.
pub fn match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
