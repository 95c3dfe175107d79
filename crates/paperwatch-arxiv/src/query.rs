//! arXiv search query assembly
//!
//! Phrases (terms containing whitespace) are wrapped in literal double
//! quotes. The whole query is URL-encoded once by the HTTP layer, so no
//! pre-encoding happens here. Nothing else is escaped.

/// Wrap `parts` in an OR group, parenthesized when there is more than one.
fn or_group(parts: Vec<String>) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(format!("({})", parts.join(" OR "))),
    }
}

fn quote_phrase(term: &str) -> String {
    if term.chars().any(char::is_whitespace) {
        format!("\"{term}\"")
    } else {
        term.to_string()
    }
}

/// Build an arXiv `search_query` from free-text terms and category filters.
///
/// Returns an empty string when neither is given (or both are empty),
/// meaning "nothing to search".
pub fn build_query(search_terms: Option<&[String]>, categories: Option<&[String]>) -> String {
    let category_clause = categories.and_then(|cats| {
        or_group(cats.iter().map(|c| format!("cat:{c}")).collect())
    });
    let term_clause =
        search_terms.and_then(|terms| or_group(terms.iter().map(|t| quote_phrase(t)).collect()));

    match (category_clause, term_clause) {
        (Some(c), Some(t)) => format!("{c} AND {t}"),
        (Some(c), None) => c,
        (None, Some(t)) => t,
        (None, None) => String::new(),
    }
}
