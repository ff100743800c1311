//! Line-by-line grammar checking of a fetched page
//!
//! The raw body is split on newlines before any HTML parsing so each match
//! can be attributed to a 1-indexed source line.

use crate::storage::{NewError, MAX_CORRECTIONS};
use crate::worker::GrammarChecker;
use scraper::Html;
use uuid::Uuid;

/// Splits a page body into numbered lines, starting at 1
///
/// A trailing `\r` is dropped from each line.
pub fn split_lines(body: &str) -> impl Iterator<Item = (u32, &str)> {
    body.split('\n').enumerate().map(|(index, line)| {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        (number, line.strip_suffix('\r').unwrap_or(line))
    })
}

/// Returns the visible text of a single line of HTML
pub fn strip_markup(line: &str) -> String {
    let fragment = Html::parse_fragment(line);
    fragment.root_element().text().collect()
}

/// Runs every non-blank line of `body` through the checker
///
/// Lines the checker fails on are logged and skipped; one bad line does not
/// fail the page.
pub async fn check_page(
    checker: &dyn GrammarChecker,
    body: &str,
    page_url: &str,
    language: &str,
    job_id: Uuid,
) -> Vec<NewError> {
    let mut found = Vec::new();

    for (line_number, line) in split_lines(body) {
        let text = strip_markup(line);
        if text.trim().is_empty() {
            continue;
        }

        let matches = match checker.check(&text, language).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Checker failed on line {} of {}: {}", line_number, page_url, e);
                continue;
            }
        };

        found.extend(matches.into_iter().map(|m| NewError {
            job_id,
            message: m.message,
            error_sentence: m.sentence,
            error_term: m.matched_text,
            error_line_number: line_number,
            page_url: page_url.to_string(),
            possible_corrections: m.replacements.into_iter().take(MAX_CORRECTIONS).collect(),
        }));
    }

    found
}
