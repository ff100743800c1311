//! HTML views for the link-extraction pages

use crate::output::LinkReport;
use crate::state::TaskState;
use url::Url;

/// Seconds between automatic reloads of a pending results page
pub const REFRESH_SECONDS: u32 = 2;

/// Escapes text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, head_extra: &str, body: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(head_extra);
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str("</head>\n<body>\n");
    html.push_str(body);
    html.push_str("</body>\n</html>\n");
    html
}

/// The URL submission form, optionally with a validation message
pub fn link_form(error: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Extract links</h1>\n");
    if let Some(error) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(error)));
    }
    body.push_str("<form method=\"post\" action=\"/links\">\n");
    body.push_str("<input type=\"url\" name=\"url\" placeholder=\"https://example.com/\" required>\n");
    body.push_str("<button type=\"submit\">Extract</button>\n");
    body.push_str("</form>\n");
    page("Extract links", "", &body)
}

/// A finished job's links as a table
pub fn link_results(report: &LinkReport) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>Links ({})</h1>\n", report.size));

    if report.results.is_empty() {
        body.push_str("<p>No links found.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Text</th><th>URL</th></tr>\n");
        for link in &report.results {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape(&link.text),
                url_cell(&link.url)
            ));
        }
        body.push_str("</table>\n");
    }

    body.push_str("<p><a href=\"/links\">Check another page</a></p>\n");
    page("Links", "", &body)
}

/// Only http(s) URLs become clickable; anything else is shown as text
fn url_cell(raw: &str) -> String {
    let url = escape(raw);
    match Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            format!("<a href=\"{}\">{}</a>", url, url)
        }
        _ => url,
    }
}

/// Shown while the task is pending or running; reloads itself
pub fn link_pending(state: TaskState, refresh_url: &str) -> String {
    let head = format!(
        "<meta http-equiv=\"refresh\" content=\"{}; url={}\">\n",
        REFRESH_SECONDS,
        escape(refresh_url)
    );
    let body = format!(
        "<h1>Extracting links</h1>\n<p>Task is {}. This page refreshes every {} seconds.</p>\n",
        state, REFRESH_SECONDS
    );
    page("Extracting links", &head, &body)
}

/// Shown when the task failed
pub fn link_failed(report: &LinkReport) -> String {
    let body = format!(
        "<h1>Link extraction failed</h1>\n<p>Job {} did not complete; {} links were saved before it stopped.</p>\n<p><a href=\"/links\">Try again</a></p>\n",
        report.job_id, report.size
    );
    page("Link extraction failed", "", &body)
}

/// Shown for stale or unknown task handles
pub fn link_unknown(task_id: &str) -> String {
    let body = format!(
        "<h1>Unknown task</h1>\n<p>No task {} is known to the worker pool.</p>\n<p><a href=\"/links\">Start over</a></p>\n",
        escape(task_id)
    );
    page("Unknown task", "", &body)
}

/// Generic error page
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape(title),
        escape(message)
    );
    page(title, "", &body)
}
