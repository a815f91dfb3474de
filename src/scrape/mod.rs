//! All positional HTML extraction lives here. The Postorius templates expose
//! almost no stable field identifiers, so records are read by tag position:
//! an exact heading, the next sibling form, the table body, then ordered
//! cells. A layout change upstream breaks these extractors loudly instead of
//! degrading.

pub mod held;
pub mod login;
pub mod subscriptions;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("expected {0:?} heading not found; the page layout changed or the list address is wrong")]
    MissingHeading(&'static str),
    #[error("no form follows the {0:?} heading")]
    MissingForm(&'static str),
    #[error("the form under {0:?} has no table body")]
    MissingTable(&'static str),
    #[error("row {row} is missing expected cells")]
    TruncatedRow { row: usize },
    #[error("row {row} has no id input")]
    MissingRowId { row: usize },
    #[error("row {row} has no subject link")]
    MissingSubjectLink { row: usize },
    #[error("row {row} has no request link")]
    MissingRequestLink { row: usize },
    #[error("login form not found")]
    MissingLoginForm,
    #[error("moderation form has no checkbox inputs")]
    MissingCheckboxes,
    #[error("moderation form has no {0:?} button")]
    MissingButton(String),
}

static H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").expect("valid selector"));
static HIDDEN_INPUT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[type="hidden"]"#).expect("valid selector"));

/// Descendant text with runs of whitespace collapsed, the way the templates
/// indent their cell contents.
fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `h2` whose collapsed text is exactly `title`.
fn heading_with_title<'a>(doc: &'a Html, title: &str) -> Option<ElementRef<'a>> {
    doc.select(&H2).find(|h| collapsed_text(*h) == title)
}

/// First `form` element among the heading's following siblings.
fn next_sibling_form(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut node = heading.next_sibling();
    while let Some(current) = node {
        if let Some(el) = ElementRef::wrap(current) {
            if el.value().name() == "form" {
                return Some(el);
            }
        }
        node = current.next_sibling();
    }
    None
}

/// Name/value pairs of a form's hidden inputs (the CSRF token rides here).
fn hidden_fields(form: ElementRef<'_>) -> Vec<(String, String)> {
    form.select(&HIDDEN_INPUT)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// A form `action` attribute worth resolving; empty means "post back here".
fn form_action(form: ElementRef<'_>) -> Option<String> {
    form.value()
        .attr("action")
        .filter(|action| !action.is_empty())
        .map(str::to_string)
}
