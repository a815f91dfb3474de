use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::domain::{HeldMessage, MessageAction};

use super::{
    collapsed_text, form_action, heading_with_title, hidden_fields, next_sibling_form, ScrapeError,
};

pub const QUEUE_TITLE: &str = "Held Messages";

/// Largest page size the queue's count control offers; one escalation
/// re-fetch at this size replaces manual pagination.
pub const MAX_PAGE_SIZE: u32 = 200;

static COUNT_SELECT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"select[name="count"]"#).expect("valid selector"));
static PAGE_SELECT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"select[name="page"] option"#).expect("valid selector"));
static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("valid selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static INPUT: Lazy<Selector> = Lazy::new(|| Selector::parse("input").expect("valid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static CHECKBOX: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[type="checkbox"]"#).expect("valid selector"));
// A bare <button> submits too, so match on the name the server dispatches on.
static SUBMIT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"button[name], input[type="submit"][name]"#).expect("valid selector")
});

/// One parse of a held-messages page.
#[derive(Debug)]
pub struct QueueScan {
    /// The page-size control is the only signal that the queue is non-empty.
    pub has_queue: bool,
    /// A jump-to-page control offering a page "2" means the default page
    /// size did not cover the queue.
    pub more_pages: bool,
    pub messages: Vec<HeldMessage>,
}

/// Reads a held-messages page. The heading must be present on any variant of
/// the page; the rest depends on whether anything is pending.
pub fn scan_queue_page(html: &str) -> Result<QueueScan, ScrapeError> {
    let doc = Html::parse_document(html);
    let heading =
        heading_with_title(&doc, QUEUE_TITLE).ok_or(ScrapeError::MissingHeading(QUEUE_TITLE))?;

    if doc.select(&COUNT_SELECT).next().is_none() {
        return Ok(QueueScan {
            has_queue: false,
            more_pages: false,
            messages: Vec::new(),
        });
    }

    let form = next_sibling_form(heading).ok_or(ScrapeError::MissingForm(QUEUE_TITLE))?;
    let tbody = form
        .select(&TBODY)
        .next()
        .ok_or(ScrapeError::MissingTable(QUEUE_TITLE))?;

    let mut messages = Vec::new();
    for (idx, tr) in tbody.select(&TR).enumerate() {
        let row = idx + 1;
        let cells: Vec<_> = tr.select(&TD).collect();
        if cells.len() < 5 {
            return Err(ScrapeError::TruncatedRow { row });
        }
        let id = cells[0]
            .select(&INPUT)
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or(ScrapeError::MissingRowId { row })?
            .to_string();
        let subject = cells[1]
            .select(&ANCHOR)
            .next()
            .map(collapsed_text)
            .ok_or(ScrapeError::MissingSubjectLink { row })?;
        messages.push(HeldMessage {
            id,
            subject,
            sender: collapsed_text(cells[2]),
            reason: collapsed_text(cells[3]),
            date: collapsed_text(cells[4]),
        });
    }

    Ok(QueueScan {
        has_queue: true,
        more_pages: offers_second_page(&doc),
        messages,
    })
}

fn offers_second_page(doc: &Html) -> bool {
    doc.select(&PAGE_SELECT).any(|option| {
        option.value().attr("value") == Some("2") || collapsed_text(option) == "2"
    })
}

/// The moderation form around the queue table: post target, hidden fields,
/// the name shared by the per-row checkboxes, and the submit buttons.
#[derive(Debug, Clone)]
pub struct ModerationForm {
    pub action: Option<String>,
    pub hidden: Vec<(String, String)>,
    pub checkbox_name: String,
    pub buttons: Vec<(String, String)>,
}

pub fn extract_moderation_form(html: &str) -> Result<ModerationForm, ScrapeError> {
    let doc = Html::parse_document(html);
    let heading =
        heading_with_title(&doc, QUEUE_TITLE).ok_or(ScrapeError::MissingHeading(QUEUE_TITLE))?;
    let form = next_sibling_form(heading).ok_or(ScrapeError::MissingForm(QUEUE_TITLE))?;

    let checkbox_name = form
        .select(&CHECKBOX)
        .find_map(|input| input.value().attr("name"))
        .ok_or(ScrapeError::MissingCheckboxes)?
        .to_string();

    let buttons = form
        .select(&SUBMIT)
        .filter_map(|button| {
            let name = button.value().attr("name")?;
            let value = button.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Ok(ModerationForm {
        action: form_action(form),
        hidden: hidden_fields(form),
        checkbox_name,
        buttons,
    })
}

impl ModerationForm {
    /// Wire body for one disposition batch: hidden fields, one checkbox pair
    /// per selected id, and the pressed button's own pair.
    pub fn params(
        &self,
        action: MessageAction,
        ids: &[String],
    ) -> Result<Vec<(String, String)>, ScrapeError> {
        let button = self
            .buttons
            .iter()
            .find(|(name, _)| name == action.as_str())
            .ok_or_else(|| ScrapeError::MissingButton(action.as_str().to_string()))?;

        let mut params = self.hidden.clone();
        for id in ids {
            params.push((self.checkbox_name.clone(), id.clone()));
        }
        params.push(button.clone());
        Ok(params)
    }
}
