use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::domain::PendingSubscription;

use super::{collapsed_text, heading_with_title, next_sibling_form, ScrapeError};

pub const SUBSCRIPTION_TITLE: &str = "Subscription requests";

/// Path segment the per-request action links hang off; the request hash is
/// the segment right after it.
const REQUEST_PATH_MARKER: &str = "handle_subscription_request";

static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("valid selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Pending subscription requests in table order. A page without the request
/// form is the empty state, not an error; a page without the heading is a
/// layout change and fails loudly.
pub fn extract_subscription_requests(
    html: &str,
) -> Result<Vec<PendingSubscription>, ScrapeError> {
    let doc = Html::parse_document(html);
    let heading = heading_with_title(&doc, SUBSCRIPTION_TITLE)
        .ok_or(ScrapeError::MissingHeading(SUBSCRIPTION_TITLE))?;

    let form = match next_sibling_form(heading) {
        Some(form) => form,
        None => return Ok(Vec::new()),
    };
    let tbody = match form.select(&TBODY).next() {
        Some(tbody) => tbody,
        None => return Ok(Vec::new()),
    };

    let mut requests = Vec::new();
    for (idx, tr) in tbody.select(&TR).enumerate() {
        let row = idx + 1;
        let cells: Vec<_> = tr.select(&TD).collect();
        if cells.len() < 2 {
            return Err(ScrapeError::TruncatedRow { row });
        }
        let email = collapsed_text(cells[0]);
        let request_hash = tr
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find_map(hash_from_href)
            .ok_or(ScrapeError::MissingRequestLink { row })?;
        requests.push(PendingSubscription {
            email,
            request_hash,
        });
    }
    Ok(requests)
}

fn hash_from_href(href: &str) -> Option<String> {
    let mut segments = href.split('/').filter(|segment| !segment.is_empty());
    segments
        .find(|segment| *segment == REQUEST_PATH_MARKER)
        .and_then(|_| segments.next())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUESTS_PAGE: &str = r#"
<html><body>
<h2>Subscription requests</h2>
<form method="post" action="">
  <table class="table">
    <tbody>
      <tr>
        <td>carol@example.org</td>
        <td>
          <a href="/postorius/lists/dev@example.org/handle_subscription_request/deadbeef01/accept">Accept</a>
          <a href="/postorius/lists/dev@example.org/handle_subscription_request/deadbeef01/discard">Discard</a>
        </td>
      </tr>
      <tr>
        <td>dave@example.org</td>
        <td>
          <a href="/postorius/lists/dev@example.org/handle_subscription_request/cafef00d02/accept">Accept</a>
        </td>
      </tr>
    </tbody>
  </table>
</form>
</body></html>
"#;

    #[test]
    fn requests_are_extracted_in_table_order() {
        let requests = extract_subscription_requests(REQUESTS_PAGE).unwrap();
        assert_eq!(
            requests,
            vec![
                PendingSubscription {
                    email: "carol@example.org".to_string(),
                    request_hash: "deadbeef01".to_string(),
                },
                PendingSubscription {
                    email: "dave@example.org".to_string(),
                    request_hash: "cafef00d02".to_string(),
                },
            ]
        );
    }

    #[test]
    fn page_without_form_is_the_empty_state() {
        let html = "<html><body><h2>Subscription requests</h2><p>none pending</p></body></html>";
        assert!(extract_subscription_requests(html).unwrap().is_empty());
    }

    #[test]
    fn missing_heading_is_fatal() {
        let err = extract_subscription_requests("<html><body></body></html>").unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingHeading(SUBSCRIPTION_TITLE)
        ));
    }

    #[test]
    fn row_without_request_link_is_fatal() {
        let broken = REQUESTS_PAGE.replace(
            r#"<a href="/postorius/lists/dev@example.org/handle_subscription_request/cafef00d02/accept">Accept</a>"#,
            "pending",
        );
        let err = extract_subscription_requests(&broken).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingRequestLink { row: 2 }));
    }

    #[test]
    fn hash_is_the_segment_after_the_marker() {
        assert_eq!(
            hash_from_href("/l/x/handle_subscription_request/abc123/accept").as_deref(),
            Some("abc123")
        );
        assert_eq!(hash_from_href("/l/x/members/"), None);
    }
}
