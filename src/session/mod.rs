mod urls;

use async_trait::async_trait;
use reqwest::{header::REFERER, Client};
use thiserror::Error;
use url::Url;

use crate::{
    config::ListConfig,
    domain::{HeldMessage, MessageAction, MessageDetail, PendingSubscription, SubscriptionAction},
    scrape::{held, login, subscriptions, ScrapeError},
};

use urls::Endpoints;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login rejected: {0}")]
    LoginRejected(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

/// One authenticated identity against one Mailman3 server. The session state
/// is nothing but the cookie jar inside the reqwest client; it is valid from
/// a successful `login` until `logout`.
pub struct SessionClient {
    http: Client,
    endpoints: Endpoints,
    base_url: String,
    username: String,
    password: String,
    debug: bool,
}

impl SessionClient {
    pub fn new(config: &ListConfig, debug: bool) -> Result<Self, SessionError> {
        let http = Client::builder()
            .user_agent(format!("listmod/{}", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            endpoints: Endpoints::new(&config.base_url)?,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            debug,
        })
    }

    /// Whether this session's credential triple covers the given list entry.
    pub fn serves(&self, config: &ListConfig) -> bool {
        self.base_url == config.base_url
            && self.username == config.username
            && self.password == config.password
    }

    /// Fetches the login page, posts the credentials through its form and
    /// checks the response for the danger alert the server renders on a
    /// rejected login.
    pub async fn login(&self) -> Result<(), SessionError> {
        let login_url = self.endpoints.login()?;
        let page = self.get_page(login_url.clone()).await?;
        let form = login::extract_login_form(&page)?;

        let post_url = resolve_action(&login_url, form.action.as_deref())?;
        let mut params = form.hidden;
        params.push(("login".to_string(), self.username.clone()));
        params.push(("password".to_string(), self.password.clone()));

        tracing::debug!(target: "http", url = %post_url, "POST login form");
        let response = self
            .http
            .post(post_url)
            .header(REFERER, login_url.as_str())
            .form(&params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        self.dump(&login_url, &body);

        if let Some(alert) = login::danger_alert(&body) {
            return Err(SessionError::LoginRejected(alert));
        }
        tracing::info!(target: "session", server = %self.base_url, user = %self.username, "logged in");
        Ok(())
    }

    /// Best-effort; callers log and ignore failures.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let url = self.endpoints.logout()?;
        tracing::debug!(target: "http", url = %url, "GET");
        self.http.get(url).send().await?;
        tracing::info!(target: "session", server = %self.base_url, "logged out");
        Ok(())
    }

    /// Held messages for one list, in queue order. A page without the
    /// page-size control is an empty queue. When the jump-to-page control
    /// shows a second page, one re-fetch at the maximum page size is made;
    /// queues beyond that size only surface their first page per run.
    pub async fn fetch_held_messages(
        &self,
        list: &str,
    ) -> Result<Vec<HeldMessage>, SessionError> {
        let url = self.endpoints.held_messages(list)?;
        let page = self.get_page(url.clone()).await?;
        let scan = held::scan_queue_page(&page)?;
        if !scan.has_queue {
            return Ok(Vec::new());
        }
        if !scan.more_pages {
            return Ok(scan.messages);
        }

        tracing::debug!(target: "session", list, "queue spans pages, re-fetching at maximum size");
        let page = self.get_page(escalated(&url)).await?;
        Ok(held::scan_queue_page(&page)?.messages)
    }

    /// Re-fetches the queue page, fills in the moderation form and submits
    /// the batch through the button matching `action`. Callers only invoke
    /// this with a non-empty id set.
    pub async fn submit_dispositions(
        &self,
        list: &str,
        action: MessageAction,
        ids: &[String],
    ) -> Result<(), SessionError> {
        debug_assert!(!ids.is_empty());

        let url = self.endpoints.held_messages(list)?;
        let mut page = self.get_page(url.clone()).await?;
        if held::scan_queue_page(&page)?.more_pages {
            page = self.get_page(escalated(&url)).await?;
        }
        let form = held::extract_moderation_form(&page)?;
        let params = form.params(action, ids)?;
        let post_url = resolve_action(&url, form.action.as_deref())?;

        tracing::debug!(target: "http", url = %post_url, "POST moderation form");
        self.http
            .post(post_url)
            .header(REFERER, url.as_str())
            .form(&params)
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(
            target: "session",
            list,
            action = action.as_str(),
            count = ids.len(),
            "dispositions submitted"
        );
        Ok(())
    }

    /// JSON detail record for one held message; a non-success status means
    /// there is nothing to show, not a failure.
    pub async fn fetch_message_detail(
        &self,
        list: &str,
        id: &str,
    ) -> Result<Option<MessageDetail>, SessionError> {
        let url = self.endpoints.held_message_detail(list, id)?;
        tracing::debug!(target: "http", url = %url, "GET");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.json::<MessageDetail>().await?))
    }

    pub async fn fetch_subscription_requests(
        &self,
        list: &str,
    ) -> Result<Vec<PendingSubscription>, SessionError> {
        let url = self.endpoints.subscription_requests(list)?;
        let page = self.get_page(url).await?;
        Ok(subscriptions::extract_subscription_requests(&page)?)
    }

    /// One GET per decision; the server gives no usable response body, so
    /// completing the request is the whole contract.
    pub async fn submit_subscription_disposition(
        &self,
        list: &str,
        action: SubscriptionAction,
        request_hash: &str,
    ) -> Result<(), SessionError> {
        let url = self
            .endpoints
            .handle_subscription_request(list, request_hash, action.as_str())?;
        tracing::debug!(target: "http", url = %url, "GET");
        self.http.get(url).send().await?;
        tracing::info!(
            target: "session",
            list,
            action = action.as_str(),
            "subscription disposition applied"
        );
        Ok(())
    }

    async fn get_page(&self, url: Url) -> Result<String, SessionError> {
        tracing::debug!(target: "http", url = %url, "GET");
        let response = self.http.get(url.clone()).send().await?.error_for_status()?;
        let body = response.text().await?;
        self.dump(&url, &body);
        Ok(body)
    }

    fn dump(&self, url: &Url, body: &str) {
        if self.debug {
            println!("----- {url}");
            println!("{body}");
        }
    }
}

/// Seam for the on-demand body/header inspection during message review.
#[async_trait]
pub trait HeldMessageDetails {
    async fn held_message_detail(
        &self,
        list: &str,
        id: &str,
    ) -> Result<Option<MessageDetail>, SessionError>;
}

#[async_trait]
impl HeldMessageDetails for SessionClient {
    async fn held_message_detail(
        &self,
        list: &str,
        id: &str,
    ) -> Result<Option<MessageDetail>, SessionError> {
        self.fetch_message_detail(list, id).await
    }
}

/// A form's action attribute resolved against the page it came from; no
/// action means the form posts back to the page URL.
fn resolve_action(page_url: &Url, action: Option<&str>) -> Result<Url, SessionError> {
    match action {
        Some(action) => Ok(page_url.join(action)?),
        None => Ok(page_url.clone()),
    }
}

/// The one-shot page-size escalation: same page, count control at maximum.
fn escalated(url: &Url) -> Url {
    let mut escalated = url.clone();
    escalated.set_query(Some(&format!("count={}", held::MAX_PAGE_SIZE)));
    escalated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalated_url_pins_count_to_maximum() {
        let url = Url::parse("https://m.example/postorius/lists/a@example/held_messages").unwrap();
        assert_eq!(
            escalated(&url).as_str(),
            "https://m.example/postorius/lists/a@example/held_messages?count=200"
        );
    }

    #[test]
    fn form_action_resolves_relative_to_page() {
        let page = Url::parse("https://m.example/accounts/login/").unwrap();
        assert_eq!(
            resolve_action(&page, Some("/accounts/login/")).unwrap().as_str(),
            "https://m.example/accounts/login/"
        );
        assert_eq!(resolve_action(&page, None).unwrap(), page);
    }
}
