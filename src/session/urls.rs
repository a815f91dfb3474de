use url::Url;

/// The fixed Postorius paths, resolved against one server's base URL. The
/// base URL always carries a trailing slash (the config loader guarantees
/// it), so joins stay inside the server prefix.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }

    pub fn login(&self) -> Result<Url, url::ParseError> {
        self.base.join("accounts/login/")
    }

    pub fn logout(&self) -> Result<Url, url::ParseError> {
        self.base.join("accounts/logout/")
    }

    pub fn held_messages(&self, list: &str) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("postorius/lists/{list}/held_messages"))
    }

    pub fn subscription_requests(&self, list: &str) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("postorius/lists/{list}/subscription_requests"))
    }

    pub fn handle_subscription_request(
        &self,
        list: &str,
        request_hash: &str,
        action: &str,
    ) -> Result<Url, url::ParseError> {
        self.base.join(&format!(
            "postorius/lists/{list}/handle_subscription_request/{request_hash}/{action}"
        ))
    }

    pub fn held_message_detail(&self, list: &str, id: &str) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("postorius/api/list/{list}/held_message/{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://mail.example.org/").unwrap()
    }

    #[test]
    fn account_paths_are_versioned() {
        assert_eq!(
            endpoints().login().unwrap().as_str(),
            "https://mail.example.org/accounts/login/"
        );
        assert_eq!(
            endpoints().logout().unwrap().as_str(),
            "https://mail.example.org/accounts/logout/"
        );
    }

    #[test]
    fn list_paths_embed_the_list_address() {
        let e = endpoints();
        assert_eq!(
            e.held_messages("dev@example.org").unwrap().as_str(),
            "https://mail.example.org/postorius/lists/dev@example.org/held_messages"
        );
        assert_eq!(
            e.subscription_requests("dev@example.org").unwrap().as_str(),
            "https://mail.example.org/postorius/lists/dev@example.org/subscription_requests"
        );
        assert_eq!(
            e.handle_subscription_request("dev@example.org", "abc123", "accept")
                .unwrap()
                .as_str(),
            "https://mail.example.org/postorius/lists/dev@example.org/handle_subscription_request/abc123/accept"
        );
        assert_eq!(
            e.held_message_detail("dev@example.org", "41").unwrap().as_str(),
            "https://mail.example.org/postorius/api/list/dev@example.org/held_message/41"
        );
    }

    #[test]
    fn base_prefix_is_preserved() {
        let e = Endpoints::new("https://mail.example.org/mailman/").unwrap();
        assert_eq!(
            e.login().unwrap().as_str(),
            "https://mail.example.org/mailman/accounts/login/"
        );
    }
}
