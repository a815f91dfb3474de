use serde::Deserialize;

/// Held-message detail as served by the Postorius JSON endpoint. Only the
/// raw message text is needed for inspection; the remaining fields ride
/// along for debug output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageDetail {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub msgid: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub hold_date: Option<String>,
}

impl MessageDetail {
    /// Everything up to the first blank line of the raw message.
    pub fn headers(&self) -> &str {
        match split_at_blank_line(&self.msg) {
            Some((headers, _)) => headers,
            None => &self.msg,
        }
    }

    /// Everything after the first blank line, or nothing for a message
    /// that is all headers.
    pub fn body(&self) -> &str {
        match split_at_blank_line(&self.msg) {
            Some((_, body)) => body,
            None => "",
        }
    }
}

fn split_at_blank_line(raw: &str) -> Option<(&str, &str)> {
    for sep in ["\r\n\r\n", "\n\n"] {
        if let Some(pos) = raw.find(sep) {
            return Some((&raw[..pos], &raw[pos + sep.len()..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(msg: &str) -> MessageDetail {
        MessageDetail {
            msg: msg.to_string(),
            ..MessageDetail::default()
        }
    }

    #[test]
    fn splits_headers_from_body() {
        let d = detail("From: a@example.org\nSubject: hi\n\nfirst line\nsecond line\n");
        assert_eq!(d.headers(), "From: a@example.org\nSubject: hi");
        assert_eq!(d.body(), "first line\nsecond line\n");
    }

    #[test]
    fn crlf_messages_split_too() {
        let d = detail("From: a@example.org\r\n\r\nbody\r\n");
        assert_eq!(d.headers(), "From: a@example.org");
        assert_eq!(d.body(), "body\r\n");
    }

    #[test]
    fn headers_only_message_has_empty_body() {
        let d = detail("From: a@example.org\nSubject: hi");
        assert_eq!(d.headers(), "From: a@example.org\nSubject: hi");
        assert_eq!(d.body(), "");
    }

    #[test]
    fn deserializes_the_detail_endpoint_payload() {
        let payload = r#"{
            "msgid": "<m1@example.org>",
            "subject": "Lunch plans",
            "sender": "alice@example.org",
            "hold_date": "2026-01-02T03:04:05",
            "msg": "From: alice@example.org\n\nhello\n"
        }"#;
        let d: MessageDetail = serde_json::from_str(payload).unwrap();
        assert_eq!(d.subject.as_deref(), Some("Lunch plans"));
        assert_eq!(d.body(), "hello\n");
    }

    #[test]
    fn missing_fields_default_rather_than_fail() {
        let d: MessageDetail = serde_json::from_str("{}").unwrap();
        assert_eq!(d.msg, "");
        assert_eq!(d.msgid, None);
    }
}
