use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{collapsed_text, form_action, hidden_fields, ScrapeError};

static LOGIN_FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form.login").expect("valid selector"));
static DANGER_ALERT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".alert-danger").expect("valid selector"));

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub action: Option<String>,
    pub hidden: Vec<(String, String)>,
}

/// The Django login form: its action target plus the hidden fields that have
/// to be posted back verbatim (csrfmiddlewaretoken and friends).
pub fn extract_login_form(html: &str) -> Result<LoginForm, ScrapeError> {
    let doc = Html::parse_document(html);
    let form = doc
        .select(&LOGIN_FORM)
        .next()
        .ok_or(ScrapeError::MissingLoginForm)?;
    Ok(LoginForm {
        action: form_action(form),
        hidden: hidden_fields(form),
    })
}

/// Text of the first danger alert, the only failure signal the login page
/// gives.
pub fn danger_alert(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&DANGER_ALERT)
        .map(collapsed_text)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
<html><body>
<form class="login" method="post" action="/accounts/login/">
  <input type="hidden" name="csrfmiddlewaretoken" value="tok123">
  <input type="hidden" name="next" value="/postorius/lists/">
  <input type="text" name="login">
  <input type="password" name="password">
  <button type="submit">Sign In</button>
</form>
</body></html>
"#;

    #[test]
    fn login_form_yields_action_and_hidden_fields() {
        let form = extract_login_form(LOGIN_PAGE).unwrap();
        assert_eq!(form.action.as_deref(), Some("/accounts/login/"));
        assert_eq!(
            form.hidden,
            vec![
                ("csrfmiddlewaretoken".to_string(), "tok123".to_string()),
                ("next".to_string(), "/postorius/lists/".to_string()),
            ]
        );
    }

    #[test]
    fn missing_login_form_is_an_error() {
        let err = extract_login_form("<html><body><p>maintenance</p></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingLoginForm));
    }

    #[test]
    fn danger_alert_text_is_extracted() {
        let html = r#"<div class="alert alert-danger">
            The username and/or password you specified are not correct.
        </div>"#;
        assert_eq!(
            danger_alert(html).as_deref(),
            Some("The username and/or password you specified are not correct.")
        );
        assert_eq!(danger_alert("<p>welcome back</p>"), None);
    }
}
