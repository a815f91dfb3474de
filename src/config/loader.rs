use std::{
    fs,
    path::{Path, PathBuf},
};

use super::types::{ConfigError, ListConfig};

const DEFAULT_CONFIG_NAME: &str = ".listadmin3.ini";

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// Parses the line-oriented config file into the ordered set of managed
/// lists. `base_url`, `username` and `password` lines set a rolling
/// credential triple; every `list` line appends one entry inheriting the
/// triple as it stood at that point in the file.
pub fn load_config(path: &Path) -> Result<Vec<ListConfig>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw)
}

fn parse_config(raw: &str) -> Result<Vec<ListConfig>, ConfigError> {
    let mut base_url: Option<String> = None;
    let mut username: Option<String> = None;
    let mut password: Option<String> = None;
    let mut lists = Vec::new();

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let (key, value) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(key), Some(value), None) => (key, value),
            _ => {
                return Err(ConfigError::Malformed {
                    line: line_no,
                    text: trimmed.to_string(),
                })
            }
        };

        match key {
            "base_url" => base_url = Some(normalize_base_url(value)),
            "username" => username = Some(value.to_string()),
            "password" => password = Some(value.to_string()),
            "list" => match (&base_url, &username, &password) {
                (Some(base_url), Some(username), Some(password)) => lists.push(ListConfig {
                    base_url: base_url.clone(),
                    username: username.clone(),
                    password: password.clone(),
                    list: value.to_string(),
                }),
                _ => return Err(ConfigError::IncompleteCredentials { line: line_no }),
            },
            other => {
                return Err(ConfigError::UnknownKey {
                    line: line_no,
                    key: other.to_string(),
                })
            }
        }
    }

    Ok(lists)
}

/// Endpoint paths are joined relative to the base URL, which only works
/// when it ends in a slash.
fn normalize_base_url(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_inherit_most_recent_triple() {
        let raw = "\
# personal lists
base_url https://mail.example.org/
username admin@example.org
password hunter2
list announce@example.org
list dev@example.org

password other-secret
list private@example.org
";
        let lists = parse_config(raw).unwrap();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].list, "announce@example.org");
        assert_eq!(lists[0].password, "hunter2");
        assert_eq!(lists[1].list, "dev@example.org");
        assert_eq!(lists[1].password, "hunter2");
        assert_eq!(lists[2].list, "private@example.org");
        assert_eq!(lists[2].password, "other-secret");
        assert!(lists[0].same_identity(&lists[1]));
        assert!(!lists[1].same_identity(&lists[2]));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let raw = "\
base_url https://mail.example.org
username u
password p
list a@example.org
";
        let lists = parse_config(raw).unwrap();
        assert_eq!(lists[0].base_url, "https://mail.example.org/");
    }

    #[test]
    fn malformed_line_is_fatal() {
        let err = parse_config("base_url https://a/ extra-token\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));

        let err = parse_config("username\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));
    }

    #[test]
    fn unknown_key_is_fatal() {
        let err = parse_config("# ok\nserver https://a/\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { line: 2, ref key } if key == "server"));
    }

    #[test]
    fn list_before_credentials_is_fatal() {
        let raw = "base_url https://a/\nusername u\nlist a@example.org\n";
        let err = parse_config(raw).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteCredentials { line: 3 }));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let lists = parse_config("\n# nothing but noise\n\n").unwrap();
        assert!(lists.is_empty());
    }
}
