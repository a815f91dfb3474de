use thiserror::Error;

/// One managed mailing list together with the credentials that were in
/// effect when its `list` line was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub list: String,
}

impl ListConfig {
    /// Two entries share a web session when the whole credential triple
    /// matches, not just the server.
    pub fn same_identity(&self, other: &ListConfig) -> bool {
        self.base_url == other.base_url
            && self.username == other.username
            && self.password == other.password
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("line {line}: expected `<key> <value>`, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: `list` requires base_url, username and password to be set first")]
    IncompleteCredentials { line: usize },
    #[error("no usable home directory and no --config given")]
    NoHomeDir,
}
