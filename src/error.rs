use thiserror::Error;

/// Fatal failures: the run stops before or during login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("PWN_USERNAME and PWN_PASSWORD must be set")]
    MissingCredentials,
    #[error("invalid platform base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to access login page (status {0})")]
    LoginPage(u16),
    #[error("could not find nonce token on login page")]
    MissingNonce,
    #[error("login rejected, check credentials")]
    Rejected,
    #[error("login failed with status code {0}")]
    UnexpectedStatus(u16),
    #[error("http error during login: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures talking to the Notion API. Row-level callers log these and move on.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("NOTION_TOKEN and NOTION_PAGE_ID must be set")]
    MissingSettings,
    #[error("NOTION_TOKEN is not a valid header value")]
    InvalidToken,
    #[error("notion api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("notion response missing field `{0}`")]
    MissingField(&'static str),
    #[error("http error talking to notion: {0}")]
    Http(#[from] reqwest::Error),
}
