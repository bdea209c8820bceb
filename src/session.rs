use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Credentials;
use crate::error::AuthError;

const LOGIN_PATH: &str = "/login";
const USER_AGENT: &str = concat!("dojo_scraper/", env!("CARGO_PKG_VERSION"));

static NONCE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(r#"input[name="nonce"]"#).unwrap());

pub struct Session {
    client: Client,
    base: Url,
}

impl Session {
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        let base = Url::parse(base_url).map_err(|source| AuthError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Fetch the login form, submit credentials with its nonce, and confirm
    /// the platform accepted them. Every failure here is fatal.
    pub async fn login(&self, creds: &Credentials) -> Result<(), AuthError> {
        let login_url = self.url(LOGIN_PATH);

        let resp = self.client.get(&login_url).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(AuthError::LoginPage(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        let nonce = extract_nonce(&body).ok_or(AuthError::MissingNonce)?;
        debug!(nonce_len = nonce.len(), "Found login nonce");

        let form = [
            ("name", creds.username.as_str()),
            ("password", creds.password.as_str()),
            ("nonce", nonce.as_str()),
            ("_submit", "Submit"),
        ];
        let resp = self.client.post(&login_url).form(&form).send().await?;
        check_login_response(resp.status(), resp.url().as_str())?;

        info!(user = %creds.username, "Login successful");
        Ok(())
    }

    /// GET a path on the platform. Non-200 responses and transport errors
    /// are logged and come back as `None`.
    pub async fn fetch(&self, path: &str) -> Option<String> {
        let url = self.url(path);
        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error accessing {}: {}", url, e);
                return None;
            }
        };
        if resp.status() != StatusCode::OK {
            warn!("Failed to access {} (status {})", url, resp.status().as_u16());
            return None;
        }
        match resp.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Error reading {}: {}", url, e);
                None
            }
        }
    }
}

/// Value of the `nonce` input on the login form.
pub fn extract_nonce(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&NONCE_SEL)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Redirects are followed, so a failed login lands back on a 200 login page.
fn check_login_response(status: StatusCode, final_url: &str) -> Result<(), AuthError> {
    if status == StatusCode::OK && final_url.to_lowercase().contains("login") {
        return Err(AuthError::Rejected);
    }
    if status != StatusCode::OK && status != StatusCode::FOUND {
        return Err(AuthError::UnexpectedStatus(status.as_u16()));
    }
    Ok(())
}
