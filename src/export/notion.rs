use std::collections::HashMap;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::payload;
use crate::config::NotionTarget;
use crate::error::NotionError;
use crate::parser::blocks;
use crate::record::Record;

const NOTION_VERSION: &str = "2022-06-28";

/// The parts of a created page or database we use.
#[derive(Debug, Clone, Deserialize)]
pub struct Created {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

pub struct NotionClient {
    http: Client,
    api_url: String,
    delay: Duration,
}

impl NotionClient {
    pub fn new(target: &NotionTarget) -> Result<Self, NotionError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", target.token)).map_err(|_| NotionError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_url: target.api_url.clone(),
            delay: target.delay,
        })
    }

    /// Send a write, then sleep for the configured delay whatever the outcome.
    async fn write(&self, req: RequestBuilder) -> Result<Value, NotionError> {
        let result = Self::execute(req).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        result
    }

    async fn execute(req: RequestBuilder) -> Result<Value, NotionError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }

    fn parse_created(value: Value) -> Result<Created, NotionError> {
        serde_json::from_value(value).map_err(|_| NotionError::MissingField("id"))
    }

    pub async fn create_database(&self, parent_page_id: &str, title: &str, properties: Value) -> Result<Created, NotionError> {
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": [{ "type": "text", "text": { "content": title } }],
            "properties": properties,
        });
        let value = self.write(self.http.post(format!("{}/databases", self.api_url)).json(&body)).await?;
        Self::parse_created(value)
    }

    /// Create a database row. Children past the per-request limit are
    /// appended in follow-up calls; once the row exists it is returned even
    /// if an append fails.
    pub async fn create_page(&self, database_id: &str, properties: Value, children: Vec<Value>) -> Result<Created, NotionError> {
        let mut chunks = children.chunks(payload::MAX_CHILDREN);
        let first = chunks.next().map(<[Value]>::to_vec).unwrap_or_default();
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
            "children": first,
        });
        let value = self.write(self.http.post(format!("{}/pages", self.api_url)).json(&body)).await?;
        let created = Self::parse_created(value)?;

        // The page exists from here on; a failed append only truncates its body.
        for chunk in chunks {
            if let Err(e) = self.append_children(&created.id, chunk).await {
                warn!(page = %created.id, "Failed to append page content, page left partial: {}", e);
                break;
            }
        }
        Ok(created)
    }

    pub async fn append_children(&self, block_id: &str, children: &[Value]) -> Result<(), NotionError> {
        let body = json!({ "children": children });
        self.write(self.http.patch(format!("{}/blocks/{}/children", self.api_url, block_id)).json(&body))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub pages: usize,
    pub rows: usize,
    pub failures: usize,
}

/// Export records under `parent_page_id`: challenge pages first, then the
/// modules table linking to them. Only failing to create the modules
/// database is an error; individual rows are logged and skipped.
pub async fn export(
    client: &NotionClient,
    parent_page_id: &str,
    records: &[Record],
    base: &Url,
    with_pages: bool,
) -> Result<ExportStats, NotionError> {
    let mut stats = ExportStats::default();
    let date = Local::now().format("%Y-%m-%d");

    let links = if with_pages {
        match client
            .create_database(parent_page_id, &format!("pwn.college Challenges ({})", date), payload::challenges_schema())
            .await
        {
            Ok(db) => {
                info!(database = %db.id, "Created challenges database");
                create_challenge_pages(client, &db.id, records, base, &mut stats).await
            }
            Err(e) => {
                warn!("Failed to create challenges database, continuing without links: {}", e);
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    let db = client
        .create_database(parent_page_id, &format!("pwn.college Structure ({})", date), payload::modules_schema())
        .await?;
    info!(database = %db.id, url = ?db.url, "Created modules database");

    for record in records {
        let props = payload::module_properties(record, &links);
        match client.create_page(&db.id, props, Vec::new()).await {
            Ok(_) => stats.rows += 1,
            Err(e) => {
                stats.failures += 1;
                warn!(dojo = %record.dojo, module = %record.module.name, "Failed to add module row: {}", e);
            }
        }
    }

    info!(
        "Notion export done: {} challenge pages, {} module rows, {} failures",
        stats.pages, stats.rows, stats.failures
    );
    Ok(stats)
}

/// First pass: one page per challenge. Returns challenge name → page URL.
/// Names repeated across modules keep the first page created.
async fn create_challenge_pages(
    client: &NotionClient,
    database_id: &str,
    records: &[Record],
    base: &Url,
    stats: &mut ExportStats,
) -> HashMap<String, String> {
    let total: usize = records.iter().map(|r| r.challenges.len()).sum();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut links = HashMap::new();
    for record in records {
        for (i, challenge) in record.challenges.iter().enumerate() {
            let description = blocks::convert(challenge.description.as_deref(), base);
            let children = payload::challenge_children(&description);
            let props = payload::challenge_properties(record, challenge, i + 1);

            match client.create_page(database_id, props, children).await {
                Ok(page) => {
                    stats.pages += 1;
                    match page.url {
                        Some(url) => {
                            if links.contains_key(&challenge.name) {
                                debug!(challenge = %challenge.name, "Duplicate challenge name, keeping first page link");
                            } else {
                                links.insert(challenge.name.clone(), url);
                            }
                        }
                        None => debug!(challenge = %challenge.name, "Created page has no url"),
                    }
                }
                Err(e) => {
                    stats.failures += 1;
                    pb.suspend(|| {
                        warn!(
                            dojo = %record.dojo,
                            module = %record.module.name,
                            challenge = %challenge.name,
                            "Failed to create challenge page: {}", e
                        )
                    });
                }
            }
            pb.inc(1);
        }
    }
    pb.finish_and_clear();
    links
}
