use chrono::NaiveDate;
use nucleihub::{FeedEntry, UpdateError, commit_feed_url, has_activity_on};
use serde::Deserialize;

use crate::USER_AGENT;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    updated: String,
}

/// Parse the entries of an Atom document.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, UpdateError> {
    let feed: AtomFeed =
        quick_xml::de::from_str(xml).map_err(|e| UpdateError::Parse(format!("failed to parse XML: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        .map(|e| FeedEntry { updated: e.updated })
        .collect())
}

/// HTTP client for repository commit feeds.
pub struct CommitFeedClient {
    client: reqwest::Client,
}

impl CommitFeedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch and parse the feed at `feed_url`.
    pub async fn entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, UpdateError> {
        let response = self
            .client
            .get(feed_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| UpdateError::Network(format!("failed to fetch URL {feed_url}: {e}")))?;

        if !response.status().is_success() {
            return Err(UpdateError::Status {
                status: response.status().as_u16(),
                url: feed_url.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::Network(format!("failed to read response body: {e}")))?;

        parse_feed(&body)
    }

    /// True if the repository behind a branch archive URL has a commit on `day`.
    ///
    /// URLs without a commit feed are never reported as updated.
    pub async fn updated_on(&self, archive_url: &str, day: NaiveDate) -> Result<bool, UpdateError> {
        let Some(feed_url) = commit_feed_url(archive_url) else {
            return Ok(false);
        };
        tracing::debug!(%archive_url, %feed_url, "checking commit feed");

        let entries = self.entries(&feed_url).await?;
        Ok(has_activity_on(&entries, day))
    }
}

impl Default for CommitFeedClient {
    fn default() -> Self {
        Self::new()
    }
}
