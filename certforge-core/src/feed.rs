//! Medium Feed - recent posts for the portfolio's writing section
//!
//! Fetches a user's Medium RSS feed and reduces each item to title, link,
//! publication time and a short plain-text excerpt. The network call and the
//! parsing are separate so the parser can run on a stored feed.

use chrono::DateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::output::{write_atomic, OutputError};

pub const DEFAULT_USERNAME: &str = "vjmourya";
pub const DEFAULT_MAX_POSTS: usize = 6;
pub const EXCERPT_LENGTH: usize = 200;
pub const UNTITLED: &str = "Untitled";

/// Where the page expects the posts document, relative to the site root.
pub const POSTS_ASSET_PATH: &str = "assets/medium_posts.json";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse feed: {0}")]
    Parse(#[from] rss::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub username: String,
    pub max_posts: usize,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            max_posts: DEFAULT_MAX_POSTS,
            timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    pub fn feed_url(&self) -> String {
        format!("https://medium.com/feed/@{}", self.username.trim())
    }

    pub fn profile_url(&self) -> String {
        format!("https://medium.com/@{}", self.username.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediumPost {
    pub title: String,
    pub link: Option<String>,
    /// Publication time in UTC, `YYYY-MM-DDTHH:MM:SS`, no offset.
    pub date: Option<String>,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostsDocument {
    pub source: String,
    pub posts: Vec<MediumPost>,
}

impl PostsDocument {
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Download the raw feed body.
pub fn fetch_feed(config: &FeedConfig) -> Result<Vec<u8>, FeedError> {
    let url = config.feed_url();
    let http_err = |source: reqwest::Error| FeedError::Http {
        url: url.clone(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("certforge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(http_err)?;

    tracing::info!(%url, "fetching feed");
    let body = client
        .get(&url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(http_err)?;

    tracing::debug!(%url, bytes = body.len(), "feed fetched");
    Ok(body.to_vec())
}

/// Reduce an RSS document to at most `max_posts` posts, in feed order.
pub fn parse_feed(body: &[u8], max_posts: usize) -> Result<Vec<MediumPost>, FeedError> {
    let channel = rss::Channel::read_from(body)?;
    let posts: Vec<_> = channel
        .items()
        .iter()
        .take(max_posts)
        .map(post_from_item)
        .collect();
    tracing::debug!(items = channel.items().len(), kept = posts.len(), "feed parsed");
    Ok(posts)
}

fn post_from_item(item: &rss::Item) -> MediumPost {
    // Summary first, full content only when there is none.
    let body = item
        .description()
        .filter(|s| !s.is_empty())
        .or_else(|| item.content().filter(|s| !s.is_empty()))
        .unwrap_or_default();

    MediumPost {
        title: item.title().unwrap_or(UNTITLED).to_string(),
        link: item.link().map(str::to_string),
        date: item.pub_date().and_then(publication_time),
        excerpt: excerpt(body, EXCERPT_LENGTH),
    }
}

/// RFC 2822 `pubDate` to naive UTC ISO time; unparseable dates become `None`.
pub fn publication_time(raw: &str) -> Option<String> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(dt) => Some(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()),
        Err(e) => {
            tracing::debug!(pub_date = raw, error = %e, "unparseable pubDate");
            None
        }
    }
}

/// Entity-decoded, whitespace-collapsed text cut to `length` characters,
/// with `…` appended when anything was cut.
pub fn excerpt(text: &str, length: usize) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > length {
        let mut cut: String = collapsed.chars().take(length).collect();
        cut.push('…');
        cut
    } else {
        collapsed
    }
}

pub fn build_document(config: &FeedConfig, posts: Vec<MediumPost>) -> PostsDocument {
    PostsDocument {
        source: config.profile_url(),
        posts,
    }
}

pub fn write_posts(doc: &PostsDocument, dest: &Path) -> Result<(), FeedError> {
    let json = doc.to_pretty_json()?;
    write_atomic(dest, json.as_bytes())?;
    Ok(())
}

/// Fetch, parse and write in one go; returns the number of posts written.
pub fn refresh_posts(config: &FeedConfig, dest: &Path) -> Result<usize, FeedError> {
    let body = fetch_feed(config)?;
    let posts = parse_feed(&body, config.max_posts)?;
    let count = posts.len();
    write_posts(&build_document(config, posts), dest)?;
    tracing::info!(path = %dest.display(), posts = count, "posts written");
    Ok(count)
}

pub fn default_output(root: &Path) -> PathBuf {
    root.join(POSTS_ASSET_PATH)
}
