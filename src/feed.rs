//! Medium feed retrieval via the rss2json conversion service.
//!
//! Medium publishes RSS only. The rss2json proxy converts a feed to JSON:
//!
//! ```text
//! GET https://api.rss2json.com/v1/api.json?rss_url=https%3A%2F%2Fmedium.com%2Ffeed%2F%40someone
//!
//! { "status": "ok", "items": [ { "title", "link", "author", "pubDate", "description" }, ... ] }
//! ```
//!
//! One request per load, no retries. Any failure surfaces as a [`FeedError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use medium_embed::{FeedFetcher, FeedSource, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let fetcher = FeedFetcher::new(&Settings::default())?;
//! let url = url::Url::parse("https://medium.com/feed/@someone")?;
//! for post in fetcher.fetch_posts(&url, 3).await? {
//!     println!("{} ({})", post.title, post.link);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::FeedError;
use crate::http_client::HttpClient;
use crate::settings::Settings;

/// Public rss2json endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";

/// One feed item, as delivered by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub author: String,
    /// Publish date in the service's format (`2024-03-04 12:30:00`).
    #[serde(rename = "pubDate", deserialize_with = "null_as_empty")]
    pub pub_date: String,
    /// Raw HTML fragment.
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
}

/// The service sends `null` for fields some feeds leave out.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source of posts for an embed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// At most `count` posts from `feed_url`, in feed order.
    async fn fetch_posts(&self, feed_url: &Url, count: usize) -> Result<Vec<Post>, FeedError>;
}

/// Fetches posts through the feed-to-JSON proxy.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: HttpClient,
    endpoint: String,
}

impl FeedFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FeedError> {
        Url::parse(&settings.endpoint).map_err(|e| FeedError::InvalidEndpoint {
            endpoint: settings.endpoint.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: HttpClient::new(settings.timeout())?,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, feed_url: &Url) -> String {
        format!(
            "{}?rss_url={}",
            self.endpoint,
            urlencoding::encode(feed_url.as_str())
        )
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    #[instrument(skip(self), fields(feed = %feed_url))]
    async fn fetch_posts(&self, feed_url: &Url, count: usize) -> Result<Vec<Post>, FeedError> {
        let request_url = self.request_url(feed_url);
        debug!("Fetching feed from {}", request_url);

        let response = self.client.get(&request_url).await?;
        let http_status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<FeedResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !http_status.is_success() => {
                return Err(FeedError::Status(http_status.as_u16()))
            }
            Err(e) => return Err(FeedError::Decode(e)),
        };

        if parsed.status != STATUS_OK {
            return Err(FeedError::Upstream {
                status: parsed.status,
                message: parsed.message.unwrap_or_default(),
            });
        }
        if !http_status.is_success() {
            return Err(FeedError::Status(http_status.as_u16()));
        }

        let total = parsed.items.len();
        let mut posts = parsed.items;
        posts.truncate(count);
        info!(total, kept = posts.len(), "Feed loaded");

        Ok(posts)
    }
}

const STATUS_OK: &str = "ok";

// ============================================================================
// rss2json Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    items: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = "https://medium.com/feed/@acct";

    fn items(n: usize) -> Vec<serde_json::Value> {
        (1..=n)
            .map(|i| {
                json!({
                    "title": format!("Post {i}"),
                    "link": format!("https://medium.com/@acct/post-{i}"),
                    "author": "Acct",
                    "pubDate": "2024-03-04 12:30:00",
                    "description": format!("<h4>Sub {i}</h4>"),
                    "guid": format!("https://medium.com/p/{i}"),
                    "categories": ["rust"],
                })
            })
            .collect()
    }

    async fn fetcher_for(server: &MockServer) -> FeedFetcher {
        let settings = Settings {
            endpoint: format!("{}/v1/api.json", server.uri()),
            ..Settings::default()
        };
        FeedFetcher::new(&settings).unwrap()
    }

    fn feed_url() -> Url {
        Url::parse(FEED).unwrap()
    }

    #[test]
    fn request_url_encodes_feed() {
        let fetcher = FeedFetcher::new(&Settings::default()).unwrap();
        assert_eq!(
            fetcher.request_url(&feed_url()),
            "https://api.rss2json.com/v1/api.json?rss_url=https%3A%2F%2Fmedium.com%2Ffeed%2F%40acct"
        );
    }

    #[test]
    fn post_deserializes_with_missing_fields() {
        let post: Post = serde_json::from_value(json!({ "title": "Only title" })).unwrap();
        assert_eq!(post.title, "Only title");
        assert!(post.description.is_empty());
        assert!(post.pub_date.is_empty());
    }

    #[test]
    fn post_deserializes_null_fields_as_empty() {
        let post: Post = serde_json::from_value(json!({
            "title": "t",
            "author": null,
            "pubDate": null,
            "description": null,
        }))
        .unwrap();
        assert_eq!(post.title, "t");
        assert!(post.author.is_empty());
        assert!(post.pub_date.is_empty());
        assert!(post.description.is_empty());
    }

    #[tokio::test]
    async fn null_author_does_not_fail_the_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "items": [{ "title": "t", "author": null }],
            })))
            .mount(&server)
            .await;

        let posts = fetcher_for(&server).await.fetch_posts(&feed_url(), 5).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "t");
        assert!(posts[0].author.is_empty());
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let settings = Settings {
            endpoint: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            FeedFetcher::new(&settings),
            Err(FeedError::InvalidEndpoint { endpoint, .. }) if endpoint == "not a url"
        ));
    }

    #[tokio::test]
    async fn truncates_to_count_preserving_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .and(query_param("rss_url", FEED))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "items": items(5) })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let posts = fetcher_for(&server).await.fetch_posts(&feed_url(), 3).await.unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Post 1", "Post 2", "Post 3"]);
        assert_eq!(posts[0].pub_date, "2024-03-04 12:30:00");
    }

    #[tokio::test]
    async fn returns_all_when_feed_is_shorter_than_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "items": items(2) })),
            )
            .mount(&server)
            .await;

        let posts = fetcher_for(&server).await.fetch_posts(&feed_url(), 5).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn upstream_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "status": "error",
                "message": "Cannot download this RSS feed, make sure the Rss URL is correct."
            })))
            .mount(&server)
            .await;

        let err = fetcher_for(&server)
            .await
            .fetch_posts(&feed_url(), 5)
            .await
            .unwrap_err();
        match err {
            FeedError::Upstream { status, message } => {
                assert_eq!(status, "error");
                assert!(message.starts_with("Cannot download"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn http_error_without_json_fails_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = fetcher_for(&server)
            .await
            .fetch_posts(&feed_url(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Status(503)));
    }

    #[tokio::test]
    async fn malformed_body_fails_with_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss>not json</rss>"))
            .mount(&server)
            .await;

        let err = fetcher_for(&server)
            .await
            .fetch_posts(&feed_url(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_service_fails_with_network() {
        let settings = Settings {
            endpoint: "http://127.0.0.1:1/v1/api.json".to_string(),
            ..Settings::default()
        };
        let err = FeedFetcher::new(&settings)
            .unwrap()
            .fetch_posts(&feed_url(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Network(_)));
    }
}
