//! Shared fixtures: a mock rss2json service.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FEED: &str = "https://medium.com/feed/@acct";
pub const API_PATH: &str = "/v1/api.json";

/// A feed item in rss2json's shape. Odd items use the public layout
/// (`h3` + `h4`), even items the member-only snippet.
pub fn item(i: usize) -> Value {
    let description = if i % 2 == 1 {
        format!(
            r#"<h3>Post {i}</h3><h4>Subtitle {i}</h4><figure><img alt="" src="https://cdn-images-1.medium.com/max/1024/img-{i}.png"></figure><p>Body {i}</p>"#
        )
    } else {
        format!(
            r#"<div class="medium-feed-item"><p class="medium-feed-image"><a href="https://medium.com/p/{i}"><img src="https://cdn-images-1.medium.com/max/2600/img-{i}.jpeg" width="2000"></a></p><p class="medium-feed-snippet">Subtitle {i}</p><p class="medium-feed-link"><a href="https://medium.com/p/{i}">Continue reading on Medium »</a></p></div>"#
        )
    };

    json!({
        "title": format!("Post {i}"),
        "pubDate": format!("2024-03-{:02} 09:15:00", i),
        "link": format!("https://medium.com/@acct/post-{i}"),
        "guid": format!("https://medium.com/p/{i}"),
        "author": "Ada Author",
        "thumbnail": "",
        "description": description,
        "content": description,
        "enclosure": {},
        "categories": ["rust", "web"],
    })
}

/// Mock service answering with `n` items for [`FEED`].
pub async fn feed_server(n: usize) -> MockServer {
    let server = MockServer::start().await;
    let items: Vec<Value> = (1..=n).map(item).collect();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("rss_url", FEED))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "feed": {
                "url": FEED,
                "title": "Stories by Ada Author on Medium",
                "link": "https://medium.com/@acct",
            },
            "items": items,
        })))
        .mount(&server)
        .await;

    server
}

/// Mock service reporting a failed conversion.
pub async fn failing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": "error",
            "message": "Cannot download this RSS feed, make sure the Rss URL is correct.",
        })))
        .mount(&server)
        .await;
    server
}

pub fn endpoint(server: &MockServer) -> String {
    format!("{}{API_PATH}", server.uri())
}
