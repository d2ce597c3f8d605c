//! Layout rendering into a standalone HTML document.
//!
//! Each layout implements [`LayoutTemplate`] and renders the same input:
//! the extracted [`PostView`]s plus the [`EmbedConfig`]. The result is
//! wrapped in a complete document (doctype, head with the Tailwind CDN
//! script, body) so it can be mounted in an isolated frame.
//!
//! | Layout | Template | Shape |
//! |--------|----------|-------|
//! | `default` | [`DefaultLayout`] | vertical list, image beside text |
//! | `card` | [`CardLayout`] | grid, `cards_per_row` columns |
//! | `artistic` | [`ArtisticLayout`] | rotated date stamp, image, call to action |
//!
//! # Example
//!
//! ```rust
//! use medium_embed::{render_document, EmbedConfig, Layout, Post, Visibility};
//!
//! let config = EmbedConfig::new("https://medium.com/feed/@someone")
//!     .unwrap()
//!     .with_layout(Layout::Card)
//!     .with_visibility(Visibility { title: true, ..Visibility::default() });
//! let posts = vec![Post { title: "Hello".into(), ..Post::default() }];
//!
//! let document = render_document(&posts, &config);
//! assert!(document.as_str().starts_with("<!DOCTYPE html>"));
//! assert_eq!(document.post_count(), 1);
//! ```

mod artistic;
mod card;
mod default;

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::EmbedConfig;
use crate::extract::{extract_featured_image, extract_subtitle};
use crate::feed::Post;

pub use artistic::ArtisticLayout;
pub use card::CardLayout;
pub use default::DefaultLayout;

/// Class carried by every rendered post entry.
pub const POST_CLASS: &str = "embed-post";

pub const DOCUMENT_HEADING: &str = "Latest Medium Posts";

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Display format for publish dates (`Mar 4, 2024`).
const DATE_FORMAT: &str = "%b %-d, %Y";

/// Layout selected by the `data-layout` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    #[default]
    Default,
    Card,
    Artistic,
}

impl Layout {
    /// Parse an attribute value. Unrecognised values select [`Layout::Default`].
    pub fn from_attr(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Self::Default,
            "card" => Self::Card,
            "artistic" => Self::Artistic,
            other => {
                debug!("Unknown layout {:?}, using default", other);
                Self::Default
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Card => "card",
            Self::Artistic => "artistic",
        }
    }

    pub fn template(self) -> &'static dyn LayoutTemplate {
        match self {
            Self::Default => &DefaultLayout,
            Self::Card => &CardLayout,
            Self::Artistic => &ArtisticLayout,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders post entries for one layout.
///
/// Implementations are stateless. Every entry must carry [`POST_CLASS`]
/// and may only show the fields present in its [`PostView`].
pub trait LayoutTemplate: Send + Sync {
    fn name(&self) -> &'static str;

    /// Classes for the element wrapping the heading and posts.
    fn container_class(&self) -> &'static str {
        "max-w-2xl mx-auto"
    }

    /// Markup for all posts, in order.
    fn render_posts(&self, posts: &[PostView], config: &EmbedConfig) -> RenderedMarkup;
}

/// A post after extraction, with hidden fields removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostView {
    pub link: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl PostView {
    /// Apply the config's visibility flags to `post`. Extraction only runs
    /// for fields that are shown.
    pub fn from_post(post: &Post, config: &EmbedConfig) -> Self {
        let visible = config.visibility();

        Self {
            link: post.link.clone(),
            title: visible.title.then(|| post.title.clone()),
            subtitle: visible
                .subtitle
                .then(|| extract_subtitle(&post.description))
                .filter(|s| !s.is_empty()),
            featured_image: visible
                .featured_image
                .then(|| extract_featured_image(&post.description))
                .flatten(),
            author: visible.author.then(|| post.author.clone()),
            date: visible.date.then(|| format_date(&post.pub_date)),
        }
    }

    /// Author and date joined by `" - "`, whichever are shown.
    pub fn byline(&self) -> Option<String> {
        match (&self.author, &self.date) {
            (Some(author), Some(date)) => Some(format!("{} - {}", escape_html(author), escape_html(date))),
            (Some(author), None) => Some(escape_html(author)),
            (None, Some(date)) => Some(escape_html(date)),
            (None, None) => None,
        }
    }
}

/// Rendered HTML, either post entries or a full document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMarkup(String);

impl RenderedMarkup {
    pub fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of post entries in the markup.
    pub fn post_count(&self) -> usize {
        self.0.matches(&format!("class=\"{POST_CLASS} ")).count()
    }
}

impl fmt::Display for RenderedMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render `posts` with the configured layout as a standalone document.
pub fn render_document(posts: &[Post], config: &EmbedConfig) -> RenderedMarkup {
    let template = config.layout().template();
    let views: Vec<PostView> = posts.iter().map(|p| PostView::from_post(p, config)).collect();
    debug!(layout = template.name(), posts = views.len(), "Rendering document");

    let body = template.render_posts(&views, config);
    RenderedMarkup(wrap_document(body.as_str(), template.container_class()))
}

fn wrap_document(body: &str, container_class: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <script src="{TAILWIND_CDN}"></script>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; }}
  </style>
</head>
<body class="bg-white p-6">
  <div class="{container_class}">
    <h2 class="text-2xl font-bold mb-4 text-gray-900">{DOCUMENT_HEADING}</h2>
{body}
  </div>
</body>
</html>
"#
    )
}

/// Format a feed publish date for display. Unrecognised input is returned as-is.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }

    raw.to_string()
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Title heading linking to the post.
fn title_html(view: &PostView, class: &str) -> Option<String> {
    view.title.as_ref().map(|title| {
        format!(
            r#"<h3 class="{class}"><a href="{link}" target="_blank" rel="noopener noreferrer" class="text-gray-800 hover:underline">{title}</a></h3>"#,
            link = escape_html(&view.link),
            title = escape_html(title),
        )
    })
}

fn subtitle_html(view: &PostView, class: &str) -> Option<String> {
    view.subtitle
        .as_ref()
        .map(|subtitle| format!(r#"<p class="{class}">{}</p>"#, escape_html(subtitle)))
}

fn image_html(view: &PostView, class: &str) -> Option<String> {
    view.featured_image.as_ref().map(|src| {
        format!(
            r#"<img src="{}" alt="Featured image" class="{class}" loading="lazy">"#,
            escape_html(src)
        )
    })
}

fn link_html(view: &PostView, label: &str, class: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="{class}">{label}</a>"#,
        escape_html(&view.link)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Visibility;

    pub(super) fn sample_post(i: usize) -> Post {
        Post {
            title: format!("Title {i}"),
            link: format!("https://medium.com/@acct/post-{i}"),
            author: "Ada Author".to_string(),
            pub_date: "2024-03-04 12:30:00".to_string(),
            description: format!(
                r#"<h3>Title {i}</h3><h4>Subtitle {i}</h4><figure><img src="https://cdn/img-{i}.png"></figure><p>Body</p>"#
            ),
        }
    }

    pub(super) fn config(layout: Layout, visibility: Visibility) -> EmbedConfig {
        EmbedConfig::new("https://medium.com/feed/@acct")
            .unwrap()
            .with_layout(layout)
            .with_visibility(visibility)
    }

    const LAYOUTS: [Layout; 3] = [Layout::Default, Layout::Card, Layout::Artistic];

    #[test]
    fn layout_parsing_is_total() {
        assert_eq!(Layout::from_attr("default"), Layout::Default);
        assert_eq!(Layout::from_attr(" Card "), Layout::Card);
        assert_eq!(Layout::from_attr("ARTISTIC"), Layout::Artistic);
        assert_eq!(Layout::from_attr("masonry"), Layout::Default);
        assert_eq!(Layout::from_attr(""), Layout::Default);
    }

    #[test]
    fn layout_names_match_templates() {
        for layout in LAYOUTS {
            assert_eq!(layout.template().name(), layout.as_str());
        }
    }

    #[test]
    fn every_layout_renders_every_post() {
        let posts: Vec<Post> = (1..=4).map(sample_post).collect();
        for layout in LAYOUTS {
            let doc = render_document(&posts, &config(layout, Visibility::ALL));
            assert_eq!(doc.post_count(), 4, "layout {layout}");
            for i in 1..=4 {
                assert!(doc.as_str().contains(&format!("Title {i}")), "layout {layout}");
            }
        }
    }

    #[test]
    fn document_is_standalone() {
        let doc = render_document(&[sample_post(1)], &config(Layout::Default, Visibility::ALL));
        let html = doc.as_str();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<script src="https://cdn.tailwindcss.com"></script>"#));
        assert!(html.contains(DOCUMENT_HEADING));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn all_flags_off_renders_empty_entries() {
        let posts: Vec<Post> = (1..=2).map(sample_post).collect();
        for layout in LAYOUTS {
            let doc = render_document(&posts, &config(layout, Visibility::default()));
            let html = doc.as_str();
            assert_eq!(doc.post_count(), 2, "layout {layout}");
            assert!(!html.contains("Title 1"), "layout {layout}");
            assert!(!html.contains("Subtitle 1"), "layout {layout}");
            assert!(!html.contains("img-1.png"), "layout {layout}");
            assert!(!html.contains("Ada Author"), "layout {layout}");
            assert!(!html.contains("Mar 4, 2024"), "layout {layout}");
        }
    }

    #[test]
    fn each_flag_removes_only_its_field() {
        let post = sample_post(1);
        let markers = [
            ("title", "Title 1"),
            ("subtitle", "Subtitle 1"),
            ("featured_image", "img-1.png"),
            ("author", "Ada Author"),
            ("date", "Mar 4, 2024"),
        ];

        for layout in LAYOUTS {
            for (field, _) in markers {
                let mut visibility = Visibility::ALL;
                match field {
                    "title" => visibility.title = false,
                    "subtitle" => visibility.subtitle = false,
                    "featured_image" => visibility.featured_image = false,
                    "author" => visibility.author = false,
                    _ => visibility.date = false,
                }

                let html = render_document(std::slice::from_ref(&post), &config(layout, visibility))
                    .into_string();
                for (other, marker) in markers {
                    assert_eq!(
                        html.contains(marker),
                        other != field,
                        "layout {layout}, hiding {field}, checking {other}"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_post_list_renders_valid_document() {
        for layout in LAYOUTS {
            let doc = render_document(&[], &config(layout, Visibility::ALL));
            assert_eq!(doc.post_count(), 0);
            assert!(doc.as_str().contains(DOCUMENT_HEADING));
        }
    }

    #[test]
    fn text_is_escaped() {
        let post = Post {
            title: r#"<script>alert("x")</script>"#.to_string(),
            link: r#"https://medium.com/p?a=1&b="2""#.to_string(),
            author: "A & B".to_string(),
            ..Post::default()
        };
        let html = render_document(&[post], &config(Layout::Default, Visibility::ALL)).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
        assert!(html.contains("a=1&amp;b=&quot;2&quot;"));
        assert!(html.contains("A &amp; B"));
    }

    #[test]
    fn byline_joins_author_and_date() {
        let mut view = PostView {
            author: Some("Ada".to_string()),
            date: Some("Mar 4, 2024".to_string()),
            ..PostView::default()
        };
        assert_eq!(view.byline().as_deref(), Some("Ada - Mar 4, 2024"));
        view.date = None;
        assert_eq!(view.byline().as_deref(), Some("Ada"));
        view.author = None;
        assert_eq!(view.byline(), None);
    }

    #[test]
    fn dates_are_formatted() {
        assert_eq!(format_date("2024-03-04 12:30:00"), "Mar 4, 2024");
        assert_eq!(format_date("2024-12-25T08:00:00Z"), "Dec 25, 2024");
        assert_eq!(format_date("Mon, 04 Mar 2024 12:30:00 GMT"), "Mar 4, 2024");
        assert_eq!(format_date("2024-03-04"), "Mar 4, 2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn empty_subtitle_is_hidden() {
        let post = Post {
            description: "<p>No subtitle here</p>".to_string(),
            ..sample_post(1)
        };
        let view = PostView::from_post(&post, &config(Layout::Default, Visibility::ALL));
        assert_eq!(view.subtitle, None);
        assert_eq!(view.featured_image, None);
    }
}
