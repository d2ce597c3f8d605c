//! Embed configuration read from host element attributes.
//!
//! The host page declares an embed with a container element:
//!
//! ```html
//! <div id="medium-embed-container"
//!      data-medium-url="https://medium.com/feed/@someone"
//!      data-show-title="true"
//!      data-article-count="3"
//!      data-layout="card"
//!      data-cards-per-row="3"></div>
//! ```
//!
//! Attributes are read once into an immutable [`EmbedConfig`]. Boolean
//! attributes are true only for the exact string `"true"`; numeric
//! attributes take their leading integer and fall back to defaults when
//! absent, unparseable, or not positive.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use medium_embed::{EmbedConfig, Layout};
//!
//! let attrs: HashMap<String, String> = [
//!     ("data-medium-url", "https://medium.com/feed/@someone"),
//!     ("data-layout", "card"),
//!     ("data-article-count", "abc"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let config = EmbedConfig::from_attributes(&attrs).unwrap();
//! assert_eq!(config.layout(), Layout::Card);
//! assert_eq!(config.article_count(), 5);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::error::ConfigError;
use crate::render::{escape_html, Layout};

pub const ATTR_FEED_URL: &str = "data-medium-url";
pub const ATTR_SHOW_TITLE: &str = "data-show-title";
pub const ATTR_SHOW_SUBTITLE: &str = "data-show-subtitle";
pub const ATTR_SHOW_FEATURED_IMAGE: &str = "data-show-featured-image";
pub const ATTR_SHOW_AUTHOR: &str = "data-show-author";
pub const ATTR_SHOW_DATE: &str = "data-show-date";
pub const ATTR_ARTICLE_COUNT: &str = "data-article-count";
pub const ATTR_LAYOUT: &str = "data-layout";
pub const ATTR_CARDS_PER_ROW: &str = "data-cards-per-row";

/// Id of the container element the embed looks for first.
pub const HOST_ELEMENT_ID: &str = "medium-embed-container";

pub const DEFAULT_ARTICLE_COUNT: usize = 5;
pub const DEFAULT_CARDS_PER_ROW: usize = 2;
/// Tailwind ships `grid-cols-1` through `grid-cols-12`.
pub const MAX_CARDS_PER_ROW: usize = 12;

static HOST_BY_ID: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#medium-embed-container").expect("static selector"));
static HOST_BY_ATTR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-medium-url]").expect("static selector"));

/// Read-only view over a host element's attributes.
pub trait AttributeSource {
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> AttributeSource for HashMap<String, String, S> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Which post fields are rendered. Each flag is independent.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub title: bool,
    pub subtitle: bool,
    pub featured_image: bool,
    pub author: bool,
    pub date: bool,
}

impl Visibility {
    /// Every field shown.
    pub const ALL: Self = Self {
        title: true,
        subtitle: true,
        featured_image: true,
        author: true,
        date: true,
    };
}

/// Display options for one embed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    feed_url: Url,
    visibility: Visibility,
    article_count: usize,
    layout: Layout,
    cards_per_row: usize,
}

impl EmbedConfig {
    /// Config for `feed_url` with every field hidden and default counts.
    pub fn new(feed_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            feed_url: parse_feed_url(feed_url)?,
            visibility: Visibility::default(),
            article_count: DEFAULT_ARTICLE_COUNT,
            layout: Layout::Default,
            cards_per_row: DEFAULT_CARDS_PER_ROW,
        })
    }

    /// Build a config from host element attributes.
    pub fn from_attributes(attrs: &impl AttributeSource) -> Result<Self, ConfigError> {
        let feed_url = attrs
            .attribute(ATTR_FEED_URL)
            .ok_or(ConfigError::MissingAttribute(ATTR_FEED_URL))?;

        let flag = |name: &str| attrs.attribute(name) == Some("true");

        let visibility = Visibility {
            title: flag(ATTR_SHOW_TITLE),
            subtitle: flag(ATTR_SHOW_SUBTITLE),
            featured_image: flag(ATTR_SHOW_FEATURED_IMAGE),
            author: flag(ATTR_SHOW_AUTHOR),
            date: flag(ATTR_SHOW_DATE),
        };

        let layout = attrs
            .attribute(ATTR_LAYOUT)
            .map_or(Layout::Default, Layout::from_attr);

        Ok(Self::new(feed_url)?
            .with_visibility(visibility)
            .with_article_count(parse_count(attrs.attribute(ATTR_ARTICLE_COUNT)))
            .with_layout(layout)
            .with_cards_per_row(parse_count(attrs.attribute(ATTR_CARDS_PER_ROW))))
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Zero falls back to the default count.
    #[must_use]
    pub fn with_article_count(mut self, count: Option<usize>) -> Self {
        self.article_count = count.filter(|&n| n > 0).unwrap_or(DEFAULT_ARTICLE_COUNT);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Zero falls back to the default; values above the grid maximum are clamped.
    #[must_use]
    pub fn with_cards_per_row(mut self, cards: Option<usize>) -> Self {
        self.cards_per_row = cards
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CARDS_PER_ROW)
            .min(MAX_CARDS_PER_ROW);
        self
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn article_count(&self) -> usize {
        self.article_count
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn cards_per_row(&self) -> usize {
        self.cards_per_row
    }

    /// Host element markup that reproduces this config.
    pub fn to_host_snippet(&self) -> String {
        let v = self.visibility;
        let attrs = [
            (ATTR_FEED_URL, escape_html(self.feed_url.as_str())),
            (ATTR_SHOW_TITLE, v.title.to_string()),
            (ATTR_SHOW_SUBTITLE, v.subtitle.to_string()),
            (ATTR_SHOW_FEATURED_IMAGE, v.featured_image.to_string()),
            (ATTR_SHOW_AUTHOR, v.author.to_string()),
            (ATTR_SHOW_DATE, v.date.to_string()),
            (ATTR_ARTICLE_COUNT, self.article_count.to_string()),
            (ATTR_LAYOUT, self.layout.as_str().to_string()),
            (ATTR_CARDS_PER_ROW, self.cards_per_row.to_string()),
        ];

        let mut html = format!("<div id=\"{HOST_ELEMENT_ID}\"");
        for (name, value) in attrs {
            html.push_str(&format!("\n     {name}=\"{value}\""));
        }
        html.push_str("></div>");
        html
    }
}

/// Attributes of a host element found in page markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostElement {
    attributes: BTreeMap<String, String>,
}

impl HostElement {
    /// Find the host element in `html`: the `#medium-embed-container`
    /// element, else the first element carrying `data-medium-url`.
    pub fn parse(html: &str) -> Result<Self, ConfigError> {
        let document = Html::parse_document(html);
        let element = document
            .select(&HOST_BY_ID)
            .next()
            .or_else(|| document.select(&HOST_BY_ATTR).next())
            .ok_or(ConfigError::HostElementNotFound)?;

        let attributes = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(Self { attributes })
    }

    pub fn to_config(&self) -> Result<EmbedConfig, ConfigError> {
        EmbedConfig::from_attributes(self)
    }
}

impl AttributeSource for HostElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.attribute(name)
    }
}

fn parse_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFeedUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

/// Positive leading integer of an attribute value, if any.
fn parse_count(raw: Option<&str>) -> Option<usize> {
    parse_leading_int(raw?)
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// Integer prefix of `raw` after leading whitespace (`"3 posts"` is 3).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
