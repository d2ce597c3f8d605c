//! `medium-embed` - Medium feed widget renderer
//!
//! # Features
//!
//! - **Feed retrieval**: one request to the rss2json proxy, truncated to a count
//! - **Fragment extraction**: featured image and subtitle from post HTML
//! - **Layouts**: default list, card grid, artistic
//! - **Mounting**: placeholder, hidden frame, size settlement, reveal
//!
//! # Example
//!
//! ```rust,no_run
//! use medium_embed::{render_feed, EmbedConfig, FeedFetcher, Layout, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EmbedConfig::new("https://medium.com/feed/@someone")?
//!         .with_layout(Layout::Card)
//!         .with_article_count(Some(3));
//!     let fetcher = FeedFetcher::new(&Settings::default())?;
//!     let document = render_feed(&config, &fetcher).await?;
//!     println!("{document}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod feed;
pub mod http_client;
pub mod mount;
pub mod render;
pub mod settings;

pub use config::{AttributeSource, EmbedConfig, HostElement, Visibility};
pub use embed::{render_feed, EmbedOutcome, MediumEmbed};
pub use error::{ConfigError, EmbedError, FeedError, MountError, FEED_LOAD_ERROR_MESSAGE};
pub use extract::{extract_featured_image, extract_subtitle};
pub use feed::{FeedFetcher, FeedSource, Post};
pub use mount::{EmbedHost, FrameEvents, FrameSignals, FrameSpec, MarkupHost, MountController, MountOptions, MountState};
pub use render::{render_document, Layout, LayoutTemplate, PostView, RenderedMarkup};
pub use settings::Settings;

/// Version of medium-embed
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
