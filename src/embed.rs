//! One embed instance: Config → Fetch → Extract → Render → Mount.
//!
//! Each [`MediumEmbed`] owns its configuration, feed source and host, so
//! any number of embeds can run on one page without sharing state.
//!
//! # Example
//!
//! ```rust,no_run
//! use medium_embed::{EmbedConfig, FeedFetcher, MarkupHost, MediumEmbed, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let config = EmbedConfig::new("https://medium.com/feed/@someone")?;
//! let host = MarkupHost::new().with_content_height(600);
//!
//! let mut embed = MediumEmbed::new(config, FeedFetcher::new(&settings)?, host, settings.mount_options());
//! let outcome = embed.load().await;
//! println!("{outcome:?}");
//! println!("{}", embed.into_host().inner_html());
//! # Ok(())
//! # }
//! ```

use tracing::{error, info, warn};

use crate::config::EmbedConfig;
use crate::error::{EmbedError, FeedError};
use crate::feed::FeedSource;
use crate::mount::{EmbedHost, MountController, MountOptions, MountState};
use crate::render::{render_document, RenderedMarkup};

/// How a load attempt ended.
#[derive(Debug)]
pub enum EmbedOutcome {
    /// The frame is visible at `height_px`.
    Settled { height_px: u32 },
    /// The host shows the error message.
    Failed(EmbedError),
}

impl EmbedOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

pub struct MediumEmbed<S, H> {
    config: EmbedConfig,
    source: S,
    controller: MountController<H>,
}

impl<S: FeedSource, H: EmbedHost> MediumEmbed<S, H> {
    pub fn new(config: EmbedConfig, source: S, host: H, options: MountOptions) -> Self {
        Self {
            config,
            source,
            controller: MountController::new(host, options),
        }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn state(&self) -> MountState {
        self.controller.state()
    }

    pub fn host(&self) -> &H {
        self.controller.host()
    }

    pub fn into_host(self) -> H {
        self.controller.into_host()
    }

    /// Run the whole pipeline once. Any failure replaces the host content
    /// with the error message; nothing is retried.
    pub async fn load(&mut self) -> EmbedOutcome {
        if let Err(e) = self.controller.start() {
            return EmbedOutcome::Failed(e.into());
        }

        match self.run().await {
            Ok(height_px) => {
                info!(feed = %self.config.feed_url(), height_px, "Embed settled");
                EmbedOutcome::Settled { height_px }
            }
            Err(e) => {
                error!(feed = %self.config.feed_url(), "Error fetching Medium posts: {}", e);
                if let Err(mount_err) = self.controller.fail() {
                    warn!("Could not show error message: {}", mount_err);
                }
                EmbedOutcome::Failed(e)
            }
        }
    }

    async fn run(&mut self) -> Result<u32, EmbedError> {
        let document = render_feed(&self.config, &self.source).await?;
        let signals = self.controller.mount(document)?;
        Ok(self.controller.settle(signals).await?)
    }
}

/// Fetch the configured feed and render it, without mounting.
pub async fn render_feed<S: FeedSource + ?Sized>(
    config: &EmbedConfig,
    source: &S,
) -> Result<RenderedMarkup, FeedError> {
    let posts = source
        .fetch_posts(config.feed_url(), config.article_count())
        .await?;
    Ok(render_document(&posts, config))
}
