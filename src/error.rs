//! Error types for each stage of the embed pipeline.
//!
//! - [`ConfigError`]: host attributes or settings could not be turned into a config
//! - [`FeedError`]: the feed proxy call failed
//! - [`MountError`]: the mount controller was driven out of order
//! - [`EmbedError`]: the single failure a caller observes for a load attempt

use std::path::PathBuf;

use thiserror::Error;

/// Message shown in place of the embed when a load attempt fails.
pub const FEED_LOAD_ERROR_MESSAGE: &str = "Error loading Medium posts. Please try again later.";

/// Configuration errors, raised once while building an [`EmbedConfig`](crate::EmbedConfig)
/// or loading [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("invalid feed URL {url:?}: {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("no host element with a data-medium-url attribute found")]
    HostElementNotFound,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Feed proxy errors. Every variant means the feed is unavailable.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("feed service returned HTTP {0}")]
    Status(u16),

    #[error("malformed feed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("feed service reported status {status:?}: {message}")]
    Upstream { status: String, message: String },

    #[error("invalid feed service endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Mount controller errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("cannot {operation} while {from}")]
    InvalidTransition {
        from: &'static str,
        operation: &'static str,
    },
}

/// The failure a load attempt ends with. There is no distinction between
/// transient and permanent causes; every variant is terminal for the attempt.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("failed to fetch Medium feed: {0}")]
    Feed(#[from] FeedError),

    #[error("failed to mount embed: {0}")]
    Mount(#[from] MountError),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
