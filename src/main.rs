//! `medium-embed` CLI - render a Medium feed as an embeddable document

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use medium_embed::mount::error_html;
use medium_embed::{
    extract_featured_image, extract_subtitle, render_feed, EmbedConfig, FeedError, FeedFetcher,
    FeedSource, HostElement, Layout, MarkupHost, MediumEmbed, Settings, Visibility,
};

#[derive(Parser)]
#[command(name = "medium-embed")]
#[command(about = "Render a Medium feed as an embeddable, self-sizing HTML document")]
#[command(version)]
struct Cli {
    /// Settings file (default: ~/.config/medium-embed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a feed and render it as a standalone HTML document
    Render {
        #[command(flatten)]
        embed: EmbedArgs,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the mounted host element (iframe) assuming PX of content height
        #[arg(long, value_name = "PX")]
        mount_height: Option<u32>,
    },

    /// Fetch a feed and print its posts as JSON
    Posts {
        #[command(flatten)]
        embed: EmbedArgs,
    },

    /// Print the host element markup for the given options
    Snippet {
        #[command(flatten)]
        embed: EmbedArgs,
    },
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
struct EmbedArgs {
    /// Medium feed URL (e.g. https://medium.com/feed/@someone)
    #[arg(long, required_unless_present = "host")]
    url: Option<String>,

    /// Read options from host page markup instead of flags
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    host: Option<PathBuf>,

    /// Show post titles
    #[arg(long)]
    show_title: bool,

    /// Show post subtitles
    #[arg(long)]
    show_subtitle: bool,

    /// Show featured images
    #[arg(long)]
    show_featured_image: bool,

    /// Show post authors
    #[arg(long)]
    show_author: bool,

    /// Show publish dates
    #[arg(long)]
    show_date: bool,

    /// Show every field
    #[arg(long)]
    show_all: bool,

    /// Number of posts (default 5)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Layout: default, card, artistic
    #[arg(short, long, default_value = "default")]
    layout: String,

    /// Columns for the card layout (default 2)
    #[arg(long)]
    cards_per_row: Option<usize>,
}

impl EmbedArgs {
    fn to_config(&self) -> Result<EmbedConfig> {
        if let Some(path) = &self.host {
            let html = read_file(path)?;
            return HostElement::parse(&html)
                .and_then(|host| host.to_config())
                .with_context(|| format!("invalid host element in {}", path.display()));
        }

        let Some(url) = &self.url else {
            bail!("either --url or --host is required");
        };

        let visibility = if self.show_all {
            Visibility::ALL
        } else {
            Visibility {
                title: self.show_title,
                subtitle: self.show_subtitle,
                featured_image: self.show_featured_image,
                author: self.show_author,
                date: self.show_date,
            }
        };

        Ok(EmbedConfig::new(url)?
            .with_visibility(visibility)
            .with_article_count(self.count)
            .with_layout(Layout::from_attr(&self.layout))
            .with_cards_per_row(self.cards_per_row))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Render {
            embed,
            output,
            mount_height,
        } => {
            cmd_render(&embed.to_config()?, &settings, output.as_deref(), mount_height).await?;
        }
        Commands::Posts { embed } => {
            cmd_posts(&embed.to_config()?, &settings).await?;
        }
        Commands::Snippet { embed } => {
            println!("{}", embed.to_config()?.to_host_snippet());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn cmd_render(
    config: &EmbedConfig,
    settings: &Settings,
    output: Option<&Path>,
    mount_height: Option<u32>,
) -> Result<()> {
    let fetcher = match FeedFetcher::new(settings) {
        Ok(fetcher) => fetcher,
        Err(e) => return render_failed(config, e),
    };

    let html = if let Some(height_px) = mount_height {
        let host = MarkupHost::new().with_content_height(height_px);
        let mut embed = MediumEmbed::new(config.clone(), fetcher, host, settings.mount_options());
        let outcome = embed.load().await;
        let html = embed.into_host().inner_html();
        if !outcome.is_settled() {
            println!("{html}");
            bail!("failed to render {}", config.feed_url());
        }
        html
    } else {
        match render_feed(config, &fetcher).await {
            Ok(document) => document.into_string(),
            Err(e) => return render_failed(config, e),
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved {} bytes to {}", html.len(), path.display());
        }
        None => println!("{html}"),
    }

    Ok(())
}

/// Print the error message in place of the document and fail.
fn render_failed(config: &EmbedConfig, e: FeedError) -> Result<()> {
    tracing::error!("Error fetching Medium posts: {}", e);
    println!("{}", error_html());
    Err(e).with_context(|| format!("failed to render {}", config.feed_url()))
}

async fn cmd_posts(config: &EmbedConfig, settings: &Settings) -> Result<()> {
    let fetcher = FeedFetcher::new(settings)?;
    let posts = fetcher
        .fetch_posts(config.feed_url(), config.article_count())
        .await
        .with_context(|| format!("failed to fetch {}", config.feed_url()))?;

    let listing: Vec<serde_json::Value> = posts
        .iter()
        .map(|post| {
            serde_json::json!({
                "title": post.title,
                "link": post.link,
                "author": post.author,
                "pubDate": post.pub_date,
                "subtitle": extract_subtitle(&post.description),
                "featuredImage": extract_featured_image(&post.description),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
