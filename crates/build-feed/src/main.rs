use anyhow::{Context, Result};
use clap::Parser;
use shared::{Channel, ChannelConfig, FeedTemplate, Sources};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build-feed")]
#[command(about = "Build a podcast RSS feed from a directory of MP3 files")]
struct Args {
    /// MP3 files or directories containing them (defaults to the current directory)
    sources: Vec<PathBuf>,

    /// Channel definition file (YAML)
    #[arg(short, long)]
    channel: Option<PathBuf>,

    /// Custom handlebars template for the feed
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Write the feed to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Podcast title
    #[arg(long)]
    title: Option<String>,

    /// Podcast home page
    #[arg(long)]
    url: Option<String>,

    /// Short description of the podcast
    #[arg(long)]
    description: Option<String>,

    /// Base URL the MP3 files are served from
    #[arg(long)]
    enclosure_base: Option<String>,

    /// Default author for episodes without an artist tag
    #[arg(long)]
    author: Option<String>,

    /// Default cover image URL
    #[arg(long)]
    image_url: Option<String>,

    /// iTunes category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> ChannelConfig {
        ChannelConfig {
            title: self.title.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
            enclosure_base: self.enclosure_base.clone(),
            author: self.author.clone(),
            image_url: self.image_url.clone(),
            categories: self.categories.clone(),
            ..ChannelConfig::default()
        }
    }

    fn sources(&self) -> Sources {
        match self.sources.as_slice() {
            [] => Sources::One(PathBuf::from(".")),
            [single] => Sources::One(single.clone()),
            many => Sources::Many(many.to_vec()),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = ChannelConfig::locate(args.channel.as_deref())
        .context("Failed to load channel definition")?
        .merge(args.overrides());
    let (options, categories) = config.into_options();
    debug!("Channel options: {:?}", options);

    let mut channel = Channel::new(args.sources(), options).context(
        "Cannot build the channel.\n\n\
        Set title, url, description and enclosure_base in channel.yml\n\
        or pass them as --title, --url, --description and --enclosure-base.",
    )?;
    for category in categories {
        channel.add_category(category);
    }

    eprintln!("✓ Found {} audio files", channel.source_files().len());

    let template = match &args.template {
        Some(path) => FeedTemplate::from_file(path),
        None => FeedTemplate::embedded(),
    }
    .context("Failed to load feed template")?;

    let rss = channel
        .render(&template)
        .context("Failed to generate feed")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rss)
                .with_context(|| format!("Failed to write feed to {}", path.display()))?;
            eprintln!("✅ Feed saved to: {}", path.display());
        }
        None => print!("{}", rss),
    }

    Ok(())
}
