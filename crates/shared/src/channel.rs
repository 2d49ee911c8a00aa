use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::info;

use crate::episode::{self, Episode, EpisodeDefaults};
use crate::error::{FeedError, Result};
use crate::metadata::{LoftyMetadataSource, MetadataSource};
use crate::render::FeedTemplate;
use crate::sources::{self, Sources};

/// Attributes every channel must have, in the order they are checked
pub const MANDATORY_ATTRIBUTES: [&str; 4] = ["title", "url", "description", "enclosure_base"];

const AUTHOR: &str = "author";
const IMAGE_URL: &str = "image_url";
const CATEGORIES: &str = "categories";

/// Named feed attributes handed to [`Channel::new`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOptions {
    entries: BTreeMap<String, String>,
}

impl ChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChannelOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

/// A podcast feed: channel attributes plus the audio files behind its episodes
pub struct Channel {
    title: String,
    url: String,
    description: String,
    enclosure_base: String,
    author: Option<String>,
    image_url: Option<String>,
    categories: Vec<String>,
    extra: BTreeMap<String, String>,
    source_files: Vec<PathBuf>,
    metadata: Box<dyn MetadataSource>,
}

impl Channel {
    /// Validate `options` and collect the audio files named by `sources`.
    ///
    /// The file list is fixed here; later filesystem changes are not picked up.
    pub fn new(sources: impl Into<Sources>, mut options: ChannelOptions) -> Result<Self> {
        let [title, url, description, enclosure_base] = MANDATORY_ATTRIBUTES.map(|attribute| {
            take_non_blank(&mut options, attribute).ok_or(FeedError::MissingAttribute { attribute })
        });
        let title = title?;
        let url = url?;
        let description = description?;
        let enclosure_base = enclosure_base?;

        let author = take_non_blank(&mut options, AUTHOR);
        let image_url = take_non_blank(&mut options, IMAGE_URL);
        options.remove(CATEGORIES);

        let source_files = sources::collect(&sources.into())?;
        info!("Channel \"{}\" has {} source files", title, source_files.len());

        Ok(Self {
            title,
            url,
            description,
            enclosure_base,
            author,
            image_url,
            categories: Vec::new(),
            extra: options.entries,
            source_files,
            metadata: Box::new(LoftyMetadataSource::new()),
        })
    }

    /// Replace the tag reader used to resolve episodes
    pub fn with_metadata_source(mut self, source: impl MetadataSource + 'static) -> Self {
        self.metadata = Box::new(source);
        self
    }

    pub fn add_category(&mut self, category: impl Into<String>) {
        self.categories.push(category.into());
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn enclosure_base(&self) -> &str {
        &self.enclosure_base
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Attributes that have no dedicated field, kept for the template
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Look up any attribute by its option name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "url" => Some(&self.url),
            "description" => Some(&self.description),
            "enclosure_base" => Some(&self.enclosure_base),
            AUTHOR => self.author(),
            IMAGE_URL => self.image_url(),
            _ => self.extra.get(name).map(String::as_str),
        }
    }

    pub fn source_files(&self) -> &[PathBuf] {
        &self.source_files
    }

    /// All episodes, newest first.
    ///
    /// Every call re-reads the files. One unreadable file fails the whole list.
    pub fn items(&self) -> Result<Vec<Episode>> {
        let defaults = EpisodeDefaults {
            author: self.author(),
            image_url: self.image_url(),
            enclosure_base: &self.enclosure_base,
        };

        let mut episodes = self
            .source_files
            .iter()
            .map(|path| episode::resolve(path, &defaults, self.metadata.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        // Stable, so equal dates keep source order
        episodes.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        Ok(episodes)
    }

    /// Render the feed with the given template
    pub fn render(&self, template: &FeedTemplate) -> Result<String> {
        let items = self.items()?;
        info!("Rendering {} episodes", items.len());
        template.render(self, &items)
    }

    /// Render the feed with the built-in RSS template
    pub fn to_rss(&self) -> Result<String> {
        self.render(&FeedTemplate::embedded()?)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("title", &self.title)
            .field("url", &self.url)
            .field("description", &self.description)
            .field("enclosure_base", &self.enclosure_base)
            .field("author", &self.author)
            .field("image_url", &self.image_url)
            .field("categories", &self.categories)
            .field("extra", &self.extra)
            .field("source_files", &self.source_files)
            .finish_non_exhaustive()
    }
}

fn take_non_blank(options: &mut ChannelOptions, name: &str) -> Option<String> {
    options.remove(name).filter(|value| !value.trim().is_empty())
}
