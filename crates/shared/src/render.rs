//! Feed rendering
//!
//! A [`FeedTemplate`] is a handlebars template that receives the channel's
//! attributes at the top level and its episodes under `items`. Pass-through
//! attributes (language, copyright, ...) sit next to the typed ones, so a
//! template can use any key the channel definition provides.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::channel::Channel;
use crate::episode::Episode;
use crate::error::{FeedError, Result};

const FEED: &str = "feed";

/// Built-in RSS 2.0 template with iTunes podcast tags
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/channel.rss.hbs");

pub struct FeedTemplate {
    registry: Handlebars<'static>,
}

impl FeedTemplate {
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_TEMPLATE)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(escape_xml);
        registry.register_template_string(FEED, text)?;
        Ok(Self { registry })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| FeedError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Render `channel` with an already resolved, ordered episode list
    pub fn render(&self, channel: &Channel, items: &[Episode]) -> Result<String> {
        let view = FeedView {
            extra: channel.extra(),
            title: channel.title(),
            url: channel.url(),
            description: channel.description(),
            enclosure_base: channel.enclosure_base(),
            author: channel.author(),
            image_url: channel.image_url(),
            categories: channel.categories(),
            last_build_date: items.first().map(|e| e.pub_date.to_rfc2822()),
            items: items.iter().map(ItemView::from).collect(),
        };
        Ok(self.registry.render(FEED, &view)?)
    }
}

// Pass-through attributes come first so the typed fields win on a name clash.
#[derive(Serialize)]
struct FeedView<'a> {
    #[serde(flatten)]
    extra: &'a BTreeMap<String, String>,
    title: &'a str,
    url: &'a str,
    description: &'a str,
    enclosure_base: &'a str,
    author: Option<&'a str>,
    image_url: Option<&'a str>,
    categories: &'a [String],
    last_build_date: Option<String>,
    items: Vec<ItemView<'a>>,
}

#[derive(Serialize)]
struct ItemView<'a> {
    title: &'a str,
    artist: Option<&'a str>,
    summary: &'a str,
    duration: String,
    pub_date: String,
    image_url: Option<&'a str>,
    url: &'a str,
    file_name: &'a str,
    file_size: u64,
    guid: &'a str,
}

impl<'a> From<&'a Episode> for ItemView<'a> {
    fn from(episode: &'a Episode) -> Self {
        Self {
            title: &episode.title,
            artist: episode.artist.as_deref(),
            summary: &episode.summary,
            duration: episode.duration_hms(),
            pub_date: episode.pub_date.to_rfc2822(),
            image_url: episode.image_url.as_deref(),
            url: episode.url.as_str(),
            file_name: &episode.file_name,
            file_size: episode.file_size,
            guid: &episode.guid,
        }
    }
}

fn escape_xml(data: &str) -> String {
    quick_xml::escape::escape(data).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_xml_escaped() {
        let template = FeedTemplate::parse("<t a=\"{{a}}\">{{b}}</t>").unwrap();
        let data = serde_json::json!({ "a": r#"say "hi""#, "b": "Tom & Jerry's <best> ?a=b" });

        let text = template.registry.render(FEED, &data).unwrap();

        assert_eq!(
            text,
            "<t a=\"say &quot;hi&quot;\">Tom &amp; Jerry&apos;s &lt;best&gt; ?a=b</t>"
        );
    }

    #[test]
    fn test_embedded_template_parses() {
        assert!(FeedTemplate::embedded().is_ok());
    }

    #[test]
    fn test_embedded_template_declares_used_namespaces_only() {
        assert!(DEFAULT_TEMPLATE.contains("xmlns:itunes="));
        assert!(!DEFAULT_TEMPLATE.contains("xmlns:atom="));
    }

    #[test]
    fn test_broken_template_is_rejected() {
        let err = FeedTemplate::parse("{{#each items}}<item>").err().unwrap();
        assert!(matches!(err, FeedError::Template(_)));
    }

    #[test]
    fn test_missing_template_file() {
        let err = FeedTemplate::from_file(Path::new("/nonexistent/feed.hbs"))
            .err()
            .unwrap();
        assert!(matches!(err, FeedError::TemplateRead { .. }));
    }
}
