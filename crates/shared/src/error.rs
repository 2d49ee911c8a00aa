use std::path::PathBuf;

/// Errors raised while assembling a feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Missing mandatory channel attribute: {attribute}")]
    MissingAttribute { attribute: &'static str },

    #[error("Could not read metadata from {}: {reason}", path.display())]
    MetadataRead { path: PathBuf, reason: String },

    #[error("Could not build enclosure URL from base {base:?} and file {file_name:?}: {reason}")]
    MalformedUrl {
        base: String,
        file_name: String,
        reason: String,
    },

    #[error("Could not list source directory {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read feed template {}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid feed template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("Failed to render feed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Invalid channel definition {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl From<handlebars::TemplateError> for FeedError {
    fn from(err: handlebars::TemplateError) -> Self {
        FeedError::Template(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
