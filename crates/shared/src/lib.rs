// Public modules
pub mod channel;
pub mod config;
pub mod episode;
pub mod error;
pub mod metadata;
pub mod render;
pub mod sources;

// Re-export commonly used types
pub use channel::{Channel, ChannelOptions, MANDATORY_ATTRIBUTES};
pub use config::ChannelConfig;
pub use episode::{enclosure_url, format_duration, Episode, EpisodeDefaults};
pub use error::{FeedError, Result};
pub use metadata::{LoftyMetadataSource, MetadataSource, RawMetadata};
pub use render::FeedTemplate;
pub use sources::{collect, Sources};
