pub mod classifier;
pub mod listing;

pub use classifier::{UrlType, classify};
pub use listing::{DiscoveredItem, RankKey, discover_recent};

use serde::{Deserialize, Serialize};

/// A reference web source supplied by the agent configuration. Input only;
/// never persisted standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    pub url: String,
    #[serde(default)]
    pub url_type: UrlType,
}

impl SourceReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            url_type: UrlType::Auto,
        }
    }
}
