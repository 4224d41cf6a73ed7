//! Feature flag capability
//!
//! The downloader never reads flags from ambient state. Callers inject a
//! [`FeatureFlags`] implementation, which keeps gate decisions reproducible.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flags consulted by the download pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Pipe zstd bundles straight from the HTTP response into tar
    StreamExtraction,
}

/// Source of feature flag decisions
#[async_trait]
pub trait FeatureFlags: Send + Sync {
    /// Whether `feature` is enabled for this run
    async fn is_enabled(&self, feature: Feature) -> bool;
}

/// Fixed set of enabled flags
#[derive(Clone, Debug, Default)]
pub struct StaticFeatureFlags {
    enabled: HashSet<Feature>,
}

impl StaticFeatureFlags {
    /// No flags enabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Enable exactly the given flags
    pub fn with(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            enabled: features.into_iter().collect(),
        }
    }
}

#[async_trait]
impl FeatureFlags for StaticFeatureFlags {
    async fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }
}
