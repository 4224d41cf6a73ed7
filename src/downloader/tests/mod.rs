use super::test_helpers::*;
use super::*;
use crate::compression::CompressionMethod;
use crate::error::Error;
use crate::features::{Feature, StaticFeatureFlags};
use crate::types::TarVariant;
use tempfile::tempdir;
