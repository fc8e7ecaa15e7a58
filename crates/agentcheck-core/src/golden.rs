//! Durable storage of golden baseline executions.
//!
//! Each test owns one JSON document holding up to [`MAX_VARIANTS`] named
//! snapshots in creation order.
//!
//! # Layout
//!
//! ```text
//! {root}/
//!   {test_name}.golden.json   # GoldenBaseline document
//! ```
//!
//! Documents are replaced atomically (temp file in the same directory, fsync,
//! rename), so a concurrent reader sees either the previous or the new
//! document, never a partial one. Every variant carries a SHA-256 digest of
//! its trace that is verified on read.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_VARIANTS;
use crate::errors::CoreResult;
use crate::model::ExecutionTrace;

#[path = "golden_next/mod.rs"]
mod golden_next;

/// Current document schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Variant id used when the caller does not name one.
pub const DEFAULT_VARIANT_ID: &str = "default";

/// One saved known-good execution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenVariant {
    pub variant_id: String,

    pub trace: ExecutionTrace,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Trace digest (sha256:...).
    pub digest: String,
}

impl GoldenVariant {
    pub fn new(
        variant_id: impl Into<String>,
        trace: ExecutionTrace,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let digest = golden_next::integrity::trace_digest_impl(&trace);
        Self {
            variant_id: variant_id.into(),
            trace,
            notes,
            created_at,
            digest,
        }
    }
}

/// All stored variants for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenBaseline {
    pub schema_version: u32,

    pub test_name: String,

    /// Designated default variant; `None` only while empty.
    #[serde(default)]
    pub default_variant: Option<String>,

    /// Creation order, oldest first.
    #[serde(default)]
    pub variants: Vec<GoldenVariant>,
}

impl GoldenBaseline {
    pub fn empty(test_name: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            test_name: test_name.into(),
            default_variant: None,
            variants: Vec::new(),
        }
    }

    /// Builds an in-memory baseline; the first variant becomes the default.
    pub fn from_variants(test_name: impl Into<String>, variants: Vec<GoldenVariant>) -> Self {
        let default_variant = variants.first().map(|v| v.variant_id.clone());
        Self {
            schema_version: SCHEMA_VERSION,
            test_name: test_name.into(),
            default_variant,
            variants,
        }
    }

    pub fn get(&self, variant_id: &str) -> Option<&GoldenVariant> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    pub fn default_variant(&self) -> Option<&GoldenVariant> {
        self.default_variant
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.variants.first())
    }

    pub fn variant_ids(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.variant_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.variants.len() >= MAX_VARIANTS
    }
}

/// Filesystem-backed golden baseline repository.
#[derive(Debug, Clone)]
pub struct GoldenStore {
    root: PathBuf,
}

impl GoldenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn baseline_path(&self, test_name: &str) -> CoreResult<PathBuf> {
        golden_next::keys::baseline_path_impl(&self.root, test_name)
    }

    /// Saves a snapshot of `trace` as `variant_id` (default: `"default"`).
    ///
    /// Overwriting an existing variant id is allowed and moves it to the end
    /// of the creation order. A new id on a test that already holds
    /// [`MAX_VARIANTS`] variants fails with `MAX_VARIANTS_EXCEEDED`; nothing
    /// is evicted.
    pub fn save(
        &self,
        test_name: &str,
        trace: ExecutionTrace,
        variant_id: Option<&str>,
        notes: Option<String>,
    ) -> CoreResult<GoldenVariant> {
        golden_next::write::save_impl(self, test_name, trace, variant_id, notes)
    }

    /// Variants in creation order; empty if the test has no baseline.
    pub fn list(&self, test_name: &str) -> CoreResult<Vec<GoldenVariant>> {
        Ok(golden_next::read::read_optional_impl(self, test_name)?
            .map(|b| b.variants)
            .unwrap_or_default())
    }

    pub fn get(&self, test_name: &str, variant_id: &str) -> CoreResult<GoldenVariant> {
        golden_next::read::get_impl(self, test_name, variant_id)
    }

    /// Full baseline for a test, or `NO_BASELINE`.
    pub fn load(&self, test_name: &str) -> CoreResult<GoldenBaseline> {
        golden_next::read::load_impl(self, test_name)
    }

    pub fn delete(&self, test_name: &str, variant_id: &str) -> CoreResult<()> {
        golden_next::write::delete_impl(self, test_name, variant_id)
    }

    pub fn set_default(&self, test_name: &str, variant_id: &str) -> CoreResult<()> {
        golden_next::write::set_default_impl(self, test_name, variant_id)
    }

    /// Names of all tests with a stored baseline, sorted.
    pub fn tests(&self) -> CoreResult<Vec<String>> {
        golden_next::read::list_tests_impl(self)
    }
}
