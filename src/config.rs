//! Configuration types
//!
//! `ConverterConfig` holds the base directories and default codec. A batch
//! file (YAML or JSON) describes the datasets to convert:
//!
//! ```yaml
//! input_dir: data
//! output_dir: processed
//! compression: snappy
//! datasets:
//!   reviews:
//!     input: Grocery_and_Gourmet_Food.jsonl.gz
//!     output: grocery_reviews.parquet
//!   metadata:
//!     input: meta_Grocery_and_Gourmet_Food.jsonl.gz
//!     output: grocery_meta.parquet
//!     ignore_errors: true
//! ```

use crate::converter::{Batch, DatasetDescriptor};
use crate::error::{Error, Result};
use crate::output::Codec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory holding source ndjson files
pub const DEFAULT_INPUT_DIR: &str = "data";

/// Default directory receiving Parquet output
pub const DEFAULT_OUTPUT_DIR: &str = "processed";

// ============================================================================
// Converter Config
// ============================================================================

/// Base directories and default codec for a [`Converter`](crate::Converter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Directory that dataset input paths are relative to
    pub input_dir: PathBuf,
    /// Directory that dataset output paths are relative to
    pub output_dir: PathBuf,
    /// Codec used when a dataset does not name one
    pub compression: Codec,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            compression: Codec::default(),
        }
    }
}

impl ConverterConfig {
    /// Create a config with the default directories and snappy compression
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_compression(mut self, codec: Codec) -> Self {
        self.compression = codec;
        self
    }
}

// ============================================================================
// Batch File
// ============================================================================

/// Batch file loaded from YAML or JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchFile {
    /// Input directory override
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// Output directory override
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Default codec name
    #[serde(default)]
    pub compression: Option<String>,

    /// Datasets keyed by name
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetEntry>,
}

/// One dataset as written in a batch file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetEntry {
    /// Input file, relative to the input directory
    pub input: PathBuf,

    /// Output file, relative to the output directory
    pub output: PathBuf,

    /// Skip malformed lines instead of failing the dataset
    #[serde(default)]
    pub ignore_errors: Option<bool>,

    /// Codec override for this dataset
    #[serde(default)]
    pub compression: Option<String>,
}

impl DatasetEntry {
    /// Resolve defaults into a descriptor
    pub fn to_descriptor(&self, name: &str) -> DatasetDescriptor {
        let descriptor = DatasetDescriptor::new(name, &self.input, &self.output)
            .with_ignore_errors(self.ignore_errors.unwrap_or(false));
        match &self.compression {
            Some(codec) => descriptor.with_compression(codec),
            None => descriptor,
        }
    }
}

impl BatchFile {
    /// Load a batch file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path.display())
            } else {
                Error::config(format!(
                    "Failed to read batch file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_str(&content)
    }

    /// Parse a batch file from a YAML (or JSON) string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let file: BatchFile = serde_yaml::from_str(content)?;
        Ok(file)
    }

    /// Converter config, starting from the defaults
    pub fn converter_config(&self) -> Result<ConverterConfig> {
        let mut config = ConverterConfig::default();
        if let Some(dir) = &self.input_dir {
            config.input_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(codec) = &self.compression {
            config.compression = codec.parse()?;
        }
        Ok(config)
    }

    /// Dataset descriptors with defaults resolved
    pub fn batch(&self) -> Result<Batch> {
        let mut batch = Batch::new();
        for (name, entry) in &self.datasets {
            batch.insert(entry.to_descriptor(name))?;
        }
        Ok(batch)
    }
}

/// Built-in batch for the Amazon grocery review dump
pub fn default_batch() -> Batch {
    [
        DatasetDescriptor::new(
            "reviews",
            "Grocery_and_Gourmet_Food.jsonl.gz",
            "grocery_reviews.parquet",
        ),
        DatasetDescriptor::new(
            "metadata",
            "meta_Grocery_and_Gourmet_Food.jsonl.gz",
            "grocery_meta.parquet",
        )
        .with_ignore_errors(true),
    ]
    .into_iter()
    .collect()
}
