//! Converter types
//!
//! Dataset descriptors, batches and per-dataset outcomes.

use crate::error::{Error, ErrorKind, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Dataset Descriptor
// ============================================================================

/// One input → output conversion task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    name: String,
    input_file: PathBuf,
    output_file: PathBuf,
    ignore_errors: bool,
    compression: Option<String>,
}

impl DatasetDescriptor {
    /// Create a strict descriptor using the converter's default codec
    pub fn new(
        name: impl Into<String>,
        input_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_file: input_file.into(),
            output_file: output_file.into(),
            ignore_errors: false,
            compression: None,
        }
    }

    /// Skip malformed lines instead of failing
    #[must_use]
    pub fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Override the codec; validated when the dataset is converted
    #[must_use]
    pub fn with_compression(mut self, codec: impl Into<String>) -> Self {
        self.compression = Some(codec.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    pub fn compression(&self) -> Option<&str> {
        self.compression.as_deref()
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Datasets to convert, keyed by unique name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    datasets: BTreeMap<String, DatasetDescriptor>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset, rejecting a name already in the batch
    pub fn insert(&mut self, dataset: DatasetDescriptor) -> Result<()> {
        match self.datasets.entry(dataset.name.clone()) {
            btree_map::Entry::Occupied(entry) => Err(Error::DuplicateDataset {
                name: entry.key().clone(),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(dataset);
                Ok(())
            }
        }
    }

    /// Take a dataset out of the batch
    pub fn remove(&mut self, name: &str) -> Option<DatasetDescriptor> {
        self.datasets.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&DatasetDescriptor> {
        self.datasets.get(name)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.values()
    }
}

/// Later descriptors replace earlier ones with the same name
impl FromIterator<DatasetDescriptor> for Batch {
    fn from_iter<I: IntoIterator<Item = DatasetDescriptor>>(iter: I) -> Self {
        let datasets = iter
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self { datasets }
    }
}

// ============================================================================
// Record Set
// ============================================================================

/// (rows, columns) of a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape(pub usize, pub usize);

impl Shape {
    pub fn rows(&self) -> usize {
        self.0
    }

    pub fn columns(&self) -> usize {
        self.1
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// In-memory table produced by loading one dataset
#[derive(Debug, Clone)]
pub struct RecordSet {
    batch: RecordBatch,
    skipped: usize,
}

impl RecordSet {
    pub fn new(batch: RecordBatch, skipped: usize) -> Self {
        Self { batch, skipped }
    }

    pub fn shape(&self) -> Shape {
        Shape(self.batch.num_rows(), self.batch.num_columns())
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Malformed lines dropped while loading
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of converting one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Parquet file written
    Success {
        shape: Shape,
        skipped: usize,
        output: PathBuf,
    },
    /// Load or save failed
    Failed { kind: ErrorKind, error: String },
}

impl Outcome {
    pub fn success(records: &RecordSet, output: impl Into<PathBuf>) -> Self {
        Self::Success {
            shape: records.shape(),
            skipped: records.skipped(),
            output: output.into(),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self::Failed {
            kind: error.kind(),
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn shape(&self) -> Option<Shape> {
        match self {
            Self::Success { shape, .. } => Some(*shape),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Shape on success, error message on failure
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { shape, .. } => write!(f, "{shape}"),
            Self::Failed { error, .. } => f.write_str(error),
        }
    }
}

/// Outcomes of a batch, keyed by dataset name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResults {
    outcomes: BTreeMap<String, Outcome>,
}

impl BatchResults {
    pub(crate) fn record(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.outcomes.insert(name.into(), outcome);
    }

    pub fn get(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.get(name)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.outcomes.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}
