//! Tests for converter module

use super::*;
use crate::error::ErrorKind;
use crate::output::{arrow_to_json, read_parquet};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const THREE_REVIEWS: &str = r#"{"id": 1, "text": "Great coffee"}
{"id": 2, "text": "Too sweet"}
{"id": 3, "text": "Arrived stale"}
"#;

const ONE_MALFORMED: &str = r#"{"parent_asin": "B001", "title": "Tea", "price": 4.5}
{"parent_asin": "B002", "title": "Jam"
{"parent_asin": "B003", "title": "Honey", "price": 9}
"#;

fn setup() -> (TempDir, Converter) {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("data");
    fs::create_dir_all(&input_dir).unwrap();

    let config = ConverterConfig::new()
        .with_input_dir(input_dir)
        .with_output_dir(dir.path().join("processed"));
    let converter = Converter::new(config).unwrap();
    (dir, converter)
}

fn write_input(converter: &Converter, name: &str, body: &str) {
    fs::write(converter.config().input_dir.join(name), body).unwrap();
}

// ============================================================================
// Configure Tests
// ============================================================================

#[test]
fn test_new_creates_output_dir() {
    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("nested/processed");

    let config = ConverterConfig::new().with_output_dir(&output_dir);
    Converter::new(config.clone()).unwrap();
    assert!(output_dir.is_dir());

    // Already present is fine
    Converter::new(config).unwrap();
}

#[test]
fn test_new_does_not_require_input_dir() {
    let dir = tempdir().unwrap();
    let config = ConverterConfig::new()
        .with_input_dir(dir.path().join("missing"))
        .with_output_dir(dir.path().join("out"));
    assert!(Converter::new(config).is_ok());
}

#[test]
fn test_new_fails_when_output_dir_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("processed");
    fs::write(&blocker, "not a directory").unwrap();

    let config = ConverterConfig::new().with_output_dir(&blocker);
    let err = Converter::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Write);
}

#[test]
fn test_paths_resolve_against_config_dirs() {
    let (_dir, converter) = setup();
    let dataset = DatasetDescriptor::new("reviews", "r.jsonl", "r.parquet");

    assert_eq!(
        converter.input_path(&dataset),
        converter.config().input_dir.join("r.jsonl")
    );
    assert_eq!(
        converter.output_path(&dataset),
        converter.config().output_dir.join("r.parquet")
    );
}

// ============================================================================
// Load / Save Tests
// ============================================================================

#[test]
fn test_load_shape() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);

    let records = converter
        .load(converter.config().input_dir.join("r.jsonl"), false)
        .unwrap();
    assert_eq!(records.shape(), Shape(3, 2));
    assert_eq!(records.skipped(), 0);
}

#[test]
fn test_load_ignore_errors_counts_skipped() {
    let (_dir, converter) = setup();
    write_input(&converter, "bad.jsonl", ONE_MALFORMED);

    let records = converter
        .load(converter.config().input_dir.join("bad.jsonl"), true)
        .unwrap();
    assert_eq!(records.shape(), Shape(2, 3));
    assert_eq!(records.skipped(), 1);
}

#[test]
fn test_save_twice_overwrites() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);

    let records = converter
        .load(converter.config().input_dir.join("r.jsonl"), false)
        .unwrap();
    let path = converter.config().output_dir.join("r.parquet");

    converter.save(&records, &path, Codec::Snappy).unwrap();
    let first = read_parquet(&path).unwrap();
    converter.save(&records, &path, Codec::Snappy).unwrap();
    let second = read_parquet(&path).unwrap();

    assert_eq!(second.num_rows(), 3);
    assert_eq!(
        arrow_to_json(&first.batches[0]).unwrap(),
        arrow_to_json(&second.batches[0]).unwrap()
    );
}

#[test]
fn test_save_roundtrip_preserves_rows_and_columns() {
    let (_dir, converter) = setup();
    write_input(&converter, "bad.jsonl", ONE_MALFORMED);

    let records = converter
        .load(converter.config().input_dir.join("bad.jsonl"), true)
        .unwrap();
    let path = converter.config().output_dir.join("m.parquet");
    converter.save(&records, &path, Codec::Zstd(None)).unwrap();

    let contents = read_parquet(&path).unwrap();
    assert_eq!(contents.num_rows(), records.shape().rows());
    assert_eq!(contents.schema.fields(), records.schema().fields());
}

// ============================================================================
// Execute Scenarios
// ============================================================================

#[test]
fn test_execute_success_scenario() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);

    let batch: Batch = [DatasetDescriptor::new("reviews", "r.jsonl", "r.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);

    assert_eq!(results.len(), 1);
    let outcome = results.get("reviews").unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.shape(), Some(Shape(3, 2)));
    assert_eq!(outcome.to_string(), "(3, 2)");

    let contents = read_parquet(converter.config().output_dir.join("r.parquet")).unwrap();
    assert_eq!(contents.num_rows(), 3);
    assert_eq!(contents.num_columns(), 2);
}

#[test]
fn test_execute_ignore_errors_scenario() {
    let (_dir, converter) = setup();
    write_input(&converter, "bad.jsonl", ONE_MALFORMED);

    let batch: Batch =
        [DatasetDescriptor::new("meta", "bad.jsonl", "m.parquet").with_ignore_errors(true)]
            .into_iter()
            .collect();
    let results = converter.execute(&batch);

    let outcome = results.get("meta").unwrap();
    assert_eq!(outcome.shape(), Some(Shape(2, 3)));
    let Outcome::Success { skipped, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(*skipped, 1);
}

#[test]
fn test_execute_strict_parse_failure_scenario() {
    let (_dir, converter) = setup();
    write_input(&converter, "bad.jsonl", ONE_MALFORMED);

    let batch: Batch = [DatasetDescriptor::new("meta", "bad.jsonl", "m.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);

    let outcome = results.get("meta").unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.kind(), Some(ErrorKind::Parse));
    assert!(outcome.error().unwrap().contains("bad.jsonl:2"));
    assert!(!converter.config().output_dir.join("m.parquet").exists());
}

#[test]
fn test_execute_missing_input_scenario() {
    let (_dir, converter) = setup();

    let batch: Batch = [DatasetDescriptor::new("missing", "absent.jsonl", "a.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);

    let outcome = results.get("missing").unwrap();
    assert_eq!(outcome.kind(), Some(ErrorKind::FileNotFound));
    assert!(outcome.error().unwrap().contains("not found"));
}

#[test]
fn test_execute_empty_input_succeeds() {
    let (_dir, converter) = setup();
    write_input(&converter, "empty.jsonl", "");

    let batch: Batch = [DatasetDescriptor::new("empty", "empty.jsonl", "e.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);

    assert_eq!(results.get("empty").unwrap().shape(), Some(Shape(0, 0)));

    let contents = read_parquet(converter.config().output_dir.join("e.parquet")).unwrap();
    assert_eq!(contents.num_rows(), 0);
    assert_eq!(contents.num_columns(), 0);
}

#[test]
fn test_execute_all_lines_skipped_reads_back_empty() {
    let (_dir, converter) = setup();
    write_input(&converter, "junk.jsonl", "{broken\n[1, 2]\n42\n");

    let batch: Batch =
        [DatasetDescriptor::new("junk", "junk.jsonl", "j.parquet").with_ignore_errors(true)]
            .into_iter()
            .collect();
    let results = converter.execute(&batch);

    match results.get("junk").unwrap() {
        Outcome::Success { shape, skipped, .. } => {
            assert_eq!(*shape, Shape(0, 0));
            assert_eq!(*skipped, 3);
        }
        other => panic!("expected success, got {other:?}"),
    }

    let contents = read_parquet(converter.config().output_dir.join("j.parquet")).unwrap();
    assert_eq!(contents.num_rows(), 0);
    assert_eq!(contents.num_columns(), 0);
}

#[test]
fn test_execute_keyless_records_keep_row_count() {
    let (_dir, converter) = setup();
    write_input(&converter, "keyless.jsonl", "{}\n{}\n{}\n");

    let batch: Batch = [DatasetDescriptor::new("keyless", "keyless.jsonl", "k.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);
    assert_eq!(results.get("keyless").unwrap().shape(), Some(Shape(3, 0)));

    let contents = read_parquet(converter.config().output_dir.join("k.parquet")).unwrap();
    assert_eq!(contents.num_rows(), 3);
    assert_eq!(contents.num_columns(), 0);

    let rows: Vec<_> = contents
        .batches
        .iter()
        .flat_map(|b| arrow_to_json(b).unwrap())
        .collect();
    assert_eq!(rows, vec![serde_json::json!({}); 3]);
}

#[test]
fn test_execute_unsupported_codec_is_per_dataset() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);

    let batch: Batch = [
        DatasetDescriptor::new("lzo", "r.jsonl", "lzo.parquet").with_compression("lzo"),
        DatasetDescriptor::new("zstd", "r.jsonl", "zstd.parquet").with_compression("zstd:3"),
    ]
    .into_iter()
    .collect();
    let results = converter.execute(&batch);

    assert_eq!(
        results.get("lzo").unwrap().kind(),
        Some(ErrorKind::UnsupportedCodec)
    );
    assert!(results.get("zstd").unwrap().is_success());
}

#[test]
fn test_execute_write_failure_is_recorded() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);

    let batch: Batch = [DatasetDescriptor::new("nested", "r.jsonl", "no/such/dir/r.parquet")]
        .into_iter()
        .collect();
    let results = converter.execute(&batch);

    assert_eq!(results.get("nested").unwrap().kind(), Some(ErrorKind::Write));
}

#[test]
fn test_execute_failures_do_not_abort_batch() {
    let (_dir, converter) = setup();
    write_input(&converter, "r.jsonl", THREE_REVIEWS);
    write_input(&converter, "bad.jsonl", ONE_MALFORMED);

    let batch: Batch = [
        DatasetDescriptor::new("a_missing", "absent.jsonl", "a.parquet"),
        DatasetDescriptor::new("b_strict", "bad.jsonl", "b.parquet"),
        DatasetDescriptor::new("c_reviews", "r.jsonl", "c.parquet"),
        DatasetDescriptor::new("d_tolerant", "bad.jsonl", "d.parquet").with_ignore_errors(true),
    ]
    .into_iter()
    .collect();
    let results = converter.execute(&batch);

    assert_eq!(results.len(), batch.len());
    assert_eq!(results.succeeded(), 2);
    assert_eq!(results.failed(), 2);
    assert!(converter.config().output_dir.join("c.parquet").exists());
    assert!(converter.config().output_dir.join("d.parquet").exists());
}

#[test]
fn test_execute_empty_batch() {
    let (_dir, converter) = setup();
    let results = converter.execute(&Batch::new());
    assert!(results.is_empty());
}

// ============================================================================
// Type Tests
// ============================================================================

#[test]
fn test_batch_rejects_duplicate_names() {
    let mut batch = Batch::new();
    batch
        .insert(DatasetDescriptor::new("reviews", "a.jsonl", "a.parquet"))
        .unwrap();
    let err = batch
        .insert(DatasetDescriptor::new("reviews", "b.jsonl", "b.parquet"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(batch.get("reviews").unwrap().input_file(), Path::new("a.jsonl"));
}

#[test]
fn test_descriptor_defaults() {
    let dataset = DatasetDescriptor::new("reviews", "r.jsonl", "r.parquet");
    assert!(!dataset.ignore_errors());
    assert_eq!(dataset.compression(), None);
}

#[test]
fn test_outcome_serialization() {
    let success = Outcome::Success {
        shape: Shape(3, 2),
        skipped: 0,
        output: "processed/r.parquet".into(),
    };
    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        serde_json::json!({
            "status": "success",
            "shape": [3, 2],
            "skipped": 0,
            "output": "processed/r.parquet"
        })
    );

    let failed = Outcome::failed(&Error::file_not_found("data/absent.jsonl"));
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        serde_json::json!({
            "status": "failed",
            "kind": "file_not_found",
            "error": "File not found: data/absent.jsonl"
        })
    );
    assert_eq!(failed.to_string(), "File not found: data/absent.jsonl");
}
