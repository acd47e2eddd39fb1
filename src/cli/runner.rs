//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ConvertArgs, OutputFormat};
use crate::config::{default_batch, BatchFile, ConverterConfig};
use crate::converter::{Batch, BatchResults, Converter, DatasetDescriptor};
use crate::error::{Error, Result, ResultExt};
use crate::output::{arrow_to_json, read_parquet};
use serde_json::{json, Value};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Convert(args) => self.convert(args),
            Commands::Inspect { file, head } => self.inspect(file, *head),
            Commands::Validate { config } => self.validate(config),
        }
    }

    /// Build the converter config and batch from a batch file and flags
    ///
    /// Flags take precedence over the batch file.
    pub fn resolve(args: &ConvertArgs) -> Result<(ConverterConfig, Batch)> {
        let (mut config, mut batch) = match &args.config {
            Some(path) => {
                let file = BatchFile::load(path)?;
                (file.converter_config()?, file.batch()?)
            }
            None => (ConverterConfig::default(), Batch::new()),
        };

        if let Some(dir) = &args.input_dir {
            config.input_dir.clone_from(dir);
        }
        if let Some(dir) = &args.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(codec) = &args.compression {
            config.compression = codec.parse()?;
        }

        for arg in &args.datasets {
            batch.insert(parse_dataset_arg(arg)?)?;
        }

        if batch.is_empty() && args.config.is_none() {
            batch = default_batch();
        }

        for name in &args.ignore_errors {
            let dataset = batch.remove(name).ok_or_else(|| {
                Error::config(format!("Unknown dataset '{name}' in --ignore-errors"))
            })?;
            batch.insert(dataset.with_ignore_errors(true))?;
        }

        Ok((config, batch))
    }

    fn convert(&self, args: &ConvertArgs) -> Result<()> {
        let (config, batch) = Self::resolve(args)?;
        tracing::debug!(?config, datasets = batch.len(), "Resolved batch");

        let converter = Converter::new(config)?;
        let results = converter.execute(&batch);

        self.print_results(&converter, &results)
    }

    fn print_results(&self, converter: &Converter, results: &BatchResults) -> Result<()> {
        match self.cli.format {
            OutputFormat::Pretty => {
                for (name, outcome) in results.iter() {
                    println!("{name}: {outcome}");
                }
            }
            OutputFormat::Json => {
                let config = converter.config();
                let report = json!({
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "input_dir": config.input_dir,
                    "output_dir": config.output_dir,
                    "compression": config.compression.to_string(),
                    "succeeded": results.succeeded(),
                    "failed": results.failed(),
                    "results": results,
                });
                self.output_json(&report)?;
            }
        }
        Ok(())
    }

    fn inspect(&self, file: &Path, head: usize) -> Result<()> {
        let contents = read_parquet(file)?;
        let rows: Vec<Value> = contents
            .batches
            .iter()
            .map(arrow_to_json)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to render rows of {}", file.display()))?
            .into_iter()
            .flatten()
            .take(head)
            .collect();

        let codecs: Vec<String> = contents.codecs.iter().map(ToString::to_string).collect();

        match self.cli.format {
            OutputFormat::Pretty => {
                println!("{}", file.display());
                println!("  shape: ({}, {})", contents.num_rows(), contents.num_columns());
                println!("  row groups: {}", contents.row_groups);
                println!("  compression: {}", codecs.join(", "));
                println!("  schema:");
                for field in contents.schema.fields() {
                    println!("    {}: {}", field.name(), field.data_type());
                }
                for row in &rows {
                    println!("{row}");
                }
            }
            OutputFormat::Json => {
                let fields: Vec<Value> = contents
                    .schema
                    .fields()
                    .iter()
                    .map(|f| json!({"name": f.name(), "type": f.data_type().to_string()}))
                    .collect();
                self.output_json(&json!({
                    "path": file,
                    "shape": [contents.num_rows(), contents.num_columns()],
                    "row_groups": contents.row_groups,
                    "compression": codecs,
                    "schema": fields,
                    "rows": rows,
                }))?;
            }
        }
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let file = BatchFile::load(path)?;
        let config = file.converter_config()?;
        let batch = file.batch()?;

        let datasets: Vec<(&DatasetDescriptor, bool)> = batch
            .iter()
            .map(|d| (d, config.input_dir.join(d.input_file()).is_file()))
            .collect();

        match self.cli.format {
            OutputFormat::Pretty => {
                println!("✓ Batch file is valid: {}", path.display());
                println!("  input_dir: {}", config.input_dir.display());
                println!("  output_dir: {}", config.output_dir.display());
                println!("  compression: {}", config.compression);
                for (dataset, present) in &datasets {
                    let status = if *present { "ok" } else { "missing" };
                    println!(
                        "  {}: {} -> {} [{status}]",
                        dataset.name(),
                        dataset.input_file().display(),
                        dataset.output_file().display()
                    );
                }
            }
            OutputFormat::Json => {
                let entries: Vec<Value> = datasets
                    .iter()
                    .map(|(d, present)| {
                        json!({
                            "name": d.name(),
                            "input": d.input_file(),
                            "output": d.output_file(),
                            "ignore_errors": d.ignore_errors(),
                            "compression": d.compression(),
                            "input_present": present,
                        })
                    })
                    .collect();
                self.output_json(&json!({
                    "valid": true,
                    "input_dir": config.input_dir,
                    "output_dir": config.output_dir,
                    "compression": config.compression.to_string(),
                    "datasets": entries,
                }))?;
            }
        }
        Ok(())
    }

    fn output_json(&self, value: &Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Parse `NAME=INPUT:OUTPUT`
pub fn parse_dataset_arg(arg: &str) -> Result<DatasetDescriptor> {
    let invalid =
        || Error::config(format!("Invalid dataset '{arg}', expected NAME=INPUT:OUTPUT"));

    let (name, paths) = arg.split_once('=').ok_or_else(invalid)?;
    let (input, output) = paths.rsplit_once(':').ok_or_else(invalid)?;

    if name.trim().is_empty() || input.is_empty() || output.is_empty() {
        return Err(invalid());
    }

    Ok(DatasetDescriptor::new(name.trim(), input, output))
}
