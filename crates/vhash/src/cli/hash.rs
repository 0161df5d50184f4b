//! The `vhash hash` command.

use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use vhash_core::{Config, FingerprintRecord, OutputFormat as CoreOutputFormat, OutputWriter};

use super::{build_vhash, HashingOverrides};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `hash` command.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Video files to fingerprint
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub hashing: HashingOverrides,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include per-frame perceptual hashes in the output
    #[arg(long)]
    pub frames: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the hash command.
pub async fn execute(config: Config, args: HashArgs) -> anyhow::Result<()> {
    let vhash = build_vhash(config, &args.hashing)?;
    let options = vhash.options();
    tracing::info!(
        "Fingerprinting {} video(s): strength {}, {} bits, {}",
        args.inputs.len(),
        options.strength,
        options.hash_bits,
        options.hash_algorithm
    );

    let progress = (args.inputs.len() > 1)
        .then(|| create_progress_bar(args.inputs.len() as u64))
        .transpose()?;

    let start = std::time::Instant::now();
    let mut records = Vec::with_capacity(args.inputs.len());
    let mut failed = 0usize;
    for input in &args.inputs {
        if let Some(pb) = &progress {
            pb.set_message(input.display().to_string());
        }

        let result = match vhash.video(input) {
            Ok(video) => video.fingerprint().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(fingerprint) => {
                tracing::debug!("{} {}", fingerprint.digest, input.display());
                records.push(FingerprintRecord::from_fingerprint(&fingerprint, args.frames));
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {}", input, e);
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), args.pretty);
    match (args.format, records.as_slice()) {
        (OutputFormat::Json, [single]) => writer.write(single)?,
        _ => writer.write_all(&records)?,
    }
    writer.flush()?;

    tracing::info!(
        "Fingerprinted {} of {} video(s) in {:?}",
        writer.items_written(),
        args.inputs.len(),
        start.elapsed()
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} video(s) failed", args.inputs.len());
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )?
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_maps_to_core() {
        assert_eq!(
            CoreOutputFormat::from(OutputFormat::Jsonl),
            CoreOutputFormat::JsonLines
        );
        assert_eq!(CoreOutputFormat::from(OutputFormat::Json), CoreOutputFormat::Json);
    }

    #[tokio::test]
    async fn test_missing_inputs_fail_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let args = HashArgs {
            inputs: vec![dir.path().join("missing-a.mp4"), dir.path().join("missing-b.mp4")],
            hashing: HashingOverrides::default(),
            format: OutputFormat::Jsonl,
            output: Some(dir.path().join("out.jsonl")),
            frames: false,
            pretty: false,
        };

        let err = execute(Config::default(), args).await.unwrap_err();
        assert!(err.to_string().contains("2 of 2"));
        let written = std::fs::read_to_string(dir.path().join("out.jsonl")).unwrap();
        assert!(written.is_empty());
    }
}
