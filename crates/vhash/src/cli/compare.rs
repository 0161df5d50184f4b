//! The `vhash compare` command.

use clap::Args;
use std::path::PathBuf;
use vhash_core::{ComparisonRecord, Config};

use super::{build_vhash, HashingOverrides};

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First video
    pub left: PathBuf,

    /// Second video
    pub right: PathBuf,

    #[command(flatten)]
    pub hashing: HashingOverrides,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the compare command.
///
/// Both videos are fingerprinted concurrently with the same options.
pub async fn execute(config: Config, args: CompareArgs) -> anyhow::Result<()> {
    let vhash = build_vhash(config, &args.hashing)?;
    let left = vhash.video(&args.left)?;
    let right = vhash.video(&args.right)?;

    let (left_fp, right_fp) = tokio::join!(left.fingerprint(), right.fingerprint());
    let left_fp = left_fp.map_err(|e| anyhow::anyhow!("{}: {e}", args.left.display()))?;
    let right_fp = right_fp.map_err(|e| anyhow::anyhow!("{}: {e}", args.right.display()))?;

    let record = ComparisonRecord::new(&left_fp, &right_fp);
    match record.frame_distance {
        Some(distance) => tracing::info!(
            "identical: {}, mean frame distance: {:.2}",
            record.identical,
            distance
        ),
        None => tracing::info!(
            "identical: {} (frame counts differ: {} vs {})",
            record.identical,
            left_fp.screenshot_count,
            right_fp.screenshot_count
        ),
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{json}");
    Ok(())
}
