//! The `vhash probe` command.

use clap::Args;
use std::path::PathBuf;
use vhash_core::{Config, Metadata, VideoHash};

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to inspect
    pub input: PathBuf,

    /// Include the probe tool's raw output
    #[arg(long)]
    pub raw: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the probe command.
pub async fn execute(config: Config, args: ProbeArgs) -> anyhow::Result<()> {
    let vhash = VideoHash::new(config)?;
    let video = vhash.video(&args.input)?;
    let metadata = video.metadata().await?;

    tracing::debug!(
        "{}: {:.3}s, {} stream(s)",
        args.input.display(),
        metadata.duration,
        metadata.streams.len()
    );

    let value = render(&metadata, args.raw)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{json}");
    Ok(())
}

fn render(metadata: &Metadata, raw: bool) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(metadata)?;
    if !raw {
        if let Some(object) = value.as_object_mut() {
            object.remove("raw");
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vhash_core::pipeline::{FormatInfo, StreamInfo};

    fn metadata() -> Metadata {
        Metadata {
            duration: 12.5,
            format: FormatInfo {
                format_name: Some("mov,mp4".to_string()),
                ..Default::default()
            },
            streams: vec![StreamInfo {
                codec_type: "video".to_string(),
                width: Some(640),
                height: Some(360),
                ..Default::default()
            }],
            raw: json!({"format": {"duration": "12.5"}}),
        }
    }

    #[test]
    fn test_render_strips_raw_by_default() {
        let value = render(&metadata(), false).unwrap();
        assert_eq!(value["duration"], 12.5);
        assert_eq!(value["streams"][0]["width"], 640);
        assert!(value.get("raw").is_none());
    }

    #[test]
    fn test_render_keeps_raw_on_request() {
        let value = render(&metadata(), true).unwrap();
        assert_eq!(value["raw"]["format"]["duration"], "12.5");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProbeArgs {
            input: dir.path().join("nope.mp4"),
            raw: false,
            pretty: false,
        };
        assert!(execute(Config::default(), args).await.is_err());
    }
}
