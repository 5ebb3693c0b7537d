//! wavebar-peaks - precompute waveform data for an audio file
//!
//! Decodes the file, reduces it to a fixed number of points and prints the
//! series as a JSON array, the document shape consumed by
//! `WaveformSource::Json`.
//!
//! ## Usage
//!
//! ```text
//! wavebar-peaks <audio-file> [--points N] [--linear] [--no-normalise]
//! ```

use anyhow::{bail, Context, Result};

use wavebar_core::amplitude::ReduceOptions;
use wavebar_core::cache::NoCache;
use wavebar_core::decode::SymphoniaDecoder;
use wavebar_core::source::{AmplitudeLoader, FileFetcher, WaveformLoader, WaveformSource};

struct Args {
    input: String,
    options: ReduceOptions,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut input = None;
    let mut options = ReduceOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--points" => {
                let value = args.next().context("--points needs a value")?;
                options.points = value
                    .parse()
                    .with_context(|| format!("invalid point count: {}", value))?;
            }
            "--linear" => options.logarithmic = false,
            "--no-normalise" => options.normalise = false,
            flag if flag.starts_with("--") => bail!("unknown flag: {}", flag),
            _ if input.is_none() => input = Some(arg),
            _ => bail!("unexpected argument: {}", arg),
        }
    }

    let input = input.context(
        "usage: wavebar-peaks <audio-file> [--points N] [--linear] [--no-normalise]",
    )?;
    if options.points == 0 {
        bail!("--points must be at least 1");
    }
    Ok(Args { input, options })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    log::info!(
        "wavebar-peaks: Reducing {} to {} points (log: {}, normalise: {})",
        args.input,
        args.options.points,
        args.options.logarithmic,
        args.options.normalise
    );

    let loader = WaveformLoader::new(FileFetcher::new(), SymphoniaDecoder, NoCache);
    let series = loader
        .load(&WaveformSource::decoded(args.input.as_str()), &args.options)
        .await
        .with_context(|| format!("failed to compute waveform for {}", args.input))?;

    let json = serde_json::to_string(&series).context("failed to serialize waveform")?;
    println!("{}", json);
    Ok(())
}
