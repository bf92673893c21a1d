//! hiclip - cut highlight clips from a stream recording using its live chat
//!
//! Finds bursts of a keyword in the chat log, records their timecodes, and cuts
//! a clip around each one with ffmpeg.
//!
//! Files for a video id live in the data folder (`--base`, default `./data`):
//! - Chat log: `{id}.chat.json`
//! - Video: `{id}.mp4`
//! - Timecodes: `{id}.hic.time.csv`
//! - Clips: `{id}.{suffix}NN.mp4`, merged into `{id}.{suffix}.merged.mp4`
//!
//! Uses XDG Base Directory specification for its own files:
//! - Logs: $XDG_STATE_HOME/hiclip/hiclip.log.<date> (~/.local/state/hiclip/)
//! - Config: $XDG_CONFIG_HOME/hiclip/config.toml (~/.config/hiclip/config.toml)

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use hiclip_core::histogram::DEFAULT_BIN_SECS;
use hiclip_core::render::{merge_clips, render_clips};
use hiclip_core::timecode::{self, format_duration, parse_duration};
use hiclip_core::{
    clip_label, create_registry, extract, ChatLog, ClipPlanner, Config, DownloadContext,
    DownloadReport, Downloader, Error, EventPredicate, Ffmpeg, Histogram, MatcherRegistry,
    MediaPaths, TimeClusterer, Timestamp,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hiclip")]
#[command(about = "Cut highlight clips from chat keyword bursts")]
#[command(version)]
struct Args {
    /// Video id
    #[arg(required_unless_present = "list_matchers")]
    id: Option<String>,

    /// Path to data folder
    #[arg(long)]
    base: Option<PathBuf>,

    /// Download chat and video simultaneously
    #[arg(long)]
    download: bool,

    /// Download chat only
    #[arg(long)]
    download_chat: bool,

    /// Download video only
    #[arg(long)]
    download_video: bool,

    /// Fewest keyword hits for a burst to count as a highlight
    #[arg(long)]
    keyword_threshold: Option<usize>,

    /// Keyword matcher name (see --list-matchers)
    #[arg(long)]
    keyword_func: Option<String>,

    /// Clip label prefix and file suffix
    #[arg(long)]
    suffix: Option<String>,

    /// Reuse the timecode file written by an earlier --clip or --clip-dryrun
    #[arg(long)]
    load_timecode: bool,

    /// Clip the video at every highlight
    #[arg(long)]
    clip: bool,

    /// Same as --clip but only print timecodes and the hit histogram
    #[arg(long)]
    clip_dryrun: bool,

    /// Clip a single timecode ([H:]MM:SS)
    #[arg(long, value_name = "TIMECODE")]
    clip_timecode: Option<String>,

    /// Re-cut only the highlight with this index
    #[arg(long, value_name = "INDEX")]
    reclip_index: Option<usize>,

    /// Seconds before the highlight for clipping
    #[arg(long, value_name = "SECS")]
    clip_seconds_before: Option<f64>,

    /// Seconds after the highlight for clipping
    #[arg(long, value_name = "SECS")]
    clip_seconds_after: Option<f64>,

    /// Merge the clips of --suffix into one video
    #[arg(long)]
    merge: bool,

    /// List available keyword matchers and exit
    #[arg(long)]
    list_matchers: bool,

    /// Config file (default: $XDG_CONFIG_HOME/hiclip/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output (-v debug logging and clip windows, -vv trace logging)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("invalid options")?;

    // Initialize logging
    let log_guard = hiclip_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;
    if args.verbose > 0 {
        eprintln!("Logging to {}", log_guard.log_dir().display());
    }

    tracing::info!("hiclip starting");

    let registry = create_registry(&config.matchers).context("failed to build matchers")?;

    if args.list_matchers {
        println!("Available matchers:");
        for name in registry.names() {
            println!("  - {}", name);
        }
        return Ok(());
    }

    let id = args.id.as_deref().context("missing video id")?;
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "failed to create data folder {}",
            config.storage.data_dir.display()
        )
    })?;
    let paths = MediaPaths::new(&config.storage.data_dir, id);

    run_downloads(&args, &config, &paths)?;

    let renderer = Ffmpeg::new(&config.render);

    if args.clip || args.clip_dryrun || args.reclip_index.is_some() {
        run_highlight_clips(&args, &config, &registry, &paths, &renderer)?;
    } else if let Some(ref text) = args.clip_timecode {
        run_single_clip(text, &config, &paths, &renderer)?;
    }

    if args.merge {
        match merge_clips(&renderer, &paths, &config.clip.suffix).context("merge failed")? {
            Some((inputs, output)) => {
                println!("Merged {} clip(s) into {}", inputs.len(), output.display());
                if args.verbose > 0 {
                    for input in &inputs {
                        println!("  {}", input.display());
                    }
                }
            }
            None => println!("No clips to merge for suffix '{}'", config.clip.suffix),
        }
    }

    tracing::info!("hiclip finished");
    Ok(())
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ref base) = args.base {
        config.storage.data_dir = base.clone();
    }
    if let Some(threshold) = args.keyword_threshold {
        config.clustering.min_reports = threshold;
    }
    if let Some(ref name) = args.keyword_func {
        config.clustering.matcher = name.clone();
    }
    if let Some(ref suffix) = args.suffix {
        config.clip.suffix = suffix.clone();
    }
    if let Some(before) = args.clip_seconds_before {
        config.clip.seconds_before = before;
    }
    if let Some(after) = args.clip_seconds_after {
        config.clip.seconds_after = after;
    }
}

fn run_downloads(args: &Args, config: &Config, paths: &MediaPaths) -> Result<()> {
    let chat = args.download || args.download_chat;
    let video = args.download || args.download_video;
    if !chat && !video {
        return Ok(());
    }

    let downloader = Downloader::new(&config.download).context("failed to start downloader")?;
    let ctx = DownloadContext::new(paths.clone(), &config.download);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = match (chat, video) {
        (true, true) => {
            pb.set_message(format!("Downloading chat and video for {}", ctx.url()));
            downloader.download_all(&ctx)
        }
        (true, false) => {
            pb.set_message(format!("Downloading chat for {}", ctx.url()));
            downloader.download_chat(&ctx)
        }
        _ => {
            pb.set_message(format!("Downloading video for {}", ctx.url()));
            downloader.download_video(&ctx)
        }
    };
    pb.finish_and_clear();

    let report = result.context("download failed")?;
    print_download_report(&report);
    Ok(())
}

fn print_download_report(report: &DownloadReport) {
    if let Some(ref chat_log) = report.chat_log {
        println!(
            "Downloaded {} chat message(s) into {}",
            report.chat_messages,
            chat_log.display()
        );
    }
    if let Some(ref video) = report.video {
        println!("Downloaded video into {}", video.display());
    }
}

/// Clip every highlight (or one, with --reclip-index).
fn run_highlight_clips(
    args: &Args,
    config: &Config,
    registry: &MatcherRegistry,
    paths: &MediaPaths,
    renderer: &Ffmpeg,
) -> Result<()> {
    // Fail before writing the timecode file when there is nothing to cut.
    if !args.clip_dryrun && !paths.video().exists() {
        return Err(Error::ResourceNotFound {
            kind: "video",
            path: paths.video(),
        }
        .into());
    }

    let timecode_path = paths.timecode();
    let times: Vec<Timestamp> = if args.load_timecode && timecode_path.exists() {
        tracing::info!(path = %timecode_path.display(), "Loading timecodes");
        timecode::read(&timecode_path).context("failed to load timecode file")?
    } else {
        let matcher = registry.get(&config.clustering.matcher)?;
        let log = ChatLog::load(&paths.chat_log())?;
        let hits = extract::extract_matching(&log.chats, matcher)?;

        let clusterer = TimeClusterer::new(
            config.clustering.distance_threshold_secs,
            config.clustering.min_reports,
        )?;
        let highlights = clusterer.highlights(&hits)?;

        if args.clip_dryrun {
            let histogram = Histogram::from_timestamps(&hits, DEFAULT_BIN_SECS);
            println!(
                "{} '{}' hit(s) in {} message(s)",
                hits.len(),
                matcher.name(),
                log.chats.len()
            );
            print!("{}", histogram.render(&highlights, 50));
        }

        timecode::write(&timecode_path, &highlights, &config.clip.suffix)
            .context("failed to write timecode file")?;
        highlights.iter().map(|h| h.representative_time).collect()
    };

    println!("HIC timecode:");
    for (i, &t) in times.iter().enumerate() {
        println!("  {} {}", clip_label(&config.clip.suffix, i), format_duration(t));
    }

    if times.is_empty() {
        println!("no highlight events found");
        return Ok(());
    }
    if args.clip_dryrun {
        return Ok(());
    }

    let planner = ClipPlanner::new(
        config.clip.seconds_before,
        config.clip.seconds_after,
        config.clip.suffix.as_str(),
    );
    let clips = planner.plan(&times, args.reclip_index);
    if clips.is_empty() {
        anyhow::bail!(
            "reclip index {} is out of range ({} highlight(s))",
            args.reclip_index.unwrap_or_default(),
            times.len()
        );
    }
    if args.verbose > 0 {
        for clip in &clips {
            println!("  {} {:.1}s..{:.1}s", clip.label, clip.start, clip.end);
        }
    }

    let written = render_clips(renderer, paths, &clips).context("clipping failed")?;
    println!("Wrote {} clip(s)", written.len());
    Ok(())
}

/// Clip one user-supplied timecode, labelled after the timecode itself.
fn run_single_clip(
    text: &str,
    config: &Config,
    paths: &MediaPaths,
    renderer: &Ffmpeg,
) -> Result<()> {
    let t = parse_duration(text)?;
    let planner = ClipPlanner::new(
        config.clip.seconds_before,
        config.clip.seconds_after,
        text.replace(':', "_"),
    );
    let clips = planner.plan(&[t], None);

    let written = render_clips(renderer, paths, &clips).context("clipping failed")?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
