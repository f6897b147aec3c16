use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use memmap2::Mmap;
use motionblend_core::blend::FrameBlender;
use motionblend_core::config::MotionBlendConfig;
use motionblend_core::handler::{HandleCounter, VideoHandler};
use motionblend_core::io::image_io::OutputFormat;
use motionblend_core::io::naming::frame_number_from_path;
use motionblend_core::save::{ImageSaveQueue, SaveQueue};
use motionblend_core::shutter::ShutterWindow;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::summary::{print_blend_header, print_blend_summary, BlendReport};

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Png,
    Tiff,
    Bmp,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Tiff => OutputFormat::Tiff,
            FormatArg::Bmp => OutputFormat::Bmp,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[derive(Args)]
pub struct BlendArgs {
    /// Directory of numbered TGA sub-frames
    pub input: PathBuf,

    /// Sub-frames per output frame (overrides config)
    #[arg(long)]
    pub blend_rate: Option<u32>,

    /// Shutter angle in degrees, 1-360 (overrides config)
    #[arg(long)]
    pub shutter_angle: Option<u32>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output image format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Bytes per write call
    #[arg(long, default_value = "65536")]
    pub chunk_size: usize,

    /// Worker threads replaying writes (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,
}

/// One captured sub-frame file.
struct SubFrame {
    frame_number: u64,
    path: PathBuf,
}

pub fn run(args: &BlendArgs, mut config: MotionBlendConfig) -> Result<()> {
    if args.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }
    if let Some(rate) = args.blend_rate {
        config.blend.blend_rate = rate;
    }
    if let Some(angle) = args.shutter_angle {
        config.blend.shutter_angle = angle;
    }
    if let Some(ref dir) = args.output {
        config.output.directory = dir.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    let window = config.blend.window()?;

    let inputs = collect_sub_frames(&args.input)?;
    if inputs.is_empty() {
        bail!("No numbered .tga files in {}", args.input.display());
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = args.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("Failed to start worker pool")?;

    print_blend_header(&args.input, &config.output, &window, inputs.len());

    let queue = Arc::new(
        ImageSaveQueue::spawn(config.output.clone()).with_context(|| {
            format!("Failed to prepare output {}", config.output.directory.display())
        })?,
    );
    let shared: Arc<dyn SaveQueue> = queue.clone();
    let blender = FrameBlender::with_tga(&config.blend, shared)?;
    let handles = HandleCounter::new();

    let groups = group_by_output(&window, inputs);
    let total: usize = groups.values().map(Vec::len).sum();
    let ignored = groups
        .values()
        .flatten()
        .filter(|s| window.should_ignore(s.frame_number))
        .count();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Blending [{bar:40}] {pos}/{len} sub-frames")?
            .progress_chars("=> "),
    );

    let start = Instant::now();
    for sub_frames in groups.values() {
        pool.install(|| -> Result<()> {
            sub_frames
                .par_iter()
                .try_for_each(|s| replay_writes(&blender, &handles, s, args.chunk_size))?;
            close_group(&blender, &window, sub_frames, &pb);
            Ok(())
        })?;
    }
    pb.finish_and_clear();

    queue.shutdown();
    blender.destroy();

    print_blend_summary(&BlendReport {
        sub_frames: total,
        ignored,
        groups: groups.len(),
        stats: queue.stats(),
        elapsed: start.elapsed(),
    });
    Ok(())
}

/// Numbered `.tga` files in `dir`, sorted by frame number.
fn collect_sub_frames(dir: &Path) -> Result<Vec<SubFrame>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut found: BTreeMap<u64, PathBuf> = BTreeMap::new();
    for entry in entries {
        let path = entry?.path();
        let is_tga = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tga"));
        if !path.is_file() || !is_tga {
            continue;
        }
        let Some(frame_number) = frame_number_from_path(&path) else {
            warn!(path = %path.display(), "no frame number in file name, skipping");
            continue;
        };
        if let Some(previous) = found.insert(frame_number, path.clone()) {
            warn!(
                frame_number,
                kept = %path.display(),
                dropped = %previous.display(),
                "duplicate frame number"
            );
        }
    }

    Ok(found
        .into_iter()
        .map(|(frame_number, path)| SubFrame { frame_number, path })
        .collect())
}

fn group_by_output(window: &ShutterWindow, inputs: Vec<SubFrame>) -> BTreeMap<u64, Vec<SubFrame>> {
    let mut groups: BTreeMap<u64, Vec<SubFrame>> = BTreeMap::new();
    for s in inputs {
        groups.entry(window.group(s.frame_number)).or_default().push(s);
    }
    groups
}

/// Feed one file through `create` and chunked `write` calls, the way the
/// filesystem driver delivers a sub-frame.
fn replay_writes(
    blender: &FrameBlender,
    handles: &HandleCounter,
    sub_frame: &SubFrame,
    chunk_size: usize,
) -> Result<()> {
    let file = File::open(&sub_frame.path)
        .with_context(|| format!("Failed to open {}", sub_frame.path.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };

    let handle = handles.next_handle();
    debug!(handle, frame_number = sub_frame.frame_number, bytes = mmap.len(), "replaying sub-frame");
    blender.create(sub_frame.frame_number);

    for (i, chunk) in mmap.chunks(chunk_size).enumerate() {
        let offset = (i * chunk_size) as u64;
        let written = blender.write(sub_frame.frame_number, chunk, offset);
        if written != chunk.len() {
            bail!(
                "Short write for {} at offset {}: {} of {} bytes",
                sub_frame.path.display(),
                offset,
                written,
                chunk.len()
            );
        }
    }
    Ok(())
}

/// Close a group's sub-frames: the opening slot first, the closing slot last,
/// everything between concurrently.
fn close_group(blender: &FrameBlender, window: &ShutterWindow, sub_frames: &[SubFrame], pb: &ProgressBar) {
    let close = |s: &SubFrame| {
        blender.close(s.frame_number);
        pb.inc(1);
    };

    sub_frames
        .iter()
        .filter(|s| window.is_first_of_group(s.frame_number))
        .for_each(close);
    sub_frames
        .par_iter()
        .filter(|s| {
            !window.is_first_of_group(s.frame_number) && !window.is_last_of_group(s.frame_number)
        })
        .for_each(close);
    sub_frames
        .iter()
        .filter(|s| {
            window.is_last_of_group(s.frame_number) && !window.is_first_of_group(s.frame_number)
        })
        .for_each(close);
}
