use std::path::Path;
use std::time::Duration;

use console::Style;
use motionblend_core::config::OutputConfig;
use motionblend_core::save::SaveStats;
use motionblend_core::shutter::ShutterWindow;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    bad: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            bad: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

/// What a `blend` run did, for the closing summary.
pub struct BlendReport {
    pub sub_frames: usize,
    pub ignored: usize,
    pub groups: usize,
    pub stats: SaveStats,
    pub elapsed: Duration,
}

pub fn print_blend_header(input: &Path, output: &OutputConfig, window: &ShutterWindow, files: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Motion Blend"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.directory.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Format"),
        s.value.apply_to(output.format)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Sub-frames"),
        s.value.apply_to(files)
    );
    println!();

    println!("  {}", s.header.apply_to("Shutter"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Blend rate"),
        s.value.apply_to(window.blend_rate())
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!(
            "{}..={} ({} merged)",
            window.min_accepted(),
            window.max_accepted(),
            window.accepted_count()
        ))
    );
    println!();
}

pub fn print_blend_summary(report: &BlendReport) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Replayed"),
        s.value.apply_to(format!(
            "{} sub-frames ({} outside window)",
            report.sub_frames, report.ignored
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Groups"),
        s.value.apply_to(report.groups)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Saved"),
        s.good.apply_to(report.stats.saved)
    );
    if report.stats.failed > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Failed"),
            s.bad.apply_to(report.stats.failed)
        );
    }
    if report.stats.discarded > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Discarded"),
            s.bad.apply_to(report.stats.discarded)
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Elapsed"),
        s.value.apply_to(format!("{:.2}s", report.elapsed.as_secs_f64()))
    );
    println!();
}
