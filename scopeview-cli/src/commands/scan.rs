//! Scan commands - plan and dry-run stage scans.

use std::time::Duration;

use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scopeview::config::ScanSettings;
use scopeview::scan::{ScanPlan, ScanRunner, ScanType, SimulatedCollector, SimulatedStage};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Scan subcommands.
#[derive(Debug, Subcommand)]
pub enum ScanCommands {
    /// Print the visiting order and image geometry of a scan
    Plan(PlanArgs),

    /// Run a scan against the simulated stage and detector
    Simulate(SimulateArgs),
}

/// Scan area overrides; unset values come from the `[scan]` section.
#[derive(Debug, Clone, Default, Args)]
pub struct AreaArgs {
    /// Scan type (raster, serpentine, trace_retrace, ortho_raster, ortho_trace_retrace)
    #[arg(long = "type")]
    pub scan_type: Option<ScanType>,

    /// Horizontal start position (µm)
    #[arg(long, allow_hyphen_values = true)]
    pub h0: Option<f64>,

    /// Horizontal stop position (µm)
    #[arg(long, allow_hyphen_values = true)]
    pub h1: Option<f64>,

    /// Horizontal step (µm)
    #[arg(long)]
    pub dh: Option<f64>,

    /// Vertical start position (µm)
    #[arg(long, allow_hyphen_values = true)]
    pub v0: Option<f64>,

    /// Vertical stop position (µm)
    #[arg(long, allow_hyphen_values = true)]
    pub v1: Option<f64>,

    /// Vertical step (µm)
    #[arg(long)]
    pub dv: Option<f64>,
}

impl AreaArgs {
    fn apply(&self, settings: &ScanSettings) -> ScanSettings {
        ScanSettings {
            scan_type: self.scan_type.unwrap_or(settings.scan_type),
            h0: self.h0.unwrap_or(settings.h0),
            h1: self.h1.unwrap_or(settings.h1),
            dh: self.dh.unwrap_or(settings.dh),
            v0: self.v0.unwrap_or(settings.v0),
            v1: self.v1.unwrap_or(settings.v1),
            dv: self.dv.unwrap_or(settings.dv),
        }
    }
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    /// Print the full plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    /// Simulated integration time per pixel in milliseconds
    #[arg(long, default_value_t = 5)]
    pub dwell_ms: u64,
}

pub fn run(command: ScanCommands, verbose: bool) -> Result<(), CliError> {
    match command {
        ScanCommands::Plan(args) => run_plan(args, verbose),
        ScanCommands::Simulate(args) => run_simulate(args, verbose),
    }
}

fn build_plan(runner: &CliRunner, area: &AreaArgs) -> Result<ScanPlan, CliError> {
    let settings = area.apply(&runner.config().scan);
    let (h, v) = settings.ranges()?;
    Ok(ScanPlan::generate(settings.scan_type, &h, &v))
}

fn run_plan(args: PlanArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("scan plan");
    let plan = build_plan(&runner, &args.area)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print!("{}", plan_summary(&plan));

    Ok(())
}

/// Plain-text plan overview, one field per line.
fn plan_summary(plan: &ScanPlan) -> String {
    let (frames, nv, nh) = plan.shape;
    let [left, right, bottom, top] = plan.imshow_extent;
    let mut lines = vec![
        format!("Scan plan: {}", plan.scan_type),
        format!("  Image:   {} frame(s) of {} x {} pixels", frames, nh, nv),
        format!("  Pixels:  {}", plan.num_pixels()),
        format!("  Lines:   {}", plan.num_lines()),
        format!("  Extent:  h {} .. {}, v {} .. {} µm", left, right, bottom, top),
    ];
    if let Some(last) = plan.num_pixels().checked_sub(1) {
        lines.push(format!("  First:   ({}, {}) µm", plan.h_positions[0], plan.v_positions[0]));
        lines.push(format!("  Last:    ({}, {}) µm", plan.h_positions[last], plan.v_positions[last]));
    }
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

fn run_simulate(args: SimulateArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("scan simulate");
    let plan = build_plan(&runner, &args.area)?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received interrupt, stopping after the current pixel...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let bar = ProgressBar::new(plan.num_pixels() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} px ({eta})")
            .map_err(|e| CliError::Config(format!("Invalid progress template: {}", e)))?
            .progress_chars("=> "),
    );
    let progress_bar = bar.clone();
    let scan_runner = ScanRunner::new().with_progress(Box::new(move |done, _, _| {
        progress_bar.set_position(done as u64);
    }));

    let mut stage = SimulatedStage::default();
    let mut collector = SimulatedCollector::new(Duration::from_millis(args.dwell_ms));
    let result = scan_runner.run(&plan, &mut stage, &mut collector, &cancel);
    bar.finish_and_clear();
    let data = result?;

    println!(
        "{} {} of {} pixels",
        if data.interrupted { "Interrupted after" } else { "Completed" },
        data.completed,
        plan.num_pixels()
    );
    println!("  Stage travel: {:.1} µm ({} slow moves)", stage.travel, stage.slow_moves);

    let peak = data.values.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    if peak.is_finite() {
        println!("  Peak signal:  {:.3}", peak);
    }

    Ok(())
}
