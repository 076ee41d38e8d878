use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::Output;
use crate::config::{CliOverrides, OutputOverrides, PipelineOverrides, ScorepipeConfig};
use crate::driver::report::{self, ReportFormat};
use crate::driver::{Driver, QueueKind, load_work_items};
use crate::pipeline::{PipelineProgress, QueueOrder};
use crate::scoring::ScoringKind;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON or YAML array of work items ({"ID", "MatrixSize", "Seed"})
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Scoring strategy
    #[arg(long, value_enum)]
    pub strategy: Option<ScoringKind>,

    /// Keep results scoring strictly above this value
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Exact number of worker threads (default: sized from input)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Work queue realization
    #[arg(long, value_enum)]
    pub queue: Option<QueueKind>,

    /// Removal order for the monitor queue
    #[arg(long, value_enum)]
    pub order: Option<QueueOrder>,

    /// Upper bound on the computed worker count (0 = CPU cores)
    #[arg(long)]
    pub max_threads: Option<usize>,

    /// Abort the run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

impl RunArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            pipeline: PipelineOverrides {
                threshold: self.threshold,
                strategy: self.strategy,
                queue: self.queue,
                order: self.order,
                max_threads: self.max_threads,
                deadline_secs: self.deadline_secs,
            },
            output: OutputOverrides {
                format: self.format,
                progress: self.progress.then_some(true),
            },
        }
    }
}

pub async fn execute(args: RunArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = ScorepipeConfig::load(config_path, Some(&args.overrides()))?;
    let items = load_work_items(&args.input)?;
    let item_count = items.len();

    let driver = Driver::new(config.pipeline.clone()).with_workers(args.workers);
    let sizing = driver.plan(item_count);
    output.info(&format!(
        "Scoring {} items with {} workers ({} strategy, threshold {})",
        item_count, sizing.workers, config.pipeline.strategy, config.pipeline.threshold
    ));
    output.verbose(&format!(
        "Queue: {:?} ({:?}), capacity {}; result capacity {}",
        config.pipeline.queue, config.pipeline.order, sizing.queue_capacity, sizing.result_capacity
    ));

    let progress = (config.output.progress && !output.is_quiet())
        .then(|| PipelineProgress::new(item_count, sizing.workers));

    // The pipeline blocks its threads; keep it off the async runtime
    let outcome = tokio::task::spawn_blocking(move || {
        let outcome = driver.run(items, progress.as_ref());
        if let Some(progress) = &progress {
            progress.finish();
        }
        outcome
    })
    .await
    .context("Pipeline task failed to complete")?;

    let summary = match outcome {
        Ok(summary) => summary,
        Err(err) => {
            output.error(&format!("Pipeline run failed: {err}"));
            return Err(err.into());
        }
    };

    let rendered = report::render(&summary, config.output.format)?;
    report::write_report(&rendered, args.output.as_deref())?;

    let totals = summary.pool.totals();
    output.success(&format!(
        "Scored {} items in {:.2}s, {} above threshold",
        totals.processed,
        summary.elapsed.as_secs_f64(),
        summary.results.len()
    ));
    output.summary_stats("filtered", totals.filtered);
    if totals.skipped > 0 {
        output.warning(&format!("{} malformed items skipped", totals.skipped));
    }
    if totals.dropped > 0 {
        output.warning(&format!(
            "{} results dropped: result collection capacity {} exceeded",
            totals.dropped, summary.sizing.result_capacity
        ));
    }
    if let Some(path) = &args.output {
        output.info(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
