use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Terminal progress bar fed by the worker pool's progress callback
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    bar: ProgressBar,
}

impl PipelineProgress {
    pub fn new(total_items: usize, workers: usize) -> Self {
        Self::with_target(total_items, workers, ProgressDrawTarget::stderr())
    }

    /// Progress that tracks position but never draws
    pub fn hidden(total_items: usize) -> Self {
        Self::with_target(total_items, 0, ProgressDrawTarget::hidden())
    }

    fn with_target(total_items: usize, workers: usize, target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template(
            "⚡ [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} items ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        let bar = ProgressBar::with_draw_target(Some(total_items as u64), target);
        bar.set_style(style);
        if workers > 0 {
            bar.set_message(format!("{workers} workers"));
        }
        Self { bar }
    }

    /// Matches the pool's `(completed, total, worker_id)` callback shape
    pub fn update(&self, completed: usize, total: usize, worker_id: usize) {
        // Callbacks from different workers race, so count them instead of
        // trusting the order `completed` arrives in
        self.bar.inc(1);
        // Only refresh the message every few items to reduce flicker
        if completed % 5 == 0 || completed == total {
            self.bar.set_message(format!("[worker-{worker_id}]"));
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
