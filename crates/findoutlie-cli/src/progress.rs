use anyhow::Result;
use findoutlie_core::metrics::{MetricStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives a single terminal progress bar through each metric stage.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:22} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: MetricStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}
