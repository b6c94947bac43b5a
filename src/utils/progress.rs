use indicatif::{ProgressBar, ProgressStyle};

/// Receives byte counts from the downloader while a file streams in
pub trait ProgressReporter: Send {
    /// `total` is 0 when the server did not declare a length
    fn start(&mut self, name: &str, total: u64);
    fn advance(&mut self, written: u64);
    fn finish(&mut self, written: u64);
}

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA: {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} {bytes} ({bytes_per_sec})";

/// Terminal progress bar; a spinner when the length is unknown
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressReporter for BarProgress {
    fn start(&mut self, name: &str, total: u64) {
        let (bar, template) = if total > 0 {
            (ProgressBar::new(total), BAR_TEMPLATE)
        } else {
            (ProgressBar::new_spinner(), SPINNER_TEMPLATE)
        };
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(name.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self, written: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(written);
        }
    }

    fn finish(&mut self, written: u64) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(written);
            bar.finish();
        }
    }
}

/// Discards all progress events
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&mut self, _name: &str, _total: u64) {}
    fn advance(&mut self, _written: u64) {}
    fn finish(&mut self, _written: u64) {}
}
