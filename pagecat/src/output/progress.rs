//! Terminal progress for merges.
//!
//! # Examples
//!
//! ```
//! use pagecat::merge::MergeProgress;
//! use pagecat::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(4, ProgressStyle::Bar);
//! progress.set_message("Merging");
//! for processed in 1..=4 {
//!     progress.observe(MergeProgress { processed, total: 4 });
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::merge::MergeProgress;

const BAR_WIDTH: usize = 30;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// `[=========>          ] 45% 9/20 1s`
    Bar,
    /// `9/20 1s`
    Counter,
}

/// Progress line drawn on stderr.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_draw: Option<Instant>,
    draw_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar for `total` steps.
    ///
    /// Drawing is disabled when stderr is not a terminal.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_draw: None,
            draw_interval: Duration::from_millis(80),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Bar style for large jobs, a plain counter for small ones.
    pub fn auto(total: usize) -> Self {
        let style = if total >= 10 {
            ProgressStyle::Bar
        } else {
            ProgressStyle::Counter
        };
        Self::new(total, style)
    }

    /// A progress bar that tracks state but never draws.
    pub fn disabled() -> Self {
        let mut bar = Self::new(0, ProgressStyle::Counter);
        bar.enabled = false;
        bar
    }

    /// Check if the bar draws to the terminal.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the label drawn in front of the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Record a merge progress report.
    pub fn observe(&mut self, progress: MergeProgress) {
        self.total = progress.total;
        self.update(progress.processed);
    }

    /// Move to `current` and redraw, at most once per draw interval
    /// unless the job just completed.
    pub fn update(&mut self, current: usize) {
        self.current = current;

        let due = self
            .last_draw
            .is_none_or(|at| at.elapsed() >= self.draw_interval);
        if due || self.current >= self.total {
            self.last_draw = Some(Instant::now());
            self.draw();
        }
    }

    /// Advance by one step.
    pub fn increment(&mut self) {
        self.update(self.current + 1);
    }

    /// Draw the completed bar and end the line.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.draw();
            eprintln!();
        }
    }

    /// Erase the bar, for example before printing an error.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            io::stderr().flush().ok();
        }
    }

    fn draw(&self) {
        if self.enabled {
            eprint!("\r{}", self.render());
            io::stderr().flush().ok();
        }
    }

    /// The progress line without cursor control.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(5);
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if self.style == ProgressStyle::Bar {
            parts.push(render_bar(self.current, self.total));
            parts.push(format!("{:.0}%", self.percent()));
        }
        parts.push(format!("{}/{}", self.current, self.total));
        parts.push(format_duration(self.start_time.elapsed()));
        parts.join(" ")
    }

    /// Completed percentage; 0 for an empty job.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64 * 100.0
        }
    }

    /// Time since the bar was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn render_bar(current: usize, total: usize) -> String {
    let filled = (BAR_WIDTH * current) / total.max(1);
    let filled = filled.min(BAR_WIDTH);
    let head = if filled > 0 && filled < BAR_WIDTH { ">" } else { "" };
    let body = "=".repeat(if head.is_empty() { filled } else { filled - 1 });
    format!("[{body}{head}{}]", " ".repeat(BAR_WIDTH - filled))
}

/// Format a duration as `42s`, `3m 5s` or `1h 2m`.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn silent(total: usize, style: ProgressStyle) -> ProgressBar {
        let mut bar = ProgressBar::new(total, style);
        bar.enabled = false;
        bar
    }

    #[test]
    fn test_auto_style() {
        assert_eq!(ProgressBar::auto(50).style, ProgressStyle::Bar);
        assert_eq!(ProgressBar::auto(3).style, ProgressStyle::Counter);
    }

    #[test]
    fn test_disabled() {
        let bar = ProgressBar::disabled();
        assert!(!bar.is_enabled());
    }

    #[test]
    fn test_observe_tracks_merge_progress() {
        let mut bar = ProgressBar::disabled();
        bar.observe(MergeProgress {
            processed: 3,
            total: 4,
        });
        assert_eq!(bar.current, 3);
        assert_eq!(bar.total, 4);
        assert_eq!(bar.percent(), 75.0);
    }

    #[test]
    fn test_increment_and_finish() {
        let mut bar = silent(5, ProgressStyle::Counter);
        bar.increment();
        bar.increment();
        assert_eq!(bar.current, 2);
        bar.finish();
        assert_eq!(bar.current, 5);
    }

    #[test]
    fn test_percent_zero_total() {
        assert_eq!(silent(0, ProgressStyle::Bar).percent(), 0.0);
    }

    #[rstest]
    #[case(0, 10, "[                              ]")]
    #[case(5, 10, "[==============>               ]")]
    #[case(10, 10, "[==============================]")]
    fn test_render_bar(#[case] current: usize, #[case] total: usize, #[case] expected: &str) {
        assert_eq!(render_bar(current, total), expected);
    }

    #[test]
    fn test_render_line() {
        let mut bar = silent(4, ProgressStyle::Counter);
        bar.set_message("Merging");
        bar.update(1);
        assert_eq!(bar.render(), "Merging 1/4 0s");

        let mut bar = silent(4, ProgressStyle::Bar);
        bar.update(2);
        assert!(bar.render().contains("50% 2/4"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }
}
