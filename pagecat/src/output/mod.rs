//! User-facing output: status messages, progress, and session listings.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::config::Config;
//! use pagecat::controller::SelectionController;
//! use pagecat::output::{create_formatter, display_session};
//!
//! # fn example(config: Config, controller: SelectionController) -> pagecat::Result<()> {
//! let formatter = create_formatter(&config);
//! display_session(&formatter, &controller.view(), config.json)?;
//! # Ok(())
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::error::{PageCatError, Result};
use crate::io::WriteStatistics;
use crate::merge::MergeStatistics;
use crate::session::SessionView;
use crate::utils::format_file_size;

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Text listing of a session: one block per document, then the merge order.
///
/// Selected pages carry their merge position in brackets, e.g. `3[1]`.
pub fn render_session(view: &SessionView) -> Vec<String> {
    if view.documents.is_empty() {
        return vec!["No documents loaded.".to_string()];
    }

    let mut lines = Vec::new();
    for doc in &view.documents {
        lines.push(format!(
            "{} {} ({} page(s), {})",
            doc.id,
            doc.name,
            doc.page_count,
            format_file_size(doc.size)
        ));
        let pages: Vec<String> = doc
            .pages
            .iter()
            .map(|page| match page.order {
                Some(order) => format!("{}[{order}]", page.page_number),
                None => page.page_number.to_string(),
            })
            .collect();
        lines.push(format!("  pages: {}", pages.join(" ")));
    }

    if view.selection.is_empty() {
        lines.push("Merge order: nothing selected".to_string());
    } else {
        let order: Vec<String> = view.selection.iter().map(ToString::to_string).collect();
        lines.push(format!(
            "Merge order ({} page(s)): {}",
            order.len(),
            order.join(", ")
        ));
    }
    lines
}

/// Print the session to stdout, as text or as JSON.
pub fn display_session(formatter: &OutputFormatter, view: &SessionView, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(view)
            .map_err(|e| PageCatError::other(format!("cannot serialize session: {e}")))?;
        formatter.output(&text);
    } else {
        for line in render_session(view) {
            formatter.output(&line);
        }
    }
    Ok(())
}

/// Report a finished merge.
pub fn display_merge_statistics(
    formatter: &OutputFormatter,
    merge: &MergeStatistics,
    write: &WriteStatistics,
) {
    formatter.success(&format!(
        "Merged {} page(s) from {} document(s) into {} ({})",
        merge.pages_merged,
        merge.source_documents,
        write.output_path.display(),
        write.format_file_size()
    ));
    if merge.pages_skipped > 0 {
        formatter.warning(&format!(
            "{} selected page(s) referred to documents that are no longer loaded",
            merge.pages_skipped
        ));
    }
    formatter.section("Statistics");
    formatter.detail("Source loads", &merge.source_loads.to_string());
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", merge.merge_time.as_secs_f64()),
    );
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write.write_time.as_secs_f64()),
    );
}
