//! pagecat - Pick pages from several PDF files and merge them into one.
//!
//! Batch mode selects pages from the command line and merges right away;
//! `--interactive` opens a command shell over the same session.

mod actions;
mod cli;
mod prompt;
mod shell;
#[cfg(test)]
mod test_pdf;

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::actions::{load_inputs, merge_to_file};
use crate::cli::Cli;
use crate::prompt::Prompter;
use crate::shell::Shell;
use pagecat::config::Config;
use pagecat::controller::SelectionController;
use pagecat::error::PageCatError;
use pagecat::output::{OutputFormatter, create_formatter, display_session};

/// Environment variable holding the log filter, e.g. `pagecat=debug`.
const LOG_ENV: &str = "PAGECAT_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        match err {
            PageCatError::Cancelled => eprintln!("Cancelled."),
            ref err => eprintln!("Error: {err}"),
        }
        process::exit(err.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pagecat=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), PageCatError> {
    cli.validate()?;
    let config = cli.to_config()?;
    let formatter = create_formatter(&config);

    if formatter.is_verbose() {
        formatter.debug(&format!("{} v{}", pagecat::NAME, pagecat::VERSION));
    }

    let mut controller = SelectionController::from_config(&config);
    let mut prompter = Prompter::stdin();

    let patterns: Vec<String> = config
        .inputs()
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    let ids = if patterns.is_empty() {
        Vec::new()
    } else {
        load_inputs(&mut controller, &patterns, &config, &formatter).await?
    };

    if config.interactive {
        return Shell::new(controller, &config, &formatter, prompter)
            .run()
            .await;
    }

    for spec in &config.selections {
        let added = controller.apply_selection(spec)?;
        formatter.debug(&format!("{spec}: {added} page(s) selected"));
    }
    if config.select_all {
        for id in &ids {
            controller.select_all_pages(*id);
        }
    }

    if config.json {
        return display_session(&formatter, &controller.view(), true);
    }
    if !config.wants_merge() {
        return list_only(&controller, &config, &formatter);
    }

    merge_to_file(
        controller.session(),
        &config.output,
        &config,
        &formatter,
        &mut prompter,
    )
    .await?;
    Ok(())
}

/// Without a selection, show what was loaded and how to pick pages.
fn list_only(
    controller: &SelectionController,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), PageCatError> {
    display_session(formatter, &controller.view(), config.json)?;
    formatter.info("Nothing selected. Use --select DOC:PAGES or --all to merge.");
    Ok(())
}
