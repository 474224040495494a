use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use issuetrail_config::Config;
use issuetrail_engine::{Pipeline, PipelineSettings, RunReport};
use issuetrail_sources::{
    AnchorQuery, BrowserHandle, BrowserOptions, ChromeBrowser, JiraClient, RowSource,
    TrackerOptions,
};
use issuetrail_text::{CommentFormatter, KeywordMatcher, Normalizer};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::report;

/// Fold command-line flags into the loaded config
fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(shape) = cli.shape {
        config.pipeline.shape = shape;
    }
    if let Some(concurrency) = cli.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(column) = &cli.column {
        config.pipeline.input_column = Some(column.clone());
    }
    config
}

fn tracker_options(config: &Config) -> TrackerOptions {
    TrackerOptions {
        host: config.tracker.host.clone(),
        user_agent: config.tracker.user_agent.clone(),
        request_timeout: config.tracker.request_timeout_secs.map(Duration::from_secs),
    }
}

fn browser_options(config: &Config) -> BrowserOptions {
    BrowserOptions {
        headless: config.browser.headless,
        executable: config.browser.executable.clone(),
    }
}

fn pipeline_settings(config: &Config) -> PipelineSettings {
    PipelineSettings {
        shape: config.pipeline.shape,
        concurrency: config.pipeline.concurrency,
        anchor: AnchorQuery {
            selector: config.browser.anchor_selector.clone(),
            timeout: Duration::from_millis(config.browser.anchor_timeout_ms),
        },
    }
}

fn comment_formatter(config: &Config) -> Result<CommentFormatter> {
    let keywords = KeywordMatcher::new(config.text.keywords.as_slice())?;
    Ok(CommentFormatter::new(
        Normalizer::new(config.text.drop_empty_lines),
        Arc::new(keywords),
    ))
}

pub async fn handle(cli: Cli, config: Config) -> Result<()> {
    let config = apply_overrides(&cli, config);
    config.validate()?;

    let shape = config.pipeline.shape;
    let column = config.pipeline.input_column();

    let rows = RowSource::open(&cli.input, column)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let tracker = Arc::new(JiraClient::new(&tracker_options(&config))?);
    let pipeline = Pipeline::new(
        pipeline_settings(&config),
        tracker,
        Arc::new(comment_formatter(&config)?),
    );

    let report = if shape.needs_browser() {
        let browser = Arc::new(
            ChromeBrowser::launch(&browser_options(&config))
                .await
                .context("Failed to launch the browser")?,
        );
        let result = pipeline.with_browser(browser.clone()).run(rows).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close the browser");
        }
        result?
    } else {
        pipeline.run(rows).await?
    };

    report::write_report(&cli.output, shape, &report.records)?;
    print_summary(&cli, &report);

    Ok(())
}

fn print_summary(cli: &Cli, report: &RunReport) {
    let summary = &report.summary;

    info!(output = %cli.output.display(), "Report written");
    println!(
        "✓ Wrote {} {} records to {}",
        summary.rows,
        summary.shape,
        cli.output.display()
    );
    if summary.failed > 0 {
        println!("  {} row(s) failed and were written as null:", summary.failed);
        for failure in &report.failures {
            println!("    row {}: {} ({})", failure.index + 1, failure.source, failure.error);
        }
    }
}
