use std::path::PathBuf;

use clap::Parser;
use issuetrail_core::ReportShape;

#[derive(Parser)]
#[command(name = "issuetrail")]
#[command(about = "Trace repository links to their tracker issues and report on logging-related ones", long_about = None)]
#[command(version)]
pub struct Cli {
    /// CSV file to read rows from
    pub input: PathBuf,

    /// CSV report to write
    pub output: PathBuf,

    /// Report to produce: reference, detail or full (default from config: full)
    #[arg(long)]
    pub shape: Option<ReportShape>,

    /// Rows processed at once (default from config: 5)
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,

    /// Input column header (default: git_url, or "Issue ID" for detail reports)
    #[arg(long)]
    pub column: Option<String>,

    /// Config file to use instead of the per-user one
    #[arg(long, env = "ISSUETRAIL_CONFIG")]
    pub config: Option<PathBuf>,
}
