use std::path::PathBuf;

use app_api::{AccountField, SelectionRequest};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "getusage", version, about = "Cluster usage reports and dashboard API")]
pub struct Cli {
    /// Config file; created with defaults when missing
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Print the monthly and per-user summary tables
    Report(ReportArgs),
    /// Write the detail rows as CSV
    Export(ExportArgs),
    /// List accounts the viewer may select
    Accounts(AccountsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured port for this run only
    #[arg(long)]
    pub port: Option<u16>,
    /// Override the configured bind address for this run only
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Account to report on; repeat for several
    #[arg(long = "account", required = true)]
    pub accounts: Vec<String>,
    #[arg(long, default_value = "CPU Hours")]
    pub measure: String,
    /// Partition class: all, commons, private or scavenge
    #[arg(long = "class", default_value = "all")]
    pub class: String,
    /// Range preset such as thismonth or last90days
    #[arg(long)]
    pub range: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
}

impl SelectionArgs {
    pub fn to_request(&self) -> SelectionRequest {
        SelectionRequest {
            account: Some(AccountField::Many(self.accounts.clone())),
            view: None,
            measure: Some(self.measure.clone()),
            partition_class: Some(self.class.clone()),
            granularity: Some("month".to_string()),
            range: self.range.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
    #[arg(long, default_value = usage_engine::EXPORT_FILE_NAME)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct AccountsArgs {
    /// Resolve for this user instead of the configured viewer
    #[arg(long)]
    pub user: Option<String>,
}
