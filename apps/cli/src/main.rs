mod args;
mod config;
mod report;

use std::fs;
use std::io;

use app_api::{AccountsRequest, AppContext};
use clap::Parser;
use http_api::HttpState;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use usage_app::{AppState, ViewState};

use crate::args::{AccountsArgs, Cli, Command, ExportArgs, ReportArgs, ReportFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let load = config::load_or_create(cli.config)?;
    let mut app_config = load.config;

    match cli.command {
        Command::Serve(args) => {
            config::apply_serve_overrides(&mut app_config, &args);
            let context = AppContext::new(AppState::new(app_config)).with_config_path(load.path);
            serve(context).await
        }
        Command::Report(args) => report(&AppState::new(app_config), &args),
        Command::Export(args) => export(&AppState::new(app_config), &args),
        Command::Accounts(args) => accounts(AppContext::new(AppState::new(app_config)), args),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn serve(context: AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let refresh_state = context.app_state.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(err) = refresh_state.refresh_data() {
            tracing::warn!(error = %err, "initial refresh failed; serving 503 until a refresh succeeds");
        }
    });

    let server = context.app_state.config.server.clone();
    let prefix = server.normalized_prefix();
    let router = http_api::router(HttpState::new(context));

    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, prefix = %prefix, "getusage is serving; press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

fn report(state: &AppState, args: &ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    state.refresh_data()?;
    let selection = app_api::parse_selection(args.selection.to_request())?;
    let ViewState::Ready(view) = state.services.usage.summary(&selection)? else {
        println!("No account or measure selected.");
        return Ok(());
    };
    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        ReportFormat::Table => {
            print!("{}", report::render_table("Month", &view.monthly));
            println!();
            print!("{}", report::render_table("User", &view.users));
        }
    }
    Ok(())
}

fn export(state: &AppState, args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    state.refresh_data()?;
    let selection = app_api::parse_selection(args.selection.to_request())?;
    let ViewState::Ready(artifact) = state.services.usage.export(&selection)? else {
        println!("No account or measure selected.");
        return Ok(());
    };
    fs::write(&args.out, &artifact.body)?;
    tracing::info!(
        path = %args.out.display(),
        rows = artifact.body.lines().count().saturating_sub(1),
        "wrote export"
    );
    Ok(())
}

fn accounts(context: AppContext, args: AccountsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let list = app_api::accounts(&context, AccountsRequest { user: args.user })?;
    match list.user.as_deref() {
        Some(user) if list.accounts.is_empty() => println!("No accounts found for {user}."),
        Some(user) => {
            println!("Accounts for {user}:");
            for account in &list.accounts {
                let marker = if list.default_account.as_ref() == Some(account) {
                    " (default)"
                } else {
                    ""
                };
                println!("  {account}{marker}");
            }
        }
        None => println!("No viewer configured; pass --user or set accounts.user."),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C");
    }
}
