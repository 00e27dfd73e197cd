//! # relaydash: relay admin dashboard
//!
//! Composition root that wires the adapters together and runs one command.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Install the tracing subscriber (stderr, so logs never mix with output)
//! - Construct the reqwest relay client and the file session store (adapters)
//! - Construct the dashboard, injecting the adapters via port traits
//! - Run the requested command, either one-shot or the live `watch` view
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod cli;
mod config;
mod render;
mod watch;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relaydash_adapter_http_reqwest::{HttpConfig, ReqwestRelayApi};
use relaydash_adapter_store_file::FileSessionStore;
use relaydash_app::dashboard::Dashboard;
use relaydash_app::services::actions::ActionOutcome;
use relaydash_app::services::fetcher::Refresh;
use relaydash_domain::error::DashError;
use relaydash_domain::filter::FilterField;
use relaydash_domain::notification::Notification;
use relaydash_domain::time::now;

use crate::cli::{Cli, Command, CredsCommand, FilterArgs, TokenCommand};
use crate::config::Config;

/// The dashboard as wired by this binary.
pub(crate) type App = Dashboard<ReqwestRelayApi, FileSessionStore>;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(base) = cli.api_base {
        config.api.base = base;
    }
    init_tracing(&config.logging.filter);

    // Adapters
    let api = ReqwestRelayApi::new(&HttpConfig::new(&config.api.base).with_timeout(config.timeout()))?;
    let store = FileSessionStore::new(&config.session.file);
    tracing::debug!(
        base = api.base().as_str(),
        session = %store.path().display(),
        "adapters ready"
    );

    let dashboard = Arc::new(Dashboard::new(Arc::new(api), Arc::new(store)));
    let output = if cli.json { Output::Json } else { Output::Text };
    run(cli.command, dashboard, &config, output).await
}

/// How one-shot lists are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(
    command: Command,
    dashboard: Arc<App>,
    config: &Config,
    output: Output,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let code = match command {
        Command::Watch(filters) => {
            watch::run(dashboard, config.poll_period(), filters).await?;
            ExitCode::SUCCESS
        }
        Command::Phones => {
            let result = dashboard.fetcher().refresh_phones().await;
            let phones = dashboard.view(now()).phones;
            match output {
                Output::Text => print!("{}", render::phones(&phones)),
                Output::Json => println!("{}", serde_json::to_string_pretty(&phones)?),
            }
            fetch_exit_code(result)
        }
        Command::Clients(filters) => {
            apply_filters(&dashboard, &filters);
            let result = dashboard.fetcher().refresh_clients().await;
            let clients = dashboard.view(now()).clients;
            match output {
                Output::Text => print!("{}", render::clients(&clients)),
                Output::Json => println!("{}", serde_json::to_string_pretty(&clients)?),
            }
            fetch_exit_code(result)
        }
        Command::Rotate => report_action(&dashboard.rotate().await),
        Command::Restart => report_action(&dashboard.restart().await),
        Command::Login { user, pass } => report(&dashboard.login(&user, &pass).await),
        Command::Logout => {
            dashboard.auth().forget()?;
            println!("Выход выполнен");
            ExitCode::SUCCESS
        }
        Command::Creds(CredsCommand::Show { domain }) => {
            match dashboard
                .settings()
                .load_masked_credentials(domain.into())
                .await
            {
                Some(body) => {
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("Не удалось загрузить учётки");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Creds(CredsCommand::Set { domain, user, pass }) => report_action(
            &dashboard
                .save_credentials(domain.into(), &user, &pass)
                .await,
        ),
        Command::Token(TokenCommand::Show) => {
            match dashboard.settings().rotation_token() {
                Some(token) => println!("{}", token.as_str()),
                None => println!("rotate_token не задан"),
            }
            ExitCode::SUCCESS
        }
        Command::Token(TokenCommand::Set { token }) => {
            report(&dashboard.settings().save_rotation_token(&token))
        }
        Command::Token(TokenCommand::Clear) => {
            report(&dashboard.settings().clear_rotation_token())
        }
    };
    Ok(code)
}

fn apply_filters(dashboard: &App, filters: &FilterArgs) {
    dashboard.set_filter(FilterField::Ip, &filters.ip);
    dashboard.set_filter(FilterField::Phone, &filters.phone);
    dashboard.set_filter(FilterField::Stream, &filters.stream);
}

fn fetch_exit_code(result: Result<Refresh, DashError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(DashError::Unauthorized) => {
            eprintln!("Требуется вход: relaydash login --user <логин> --pass <пароль>");
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}

fn report(notification: &Notification) -> ExitCode {
    let line = render::notification(notification);
    if notification.is_failure() {
        eprintln!("{line}");
        ExitCode::FAILURE
    } else {
        println!("{line}");
        ExitCode::SUCCESS
    }
}

fn report_action(outcome: &ActionOutcome) -> ExitCode {
    match outcome.notification() {
        Some(notification) => report(notification),
        None => ExitCode::FAILURE,
    }
}
