//! Live dashboard: periodic refresh, redraw on every state change, and line
//! commands read from stdin.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use relaydash_domain::filter::FilterField;
use relaydash_domain::time::now;

use crate::App;
use crate::cli::FilterArgs;
use crate::render;

const CLEAR: &str = "\x1b[2J\x1b[H";
const HELP: &str = "Команды: ip|phone|stream <значение>, reset, rotate, restart, refresh, login <логин> <пароль>, q";

/// A line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Filter(FilterField, String),
    Reset,
    Rotate,
    Restart,
    Refresh,
    Login { user: String, pass: String },
    Quit,
    Unknown(String),
}

/// Parse one input line; blank lines yield `None`.
#[must_use]
pub fn parse(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let input = match word {
        "ip" => Input::Filter(FilterField::Ip, rest.to_string()),
        "phone" => Input::Filter(FilterField::Phone, rest.to_string()),
        "stream" => Input::Filter(FilterField::Stream, rest.to_string()),
        "reset" => Input::Reset,
        "rotate" => Input::Rotate,
        "restart" => Input::Restart,
        "refresh" => Input::Refresh,
        "login" => match rest.split_once(char::is_whitespace) {
            Some((user, pass)) => Input::Login {
                user: user.to_string(),
                pass: pass.trim().to_string(),
            },
            None => Input::Login {
                user: rest.to_string(),
                pass: String::new(),
            },
        },
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    };
    Some(input)
}

/// Run the live dashboard until `q`, end of input, or Ctrl-C.
///
/// # Errors
///
/// Returns an error when stdin or stdout fail.
pub async fn run(dashboard: Arc<App>, period: Duration, filters: FilterArgs) -> std::io::Result<()> {
    dashboard.set_filter(FilterField::Ip, &filters.ip);
    dashboard.set_filter(FilterField::Phone, &filters.phone);
    dashboard.set_filter(FilterField::Stream, &filters.stream);

    let mut stdout = tokio::io::stdout();
    draw(&mut stdout, &dashboard).await?;
    dashboard.ensure_authenticated().await;

    let poller = dashboard.poller(period).spawn();
    let mut changes = dashboard.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // ages and toast expiry move with the clock
    let mut clock = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = clock.tick() => {}
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse(&line) {
                    Some(Input::Quit) => break,
                    Some(input) => handle(&dashboard, input),
                    None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        draw(&mut stdout, &dashboard).await?;
    }

    poller.abort();
    tracing::info!("watch stopped");
    Ok(())
}

fn handle(dashboard: &Arc<App>, input: Input) {
    match input {
        Input::Filter(field, value) => dashboard.set_filter(field, &value),
        Input::Reset => dashboard.reset_filters(),
        Input::Rotate => spawn(dashboard, |dash| async move {
            dash.rotate().await;
        }),
        Input::Restart => spawn(dashboard, |dash| async move {
            dash.restart().await;
        }),
        Input::Refresh => spawn(dashboard, |dash| async move {
            dash.refresh().await;
        }),
        Input::Login { user, pass } => spawn(dashboard, |dash| async move {
            if !dash.login(&user, &pass).await.is_failure() {
                dash.refresh().await;
            }
        }),
        Input::Quit => {}
        Input::Unknown(line) => tracing::warn!(%line, "unknown command"),
    }
}

fn spawn<F, Fut>(dashboard: &Arc<App>, f: F)
where
    F: FnOnce(Arc<App>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(f(Arc::clone(dashboard)));
}

async fn draw(stdout: &mut tokio::io::Stdout, dashboard: &App) -> std::io::Result<()> {
    let frame = render::frame(&dashboard.view(now()));
    let text = format!("{CLEAR}{frame}\n{HELP}\n");
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
