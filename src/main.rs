//! Trio - interactive entry point
//!
//! Bootstraps one session and reads prompt lines from stdin. Replies are
//! JSON on stdout; logs go to stderr.
//!
//! With `--serve` (feature `web`) the HTTP server runs instead.

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use trio::{Repl, Reply};
use trio_core::{
    load_config, GeminiSynthesizer, GeminiTranscriber, OrchestrationService, SessionKey,
    SessionService, TrioConfig,
};

const DEFAULT_LOG_FILTER: &str = "trio=info,trio_core=info,trio_server=debug,tower_http=debug";

/// Command-line arguments
struct Args {
    app: Option<String>,
    user: Option<String>,
    session: Option<String>,
    /// `Some(None)` means serve on the configured port
    serve: Option<Option<u16>>,
    help: bool,
}

impl Args {
    /// Parse command-line arguments
    fn parse() -> Self {
        let mut args = std::env::args().skip(1).peekable();
        let mut parsed = Self {
            app: None,
            user: None,
            session: None,
            serve: None,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--app" | "-a" => parsed.app = args.next(),
                "--user" | "-u" => parsed.user = args.next(),
                "--session" | "-s" => parsed.session = args.next(),
                "--serve" => {
                    let port = args.peek().and_then(|p| p.parse().ok());
                    if port.is_some() {
                        args.next();
                    }
                    parsed.serve = Some(port);
                }
                "--help" | "-h" => parsed.help = true,
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        parsed
    }
}

fn print_usage() {
    println!("Usage: trio [--app NAME] [--user ID] [--session ID] [--serve [PORT]]");
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_or_default() -> TrioConfig {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => return TrioConfig::default(),
    };
    match load_config(&cwd) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default configuration");
            TrioConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.help {
        print_usage();
        return Ok(());
    }

    if let Some(port) = args.serve {
        return serve(port).await;
    }

    init_tracing();
    let config = load_or_default();

    let key = SessionKey::new(
        args.app.as_deref().unwrap_or(&config.session.app_name),
        args.user.as_deref().unwrap_or(&config.session.user_id),
        args.session.as_deref().unwrap_or(&config.session.session_id),
    )?;
    let sessions = SessionService::new();
    let session = sessions.create_session(key);

    let repl = Repl::new(
        Arc::new(OrchestrationService::from_config(&config)?),
        session,
        Arc::new(GeminiTranscriber::from_config(&config)),
        Arc::new(GeminiSynthesizer::from_config(&config)),
    );

    eprintln!(
        "Session {} ready. Type a message, or /help for commands.",
        repl.session().key()
    );
    run_loop(&repl).await
}

/// Read lines until EOF, `/quit` or Ctrl-C at the prompt.
///
/// Ctrl-C while a request is running drops that request and returns to the
/// prompt.
async fn run_loop(repl: &Repl) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("> ");
        std::io::stderr().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(line) = line else { break };

        let reply = tokio::select! {
            reply = repl.handle_line(&line) => reply,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Request cancelled");
                eprintln!("Cancelled.");
                continue;
            }
        };

        match reply {
            Reply::Output(text) => println!("{}", text),
            Reply::Nothing => {}
            Reply::Quit => break,
        }
    }

    Ok(())
}

#[cfg(feature = "web")]
async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let port = match port {
        Some(port) => port,
        None => std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| load_or_default().server.port),
    };
    trio_server::run_server(port).await
}

#[cfg(not(feature = "web"))]
async fn serve(_port: Option<u16>) -> anyhow::Result<()> {
    anyhow::bail!("trio was built without the `web` feature")
}
