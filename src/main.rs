//! ClassPair - classroom display client with QR device-pairing login
//!
//! Shows a QR code that a teacher scans with the companion mobile app; once
//! the companion authorizes the session, credentials are stored locally and
//! the client switches to the home screen.

use anyhow::Result;
use clap::Parser;
use classpair_api::DeviceAuthClient;
use classpair_core::config::DEFAULT_API_BASE_URL;
use classpair_core::{Config, NavRequest, Screen};
use classpair_session::{PairingFlow, PairingPhase, PairingSnapshot};
use classpair_store::{CredentialStore, LoginHandoff, KEY_SELECTED_CLASS, KEY_TEACHER};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// ClassPair - sign in to the classroom display by scanning a QR code
#[derive(Parser, Debug)]
#[command(name = "classpair")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the device-auth service
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Interval between authorization polls, in milliseconds
    #[arg(long, default_value = "2000")]
    poll_interval: u64,

    /// Path to the credential storage file
    /// (default: ~/.config/classpair/credentials.json)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    info!("ClassPair v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::new()
        .with_api_base_url(args.api_url)
        .with_poll_interval(Duration::from_millis(args.poll_interval));

    let store = match &args.storage {
        Some(path) => CredentialStore::with_path(path.clone()),
        None => CredentialStore::open(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to open credential store: {}", e))?;
    let store = Arc::new(store);

    let (nav_tx, nav_rx) = mpsc::channel(1);
    let handoff = Arc::new(LoginHandoff::new(store.clone(), nav_tx));
    let api = Arc::new(DeviceAuthClient::new(&config));

    let flow = PairingFlow::start(api, handoff, config);

    if run_login_screen(&flow, nav_rx).await? {
        render_home_screen(&store).await;
    }

    Ok(())
}

/// QR login screen: renders the pairing state until the login completes.
///
/// Returns `true` when the handoff requested the switch to the home screen,
/// `false` when the user quit.
async fn run_login_screen(
    flow: &PairingFlow,
    mut nav_rx: mpsc::Receiver<NavRequest>,
) -> Result<bool> {
    let mut states = flow.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    // Branch guards: a finished flow or a closed stdin must not spin the
    // select loop.
    let mut states_open = true;
    let mut stdin_open = true;

    render_login_screen(&states.borrow().clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                flow.shutdown();
                return Ok(false);
            }
            nav = nav_rx.recv() => {
                match nav {
                    Some(NavRequest::ResetTo(Screen::Home)) => return Ok(true),
                    Some(NavRequest::ResetTo(Screen::QrLogin)) => {}
                    None => return Ok(false),
                }
            }
            changed = states.changed(), if states_open => {
                match changed {
                    Ok(()) => render_login_screen(&states.borrow().clone()),
                    Err(_) => states_open = false,
                }
            }
            line = input.next_line(), if stdin_open => {
                match line {
                    // Enter retries from the error screen; the flow ignores
                    // it in any other phase.
                    Ok(Some(_)) => flow.retry(),
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        stdin_open = false;
                    }
                }
            }
        }
    }
}

/// Render the QR login screen for the current pairing state
fn render_login_screen(snapshot: &PairingSnapshot) {
    match snapshot.phase {
        PairingPhase::Generating => {
            println!();
            println!("  Generating QR code...");
        }
        PairingPhase::Waiting => {
            println!();
            println!("  Scan to Login");
            println!();
            if let Some(payload) = snapshot.qr_payload() {
                display_qr_code(payload);
            }
            println!();
            println!("  Waiting for authorization...");
            if let Some(id) = snapshot.short_session_id() {
                println!("  Session ID: {id}...");
            }
        }
        PairingPhase::Authorized => {
            println!();
            println!("  ✓ Login successful! Redirecting...");
        }
        PairingPhase::Error => {
            println!();
            if let Some(message) = snapshot.last_error() {
                println!("  ✗ {message}");
            }
            println!("  Press Enter to retry, Ctrl+C to quit.");
        }
    }
}

/// Render the post-login home screen from the stored credentials
async fn render_home_screen(store: &CredentialStore) {
    let teacher = store.get(KEY_TEACHER).await;
    let class = store.get(KEY_SELECTED_CLASS).await;

    println!();
    println!("  ══════════════════════════════════════");
    println!("  Successfully logged in!");
    match (teacher, class) {
        (Some(teacher), Some(class)) => println!("  Welcome {teacher}! Class: {class}"),
        (Some(teacher), None) => println!("  Welcome {teacher}!"),
        _ => println!("  Welcome!"),
    }
    println!("  ══════════════════════════════════════");
    println!();
}

/// Display a QR code in the terminal
fn display_qr_code(data: &str) {
    use qrcode::QrCode;

    let code = match QrCode::new(data.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to generate QR code: {}", e);
            return;
        }
    };

    // Render as Unicode block characters for terminal display
    let string = code
        .render::<char>()
        .quiet_zone(true)
        .module_dimensions(2, 1)
        .build();

    for line in string.lines() {
        println!("  {}", line);
    }
}
