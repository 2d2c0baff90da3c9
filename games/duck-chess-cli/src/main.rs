//! Terminal client for duck chess. Connects with the board setup stored in the setup directory,
//! prints the board whenever it changes, and optionally plays the first offered move every turn.

mod animation_pacer;
mod text_view;

use crate::animation_pacer::AnimationPacer;
use crate::text_view::{render_board, render_status};
use clap::Parser;
use session_lib::{
    ConnectionState, FileSetupStorage, GameSession, SessionConfig, SessionView, WebSocketFactory,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Time between two heartbeats of the loop.
const FRAME_TIME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "duck-chess-cli", about = "Plays duck chess against the public authority")]
struct Args {
    /// JSON file with endpoint and setup directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the web socket endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Overrides the directory holding boardSetup.json.
    #[arg(long)]
    setup_dir: Option<PathBuf>,

    /// How long a remote move is shown before it lands on the board.
    #[arg(long, default_value = "0.4")]
    animation_seconds: f32,

    /// Plays the first offered move whenever it is our turn.
    #[arg(long)]
    auto_play: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,session_lib=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(%e, "Could not load configuration.");
            std::process::exit(2);
        }
    };

    let storage = FileSetupStorage::new(config.setup_dir.clone());
    let mut session = GameSession::create(&config, WebSocketFactory::default(), Box::new(storage));
    let mut pacer = AnimationPacer::new(args.animation_seconds);
    let mut last_view = SessionView::default();

    session.connect();
    let mut last_frame = Instant::now();
    loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        session.update();

        if let Some(ticket) = pacer.update_and_take_finished(delta_time) {
            session.animation_complete(ticket);
        }
        if !pacer.is_busy()
            && let Some((ticket, mv)) = session.next_animation()
        {
            pacer.start(ticket, mv);
        }

        let view = session.view();
        report_changes(&last_view, &view);

        if args.auto_play && view.moves_for_active_player.is_some() {
            if let Err(e) = session.send_turn(0, 0) {
                tracing::warn!(%e, "Could not play a move.");
            }
        }

        if let ConnectionState::Disconnected { error } = session.connection_state() {
            match error {
                Some(error) => {
                    tracing::error!(%error, retryable = error.is_retryable(), "Session ended.");
                    std::process::exit(1);
                }
                None if view.outcome.is_some() && !pacer.is_busy() => break,
                None => {}
            }
        }
        last_view = view;
        std::thread::sleep(FRAME_TIME);
    }
    session.dispose();
}

/// File first, command line flags on top.
fn load_config(args: &Args) -> Result<SessionConfig, session_lib::SessionError> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(setup_dir) = &args.setup_dir {
        config.setup_dir = setup_dir.clone();
    }
    Ok(config)
}

fn report_changes(last: &SessionView, view: &SessionView) {
    if view.identity != last.identity
        && let Some(identity) = &view.identity
    {
        tracing::info!(%identity, "Authority assigned identity.");
    }
    if view.board != last.board
        && let Some(board) = &view.board
    {
        println!("{}", render_board(board));
    }
    if view.turn != last.turn || view.outcome != last.outcome || view.clock != last.clock {
        println!("{}", render_status(view));
    }
    if view.chat.len() > last.chat.len() {
        for line in &view.chat[last.chat.len()..] {
            println!("<{}> {}", line.id, line.message);
        }
    }
}
