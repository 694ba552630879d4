//! House Party CLI - terminal front-end for House Party rooms.
//!
//! Joins or rejoins a room and follows it the way the web client's room
//! screen does: the current track every second, room settings every five
//! seconds, and the host's playback-account check. Playback can be driven
//! from stdin while watching, or with one-shot subcommands.

mod commands;
mod config;
mod navigator;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use houseparty_core::{
    bootstrap_client, join_url, BootstrappedClient, BroadcastEvent, ErrorCode, JoinError, Navigator,
    NowPlaying, PlaybackControl, PlaybackEvent, RoomApi, RoomSessionController, RoomView, Route,
    SessionEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

use crate::commands::{RoomCommand, HELP};
use crate::config::CliConfig;
use crate::navigator::TerminalNavigator;

/// House Party - follow and control a shared listening room.
#[derive(Parser, Debug)]
#[command(name = "houseparty")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "HOUSEPARTY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Backend origin (overrides config file).
    #[arg(short, long, env = "HOUSEPARTY_BASE_URL")]
    base_url: Option<String>,

    /// Backend session cookie to act as, `name=value` (overrides config file).
    #[arg(short, long, env = "HOUSEPARTY_SESSION_COOKIE")]
    session_cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join a room by code and watch it.
    Join { code: String },
    /// Watch the room you are in, or CODE.
    Watch { code: Option<String> },
    /// Leave the current room.
    Leave,
    /// Set the playback volume.
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },
    /// Resume playback.
    Play,
    /// Pause playback.
    Pause,
    /// Vote to skip the current track.
    Skip,
    /// Print the shareable join link for a room.
    JoinUrl { origin: String, code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    if let Command::JoinUrl { origin, code } = &args.command {
        println!("{}", join_url(origin, code));
        return Ok(());
    }

    // Load configuration
    let mut config =
        CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(base_url) = args.base_url {
        config.client.base_url = base_url;
    }
    if let Some(cookie) = args.session_cookie {
        config.client.session_cookie = Some(cookie);
    }

    log::info!("Configuration: base_url={}", config.client.base_url);

    let client =
        bootstrap_client(&config.to_core_config()).context("Failed to bootstrap client")?;
    let navigator = Arc::new(TerminalNavigator::default());

    let result = match args.command {
        Command::Join { code } => {
            let lobby = client.lobby(Arc::clone(&navigator) as Arc<dyn Navigator>);
            match lobby.join(&code).await {
                Ok(Route::Room(code)) => watch(&client, &navigator, &code, &config).await,
                Ok(route) => Err(anyhow!("Unexpected route after join: {}", route)),
                Err(JoinError::RoomNotFound) => Err(anyhow!("Room not found.")),
                Err(e) => Err(anyhow!("Failed to join room [{}]: {}", e.code(), e)),
            }
        }
        Command::Watch { code } => {
            let code = match code.or_else(|| config.room_code.clone()) {
                Some(code) => Some(code),
                None => {
                    let lobby = client.lobby(Arc::clone(&navigator) as Arc<dyn Navigator>);
                    match lobby.resolve_entry().await {
                        Route::Room(code) => Some(code),
                        _ => None,
                    }
                }
            };
            match code {
                Some(code) => watch(&client, &navigator, &code, &config).await,
                None => Err(anyhow!(
                    "You are not in a room. Use `houseparty join <CODE>`."
                )),
            }
        }
        Command::Leave => client
            .remote
            .rooms
            .leave_room()
            .await
            .context("Failed to leave room"),
        Command::Volume { percent } => client
            .remote
            .playback
            .set_playback_volume(percent)
            .await
            .context("Failed to set volume"),
        Command::Play => client
            .remote
            .playback
            .playback_play()
            .await
            .context("Failed to resume playback"),
        Command::Pause => client
            .remote
            .playback
            .playback_pause()
            .await
            .context("Failed to pause playback"),
        Command::Skip => client
            .remote
            .playback
            .playback_skip()
            .await
            .context("Failed to vote to skip"),
        Command::JoinUrl { .. } => Ok(()),
    };

    // Lets a pending leave reach the backend before the runtime stops.
    client.shutdown().await;
    result
}

/// Enters `code` and follows it until the room closes or a shutdown signal.
///
/// Interrupting stops polling but does not leave the room; use `leave` for that.
async fn watch(
    client: &BootstrappedClient,
    navigator: &Arc<TerminalNavigator>,
    code: &str,
    config: &CliConfig,
) -> Result<()> {
    let mut events = client.event_bridge.subscribe();
    let controller = client
        .enter_room(code, Arc::clone(navigator) as Arc<dyn Navigator>)
        .await
        .map_err(|e| anyhow!("Failed to enter room {} [{}]: {}", code, e.code(), e))?;

    println!("In room {}. Share: {}", code, controller.view().join_url);
    println!("Type `help` for commands.");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Shutdown signal received, stopping");
                break;
            }
            _ = controller.closed() => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event, config.json_events),
                Err(RecvError::Lagged(n)) => log::warn!("Skipped {} events", n),
                Err(RecvError::Closed) => break,
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match RoomCommand::parse(&line) {
                    Ok(command) => run_command(&controller, navigator, command).await,
                    Err(message) => println!("{}", message),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    log::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    // Drain what the teardown emitted.
    while let Ok(event) = events.try_recv() {
        print_event(&event, config.json_events);
    }
    if let Some(route) = navigator.current_route() {
        log::debug!("Final screen: {}", route);
    }
    Ok(())
}

async fn run_command(
    controller: &RoomSessionController,
    navigator: &TerminalNavigator,
    command: RoomCommand,
) {
    match command {
        RoomCommand::Volume(value) => {
            if !controller.view().can_control_volume {
                println!("The host has not allowed guests to change the volume.");
                return;
            }
            controller.set_volume(value);
        }
        RoomCommand::Toggle => {
            if !controller.view().can_pause {
                println!("The host has not allowed guests to pause.");
                return;
            }
            controller.toggle_playback();
        }
        RoomCommand::Skip => controller.skip(),
        RoomCommand::OpenSettings => {
            if !controller.view().session.is_host {
                println!("Only the host can change settings.");
                return;
            }
            controller.open_settings();
        }
        RoomCommand::UpdateSettings(settings) => match controller.update_settings(settings).await {
            Ok(()) => println!("Room updated successfully!"),
            Err(e) => println!("Error updating room [{}]: {}", e.code(), e),
        },
        RoomCommand::CloseSettings => controller.close_settings(),
        RoomCommand::Status => {
            print_view(&controller.view());
            if let Some(url) = navigator.auth_url() {
                println!("Playback account link: {}", url);
            }
        }
        RoomCommand::Leave => controller.leave(),
        RoomCommand::Help => println!("{}", HELP),
    }
}

fn print_event(event: &BroadcastEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => log::warn!("Failed to encode event: {}", e),
        }
        return;
    }

    match event {
        BroadcastEvent::Playback(PlaybackEvent::NowPlaying { now_playing, .. }) => {
            println!("{}", describe_now_playing(now_playing));
        }
        BroadcastEvent::Playback(PlaybackEvent::VolumeChanged { volume, origin, .. }) => {
            log::debug!("Volume {} ({:?})", volume, origin);
        }
        BroadcastEvent::Session(SessionEvent::Updated { session, .. }) => {
            println!(
                "Room {}: votes to skip {}, guests can pause: {}, guests can change volume: {}{}",
                session.room_code(),
                session.votes_to_skip,
                yes_no(session.guest_can_pause),
                yes_no(session.guest_can_control_volume),
                if session.is_host { " (you are the host)" } else { "" }
            );
        }
        BroadcastEvent::Session(SessionEvent::SettingsToggled { open, .. }) => {
            if *open {
                println!("Settings: `settings <votes> <guests can pause> <guests can change volume>`");
            }
        }
        BroadcastEvent::Session(SessionEvent::AuthRedirect { .. }) => {}
        BroadcastEvent::Session(SessionEvent::Closed { room_code, reason, .. }) => {
            println!("Left room {} ({:?}).", room_code, reason);
        }
    }
}

fn describe_now_playing(now_playing: &NowPlaying) -> String {
    match now_playing.snapshot() {
        None => "Nothing playing.".to_string(),
        Some(song) => format!(
            "{} {} - {} [{:.0}%] votes {}/{}",
            if song.is_playing { ">" } else { "||" },
            song.title,
            song.artist,
            song.progress_percent(),
            song.votes,
            song.votes_required
        ),
    }
}

fn print_view(view: &RoomView) {
    println!("Room {}", view.session.room_code());
    println!("  {}", describe_now_playing(&view.now_playing));
    println!("  Volume: {}", view.display_volume);
    println!(
        "  Host: {}, can pause: {}, can change volume: {}",
        yes_no(view.session.is_host),
        yes_no(view.can_pause),
        yes_no(view.can_control_volume)
    );
    println!("  Join link: {}", view.join_url);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
