use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use huddle_core::{IceServerConfig, RoomId};
use huddle_mesh::{
    MeshConfig, MeshCoordinator, MeshHandle, MeshNotification, NoDevices, TransportConfig,
    WsSignaling,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Join a huddle room from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a room as a receive-only participant and print what happens.
    Join {
        /// Signaling relay endpoint.
        #[arg(long, default_value = "ws://localhost:3000/ws")]
        url: String,

        #[arg(short, long)]
        room: String,

        /// Bearer token appended to the relay URL.
        #[arg(long)]
        token: Option<String>,

        /// STUN server, repeatable. Defaults to Google's public servers.
        #[arg(long = "stun")]
        stun: Vec<String>,

        #[arg(long, default_value_t = 30)]
        negotiation_timeout_secs: u64,

        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Join {
            url,
            room,
            token,
            stun,
            negotiation_timeout_secs,
            verbose,
        } => {
            init_tracing(verbose);

            let mut transport = TransportConfig::default();
            if !stun.is_empty() {
                transport.ice_servers = stun.into_iter().map(IceServerConfig::stun).collect();
            }
            let config = MeshConfig::default()
                .with_transport(transport)
                .with_negotiation_timeout(Duration::from_secs(negotiation_timeout_secs));

            join(&url, &room, token.as_deref(), config).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "huddle_mesh=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn join(url: &str, room: &str, token: Option<&str>, config: MeshConfig) -> Result<()> {
    println!("{} {}", "Connecting to".cyan(), url);
    let signaling = WsSignaling::connect(url, token, config.event_buffer)
        .await
        .with_context(|| format!("Failed to reach signaling relay at {url}"))?;

    let (coordinator, handle) =
        MeshCoordinator::with_webrtc(RoomId::from(room), config, signaling, Arc::new(NoDevices));
    let printer = tokio::spawn(print_notifications(handle.clone()));
    let mut session = tokio::spawn(coordinator.run());

    println!("{} {}", "Joined room".green().bold(), room);
    println!("{}", "Press Ctrl-C to leave.".dimmed());

    let result = tokio::select! {
        res = &mut session => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            if let Ok(snapshot) = handle.snapshot().await {
                println!(
                    "{} {} participant(s), {} connected",
                    "Leaving with".yellow(),
                    snapshot.participants.len(),
                    snapshot.connected().count()
                );
            }
            // The coordinator may already be gone.
            let _ = handle.leave().await;
            session.await
        }
    };

    printer.abort();
    result
        .context("Mesh task panicked")?
        .context("Mesh session failed")?;
    println!("{}", "Left the room.".green());
    Ok(())
}

async fn print_notifications(handle: MeshHandle) {
    let mut rx = handle.subscribe();
    loop {
        match rx.recv().await {
            Ok(notification) => print_notification(&notification),
            Err(RecvError::Lagged(n)) => {
                println!("{}", format!("... skipped {n} event(s)").dimmed());
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_notification(notification: &MeshNotification) {
    match notification {
        MeshNotification::ParticipantJoined(info) => {
            println!("{} {} ({})", "+".green().bold(), info.username, info.id);
        }
        MeshNotification::ParticipantLeft { id, state } => {
            println!("{} {} [{:?}]", "-".red().bold(), id, state);
        }
        MeshNotification::LinkStateChanged { id, state } => {
            println!("  {} {:?}", id.to_string().cyan(), state);
        }
        MeshNotification::RemoteTrackAdded { participant, track } => {
            println!(
                "  {} {} track {}",
                participant.to_string().cyan(),
                track.kind,
                track.id
            );
        }
        MeshNotification::ParticipantMediaChanged { id, kind, enabled } => {
            let status = if *enabled { "on".green() } else { "off".red() };
            println!("  {} {} {}", id.to_string().cyan(), kind, status);
        }
        MeshNotification::ParticipantScreenShare { id, active } => {
            let status = if *active {
                "started sharing".magenta()
            } else {
                "stopped sharing".dimmed()
            };
            println!("  {} {}", id.to_string().cyan(), status);
        }
        MeshNotification::LocalMediaChanged(state) => {
            println!(
                "{} audio={} video={} screen={}",
                "local".dimmed(),
                state.audio_enabled,
                state.video_enabled,
                state.screen_sharing
            );
        }
    }
}
