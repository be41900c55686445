pub mod config;
pub mod file_lock;
pub mod host;

use anyhow::Context;
use btplayer::{BluezDaemon, BtPlayer, Host, MediaItem, PlayerOptions};
use clap::Parser;
use log::info;
use std::sync::Arc;

use crate::config::Config;
use crate::file_lock::SessionLock;
use crate::host::{ConsoleBus, DetachedEngine, SessionCallback};

/// Follow a Bluetooth (BlueZ) audio session and print what is playing.
#[derive(Parser, Debug)]
#[command(name = "btplayer", version, about)]
struct Args {
    /// Object path of the BlueZ media player to follow
    /// (e.g. /org/bluez/hci0/dev_00_1A_7D_DA_71_13/player0).
    /// Defaults to the first player found.
    path: Option<String>,

    /// List available BlueZ media players and exit
    #[arg(long)]
    list: bool,

    /// Poll interval in milliseconds (overrides the config file)
    #[arg(long, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Consecutive failed queries before giving up (overrides the config file)
    #[arg(long, value_name = "N")]
    max_errors: Option<u32>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load();
    if let Some(ms) = args.poll_interval {
        config.poll_interval_ms = ms;
    }
    if let Some(n) = args.max_errors {
        config.max_dbus_errors = n;
    }

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let daemon = BluezDaemon::system()
        .await
        .context("Failed to connect to the system D-Bus")?;

    if args.list {
        for path in daemon.list_players().await? {
            println!("{path}");
        }
        return Ok(());
    }

    let path = match args.path {
        Some(path) => path,
        None => daemon
            .first_player()
            .await
            .context("No Bluetooth media player found; is a device connected?")?,
    };

    let _lock = SessionLock::acquire()?;

    let callback = Arc::new(SessionCallback::default());
    let host = Host {
        engine: Arc::new(DetachedEngine::default()),
        bus: Arc::new(ConsoleBus),
        callback: callback.clone(),
    };
    let player = BtPlayer::with_config(Arc::new(daemon), host, config.player_config());

    player
        .open(&MediaItem::new(path.as_str()), &PlayerOptions::default())
        .await;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
        _ = callback.stopped() => {}
    }

    player.close(false).await;
    Ok(())
}
