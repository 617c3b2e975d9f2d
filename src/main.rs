//! Entry point for the **winsnap** daemon.
//!
//! Loads the configuration and the saved profiles, picks the window-manager
//! backend for this platform, and then applies newline-delimited JSON
//! commands read from standard input on the main thread.
//!
//! Pass `--debug` for debug-level logging; `RUST_LOG` is honoured otherwise.

use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::sync::mpsc;
use winsnap::command::Command;
use winsnap::config::Config;
use winsnap::ipc::listener::LineListener;
use winsnap::session::Session;
use winsnap::store::ProfileStore;
use winsnap::traits::{CommandSource, WindowManager};

/// Resolve the config directory: `%APPDATA%\winsnap` on Windows,
/// `$XDG_CONFIG_HOME/winsnap` elsewhere.
fn config_dir() -> PathBuf {
    let base = if cfg!(windows) {
        std::env::var("APPDATA").unwrap_or_else(|_| ".".into())
    } else {
        std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            format!("{}/.config", home)
        })
    };
    PathBuf::from(base).join("winsnap")
}

/// Try to load the config from `<config dir>/config.json`, falling back to
/// compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn init_logging() {
    let debug = std::env::args().any(|a| a == "--debug");
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

//  Main

fn main() {
    init_logging();

    let config = load_config();
    let store_path = config.store_path(&config_dir());
    let store = match ProfileStore::open(&store_path) {
        Ok(store) => store,
        Err(e) => {
            error!("cannot open saved profiles: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(windows)]
    let wm = winsnap::win32::wm::Win32Wm::new(config.windows.excluded_titles.clone());

    #[cfg(not(windows))]
    let wm = {
        info!("not running on Windows, using the headless backend");
        winsnap::headless::HeadlessWm::single_monitor()
    };

    run_daemon(wm, store, &config);
}

fn run_daemon<W: WindowManager>(wm: W, store: ProfileStore, config: &Config) {
    let mut session = match Session::new(wm, store) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to query monitors: {}", e);
            std::process::exit(1);
        }
    };
    session.set_refresh_before_snap(config.snap.refresh_before_snap);

    if let Err(e) = session.refresh_windows() {
        error!("failed to enumerate windows: {}", e);
    }
    if let Err(e) = session.load() {
        error!("failed to load profiles: {}", e);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    info!("winsnap running");
    for cmd in cmd_rx {
        if let Err(e) = session.handle(cmd) {
            error!("command error: {}", e);
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let mut source = LineListener::stdin();
        if let Err(e) = source.run(tx) {
            error!("stdin listener error: {}", e);
        }
    });
}
