//! Entry point for the **hyprattach** daemon.
//!
//! Spawns the command socket, the Hyprland watcher and the signal handler on
//! background threads and runs the session on the main thread.
//!
//! ```text
//! hyprattach [--session <path>]
//! ```

use hyprattach::command::Command;
use hyprattach::config::{self, Config};
use hyprattach::hyprland::host::HyprlandHost;
use hyprattach::hyprland::socket::CommandSocket;
use hyprattach::hyprland::watch::HyprlandWatcher;
use hyprattach::ipc::listener::UnixSocketListener;
use hyprattach::model::SessionConfig;
use hyprattach::session::Session;
use hyprattach::signals::TerminationSignals;
use hyprattach::traits::EventSource;
use log::{error, info};
use std::path::Path;
use std::sync::mpsc;

/// Log `message` and exit with `code`.
fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    std::process::exit(code)
}

fn load_config() -> Config {
    let Some(path) = Config::default_path() else {
        info!("no config directory, using defaults");
        return Config::default();
    };
    match Config::load_or_default(&path) {
        Ok(cfg) => {
            info!("config: {}", path.display());
            cfg
        }
        Err(e) => fail(1, e),
    }
}

/// The session to start with: `--session <path>` wins over the config file.
fn startup_session(config: &Config) -> Option<SessionConfig> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg != "--session" {
            continue;
        }
        let path = args.next().unwrap_or_else(|| fail(2, "--session needs a path"));
        return Some(config::load_session(Path::new(&path)).unwrap_or_else(|e| fail(1, e)));
    }
    config.session.clone()
}

/// Run `source` on its own thread, feeding `tx`.
fn spawn_source<S>(name: &'static str, mut source: S, tx: mpsc::Sender<Command>)
where
    S: EventSource + 'static,
{
    std::thread::spawn(move || {
        if let Err(e) = source.run(tx) {
            error!("{} stopped: {}", name, e);
        }
    });
}

fn main() {
    env_logger::init();

    let config = load_config();
    let startup = startup_session(&config);
    let hyprland = CommandSocket::from_env().unwrap_or_else(|e| fail(1, e));
    let signals = TerminationSignals::new().unwrap_or_else(|e| fail(1, e));

    let mut session = Session::new(HyprlandHost::new(
        hyprland.clone(),
        config.hyprland.minimized_workspace.clone(),
    ));
    session.set_on_remove(|entry| info!("window {} detached from the group", entry.id));

    let (tx, rx) = mpsc::channel::<Command>();
    spawn_source("signal handler", signals, tx.clone());
    spawn_source(
        "command socket",
        UnixSocketListener::new(config.command_socket()),
        tx.clone(),
    );
    spawn_source(
        "hyprland watcher",
        HyprlandWatcher::new(hyprland, config.hyprland.clone(), session.in_flight()),
        tx,
    );

    if let Some(startup) = startup {
        if let Err(e) = session.initialize(startup) {
            fail(1, format!("cannot start session: {}", e));
        }
    }

    info!("hyprattach running");
    session.run(rx);
    let _ = std::fs::remove_file(config.command_socket());
    info!("unloaded, exiting");
}
