//! Entry point for the **gridlaunch** daemon.
//!
//! Binds the loopback command listener, runs it on a background thread and
//! processes incoming requests on the main thread, one at a time.

use gridlaunch::command::Request;
use gridlaunch::config::{config_dir, Config, Settings};
use gridlaunch::ipc::listener::TcpCommandListener;
use gridlaunch::launcher::SpawnLauncher;
use gridlaunch::session::Session;
use gridlaunch::traits::{CommandSource, WindowPrimitives};
use log::{error, info};
use std::sync::mpsc;

#[cfg(windows)]
fn native_desktop() -> gridlaunch::backend::win32::Win32Desktop {
    gridlaunch::backend::win32::Win32Desktop::new()
}

#[cfg(unix)]
fn native_desktop() -> gridlaunch::backend::hyprland::HyprlandDesktop {
    gridlaunch::backend::hyprland::HyprlandDesktop::new()
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

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let settings_path = config.settings_path_in(&config_dir());
    let settings = Settings::load_or_default(&settings_path);

    let listener = match TcpCommandListener::bind(config.listen.as_str()) {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {}: {}", config.listen, e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(native_desktop(), SpawnLauncher)
        .with_settings(settings, Some(settings_path));
    session.set_launch_delay(config.launch_delay());

    let (tx, rx) = mpsc::channel::<Request>();
    spawn_listener(listener, tx);

    start_event_loop(session, rx);
}

//  Event loop

fn start_event_loop<W: WindowPrimitives>(
    mut session: Session<W, SpawnLauncher>,
    rx: mpsc::Receiver<Request>,
) {
    info!("gridlaunch running");
    for req in rx {
        let reply = session.handle(req.command);
        if req.reply.send(reply).is_err() {
            error!("client went away before the reply was sent");
        }
    }
    info!("command listener closed, exiting");
}

fn spawn_listener(mut listener: TcpCommandListener, tx: mpsc::Sender<Request>) {
    std::thread::spawn(move || {
        if let Err(e) = listener.run(tx) {
            error!("command listener error: {}", e);
        }
    });
}
