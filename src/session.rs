//! The orchestrator that ties the layout engine, the window backend, the
//! launcher and the settings store together.
//!
//! [`Session`] owns all mutable state of one management session and reacts
//! to [`Command`]s by calling into the [`LayoutEngine`] and the backends.
//! Every command yields a [`Reply`]; failures are reported, logged, and
//! never propagated to the event loop.

use crate::command::{CellSize, Command, Reply, WindowRect};
use crate::config::Settings;
use crate::engine::LayoutEngine;
use crate::error::LayoutError;
use crate::launcher::{self, DEFAULT_LAUNCH_DELAY};
use crate::traits::{ProcessLauncher, WindowPrimitives};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Handles shell commands against one window backend.
///
/// The session is generic over any [`WindowPrimitives`] and
/// [`ProcessLauncher`] implementation, making it independent of Win32,
/// Hyprland, or any other concrete backend.
///
/// # Typical usage
///
/// ```ignore
/// let mut session = Session::new(Win32Desktop::new(), SpawnLauncher)
///     .with_settings(Settings::load_or_default(&path), Some(path));
/// let reply = session.handle(Command::GetTrackedWindows);
/// ```
pub struct Session<W: WindowPrimitives, L: ProcessLauncher> {
    wm: W,
    launcher: L,
    engine: LayoutEngine,
    settings: Settings,
    settings_path: Option<PathBuf>,
    launch_delay: Duration,
}

impl<W: WindowPrimitives, L: ProcessLauncher> Session<W, L> {
    /// Create a session with default settings that are kept in memory only.
    pub fn new(wm: W, launcher: L) -> Self {
        Self {
            wm,
            launcher,
            engine: LayoutEngine::new(),
            settings: Settings::default(),
            settings_path: None,
            launch_delay: DEFAULT_LAUNCH_DELAY,
        }
    }

    /// Start from `settings`; when `path` is set, saved settings are written
    /// there.
    pub fn with_settings(mut self, settings: Settings, path: Option<PathBuf>) -> Self {
        self.settings = settings;
        self.settings_path = path;
        self
    }

    /// Override the pause between launches.
    pub fn set_launch_delay(&mut self, delay: Duration) {
        self.launch_delay = delay;
    }

    /// Return a shared reference to the layout engine.
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Reply {
        match self.dispatch(cmd) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("command failed: {}", e);
                Reply::from(&e)
            }
        }
    }

    fn dispatch(&mut self, cmd: Command) -> Result<Reply, LayoutError> {
        match cmd {
            Command::LaunchProgram { path, count } => {
                let started =
                    launcher::launch_program(&self.launcher, &path, count, self.launch_delay)?;
                Ok(Reply::done(format!("started {} {}", started, plural(started, "copy", "copies"))))
            }

            Command::ApplyWindowLayout {
                title,
                width,
                height,
                options,
            } => {
                info!("apply layout {:?} {}x{} {:?}", title, width, height, options);
                let count = self.engine.reconcile_and_place(
                    &self.wm,
                    &title,
                    CellSize::new(width, height),
                    options,
                )?;
                let message = if options.freeze_current_position {
                    format!("resized {} window(s) in place", count)
                } else {
                    format!("arranged {} window(s)", count)
                };
                Ok(Reply::Placed { count, message })
            }

            Command::GetTrackedWindows => {
                let rows = self.engine.list_tracked(&self.wm);
                debug!("{} tracked window(s)", rows.len());
                Ok(Reply::Windows(rows))
            }

            Command::RenameWindow { handle, title } => {
                self.engine.rename(&self.wm, handle, &title)?;
                Ok(Reply::done(format!("renamed {}", handle)))
            }

            Command::RestyleWindow {
                handle,
                remove_caption,
                remove_border,
            } => {
                self.engine
                    .restyle(&self.wm, handle, remove_caption, remove_border)?;
                Ok(Reply::done(format!("restyled {}", handle)))
            }

            Command::MoveWindow {
                handle,
                x,
                y,
                width,
                height,
            } => {
                self.engine
                    .reposition(&self.wm, handle, WindowRect::new(x, y, width, height))?;
                Ok(Reply::done(format!("moved {}", handle)))
            }

            Command::EditWindow(edit) => match self.engine.edit_window(&self.wm, &edit) {
                Ok(()) => Ok(Reply::done(format!("updated {}", edit.handle))),
                Err(e) => {
                    warn!("edit of {} failed: {}", edit.handle, e);
                    Ok(Reply::Error {
                        kind: e.source.kind(),
                        message: e.to_string(),
                    })
                }
            },

            Command::LaunchSaved => {
                let count = self.settings.execution_count()?;
                let path = self.settings.program_path.clone();
                self.dispatch(Command::LaunchProgram { path, count })
            }

            Command::ApplySavedLayout => {
                let cell = self.settings.cell_size()?;
                self.dispatch(Command::ApplyWindowLayout {
                    title: self.settings.window_title.clone(),
                    width: cell.width,
                    height: cell.height,
                    options: self.settings.placement_options(),
                })
            }

            Command::GetSettings => Ok(Reply::Settings(self.settings.clone())),

            Command::SaveSettings(settings) => {
                let settings = settings.with_derived_title();
                if let Some(path) = &self.settings_path {
                    settings.save(path)?;
                    info!("saved settings to {}", path.display());
                }
                self.settings = settings.clone();
                Ok(Reply::Settings(settings))
            }
        }
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}

//  Tests
