//! Starting copies of the target program.
//!
//! [`launch_program`] fires off `count` copies with a fixed pause between
//! them.  The pause blocks the calling thread; it is only ever used from a
//! user-initiated request.

use crate::error::LayoutError;
use crate::traits::ProcessLauncher;
use log::{debug, info};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Pause between two successive launches.
pub const DEFAULT_LAUNCH_DELAY: Duration = Duration::from_millis(300);

/// Start `count` copies of `path`, sleeping `delay` between launches.
///
/// Returns the number of copies started.  Stops at the first failed spawn;
/// copies already started keep running.
pub fn launch_program<L: ProcessLauncher>(
    launcher: &L,
    path: &str,
    count: u32,
    delay: Duration,
) -> Result<u32, LayoutError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(LayoutError::LaunchFailure("no program selected".into()));
    }
    if count == 0 {
        return Err(LayoutError::LaunchFailure(
            "launch count must be at least 1".into(),
        ));
    }

    info!("launching {} x{}", path, count);
    for i in 0..count {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        launcher.launch(Path::new(path)).map_err(|e| {
            LayoutError::LaunchFailure(format!(
                "{} (started {} of {})",
                e, i, count
            ))
        })?;
        debug!("  started copy {}/{}", i + 1, count);
    }
    Ok(count)
}

/// [`ProcessLauncher`] backed by [`std::process::Command`].
///
/// The child runs in the program's own directory with its standard streams
/// detached.  A background thread reaps it so no zombie is left behind; the
/// caller never waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnLauncher;

impl ProcessLauncher for SpawnLauncher {
    type Error = std::io::Error;

    fn launch(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut command = Command::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::FakeDesktop;
    use std::path::PathBuf;
    use std::time::Instant;

    #[test]
    fn launches_requested_number_of_copies() {
        let desk = FakeDesktop::single(1920, 1080);
        let started = launch_program(&desk, "C:/games/client.exe", 3, Duration::ZERO).unwrap();
        assert_eq!(started, 3);
        assert_eq!(
            *desk.launches.borrow(),
            vec![PathBuf::from("C:/games/client.exe"); 3]
        );
    }

    #[test]
    fn empty_path_is_rejected_before_spawning() {
        let desk = FakeDesktop::single(1920, 1080);
        let err = launch_program(&desk, "   ", 2, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LaunchFailure);
        assert!(desk.launches.borrow().is_empty());
    }

    #[test]
    fn zero_count_is_rejected() {
        let desk = FakeDesktop::single(1920, 1080);
        let err = launch_program(&desk, "/bin/true", 0, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LaunchFailure);
    }

    #[test]
    fn failure_stops_the_batch() {
        let desk = FakeDesktop::single(1920, 1080);
        desk.fail_launch_at.set(Some(2));
        let err = launch_program(&desk, "/opt/client", 5, Duration::ZERO).unwrap_err();
        assert_eq!(desk.launches.borrow().len(), 2);
        assert!(err.to_string().contains("started 2 of 5"), "{}", err);
    }

    #[test]
    fn delay_is_only_between_launches() {
        let desk = FakeDesktop::single(1920, 1080);
        let t0 = Instant::now();
        launch_program(&desk, "/opt/client", 3, Duration::from_millis(20)).unwrap();
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(40), "{:?}", elapsed);
    }

    #[test]
    fn spawn_launcher_reports_missing_program() {
        let missing = std::env::temp_dir().join("gridlaunch-definitely-missing-binary");
        assert!(SpawnLauncher.launch(&missing).is_err());
    }
}
