//! Audible alert devices backed by the host system.

use roi_watchdog::core_modules::alert_throttle::AlertDevice;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// Player used when none is given on the command line.
pub const DEFAULT_PLAYER: &str = if cfg!(target_os = "macos") {
    "afplay"
} else {
    "aplay"
};

/// Plays a sound file by spawning an external player process.
///
/// Players are never waited on; finished ones are reaped on the next playback.
pub struct ProcessSound {
    player: String,
    children: Vec<Child>,
}

impl ProcessSound {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            children: Vec::new(),
        }
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl AlertDevice for ProcessSound {
    fn play(&mut self, sound: &str) {
        self.reap();

        let spawned = Command::new(&self.player)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(pid = child.id(), player = %self.player, sound, "alert sound started");
                self.children.push(child);
            }
            Err(err) => warn!(player = %self.player, sound, error = %err, "failed to start alert sound"),
        }
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Rings the terminal bell on stderr.
pub struct TerminalBell;

impl AlertDevice for TerminalBell {
    fn play(&mut self, _sound: &str) {
        let mut stderr = std::io::stderr();
        if let Err(err) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            warn!(error = %err, "failed to ring terminal bell");
        }
    }

    fn name(&self) -> &str {
        "bell"
    }
}

/// Picks the process player when the sound file exists, the terminal bell otherwise.
pub fn select_device(player: &str, sound: &str) -> Box<dyn AlertDevice> {
    let device: Box<dyn AlertDevice> = if Path::new(sound).is_file() {
        Box::new(ProcessSound::new(player))
    } else {
        warn!(sound, "sound file not found, falling back to the terminal bell");
        Box::new(TerminalBell)
    };
    debug!(device = device.name(), player, sound, "alert device selected");
    device
}
