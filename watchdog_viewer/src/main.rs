mod logging;
mod overlay;
mod sound;

use anyhow::{bail, Context, Result};
use clap::Parser;
use opencv::{
    core::Mat,
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use roi_watchdog::pipeline::{
    frame_from_rgb_bytes, DetectorConfig, Frame, KeyCommand, LoopControl, Point, PointerEvent,
    Watchdog, DEFAULT_ALERT_RATIO, DEFAULT_COOLDOWN, DEFAULT_PIXEL_THRESHOLD, DEFAULT_SOUND,
};
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info};

const WINDOW_NAME: &str = "roi_watchdog";
const KEY_POLL_MS: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "watchdog_viewer", about = "Watch a region of a camera feed and sound an alert when it changes")]
struct Args {
    /// Index of the camera to open
    #[arg(long, default_value_t = 0)]
    camera: i32,
    /// Sound file played on an alert; the terminal bell is used if it does not exist
    #[arg(long, default_value = DEFAULT_SOUND)]
    sound: String,
    /// External program that plays the sound file
    #[arg(long, default_value = sound::DEFAULT_PLAYER)]
    player: String,
    /// Luma difference (0-255) a pixel must exceed to count as changed
    #[arg(long, default_value_t = DEFAULT_PIXEL_THRESHOLD)]
    pixel_threshold: u8,
    /// Fraction of the region (0-1] that must change to raise an alert
    #[arg(long, default_value_t = DEFAULT_ALERT_RATIO)]
    alert_ratio: f64,
    /// Minimum milliseconds between two audible alerts
    #[arg(long, default_value_t = DEFAULT_COOLDOWN.as_millis() as u64)]
    cooldown_ms: u64,
    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            pixel_threshold: self.pixel_threshold,
            alert_ratio: self.alert_ratio,
            cooldown: Duration::from_millis(self.cooldown_ms),
            sound: self.sound.clone(),
        }
    }
}

/// Maps an OpenCV mouse event onto a selection step. Other buttons and wheel events
/// are dropped.
fn pointer_event(event: i32, x: i32, y: i32) -> Option<PointerEvent> {
    let point = Point::new(x, y);
    match event {
        highgui::EVENT_LBUTTONDOWN => Some(PointerEvent::Press(point)),
        highgui::EVENT_MOUSEMOVE => Some(PointerEvent::Move(point)),
        highgui::EVENT_LBUTTONUP => Some(PointerEvent::Release(point)),
        _ => None,
    }
}

/// Maps a `wait_key` result onto a command; `-1` means no key was pressed.
fn key_command(key: i32) -> Option<KeyCommand> {
    if key < 0 {
        return None;
    }
    KeyCommand::from_key(key & 0xFF)
}

/// Converts a captured BGR `Mat` into an RGB frame for the detector.
fn to_frame(bgr: &Mat) -> Result<Frame> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let bytes = rgb.data_bytes()?.to_vec();
    let frame = frame_from_rgb_bytes(rgb.cols() as u32, rgb.rows() as u32, bytes)?;
    Ok(frame)
}

fn run(args: Args) -> Result<()> {
    let config = args.detector_config();
    info!(
        camera = args.camera,
        pixel_threshold = config.pixel_threshold,
        alert_ratio = config.alert_ratio,
        cooldown_ms = config.cooldown.as_millis() as u64,
        sound = %config.sound,
        "starting watchdog"
    );

    let device = sound::select_device(&args.player, &config.sound);
    let mut watchdog = Watchdog::new(config, device).context("invalid detector configuration")?;

    // --- Camera ---
    let mut capture = VideoCapture::new(args.camera, videoio::CAP_ANY)
        .with_context(|| format!("failed to open camera {}", args.camera))?;
    if !capture.is_opened()? {
        bail!("failed to open camera {}", args.camera);
    }

    // --- Window and pointer input ---
    highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE).context("failed to create window")?;
    let (pointer_tx, pointer_rx) = mpsc::channel::<PointerEvent>();
    highgui::set_mouse_callback(
        WINDOW_NAME,
        Some(Box::new(move |event, x, y, _flags| {
            if let Some(pointer) = pointer_event(event, x, y) {
                let _ = pointer_tx.send(pointer);
            }
        })),
    )?;

    info!("drag to select a region, 'c' to reset, Esc to quit");

    // --- Main loop ---
    let mut captured = Mat::default();
    loop {
        let has_frame = capture.read(&mut captured)? && !captured.empty();

        if has_frame {
            watchdog.process_frame(Some(to_frame(&captured)?));
            let canvas = overlay::render(&captured, &watchdog)?;
            highgui::imshow(WINDOW_NAME, &canvas)?;
        } else {
            watchdog.process_frame(None);
        }

        let key = highgui::wait_key(KEY_POLL_MS)?;
        for pointer in pointer_rx.try_iter() {
            watchdog.handle_pointer(pointer);
        }
        if let Some(command) = key_command(key) {
            if watchdog.handle_command(command) == LoopControl::Break {
                break;
            }
        }
    }

    highgui::destroy_all_windows()?;
    info!("watchdog stopped");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_detector_constants() {
        let args = Args::try_parse_from(["watchdog_viewer"]).unwrap();
        let config = args.detector_config();
        assert_eq!(args.camera, 0);
        assert_eq!(config.pixel_threshold, 30);
        assert_eq!(config.alert_ratio, 0.10);
        assert_eq!(config.cooldown, Duration::from_millis(3000));
        assert_eq!(config.sound, "warning.wav");
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "watchdog_viewer",
            "--camera",
            "2",
            "--alert-ratio",
            "0.25",
            "--cooldown-ms",
            "500",
            "--sound",
            "door.wav",
        ])
        .unwrap();
        let config = args.detector_config();
        assert_eq!(args.camera, 2);
        assert_eq!(config.alert_ratio, 0.25);
        assert_eq!(config.cooldown, Duration::from_millis(500));
        assert_eq!(config.sound, "door.wav");
    }

    #[test]
    fn maps_left_button_gesture() {
        assert_eq!(
            pointer_event(highgui::EVENT_LBUTTONDOWN, 3, 4),
            Some(PointerEvent::Press(Point::new(3, 4)))
        );
        assert_eq!(
            pointer_event(highgui::EVENT_MOUSEMOVE, 5, 6),
            Some(PointerEvent::Move(Point::new(5, 6)))
        );
        assert_eq!(
            pointer_event(highgui::EVENT_LBUTTONUP, 7, 8),
            Some(PointerEvent::Release(Point::new(7, 8)))
        );
        assert_eq!(pointer_event(highgui::EVENT_RBUTTONDOWN, 1, 1), None);
    }

    #[test]
    fn maps_polled_keys() {
        assert_eq!(key_command(-1), None);
        assert_eq!(key_command('c' as i32), Some(KeyCommand::Reset));
        assert_eq!(key_command(27), Some(KeyCommand::Quit));
        assert_eq!(key_command(0x100000 | 27), Some(KeyCommand::Quit));
        assert_eq!(key_command('x' as i32), None);
    }
}
