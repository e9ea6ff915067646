// THEORY:
// The `pipeline` module is the top-level API of the watchdog. A front end runs one
// cycle per captured frame: feed the frame to `process_frame`, forward any pointer
// events to `handle_pointer`, forward key presses to `handle_command`, and draw
// whatever the accessors report. The `Watchdog` owns the single `WatchState`, the
// alert throttle and the alert device, so the front end never touches detector state
// directly.

use crate::core_modules::alert_throttle::{AlertDevice, AlertThrottle};
use crate::core_modules::change_analyzer;
use crate::core_modules::watch_state::WatchState;
use crate::error::{WatchdogError, WatchdogResult};
use std::time::{Duration, Instant};
use tracing::info;

// Re-export key data structures for the public API.
pub use crate::core_modules::change_analyzer::{AnalysisOutcome, ChangeReport};
pub use crate::core_modules::frame::{frame_from_rgb_bytes, Frame};
pub use crate::core_modules::rect::{Point, Rect};
pub use crate::core_modules::region_selector::PointerEvent;

pub const DEFAULT_PIXEL_THRESHOLD: u8 = 30;
pub const DEFAULT_ALERT_RATIO: f64 = 0.10;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3000);
pub const DEFAULT_SOUND: &str = "warning.wav";

const KEY_ESCAPE: i32 = 27;

/// Configuration for the Watchdog. Fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// A pixel counts as changed when its luma difference exceeds this value.
    pub pixel_threshold: u8,
    /// Fraction of changed region pixels at which the region is alerting.
    /// A value of 0.10 means 10% of the region must change.
    pub alert_ratio: f64,
    /// Minimum time between two audible alerts.
    pub cooldown: Duration,
    /// Sound resource handed to the alert device on every playback.
    pub sound: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            alert_ratio: DEFAULT_ALERT_RATIO,
            cooldown: DEFAULT_COOLDOWN,
            sound: DEFAULT_SOUND.to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> WatchdogResult<()> {
        if !(self.alert_ratio > 0.0 && self.alert_ratio <= 1.0) {
            return Err(WatchdogError::config(format!(
                "alert ratio must be in (0, 1], got {}",
                self.alert_ratio
            )));
        }
        if self.sound.is_empty() {
            return Err(WatchdogError::config("sound resource must not be empty"));
        }
        Ok(())
    }
}

/// Keyboard commands understood by the watchdog loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Forget the region, both frames and the alert history.
    Reset,
    /// Leave the loop.
    Quit,
}

impl KeyCommand {
    /// Maps a key code (`c`, `Esc`) to its command. Other keys map to `None`.
    pub fn from_key(key: i32) -> Option<Self> {
        match key {
            k if k == 'c' as i32 => Some(Self::Reset),
            KEY_ESCAPE => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Whether the front end loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

/// The main, top-level struct for the watchdog.
pub struct Watchdog<D: AlertDevice> {
    state: WatchState,
    config: DetectorConfig,
    throttle: AlertThrottle,
    device: D,
    last_report: Option<ChangeReport>,
}

impl<D: AlertDevice> Watchdog<D> {
    pub fn new(config: DetectorConfig, device: D) -> WatchdogResult<Self> {
        config.validate()?;
        Ok(Self {
            state: WatchState::new(),
            throttle: AlertThrottle::new(config.cooldown),
            config,
            device,
            last_report: None,
        })
    }

    /// Runs one analysis cycle for a captured frame.
    ///
    /// `None` stands for a transient empty frame: the cycle is skipped and no state
    /// changes.
    pub fn process_frame(&mut self, frame: Option<Frame>) -> AnalysisOutcome {
        self.process_frame_at(Instant::now(), frame)
    }

    /// Same as [`process_frame`](Self::process_frame) with an explicit clock reading
    /// for the alert throttle.
    pub fn process_frame_at(&mut self, now: Instant, frame: Option<Frame>) -> AnalysisOutcome {
        let Some(frame) = frame else {
            return AnalysisOutcome::Skipped;
        };
        self.state.current_frame = Some(frame);

        let outcome = change_analyzer::analyze(&mut self.state, &self.config);
        match &outcome {
            AnalysisOutcome::Measured(report) => {
                if report.triggered {
                    self.throttle
                        .maybe_play_at(now, &mut self.device, &self.config.sound);
                }
                self.last_report = Some(*report);
            }
            AnalysisOutcome::Baseline => self.last_report = None,
            AnalysisOutcome::Skipped => {}
        }
        outcome
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.state.apply_pointer(event);
    }

    pub fn handle_command(&mut self, command: KeyCommand) -> LoopControl {
        match command {
            KeyCommand::Reset => {
                self.reset();
                LoopControl::Continue
            }
            KeyCommand::Quit => LoopControl::Break,
        }
    }

    /// Returns the detector to its startup state.
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_report = None;
        info!("watch state cleared");
    }

    pub fn watch_region(&self) -> Option<Rect> {
        self.state.watch_region
    }

    pub fn drag_region(&self) -> Option<Rect> {
        self.state.drag_region
    }

    /// Whether the latest measured cycle was alerting.
    pub fn is_alerting(&self) -> bool {
        self.state.last_alert_state
    }

    /// The latest measurement, cleared by reset and by new baselines.
    pub fn last_report(&self) -> Option<&ChangeReport> {
        self.last_report.as_ref()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[derive(Default)]
    struct CountingDevice {
        plays: usize,
    }

    impl AlertDevice for CountingDevice {
        fn play(&mut self, _sound: &str) {
            self.plays += 1;
        }
    }

    fn watchdog() -> Watchdog<CountingDevice> {
        Watchdog::new(DetectorConfig::default(), CountingDevice::default()).expect("default config is valid")
    }

    fn select(watchdog: &mut Watchdog<CountingDevice>, from: Point, to: Point) {
        watchdog.handle_pointer(PointerEvent::Press(from));
        watchdog.handle_pointer(PointerEvent::Move(to));
        watchdog.handle_pointer(PointerEvent::Release(to));
    }

    fn solid(level: u8) -> Frame {
        RgbImage::from_pixel(40, 40, Rgb([level, level, level]))
    }

    #[test]
    fn rejects_out_of_range_alert_ratio() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let config = DetectorConfig {
                alert_ratio: ratio,
                ..DetectorConfig::default()
            };
            assert!(Watchdog::new(config, CountingDevice::default()).is_err());
        }
    }

    #[test]
    fn maps_keys_to_commands() {
        assert_eq!(KeyCommand::from_key('c' as i32), Some(KeyCommand::Reset));
        assert_eq!(KeyCommand::from_key(27), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key('q' as i32), None);
        assert_eq!(KeyCommand::from_key(-1), None);
    }

    #[test]
    fn empty_frame_skips_cycle() {
        let mut watchdog = watchdog();
        select(&mut watchdog, Point::new(0, 0), Point::new(10, 10));
        assert_eq!(watchdog.process_frame(None), AnalysisOutcome::Skipped);
        assert!(watchdog.state().current_frame.is_none());
    }

    #[test]
    fn rising_edge_plays_alert() {
        let mut watchdog = watchdog();
        select(&mut watchdog, Point::new(5, 5), Point::new(25, 25));

        assert_eq!(watchdog.process_frame(Some(solid(0))), AnalysisOutcome::Baseline);
        let outcome = watchdog.process_frame(Some(solid(200)));

        assert!(matches!(outcome, AnalysisOutcome::Measured(report) if report.triggered));
        assert!(watchdog.is_alerting());
        assert_eq!(watchdog.device().plays, 1);
    }

    #[test]
    fn flapping_region_is_throttled() {
        let mut watchdog = watchdog();
        select(&mut watchdog, Point::new(5, 5), Point::new(25, 25));
        let start = Instant::now();

        watchdog.process_frame_at(start, Some(solid(0)));
        // calm -> alert -> calm -> alert inside the cooldown
        watchdog.process_frame_at(start, Some(solid(200)));
        watchdog.process_frame_at(start + Duration::from_millis(500), Some(solid(200)));
        watchdog.process_frame_at(start + Duration::from_millis(1000), Some(solid(0)));
        assert_eq!(watchdog.device().plays, 1);

        // and once more after it
        watchdog.process_frame_at(start + Duration::from_millis(3500), Some(solid(0)));
        watchdog.process_frame_at(start + Duration::from_millis(4000), Some(solid(200)));
        assert_eq!(watchdog.device().plays, 2);
    }

    #[test]
    fn reset_then_first_frame_is_baseline() {
        let mut watchdog = watchdog();
        select(&mut watchdog, Point::new(5, 5), Point::new(25, 25));
        watchdog.process_frame(Some(solid(0)));
        watchdog.process_frame(Some(solid(200)));

        assert_eq!(watchdog.handle_command(KeyCommand::Reset), LoopControl::Continue);
        assert_eq!(watchdog.watch_region(), None);
        assert!(!watchdog.is_alerting());
        assert!(watchdog.last_report().is_none());

        select(&mut watchdog, Point::new(5, 5), Point::new(25, 25));
        assert_eq!(watchdog.process_frame(Some(solid(255))), AnalysisOutcome::Baseline);
        assert_eq!(watchdog.device().plays, 1);
    }

    #[test]
    fn quit_breaks_the_loop() {
        let mut watchdog = watchdog();
        assert_eq!(watchdog.handle_command(KeyCommand::Quit), LoopControl::Break);
    }

    #[test]
    fn new_selection_keeps_previous_frame() {
        let mut watchdog = watchdog();
        select(&mut watchdog, Point::new(5, 5), Point::new(25, 25));
        watchdog.process_frame(Some(solid(0)));

        watchdog.handle_pointer(PointerEvent::Press(Point::new(1, 1)));
        assert_eq!(watchdog.watch_region(), None);
        assert_eq!(watchdog.drag_region(), Some(Rect::new(1, 1, 0, 0)));
        assert_eq!(watchdog.process_frame(Some(solid(0))), AnalysisOutcome::Skipped);

        watchdog.handle_pointer(PointerEvent::Release(Point::new(11, 11)));
        assert!(matches!(
            watchdog.process_frame(Some(solid(0))),
            AnalysisOutcome::Measured(_)
        ));
    }
}
