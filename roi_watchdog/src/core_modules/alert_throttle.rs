// THEORY:
// The edge trigger in the change analyzer decides *when* a trigger event happens; the
// throttle decides whether that event is allowed to make sound. A region that flaps
// between calm and alerting produces a rising edge on every flap, and playing a sound
// for each would bury the operator in noise. After a playback, further triggers are
// dropped (not queued, not deferred) until the cooldown has elapsed.
//
// The sound itself is played by an `AlertDevice`. Playback is fire-and-forget: the
// device returns immediately and reports nothing back to the detector.

use std::time::{Duration, Instant};
use tracing::trace;

/// Something that can make an audible alert.
pub trait AlertDevice {
    /// Starts playing `sound` without waiting for it to finish.
    fn play(&mut self, sound: &str);

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<D: AlertDevice + ?Sized> AlertDevice for Box<D> {
    fn play(&mut self, sound: &str) {
        (**self).play(sound)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Rate-limits playback through an `AlertDevice`.
#[derive(Debug, Clone)]
pub struct AlertThrottle {
    /// Minimum spacing between two playbacks.
    cooldown: Duration,
    /// When the last playback happened, if one has.
    last_played: Option<Instant>,
}

impl AlertThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_played: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Plays `sound` unless the previous playback was less than `cooldown` ago.
    /// Returns whether the device was asked to play.
    pub fn maybe_play<D: AlertDevice + ?Sized>(&mut self, device: &mut D, sound: &str) -> bool {
        self.maybe_play_at(Instant::now(), device, sound)
    }

    /// Same as [`maybe_play`](Self::maybe_play) with an explicit clock reading.
    pub fn maybe_play_at<D: AlertDevice + ?Sized>(
        &mut self,
        now: Instant,
        device: &mut D,
        sound: &str,
    ) -> bool {
        if let Some(last) = self.last_played {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.cooldown {
                trace!(elapsed_ms = elapsed.as_millis() as u64, "alert suppressed by cooldown");
                return false;
            }
        }

        self.last_played = Some(now);
        device.play(sound);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDevice {
        played: Vec<String>,
    }

    impl AlertDevice for RecordingDevice {
        fn play(&mut self, sound: &str) {
            self.played.push(sound.to_string());
        }
    }

    const COOLDOWN: Duration = Duration::from_millis(3000);

    #[test]
    fn first_trigger_always_plays() {
        let mut throttle = AlertThrottle::new(COOLDOWN);
        let mut device = RecordingDevice::default();

        assert!(throttle.maybe_play_at(Instant::now(), &mut device, "warning.wav"));
        assert_eq!(device.played, vec!["warning.wav"]);
    }

    #[test]
    fn triggers_inside_cooldown_play_once() {
        let mut throttle = AlertThrottle::new(COOLDOWN);
        let mut device = RecordingDevice::default();
        let start = Instant::now();

        assert!(throttle.maybe_play_at(start, &mut device, "warning.wav"));
        assert!(!throttle.maybe_play_at(start + Duration::from_millis(2999), &mut device, "warning.wav"));
        assert_eq!(device.played.len(), 1);
    }

    #[test]
    fn triggers_a_cooldown_apart_both_play() {
        let mut throttle = AlertThrottle::new(COOLDOWN);
        let mut device = RecordingDevice::default();
        let start = Instant::now();

        assert!(throttle.maybe_play_at(start, &mut device, "warning.wav"));
        assert!(throttle.maybe_play_at(start + COOLDOWN, &mut device, "warning.wav"));
        assert_eq!(device.played.len(), 2);
    }

    #[test]
    fn dropped_trigger_does_not_extend_cooldown() {
        let mut throttle = AlertThrottle::new(COOLDOWN);
        let mut device = RecordingDevice::default();
        let start = Instant::now();

        throttle.maybe_play_at(start, &mut device, "a");
        throttle.maybe_play_at(start + Duration::from_millis(2000), &mut device, "b");
        assert!(throttle.maybe_play_at(start + Duration::from_millis(3000), &mut device, "c"));
        assert_eq!(device.played, vec!["a", "c"]);
    }

    #[test]
    fn boxed_devices_play_through() {
        let mut throttle = AlertThrottle::new(COOLDOWN);
        let mut device: Box<dyn AlertDevice> = Box::new(RecordingDevice::default());
        assert_eq!(device.name(), "unnamed");
        assert!(throttle.maybe_play(&mut device, "warning.wav"));
    }
}
