// THEORY:
// `WatchState` is the single piece of mutable state the detector owns. The region
// selector writes the geometric half of it (watch/drag regions, the drag gesture), the
// change analyzer writes the temporal half (frames, the previous alert flag), and the
// reset command returns both halves to the cleared startup state.
//
// There is exactly one instance per running watchdog and it is passed explicitly to
// whichever step mutates it; nothing here is global.

use crate::core_modules::frame::Frame;
use crate::core_modules::rect::{Point, Rect};

/// The mutable state shared by region selection and change analysis.
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    /// The committed region being monitored, if the user has selected one.
    pub watch_region: Option<Rect>,
    /// The rectangle shown while a selection drag is in progress. Never analyzed.
    pub drag_region: Option<Rect>,
    /// Where the current drag gesture started; `Some` exactly while dragging.
    pub drag_start: Option<Point>,
    /// Whether the previous analysis cycle ended in the alerting condition.
    pub last_alert_state: bool,
    /// The most recently ingested frame.
    pub current_frame: Option<Frame>,
    /// The frame the current one is compared against.
    pub previous_frame: Option<Frame>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the pointer button is held during a selection.
    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Clears the regions, both frame buffers and the alert history.
    ///
    /// A drag gesture that is still in progress keeps its start point, so the next
    /// pointer move re-creates its drag region.
    pub fn reset(&mut self) {
        self.watch_region = None;
        self.drag_region = None;
        self.current_frame = None;
        self.previous_frame = None;
        self.last_alert_state = false;
    }
}
