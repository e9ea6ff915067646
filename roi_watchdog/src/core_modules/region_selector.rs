// THEORY:
// The region selector turns a press/move/release pointer gesture into a committed
// watch region. Pointer input is delivered as `PointerEvent` messages rather than
// having a callback poke at shared state; whoever owns the `WatchState` applies the
// messages in order between analysis cycles.
//
// Rules:
// 1.  Pressing starts a new selection and immediately drops the old watch region, so
//     nothing is monitored while the user is choosing.
// 2.  While dragging, the drag region is the normalized rectangle between the press
//     point and the pointer, valid in any drag direction.
// 3.  Releasing commits the same normalized rectangle as the watch region, unless it
//     has no area (a click without movement), in which case nothing is selected.

use crate::core_modules::rect::{Point, Rect};
use crate::core_modules::watch_state::WatchState;
use tracing::{debug, info};

/// A pointer gesture step, in window pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release(Point),
}

impl WatchState {
    /// Starts a selection at `point`, discarding the current watch region.
    pub fn begin_drag(&mut self, point: Point) {
        self.drag_start = Some(point);
        self.watch_region = None;
        self.drag_region = Some(Rect::spanning(point, point));
        debug!(x = point.x, y = point.y, "selection started");
    }

    /// Stretches the in-progress selection to `point`. Ignored when not dragging.
    pub fn update_drag(&mut self, point: Point) {
        if let Some(start) = self.drag_start {
            self.drag_region = Some(Rect::spanning(start, point));
        }
    }

    /// Finishes the selection at `point` and commits it as the watch region.
    ///
    /// A release without a preceding press is ignored.
    pub fn end_drag(&mut self, point: Point) {
        let Some(start) = self.drag_start.take() else {
            return;
        };

        self.drag_region = None;
        self.watch_region = Rect::spanning(start, point).non_empty();

        match self.watch_region {
            Some(region) => info!(
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                "watch region selected"
            ),
            None => debug!("empty selection discarded"),
        }
    }

    /// Dispatches a pointer message to the matching selection step.
    pub fn apply_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(point) => self.begin_drag(point),
            PointerEvent::Move(point) => self.update_drag(point),
            PointerEvent::Release(point) => self.end_drag(point),
        }
    }
}
