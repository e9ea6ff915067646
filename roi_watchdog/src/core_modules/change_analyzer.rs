// THEORY:
// The change analyzer decides, once per frame, whether the watched region changed
// enough to count as an alert. It is a frame-to-frame detector: every analyzed frame
// becomes the baseline for the next one, so a slow drift never accumulates into an
// alert while a sudden change (something appearing, leaving, a light switching) does.
//
// Stages:
// 1.  **Gate**: nothing to do without a frame or a watch region. The region is clipped
//     to the frame; a region entirely off-frame is treated like no region.
// 2.  **Baseline**: the first usable frame (after start or reset) only seeds the
//     comparison. So does a frame whose dimensions differ from the stored baseline.
// 3.  **Measure**: crop both frames to the region, reduce to luma, take the per-pixel
//     absolute difference and binarize it against `pixel_threshold`. The fraction of
//     changed pixels is the `ratio`.
// 4.  **Edge trigger**: the region is alerting while `ratio >= alert_ratio`, but a
//     trigger fires only on the transition from calm to alerting. A sustained change
//     raises exactly one trigger.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::{luma, LuminanceDelta};
use crate::core_modules::rect::Rect;
use crate::core_modules::watch_state::WatchState;
use crate::pipeline::DetectorConfig;
use image::{GrayImage, Luma};
use tracing::{debug, info, warn};

/// The measurement produced by one compared frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeReport {
    /// Fraction of region pixels whose luma moved past the pixel threshold, in [0, 1].
    pub ratio: f64,
    /// Whether the ratio reached the alert ratio this cycle.
    pub is_alerting: bool,
    /// True only on the cycle the region went from calm to alerting.
    pub triggered: bool,
    pub changed_pixels: u64,
    pub total_pixels: u64,
}

impl ChangeReport {
    /// The ratio as a whole percentage, truncated rather than rounded.
    ///
    /// Computed from the pixel counts so exact ratios such as 29/100 do not lose a
    /// point to floating-point rounding.
    pub fn percent(&self) -> u32 {
        if self.total_pixels == 0 {
            return 0;
        }
        (self.changed_pixels * 100 / self.total_pixels) as u32
    }
}

/// What happened to a frame handed to the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// No frame or no usable watch region; state untouched.
    Skipped,
    /// The frame was stored as the comparison baseline without being measured.
    Baseline,
    /// The frame was compared against the baseline.
    Measured(ChangeReport),
}

/// A rising edge is a calm cycle followed by an alerting one.
pub fn is_rising_edge(was_alerting: bool, is_alerting: bool) -> bool {
    is_alerting && !was_alerting
}

/// Crops `frame` to `region` and reduces it to single-channel luma.
///
/// `region` must lie inside the frame.
pub fn crop_luma(frame: &Frame, region: Rect) -> GrayImage {
    let (left, top) = (region.x as u32, region.y as u32);
    GrayImage::from_fn(region.width, region.height, |x, y| {
        Luma([luma(frame.get_pixel(left + x, top + y))])
    })
}

/// Per-pixel absolute difference of two equally sized luma images.
pub fn abs_diff(before: &GrayImage, after: &GrayImage) -> GrayImage {
    GrayImage::from_fn(before.width(), before.height(), |x, y| {
        Luma([before.get_pixel(x, y)[0].abs_diff(after.get_pixel(x, y)[0])])
    })
}

/// Number of difference pixels strictly above `threshold`.
pub fn count_above(diff: &GrayImage, threshold: LuminanceDelta) -> u64 {
    diff.pixels().filter(|pixel| pixel[0] > threshold).count() as u64
}

/// Runs one analysis cycle on `state.current_frame`.
pub fn analyze(state: &mut WatchState, config: &DetectorConfig) -> AnalysisOutcome {
    let Some(current) = state.current_frame.as_ref() else {
        return AnalysisOutcome::Skipped;
    };
    let Some(watch_region) = state.watch_region else {
        return AnalysisOutcome::Skipped;
    };
    let (width, height) = current.dimensions();
    let Some(region) = watch_region.clip_to(width, height) else {
        return AnalysisOutcome::Skipped;
    };

    let previous = match state.previous_frame.take() {
        Some(previous) if previous.dimensions() == (width, height) => previous,
        stale => {
            if let Some(stale) = stale {
                warn!(
                    old_width = stale.width(),
                    old_height = stale.height(),
                    width,
                    height,
                    "frame size changed, re-baselining"
                );
            }
            state.previous_frame = Some(current.clone());
            debug!("baseline frame stored");
            return AnalysisOutcome::Baseline;
        }
    };

    let diff = abs_diff(&crop_luma(&previous, region), &crop_luma(current, region));
    let changed_pixels = count_above(&diff, config.pixel_threshold);
    let total_pixels = region.area();
    let ratio = changed_pixels as f64 / total_pixels as f64;

    let is_alerting = ratio >= config.alert_ratio;
    let triggered = is_rising_edge(state.last_alert_state, is_alerting);
    state.last_alert_state = is_alerting;
    state.previous_frame = Some(current.clone());

    let report = ChangeReport {
        ratio,
        is_alerting,
        triggered,
        changed_pixels,
        total_pixels,
    };
    debug!(percent = report.percent(), changed_pixels, total_pixels, "subtraction ratio");
    if triggered {
        info!(percent = report.percent(), "change detected in watch region");
    }

    AnalysisOutcome::Measured(report)
}
