use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
};
use roi_watchdog::core_modules::alert_throttle::AlertDevice;
use roi_watchdog::pipeline::{Rect, Watchdog};

const DRAG_COLOR: (f64, f64, f64) = (255.0, 0.0, 255.0); // magenta
const CALM_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0); // green
const ALERT_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0); // red

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

fn to_cv_rect(rect: Rect) -> core::Rect {
    core::Rect::new(rect.x, rect.y, rect.width as i32, rect.height as i32)
}

/// Draws the drag region, the watch region (color-coded by alert state) and the last
/// measured change percentage on a copy of `frame`.
pub fn render(frame: &Mat, watchdog: &Watchdog<impl AlertDevice>) -> opencv::Result<Mat> {
    let mut canvas = frame.clone();

    if let Some(drag) = watchdog.drag_region() {
        imgproc::rectangle(&mut canvas, to_cv_rect(drag), bgr(DRAG_COLOR), 2, imgproc::LINE_8, 0)?;
    }

    if let Some(watch) = watchdog.watch_region() {
        let (color, thickness) = if watchdog.is_alerting() {
            (ALERT_COLOR, 3)
        } else {
            (CALM_COLOR, 2)
        };
        imgproc::rectangle(&mut canvas, to_cv_rect(watch), bgr(color), thickness, imgproc::LINE_8, 0)?;

        if let Some(report) = watchdog.last_report() {
            imgproc::put_text(
                &mut canvas,
                &format!("change {}%", report.percent()),
                core::Point::new(10, 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.8,
                bgr(color),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }
    }

    Ok(canvas)
}
