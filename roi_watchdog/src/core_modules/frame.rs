// THEORY:
// A `Frame` is one captured camera image in interleaved 8-bit RGB. Capture backends
// hand us raw byte buffers, so the only way in is `frame_from_rgb_bytes`, which checks
// that the buffer matches the declared dimensions before wrapping it. Once built, a
// frame is an ordinary `image::RgbImage` and can be cropped, viewed and compared with
// the `image` crate's tooling.

use crate::error::{WatchdogError, WatchdogResult};
use image::RgbImage;

const CHANNELS: usize = 3;

/// A single captured RGB8 image.
pub type Frame = RgbImage;

/// Wraps an interleaved RGB buffer of exactly `width * height * 3` bytes.
pub fn frame_from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> WatchdogResult<Frame> {
    let expected = width as usize * height as usize * CHANNELS;
    let actual = bytes.len();
    if actual != expected {
        return Err(WatchdogError::FrameBuffer {
            width,
            height,
            expected,
            actual,
        });
    }

    RgbImage::from_raw(width, height, bytes).ok_or(WatchdogError::FrameBuffer {
        width,
        height,
        expected,
        actual,
    })
}
