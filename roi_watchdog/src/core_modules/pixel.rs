// THEORY (single-pixel luminance):
// Change detection compares brightness, not color. Every pixel of a watched region is
// reduced to one 8-bit luma value before two frames are differenced, so a change in
// hue at constant brightness is (deliberately) invisible to the detector.
//
// Luma uses the Rec. 601 weights (0.299 R + 0.587 G + 0.114 B). The hot path runs once
// per pixel per frame, so the weights are carried in 14-bit fixed point with
// round-half-up, which gives the same bytes a camera stack's BGR->GRAY conversion
// produces and keeps the whole computation in integer arithmetic.

use image::Rgb;

pub type Channel = u8;
pub type Luminance = u8;
pub type LuminanceDelta = u8;

const LUMA_SHIFT: u32 = 14;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);
const RED_WEIGHT: u32 = 4899; // 0.299 * 2^14
const GREEN_WEIGHT: u32 = 9617; // 0.587 * 2^14
const BLUE_WEIGHT: u32 = 1868; // 0.114 * 2^14

/// Rec. 601 luma of an RGB pixel, rounded to the nearest integer.
#[inline]
pub fn luma(pixel: &Rgb<Channel>) -> Luminance {
    let [red, green, blue] = pixel.0;
    let weighted = RED_WEIGHT * red as u32 + GREEN_WEIGHT * green as u32 + BLUE_WEIGHT * blue as u32;
    ((weighted + LUMA_ROUND) >> LUMA_SHIFT) as Luminance
}
