// THEORY:
// This file is the entry point for the `roi_watchdog` library crate. The public face
// of the crate is the `Watchdog` in `pipeline`: hand it frames, pointer events and key
// commands, and it keeps the watch state, measures change inside the selected region
// and rings the alert device on a rising edge, throttled.
//
// The building blocks (`core_modules`) stay public for front ends that want to draw
// the regions or run the analyzer stages on their own, but nothing here knows about
// cameras, windows or audio backends. Those live in the front end behind the
// `AlertDevice` trait and plain `Frame` values.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{WatchdogError, WatchdogResult};
