pub mod alert_throttle;
pub mod change_analyzer;
pub mod frame;
pub mod pixel;
pub mod rect;
pub mod region_selector;
pub mod watch_state;
