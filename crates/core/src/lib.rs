#![forbid(unsafe_code)]

pub mod model;
pub mod results;
pub mod time;
pub mod timer;

pub use time::Clock;
