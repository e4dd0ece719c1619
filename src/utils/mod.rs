pub mod date;
pub mod path;
pub mod time;

pub use path::expand_tilde;
pub use time::{Clock, ManualClock, SystemClock};
