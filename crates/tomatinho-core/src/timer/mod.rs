mod interval_timer;
mod local;
mod manual;
mod scheduler;

pub use interval_timer::{format_remaining, IntervalTimer, TickHandler};
pub use local::LocalScheduler;
pub use manual::ManualScheduler;
pub use scheduler::{OnceCallback, RepeatCallback, Scheduler, TimerHandle};
