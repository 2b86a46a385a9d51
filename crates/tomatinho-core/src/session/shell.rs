//! Capabilities the session controller needs from its surroundings.
//!
//! The presentation shell implements these and hands them to the
//! controller at construction; the core never touches a widget.

use std::rc::Rc;

use crate::interval::IntervalKind;

/// Indicator state shown to the user.
pub trait DisplayUpdater {
    fn set_icon(&self, icon: &str);
    fn set_label(&self, text: &str);
}

/// Fire-and-forget desktop notifications.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str, icon: &str);
}

/// Asks the shell to end its event loop.
pub trait ShutdownSignal {
    fn request_quit(&self);
}

/// Configured interval lengths.
pub trait ConfigSource {
    /// Duration in seconds, `None` when the kind has no duration.
    fn duration_for(&self, kind: IntervalKind) -> Option<u64>;
}

/// Everything the controller talks to besides the timer and the log.
#[derive(Clone)]
pub struct Collaborators {
    pub display: Rc<dyn DisplayUpdater>,
    pub notifier: Rc<dyn Notifier>,
    pub shutdown: Rc<dyn ShutdownSignal>,
    pub config: Rc<dyn ConfigSource>,
}
