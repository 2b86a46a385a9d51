mod controller;
mod shell;

pub use controller::{SessionController, SessionStatus, APP_NAME};
pub use shell::{Collaborators, ConfigSource, DisplayUpdater, Notifier, ShutdownSignal};
