//! Terminal implementations of the session's collaborator traits.

use std::cell::RefCell;
use std::io::{IsTerminal, Write};
use std::rc::Rc;

use notify_rust::Notification;
use tokio::sync::Notify;
use tomatinho_core::{DisplayUpdater, Notifier, ShutdownSignal};
use tracing::{debug, warn};

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Keeps a status line (`[icon] label`) at the bottom of an interactive
/// terminal. Prints nothing when stdout is not a terminal.
pub struct ConsoleDisplay {
    interactive: bool,
    icon: RefCell<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
            icon: RefCell::new(String::new()),
        }
    }
}

impl DisplayUpdater for ConsoleDisplay {
    fn set_icon(&self, icon: &str) {
        *self.icon.borrow_mut() = icon.to_string();
    }

    fn set_label(&self, text: &str) {
        if !self.interactive {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{CLEAR_LINE}[{}] {text}", self.icon.borrow());
        let _ = out.flush();
    }
}

/// Echoes every notification to stdout and, when enabled, raises a desktop
/// notification as well.
pub struct DesktopNotifier {
    desktop: bool,
    interactive: bool,
}

impl DesktopNotifier {
    pub fn new(desktop: bool) -> Self {
        Self {
            desktop,
            interactive: std::io::stdout().is_terminal(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str, icon: &str) {
        let prefix = if self.interactive { CLEAR_LINE } else { "" };
        println!("{prefix}{title}: {message}");

        if !self.desktop {
            return;
        }
        match Notification::new()
            .appname(title)
            .summary(title)
            .body(message)
            .icon(icon)
            .show()
        {
            Ok(_) => debug!(message, "desktop notification sent"),
            Err(err) => warn!(error = %err, message, "desktop notification failed"),
        }
    }
}

/// Wakes the event loop when the session asks to quit.
pub struct QuitSignal {
    notify: Rc<Notify>,
}

impl QuitSignal {
    pub fn new(notify: Rc<Notify>) -> Self {
        Self { notify }
    }
}

impl ShutdownSignal for QuitSignal {
    fn request_quit(&self) {
        // notify_one keeps a permit if the loop is not waiting yet.
        self.notify.notify_one();
    }
}
