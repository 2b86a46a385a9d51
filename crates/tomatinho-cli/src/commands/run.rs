//! Interactive session: menu commands on stdin, status on stdout.

use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tomatinho_core::{
    Collaborators, Config, EventLog, IntervalKind, LocalScheduler, Result, SessionController,
    SessionError,
};
use tracing::{info, warn};

use super::about;
use crate::shell::{ConsoleDisplay, DesktopNotifier, QuitSignal};

const HELP: &str = "\
commands:
  pomodoro, p   start a pomodoro
  short, s      start a short pause
  long, l       start a long break
  stop, x       stop the running interval
  status        show the current interval as JSON
  about         about this application
  help          show this help
  quit, q       quit (also Ctrl-C or end of input)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuCommand {
    Start(IntervalKind),
    Stop,
    Status,
    About,
    Help,
    Quit,
}

impl FromStr for MenuCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "p" => Ok(MenuCommand::Start(IntervalKind::Pomodoro)),
            "short" | "s" => Ok(MenuCommand::Start(IntervalKind::ShortRest)),
            "long" | "l" => Ok(MenuCommand::Start(IntervalKind::LongRest)),
            "stop" | "x" => Ok(MenuCommand::Stop),
            "status" => Ok(MenuCommand::Status),
            "about" => Ok(MenuCommand::About),
            "help" | "?" => Ok(MenuCommand::Help),
            "quit" | "q" => Ok(MenuCommand::Quit),
            other => Err(format!("unknown command: {other} (type 'help')")),
        }
    }
}

pub fn run() -> Result<()> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(config));
    // A pending stdin read would otherwise keep shutdown waiting.
    runtime.shutdown_background();
    result
}

async fn session(config: Config) -> Result<()> {
    let scheduler = Rc::new(LocalScheduler::new());
    let quit = Rc::new(Notify::new());
    let tick = Duration::from_secs(config.tick_secs);
    let shell = Collaborators {
        display: Rc::new(ConsoleDisplay::new()),
        notifier: Rc::new(DesktopNotifier::new(config.notifications.enabled)),
        shutdown: Rc::new(QuitSignal::new(quit.clone())),
        config: Rc::new(config),
    };

    let controller = match EventLog::open_default() {
        Ok(log) => SessionController::new(scheduler.clone(), Box::new(log), shell),
        Err(err) => {
            warn!(error = %err, "event log unavailable, running without history");
            SessionController::without_history(scheduler.clone(), &err, shell)
        }
    };
    controller.set_tick_period(tick);

    info!("session started");
    scheduler.run_until(event_loop(&controller, &quit)).await
}

async fn event_loop(controller: &SessionController, quit: &Notify) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ctrl_c_armed = true;

    loop {
        tokio::select! {
            biased;
            _ = quit.notified() => break,
            signal = &mut ctrl_c, if ctrl_c_armed => {
                ctrl_c_armed = false;
                match signal {
                    Ok(()) => controller.quit(),
                    Err(err) => warn!(error = %err, "Ctrl-C handler unavailable"),
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<MenuCommand>() {
                    Ok(command) => dispatch(controller, command)?,
                    Err(message) => println!("{message}"),
                },
                Ok(None) => controller.quit(),
                Err(err) => {
                    // The running interval still gets its record.
                    controller.quit();
                    return Err(err.into());
                }
            },
        }
    }

    info!("session ended");
    Ok(())
}

fn dispatch(controller: &SessionController, command: MenuCommand) -> Result<()> {
    match command {
        MenuCommand::Start(kind) => match controller.start(kind) {
            Ok(()) => {}
            Err(err @ SessionError::Scheduler(_)) => return Err(err.into()),
            Err(err) => eprintln!("error: {err}"),
        },
        MenuCommand::Stop => controller.stop(true),
        MenuCommand::Status => {
            println!("{}", serde_json::to_string_pretty(&controller.status())?);
        }
        MenuCommand::About => about::print(),
        MenuCommand::Help => println!("{HELP}"),
        MenuCommand::Quit => controller.quit(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_commands_and_shortcuts() {
        assert_eq!(
            "p".parse::<MenuCommand>(),
            Ok(MenuCommand::Start(IntervalKind::Pomodoro))
        );
        assert_eq!(
            "Short".parse::<MenuCommand>(),
            Ok(MenuCommand::Start(IntervalKind::ShortRest))
        );
        assert_eq!(
            " long ".parse::<MenuCommand>(),
            Ok(MenuCommand::Start(IntervalKind::LongRest))
        );
        assert_eq!("x".parse::<MenuCommand>(), Ok(MenuCommand::Stop));
        assert_eq!("q".parse::<MenuCommand>(), Ok(MenuCommand::Quit));
        assert_eq!("status".parse::<MenuCommand>(), Ok(MenuCommand::Status));
    }

    #[test]
    fn rejects_unknown_commands() {
        let err = "nap".parse::<MenuCommand>().unwrap_err();
        assert!(err.contains("nap"));
    }
}
