use std::str::FromStr;
use std::time::Instant;

use clap::Args;
use matchclock_core::{format_time, ClockDriver, Config, Event, RunState, Signal};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct RunArgs {
    /// Jump to this segment before starting (e.g. "Game 2 Q 1")
    #[arg(long)]
    from: Option<String>,
    /// Tick five times per second
    #[arg(long)]
    test_mode: bool,
    /// Print events and status as JSON lines
    #[arg(long)]
    json: bool,
    /// Ring the terminal bell on warnings and segment ends
    #[arg(long)]
    bell: bool,
}

const HELP: &str = "commands: <enter>/toggle, start, pause, resume, reset, +N/-N, undo, \
jump <name>, list, status, reload, help, quit";

/// A line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Toggle,
    Start,
    Pause,
    Resume,
    Reset,
    Adjust(i64),
    Undo,
    Jump(String),
    List,
    Status,
    Reload,
    Help,
    Quit,
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.starts_with('+') || line.starts_with('-') {
            return line
                .parse::<i64>()
                .map(OperatorCommand::Adjust)
                .map_err(|_| format!("invalid adjustment: {line}"));
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "" | "t" | "toggle" => OperatorCommand::Toggle,
            "start" => OperatorCommand::Start,
            "p" | "pause" => OperatorCommand::Pause,
            "resume" => OperatorCommand::Resume,
            "reset" => OperatorCommand::Reset,
            "u" | "undo" => OperatorCommand::Undo,
            "j" | "jump" => {
                if rest.is_empty() {
                    return Err("jump needs a segment name".to_string());
                }
                OperatorCommand::Jump(rest.to_string())
            }
            "l" | "list" => OperatorCommand::List,
            "s" | "status" => OperatorCommand::Status,
            "reload" => OperatorCommand::Reload,
            "h" | "help" | "?" => OperatorCommand::Help,
            "q" | "quit" | "exit" => OperatorCommand::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        if !rest.is_empty() && !matches!(command, OperatorCommand::Jump(_)) {
            return Err(format!("unexpected argument: {rest}"));
        }
        Ok(command)
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if args.test_mode {
        config.schedule.test_mode = true;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config, args))
}

async fn session(config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = ClockDriver::from_config(&config);
    let out = Printer {
        json: args.json,
        bell: args.bell,
    };

    if let Some(name) = &args.from {
        match driver.jump_to(name) {
            Some(event) => out.event(&event),
            None => return Err(format!("unknown segment: {name}").into()),
        }
    }

    if !args.json {
        println!("{HELP}");
    }
    out.status(&driver);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        // Without an operator the session lasts only as long as the clock runs.
        if !stdin_open && driver.clock().state() != RunState::Running {
            break;
        }
        let deadline = driver.next_deadline();

        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let command = match line.parse::<OperatorCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                tracing::debug!(?command, "operator command");
                match command {
                    OperatorCommand::Quit => break,
                    OperatorCommand::Help => println!("{HELP}"),
                    OperatorCommand::List => out.list(&driver),
                    OperatorCommand::Status => out.status(&driver),
                    OperatorCommand::Reload => {
                        if driver.clock().can_edit_settings() {
                            let mut fresh = Config::load_or_default();
                            fresh.schedule.test_mode |= args.test_mode;
                            out.event(&driver.reconfigure(&fresh));
                            out.status(&driver);
                        } else {
                            eprintln!("pause the clock before reloading settings");
                        }
                    }
                    command => {
                        let events = apply(&mut driver, command, Instant::now());
                        if events.is_empty() {
                            eprintln!("no change");
                        }
                        for event in &events {
                            out.event(event);
                        }
                        out.status(&driver);
                    }
                }
            }
            _ = wait_for(deadline) => {
                let events = driver.poll(Instant::now());
                for event in &events {
                    out.event(event);
                }
                if !events.is_empty() {
                    out.status(&driver);
                }
            }
        }
    }
    Ok(())
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

fn apply(driver: &mut ClockDriver, command: OperatorCommand, now: Instant) -> Vec<Event> {
    match command {
        OperatorCommand::Toggle => driver.toggle(now),
        OperatorCommand::Start => driver.start(now).into_iter().collect(),
        OperatorCommand::Pause => driver.pause(now),
        OperatorCommand::Resume => driver.resume(now).into_iter().collect(),
        OperatorCommand::Reset => vec![driver.reset()],
        OperatorCommand::Adjust(delta) => driver.add_seconds(delta).into_iter().collect(),
        OperatorCommand::Undo => driver.undo_last_adjustment().into_iter().collect(),
        OperatorCommand::Jump(name) => driver.jump_to(&name).into_iter().collect(),
        OperatorCommand::List
        | OperatorCommand::Status
        | OperatorCommand::Reload
        | OperatorCommand::Help
        | OperatorCommand::Quit => Vec::new(),
    }
}

struct Printer {
    json: bool,
    bell: bool,
}

impl Printer {
    fn event(&self, event: &Event) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }
        if let Some(line) = describe(event) {
            let ring = self.bell
                && matches!(
                    event.signal(),
                    Some(Signal::WarningEntered { .. } | Signal::Ended { .. })
                );
            if ring {
                print!("\x07");
            }
            println!("{line}");
        }
    }

    fn status(&self, driver: &ClockDriver) {
        let snapshot = driver.clock().snapshot();
        if self.json {
            if let Ok(line) = serde_json::to_string(&snapshot) {
                println!("{line}");
            }
            return;
        }
        let name = snapshot
            .full_name
            .as_deref()
            .unwrap_or(&snapshot.section_name);
        let state = serde_json::to_value(snapshot.run_state)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let mut line = format!(
            "[{state}] {name}  {}  game {}/{}",
            format_time(snapshot.time_left),
            snapshot.game_progress.current,
            snapshot.game_progress.total
        );
        if snapshot.pending_adjustments > 0 {
            line.push_str(&format!(
                "  ({} undoable, net {:+}s)",
                snapshot.pending_adjustments, snapshot.net_adjustment
            ));
        }
        println!("{line}");
    }

    fn list(&self, driver: &ClockDriver) {
        let current = driver.clock().current_segment().map(|s| s.full_name.as_str());
        for name in driver.clock().full_names() {
            let marker = if Some(name) == current { ">" } else { " " };
            println!("{marker} {name}");
        }
    }
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::ClockStarted {
            full_name,
            time_left,
            ..
        } => format!("started {full_name} ({})", format_time(*time_left)),
        Event::ClockPaused { time_left, .. } => format!("paused at {}", format_time(*time_left)),
        Event::ClockResumed { time_left, .. } => format!("resumed at {}", format_time(*time_left)),
        Event::ClockReset { .. } => "reset".to_string(),
        Event::SegmentJumped { full_name, .. } => format!("jumped to {full_name}"),
        Event::SegmentAdvanced {
            full_name,
            duration_secs,
            ..
        } => format!("now {full_name} ({})", format_time(*duration_secs)),
        Event::TimelineCompleted { .. } => "day complete".to_string(),
        Event::TimeAdjusted {
            delta, time_left, ..
        } => format!("adjusted {delta:+}s, {} left", format_time(*time_left)),
        Event::AdjustmentUndone {
            delta, time_left, ..
        } => format!("undid {delta:+}s, {} left", format_time(*time_left)),
        Event::Signal { signal, .. } => match signal {
            Signal::PreWarningPip { .. } | Signal::HooterPip { .. } => return None,
            Signal::WarningEntered { message, time_left } => {
                format!("{message} ({})", format_time(*time_left))
            }
            Signal::Ended { message } => format!("📣 {message}"),
        },
        Event::Rejected { reason, .. } => format!("rejected: {reason}"),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchclock_core::ScheduleConfig;

    #[test]
    fn parses_adjustments() {
        assert_eq!("+10".parse(), Ok(OperatorCommand::Adjust(10)));
        assert_eq!("-30".parse(), Ok(OperatorCommand::Adjust(-30)));
        assert_eq!(" +7 ".parse(), Ok(OperatorCommand::Adjust(7)));
        assert!("+ten".parse::<OperatorCommand>().is_err());
    }

    #[test]
    fn empty_line_toggles() {
        assert_eq!("".parse(), Ok(OperatorCommand::Toggle));
        assert_eq!("toggle".parse(), Ok(OperatorCommand::Toggle));
    }

    #[test]
    fn jump_keeps_full_name() {
        assert_eq!(
            "jump Game 2 Q 1".parse(),
            Ok(OperatorCommand::Jump("Game 2 Q 1".to_string()))
        );
        assert!("jump".parse::<OperatorCommand>().is_err());
    }

    #[test]
    fn rejects_unknown_words_and_stray_arguments() {
        assert!("dance".parse::<OperatorCommand>().is_err());
        assert!("pause now".parse::<OperatorCommand>().is_err());
        assert_eq!("QUIT".parse(), Ok(OperatorCommand::Quit));
    }

    #[test]
    fn apply_routes_to_driver() {
        let now = Instant::now();
        let mut driver = ClockDriver::from_config(&Config {
            schedule: ScheduleConfig {
                num_games: 1,
                play_times: vec![1],
                break_times: vec![],
                ..ScheduleConfig::default()
            },
            ..Config::default()
        });
        let events = apply(&mut driver, OperatorCommand::Start, now);
        assert!(matches!(events[0], Event::ClockStarted { .. }));

        // Gametime adjustments are locked by default.
        let events = apply(&mut driver, OperatorCommand::Adjust(10), now);
        assert!(events[0].is_rejection());

        let events = apply(&mut driver, OperatorCommand::Pause, now);
        assert!(matches!(events.last(), Some(Event::ClockPaused { .. })));
        assert!(apply(&mut driver, OperatorCommand::Status, now).is_empty());
    }

    #[test]
    fn pips_are_not_printed() {
        let event = Event::Signal {
            full_name: "Game 1 Q 1".to_string(),
            signal: Signal::HooterPip { time_left: 3 },
            at: chrono::Utc::now(),
        };
        assert_eq!(describe(&event), None);
    }
}
