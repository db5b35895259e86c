//! Terminal host for the place picker.
//!
//! # Responsibility
//! - Drive `placepicker_core` with the real clock from line-based commands.
//! - Keep `--probe` output deterministic for quick linkage checks.

use clap::Parser;
use log::info;
use placepicker_core::{
    init_logging_from_config, Coordinates, FixedLocation, GeolocationProvider, KeyValueStore,
    NoLocation, Place, PickerConfig, PlaceCatalog, PlaceId, PlacePicker, SelectionRepository,
    SelectionService, SqliteKeyValueStore, TimerQueue,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

const BAR_WIDTH: usize = 30;
const IDLE_WAIT: Duration = Duration::from_millis(500);

const HELP: &str = "commands:
  list            available places (nearest first when --at is given)
  picked          picked places
  pick <id>       add a place
  remove <id>     start the timed removal of a picked place
  keep            cancel the pending removal
  confirm         remove now
  close           close the removal dialog without deciding
  help            show this text
  quit            exit";

/// Pick places and remove them through a timed confirmation.
#[derive(Debug, PartialEq, Parser)]
#[command(name = "placepicker")]
#[command(version)]
struct CliArgs {
    /// Print core ping/version and exit
    #[arg(long)]
    probe: bool,

    /// Current position; places are listed nearest first
    #[arg(
        long,
        value_name = "LAT,LON",
        allow_hyphen_values = true,
        value_parser = Coordinates::from_str
    )]
    at: Option<Coordinates>,

    /// SQLite file holding the selection (overrides PLACEPICKER_DB_PATH)
    #[arg(long = "db", value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Picked,
    Pick(PlaceId),
    Remove(PlaceId),
    Keep,
    Confirm,
    Close,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let mut place_arg = || -> Result<PlaceId, String> {
            let raw = words
                .next()
                .ok_or_else(|| format!("`{verb}` needs a place id"))?;
            PlaceId::parse(raw).map_err(|err| err.to_string())
        };

        let command = match verb {
            "list" | "ls" => Self::List,
            "picked" => Self::Picked,
            "pick" => Self::Pick(place_arg()?),
            "remove" | "rm" => Self::Remove(place_arg()?),
            "keep" | "cancel" => Self::Keep,
            "confirm" | "yes" => Self::Confirm,
            "close" => Self::Close,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command `{other}`; try `help`")),
        };
        Ok(Some(command))
    }
}

fn main() -> ExitCode {
    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CliArgs) -> Result<(), String> {
    if cli.probe {
        println!("placepicker_core ping={}", placepicker_core::ping());
        println!("placepicker_core version={}", placepicker_core::core_version());
        return Ok(());
    }

    let mut config = PickerConfig::from_env().map_err(|err| err.to_string())?;
    if cli.db_path.is_some() {
        config.db_path = cli.db_path;
    }
    init_logging_from_config(&config)?;

    let store = match &config.db_path {
        Some(path) => SqliteKeyValueStore::open(path),
        None => SqliteKeyValueStore::in_memory(),
    }
    .map_err(|err| format!("cannot open selection store: {err}"))?;

    let timers = TimerQueue::system();
    let mut picker = PlacePicker::new(
        PlaceCatalog::builtin().clone(),
        SelectionService::new(SelectionRepository::with_key(
            store,
            config.storage_key.as_str(),
        )),
        timers.clone(),
        &config.decision,
    );
    let location: Box<dyn GeolocationProvider> = match cli.at {
        Some(coords) => Box::new(FixedLocation(coords)),
        None => Box::new(NoLocation),
    };
    picker.start(location.as_ref()).map_err(|err| err.to_string())?;

    println!("{HELP}");
    print_places("available", &picker.available_places());
    print_places("picked", &picker.picked_places());

    let commands = spawn_line_reader();
    event_loop(&mut picker, &timers, &commands)?;
    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn event_loop<S: KeyValueStore>(
    picker: &mut PlacePicker<S>,
    timers: &TimerQueue,
    commands: &Receiver<String>,
) -> Result<(), String> {
    let mut last_bar = String::new();
    loop {
        let wait = timers
            .next_due()
            .map(|due| Duration::from_millis(due.saturating_sub(timers.now())))
            .unwrap_or(IDLE_WAIT);

        match commands.recv_timeout(wait) {
            Ok(line) => match Command::parse(&line) {
                Ok(Some(Command::Quit)) => return Ok(()),
                Ok(Some(command)) => {
                    last_bar.clear();
                    execute(picker, command)?;
                }
                Ok(None) => {}
                Err(message) => println!("{message}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        let tick = picker.poll().map_err(|err| err.to_string())?;
        if let Some(removed) = tick.removed {
            println!("\nremoved {removed}");
            last_bar.clear();
        }
        if let (Some(progress), Some(target)) = (tick.progress, picker.removal_target()) {
            let bar = format!("removing {target} {}", progress.render_bar(BAR_WIDTH));
            if bar != last_bar {
                draw_bar(&mut io::stdout(), &bar)
                    .map_err(|err| format!("cannot write to terminal: {err}"))?;
                last_bar = bar;
            }
        }
    }
}

fn execute<S: KeyValueStore>(picker: &mut PlacePicker<S>, command: Command) -> Result<(), String> {
    match command {
        Command::List => print_places("available", &picker.available_places()),
        Command::Picked => print_places("picked", &picker.picked_places()),
        Command::Pick(id) => match picker.select_place(&id) {
            Ok(true) => println!("picked {id}"),
            Ok(false) => println!("{id} is already picked"),
            Err(err) => println!("{err}"),
        },
        Command::Remove(id) => match picker.start_removal(&id) {
            Ok(()) => println!("`keep` to cancel, `confirm` to remove now"),
            Err(err) => println!("{err}"),
        },
        Command::Keep => {
            if picker.stop_removal() {
                println!("\nkept");
            } else {
                println!("nothing to keep");
            }
        }
        Command::Confirm => match picker.confirm_removal().map_err(|err| err.to_string())? {
            Some(id) => println!("\nremoved {id}"),
            None => println!("nothing to confirm"),
        },
        Command::Close => {
            picker.dismiss_removal();
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Redraws the progress line in place.
fn draw_bar(out: &mut impl Write, bar: &str) -> io::Result<()> {
    write!(out, "\r{bar} ")?;
    out.flush()
}

fn print_places(label: &str, places: &[&Place]) {
    println!("{label} ({}):", places.len());
    for place in places {
        println!("  {:<4} {}", place.id, place.title);
    }
}

fn spawn_line_reader() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::{draw_bar, CliArgs, Command};
    use clap::Parser;
    use placepicker_core::{Coordinates, PlaceId};
    use std::io::{self, Write};

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn parses_position_and_db_path() {
        let parsed =
            CliArgs::try_parse_from(["placepicker", "--at", "48.85,2.35", "--db", "/tmp/p.sqlite3"])
                .unwrap();
        assert_eq!(
            parsed,
            CliArgs {
                probe: false,
                at: Some(Coordinates::new(48.85, 2.35).unwrap()),
                db_path: Some("/tmp/p.sqlite3".into()),
            }
        );
    }

    #[test]
    fn accepts_southern_and_western_positions() {
        let parsed = CliArgs::try_parse_from(["placepicker", "--at", "-33.86,-70.65"]).unwrap();
        assert_eq!(parsed.at, Some(Coordinates::new(-33.86, -70.65).unwrap()));
    }

    #[test]
    fn probe_flag_needs_no_other_arguments() {
        let parsed = CliArgs::try_parse_from(["placepicker", "--probe"]).unwrap();
        assert!(parsed.probe);
        assert_eq!(parsed.at, None);
        assert_eq!(parsed.db_path, None);
    }

    #[test]
    fn rejects_missing_values_bad_positions_and_unknown_flags() {
        assert!(CliArgs::try_parse_from(["placepicker", "--at"]).is_err());
        assert!(CliArgs::try_parse_from(["placepicker", "--at", "north"]).is_err());
        assert!(CliArgs::try_parse_from(["placepicker", "--at", "95,0"]).is_err());
        assert!(CliArgs::try_parse_from(["placepicker", "--verbose"]).is_err());
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("pick p3").unwrap(),
            Some(Command::Pick(PlaceId::parse("p3").unwrap()))
        );
        assert_eq!(Command::parse("keep").unwrap(), Some(Command::Keep));
        assert!(Command::parse("remove").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn bar_is_drawn_over_the_current_line() {
        let mut out = Vec::new();
        draw_bar(&mut out, "removing p1 [##..]  50%").unwrap();
        assert_eq!(out, b"\rremoving p1 [##..]  50% ");
    }

    #[test]
    fn flush_failure_is_reported() {
        let err = draw_bar(&mut ClosedTerminal, "removing p1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
