use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::dispatch::{Dispatch, DispatchTx};
use crate::error::CommandError;

/// A user request typed on stdin. Playlist positions are zero-based here;
/// the prompt shows and accepts them one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a file, folder or URI.
    Add(String),
    /// Import an album from the remote catalog by its id.
    Import(String),
    /// Play the given entry, or resume / start the selection.
    Play(Option<usize>),
    Toggle,
    Next,
    Prev,
    /// Seek to a position in whole seconds.
    Seek(u64),
    /// Seek to a share of the track, 0 to 100.
    SeekPercent(u8),
    Select(usize),
    Remove(usize),
    List,
    /// Replace the playlist with a saved one.
    Open(PathBuf),
    /// Save the playlist, to the configured file when no path is given.
    Save(Option<PathBuf>),
    Stop,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  add <path|uri>   add a file, folder or stream
  import <album>   add an album from the catalog
  play [n]         play entry n, or the selection
  pause, p         toggle play/pause
  stop             stop playback
  next, n          select the next entry
  prev             restart, or select the previous entry
  seek <s|m:ss|n%> jump within the current track
  select <n>       select entry n
  remove <n>       remove entry n
  list, ls         show the playlist
  open <file>      load a saved playlist
  save [file]      save the playlist
  quit, q          leave";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    let cmd = match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Command::Add(required(arg, "add")?.to_string()),
        "import" => Command::Import(required(arg, "import")?.to_string()),
        "play" => Command::Play(arg.map(parse_position).transpose()?),
        "pause" | "toggle" | "p" => Command::Toggle,
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,
        "seek" => parse_seek(required(arg, "seek")?)?,
        "select" | "sel" => Command::Select(parse_position(required(arg, "select")?)?),
        "remove" | "rm" => Command::Remove(parse_position(required(arg, "remove")?)?),
        "list" | "ls" => Command::List,
        "open" => Command::Open(PathBuf::from(required(arg, "open")?)),
        "save" => Command::Save(arg.map(PathBuf::from)),
        "stop" => Command::Stop,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn required<'a>(arg: Option<&'a str>, command: &'static str) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument(command))
}

fn parse_number(s: &str) -> Result<u64, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

/// One-based position to zero-based index.
fn parse_position(s: &str) -> Result<usize, CommandError> {
    let n: usize = s
        .parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))?;
    n.checked_sub(1).ok_or(CommandError::ZeroIndex)
}

fn parse_seek(s: &str) -> Result<Command, CommandError> {
    match s.strip_suffix('%') {
        Some(pct) => match parse_number(pct.trim())? {
            n @ 0..=100 => Ok(Command::SeekPercent(n as u8)),
            _ => Err(CommandError::InvalidNumber(s.to_string())),
        },
        None => Ok(Command::Seek(parse_clock(s)?)),
    }
}

/// `90`, `1:30` and `1:01:30` are all accepted.
fn parse_clock(s: &str) -> Result<u64, CommandError> {
    s.split(':').try_fold(0u64, |acc, part| {
        let n = parse_number(part)?;
        Ok(acc.saturating_mul(60).saturating_add(n))
    })
}

/// Read commands from stdin until EOF. EOF counts as `quit`.
pub fn spawn_input_thread(tx: DispatchTx) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            };
            match parse_command(&line) {
                Ok(Some(cmd)) => {
                    let quit = cmd == Command::Quit;
                    if tx.send(Dispatch::Command(cmd)).is_err() || quit {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{e} (try 'help')"),
            }
        }
        debug!("input closed");
        let _ = tx.send(Dispatch::Command(Command::Quit));
    })
}
