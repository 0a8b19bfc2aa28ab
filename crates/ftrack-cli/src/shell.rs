//! Interactive front end: a line-oriented shell over the tracker.
//!
//! Every command maps to the same [`Action`]s the one-shot command line
//! uses. Rows of the last listing can be addressed by number, so
//! `open 2` opens the second row; write `./2` for a folder named `2`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use ftrack_core::{PathRecord, SortKey};
use ftrack_shell::{Launcher, PathProbe, Tracker};

use crate::action::{execute, Action, Reply};
use crate::format::{format_records, OutputFormat};

const PROMPT: &str = "ftrack> ";

const HELP: &str = "\
commands:
  ls [frequency|recency|path] [asc|desc]   show history (pinned first)
  sort                                     switch between frequency and recency
  open [row|path]                          open a folder and record the visit
                                           (no argument: the folder opened last)
  visit <row|path>                         record a visit without opening
  pin <row|path> / unpin <row|path>        keep a folder at the top
  rm <row|path>                            delete a record (asks first)
  clear                                    delete all records (asks first)
  prune                                    delete records of vanished folders
  import <file>                            merge an old history database
  help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Run(Action),
    Confirm(Action, String),
    SetSort(Option<SortKey>, Option<bool>),
    ToggleSort,
    Help,
    Quit,
    Nothing,
}

struct Session {
    sort: SortKey,
    descending: bool,
    last_view: Vec<PathRecord>,
}

impl Session {
    fn list_action(&self) -> Action {
        Action::List {
            sort: self.sort,
            descending: self.descending,
        }
    }

    /// A row number from the last listing, or the text as a path.
    fn target(&self, arg: &str) -> Result<String, String> {
        if arg.is_empty() {
            return Err("missing row number or path".to_string());
        }
        match arg.parse::<usize>() {
            Ok(n) => self
                .last_view
                .get(n.wrapping_sub(1))
                .map(|r| r.path.clone())
                .ok_or_else(|| format!("no row {n} in the last listing")),
            Err(_) => Ok(arg.to_string()),
        }
    }

    fn parse(&self, line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "" => Command::Nothing,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "sort" => Command::ToggleSort,
            "ls" | "list" => {
                let mut sort = None;
                let mut descending = None;
                for arg in rest.split_whitespace() {
                    match arg.to_ascii_lowercase().as_str() {
                        "asc" => descending = Some(false),
                        "desc" => descending = Some(true),
                        other => sort = Some(other.parse::<SortKey>().map_err(|e| e.to_string())?),
                    }
                }
                Command::SetSort(sort, descending)
            }
            "open" | "o" if rest.is_empty() => Command::Run(Action::OpenLast),
            "open" | "o" => Command::Run(Action::Open(self.target(rest)?)),
            "visit" => Command::Run(Action::Visit(self.target(rest)?)),
            "pin" => Command::Run(Action::Pin(self.target(rest)?)),
            "unpin" => Command::Run(Action::Unpin(self.target(rest)?)),
            "rm" | "remove" | "del" => {
                let path = self.target(rest)?;
                let question = format!("delete the record of {path}? [y/N] ");
                Command::Confirm(Action::Remove(path), question)
            }
            "clear" => Command::Confirm(Action::Clear, "delete ALL records? [y/N] ".to_string()),
            "prune" => Command::Run(Action::Prune),
            "import" if !rest.is_empty() => Command::Run(Action::Import(PathBuf::from(rest))),
            "import" => return Err("missing file to import".to_string()),
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails;
/// tracker errors are reported in the session and the shell continues.
pub fn run<P, L, R, W>(tracker: &mut Tracker<P, L>, mut input: R, out: &mut W) -> std::io::Result<()>
where
    P: PathProbe,
    L: Launcher,
    R: BufRead,
    W: Write,
{
    let mut session = Session {
        sort: SortKey::Frequency,
        descending: true,
        last_view: Vec::new(),
    };
    show_listing(tracker, &mut session, out)?;

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let command = match session.parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };

        match command {
            Command::Nothing => {}
            Command::Quit => break,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::ToggleSort => {
                session.sort = session.sort.toggled();
                session.descending = true;
                show_listing(tracker, &mut session, out)?;
            }
            Command::SetSort(sort, descending) => {
                if let Some(sort) = sort {
                    session.sort = sort;
                }
                if let Some(descending) = descending {
                    session.descending = descending;
                }
                show_listing(tracker, &mut session, out)?;
            }
            Command::Confirm(action, question) => {
                write!(out, "{question}")?;
                out.flush()?;
                line.clear();
                input.read_line(&mut line)?;
                if matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                    run_action(tracker, &mut session, action, out)?;
                } else {
                    writeln!(out, "cancelled")?;
                }
            }
            Command::Run(action) => run_action(tracker, &mut session, action, out)?,
        }
    }
    Ok(())
}

fn run_action<P: PathProbe, L: Launcher, W: Write>(
    tracker: &mut Tracker<P, L>,
    session: &mut Session,
    action: Action,
    out: &mut W,
) -> std::io::Result<()> {
    let mutates = action.mutates();
    match execute(tracker, action) {
        Ok(reply) => {
            if let Some(message) = reply.message() {
                writeln!(out, "{message}")?;
            }
            if mutates {
                show_listing(tracker, session, out)?;
            }
        }
        Err(e) => writeln!(out, "error: {e}")?,
    }
    Ok(())
}

fn show_listing<P: PathProbe, L: Launcher, W: Write>(
    tracker: &mut Tracker<P, L>,
    session: &mut Session,
    out: &mut W,
) -> std::io::Result<()> {
    match execute(tracker, session.list_action()) {
        Ok(Reply::Listing(records)) => {
            writeln!(
                out,
                "-- by {} ({}) --",
                session.sort,
                if session.descending { "desc" } else { "asc" }
            )?;
            writeln!(out, "{}", format_records(&records, OutputFormat::Table))?;
            session.last_view = records;
        }
        Ok(_) => {}
        Err(e) => writeln!(out, "error: {e}")?,
    }
    Ok(())
}
