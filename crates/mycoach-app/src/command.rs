//! Parsing of chat-loop input lines.
//!
//! Lines starting with `/` are commands; anything else is sent to the
//! coach. Plan and habit commands take 1-based positions as shown by
//! `/plan` and `/stats`.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    /// Attach an image, with optional accompanying text.
    Image { path: PathBuf, text: String },
    ConfirmPlan,
    ShowPlan,
    Done(usize),
    Undo(usize),
    AddHabit(String),
    CheckHabit(usize),
    DeleteHabit(usize),
    Weight(f64),
    Target(f64),
    Stats,
    Motivate,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  /confirm             add the proposed plan to your dashboard
  /plan                show today's plan
  /done N, /undo N     mark plan task N complete or not
  /habit add TITLE     start tracking a habit
  /habit check N       toggle today's check-in for habit N
  /habit delete N      stop tracking habit N
  /weight KG           log today's weight
  /target KG           set the target weight
  /image PATH [TEXT]   send a photo to the coach
  /stats               dashboard summary
  /motivate            a quick push
  /reset               erase all data
  /quit";

impl Command {
    /// Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> eyre::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Chat(line.to_string())));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "confirm" => Self::ConfirmPlan,
            "plan" => Self::ShowPlan,
            "done" => Self::Done(position(args)?),
            "undo" => Self::Undo(position(args)?),
            "habit" => parse_habit(args)?,
            "weight" => Self::Weight(weight(args)?),
            "target" => Self::Target(weight(args)?),
            "image" => parse_image(args)?,
            "stats" => Self::Stats,
            "motivate" => Self::Motivate,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(eyre::eyre!("unknown command /{other}, try /help")),
        };
        Ok(Some(command))
    }
}

fn parse_habit(args: &str) -> eyre::Result<Command> {
    let (action, rest) = match args.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim()),
        None => (args, ""),
    };

    match action {
        "add" if !rest.is_empty() => Ok(Command::AddHabit(rest.to_string())),
        "add" => Err(eyre::eyre!("usage: /habit add TITLE")),
        "check" => Ok(Command::CheckHabit(position(rest)?)),
        "delete" | "rm" => Ok(Command::DeleteHabit(position(rest)?)),
        _ => Err(eyre::eyre!("usage: /habit add|check|delete ...")),
    }
}

fn parse_image(args: &str) -> eyre::Result<Command> {
    let (path, text) = match args.split_once(char::is_whitespace) {
        Some((path, text)) => (path, text.trim()),
        None => (args, ""),
    };
    if path.is_empty() {
        return Err(eyre::eyre!("usage: /image PATH [TEXT]"));
    }
    Ok(Command::Image {
        path: PathBuf::from(path),
        text: text.to_string(),
    })
}

/// The item at a 1-based `position`, or `None` when it is 0 or past the end.
pub fn nth<T>(items: &[T], position: usize) -> Option<&T> {
    position.checked_sub(1).and_then(|i| items.get(i))
}

fn position(arg: &str) -> eyre::Result<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(eyre::eyre!("expected a position starting at 1, got {arg:?}")),
    }
}

fn weight(arg: &str) -> eyre::Result<f64> {
    match arg.parse::<f64>() {
        Ok(w) if w.is_finite() && w > 0.0 => Ok(w),
        _ => Err(eyre::eyre!("expected a positive weight, got {arg:?}")),
    }
}
