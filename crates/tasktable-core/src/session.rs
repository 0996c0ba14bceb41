use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::board::Board;
use crate::edit::{CommitOutcome, EditKey};
use crate::filter::FilterMode;
use crate::render::Renderer;
use crate::task::TaskField;

const HELP: &str = "\
commands:
  list                      show the board
  filter <all|active|completed>
  add                       open the new-task form
  set <field> <value>       fill a form field (description, status, deadline)
  submit                    create the task from the form
  close                     close the form
  delete <id>               delete a task
  edit <id> <field>         start editing a cell
  type <value>              replace the value being edited
  enter | esc | blur        save, discard, or leave the edited cell
  help | quit";

/// One user event read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Filter(FilterMode),
    OpenForm,
    SetField(TaskField, String),
    Submit,
    CloseForm,
    Delete(u64),
    Edit(u64, TaskField),
    Type(String),
    Key(EditKey),
    Blur,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let untrimmed = line.trim_start().trim_end_matches(['\r', '\n']);
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "filter" => Command::Filter(rest.parse()?),
            "add" | "new" => Command::OpenForm,
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(f, v)| (f, v.trim()));
                Command::SetField(field.parse()?, value.to_string())
            }
            "submit" => Command::Submit,
            "close" => Command::CloseForm,
            "delete" | "rm" => Command::Delete(parse_id(rest)?),
            "edit" => {
                let mut parts = rest.split_whitespace();
                let id = parse_id(parts.next().unwrap_or_default())?;
                let field = parts
                    .next()
                    .ok_or_else(|| anyhow!("edit needs a field"))?
                    .parse()?;
                Command::Edit(id, field)
            }
            "type" => {
                // Edited text keeps its surrounding spaces; trimming is the commit's job.
                let raw = untrimmed.get(word.len()..).unwrap_or_default();
                let value = raw.strip_prefix(char::is_whitespace).unwrap_or(raw);
                Command::Type(value.to_string())
            }
            "enter" => Command::Key(EditKey::Confirm),
            "esc" | "escape" => Command::Key(EditKey::Cancel),
            "blur" => Command::Blur,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

fn parse_id(raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid task id: {raw:?}"))
}

/// Reads commands line by line, applying each to `board` before reading the
/// next. Stops at end of input or `quit`.
#[tracing::instrument(skip_all)]
pub fn run_session<R: BufRead, W: Write>(
    board: &mut Board,
    renderer: &Renderer,
    input: R,
    mut out: W,
    today: NaiveDate,
) -> anyhow::Result<()> {
    renderer.render_board(&mut out, board, today)?;

    for line in input.lines() {
        let line = line.context("failed reading command input")?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                warn!(line = %line, error = %err, "rejected command");
                writeln!(out, "error: {err:#}")?;
                continue;
            }
        };
        debug!(?command, "handling command");

        if command == Command::Quit {
            break;
        }
        if command == Command::Help {
            writeln!(out, "{HELP}")?;
            continue;
        }

        apply(board, command, &mut out)?;
        renderer.render_board(&mut out, board, today)?;
        renderer.render_form(&mut out, board)?;
    }

    out.flush()?;
    Ok(())
}

fn apply<W: Write>(board: &mut Board, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::List | Command::Help | Command::Quit => {}
        Command::Filter(mode) => board.set_filter(mode),
        Command::OpenForm => board.open_form(),
        Command::SetField(field, value) => {
            if board.form().is_open() {
                board.change_form(field, value);
            } else {
                writeln!(out, "the new-task form is not open")?;
            }
        }
        Command::Submit => {
            if !board.form().is_open() {
                writeln!(out, "the new-task form is not open")?;
            } else {
                match board.submit_form() {
                    Ok(Some(task)) => writeln!(out, "added task {}", task.id)?,
                    Ok(None) => {}
                    Err(err) => {
                        warn!(error = %err, "task not created");
                        writeln!(out, "error: {err:#}")?;
                    }
                }
            }
        }
        Command::CloseForm => board.close_form(),
        Command::Delete(id) => match board.delete(id) {
            Some(task) => writeln!(out, "deleted task {}", task.id)?,
            None => writeln!(out, "no task {id}")?,
        },
        Command::Edit(id, field) => {
            if !board.start_editing(id, field) {
                writeln!(out, "no task {id}")?;
            }
        }
        Command::Type(value) => board.change_value(value),
        Command::Key(key) => report(out, &board.handle_key(key))?,
        Command::Blur => report(out, &board.blur())?,
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, outcome: &CommitOutcome) -> anyhow::Result<()> {
    if let Some(message) = outcome.message() {
        writeln!(out, "{message}")?;
    }
    Ok(())
}
