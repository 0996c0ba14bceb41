pub mod board;
pub mod cli;
pub mod config;
pub mod datetime;
pub mod edit;
pub mod filter;
pub mod form;
pub mod loader;
pub mod render;
pub mod session;
pub mod store;
pub mod task;
pub mod validate;

use std::ffi::OsString;
use std::fs::File;
use std::io::{
  self,
  BufReader
};

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tasktable"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  debug!(files = ?cfg.loaded_files, "configuration ready");

  let initial =
    match config::resolve_tasks_file(
      &cfg,
      cli.tasks.as_deref()
    )? {
      | Some(path) => {
        loader::load_tasks(&path)?
      }
      | None => vec![]
    };

  let store = store::TaskStore::from_tasks(
    initial,
    cfg.id_strategy()?
  )
  .context(
    "initial tasks are inconsistent"
  )?;
  let mut board =
    board::Board::new(store);
  let renderer =
    render::Renderer::new(&cfg)?;
  let today = datetime::today();

  let stdout = io::stdout().lock();
  match cli.script {
    | Some(path) => {
      let file = File::open(&path)
        .with_context(|| {
          format!(
            "failed to open script {}",
            path.display()
          )
        })?;
      session::run_session(
        &mut board,
        &renderer,
        BufReader::new(file),
        stdout,
        today
      )?;
    }
    | None => {
      session::run_session(
        &mut board,
        &renderer,
        io::stdin().lock(),
        stdout,
        today
      )?;
    }
  }

  info!(
    tasks = board.tasks().len(),
    "done"
  );
  Ok(())
}
