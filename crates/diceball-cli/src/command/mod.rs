use clap::{Parser, Subcommand};

use self::{bats::BatsArg, play::PlayArg};

mod bats;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play at-bats interactively (default)
    Play(#[clap(flatten)] PlayArg),
    /// Print B.A.T.S. odds for a pitcher's kept dice as JSON
    Bats(#[clap(flatten)] BatsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Bats(arg) => bats::run(&arg)?,
    }
    Ok(())
}
