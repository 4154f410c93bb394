use std::{
    cell::RefCell,
    io::{self, BufRead},
};

use anyhow::Context;
use diceball_engine::{
    AtBat, AtBatConfig, AtBatOutcome, DiceSeed, PitcherDecider, PowerTable, RandomDice,
};

use crate::{console::Console, render};

use self::human::{CpuPitcher, HumanHitter, HumanPitcher};

mod human;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Let the automated pitcher throw against you
    #[clap(long)]
    cpu: bool,
    /// Dice the pitcher rolls each pitch (4 to 7)
    #[clap(long, default_value_t = 5)]
    pool_size: usize,
    /// Seed for the dice, as 32 hex digits (random when omitted)
    #[clap(long)]
    seed: Option<DiceSeed>,
    /// Dice the pitcher may re-roll over a whole at-bat (unlimited when omitted)
    #[clap(long)]
    reroll_budget: Option<usize>,
    /// Power table: tiered or hitsonly
    #[clap(long, default_value = "tiered")]
    power_table: PowerTable,
}

impl Default for PlayArg {
    fn default() -> Self {
        let config = AtBatConfig::default();
        Self {
            cpu: false,
            pool_size: config.pool_size(),
            seed: None,
            reroll_budget: config.reroll_budget(),
            power_table: config.power_table(),
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        cpu,
        pool_size,
        seed,
        reroll_budget,
        power_table,
    } = arg;

    let config = AtBatConfig::new(*pool_size)
        .context("Invalid --pool-size")?
        .with_reroll_budget(*reroll_budget)
        .with_power_table(*power_table);
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!(%seed, ?config, cpu, "starting session");

    let console = RefCell::new(Console::stdio());
    run_session(config, *cpu, seed, &console)
}

fn run_session<R, W>(
    config: AtBatConfig,
    cpu: bool,
    seed: DiceSeed,
    console: &RefCell<Console<R, W>>,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: io::Write,
{
    console.borrow_mut().say(format_args!(
        "Welcome to Diceball! (dice seed {seed}, replay with --seed {seed})"
    ));
    let mut dice = RandomDice::with_seed(seed);
    loop {
        play_at_bat(config, cpu, &mut dice, console)?;

        let mut console = console.borrow_mut();
        let again = console.choose(
            "\nPlay another at-bat? [y]es or [n]o: ",
            &[("y", true), ("yes", true), ("n", false), ("no", false)],
        );
        console.check().context("Failed to read from the terminal")?;
        if again != Some(true) {
            console.say("Thanks for playing!");
            return console.check().context("Failed to write to the terminal");
        }
    }
}

fn play_at_bat<R, W>(
    config: AtBatConfig,
    cpu: bool,
    dice: &mut RandomDice,
    console: &RefCell<Console<R, W>>,
) -> anyhow::Result<AtBatOutcome>
where
    R: BufRead,
    W: io::Write,
{
    let mut at_bat = AtBat::with_dice(config, dice);
    let mut hitter = HumanHitter::new(console);
    let mut pitcher: Box<dyn PitcherDecider + '_> = if cpu {
        Box::new(CpuPitcher::new(console))
    } else {
        Box::new(HumanPitcher::new(console))
    };

    {
        let mut console = console.borrow_mut();
        console.say("\n=== NEW AT-BAT ===");
        console.say(format_args!(
            "Pitcher rolls {} dice per pitch; three of them must form the committed pitch.",
            config.pool_size()
        ));
        if let Some(budget) = config.reroll_budget() {
            console.say(format_args!("Pitcher may re-roll {budget} dice this at-bat."));
        }
    }

    loop {
        {
            let mut console = console.borrow_mut();
            console.start_pitch();
            console.say(format_args!(
                "\n--- NEW PITCH --- COUNT: {} ---",
                at_bat.count()
            ));
            if let Some(line) = render::streak_line(at_bat.streak()) {
                console.say(line);
            }
        }

        let report = at_bat.play_pitch(&mut pitcher, &mut hitter)?;
        let mut console = console.borrow_mut();
        console.check().context("Failed to read from the terminal")?;
        console.say(render::Reveal(&report));

        if let Some(outcome) = report.outcome {
            console.say(format_args!("\n=== AT-BAT OVER: {outcome} ==="));
            console.check().context("Failed to write to the terminal")?;
            return Ok(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::tests::{console, printed};

    fn seed() -> DiceSeed {
        "000102030405060708090a0b0c0d0e0f".parse().unwrap()
    }

    #[test]
    fn test_cpu_at_bat_with_takes_ends_in_walk_or_strikeout() {
        let input = "t\n".repeat(6);
        let console = RefCell::new(console(&input));
        let mut dice = RandomDice::with_seed(seed());
        let outcome =
            play_at_bat(AtBatConfig::default(), true, &mut dice, &console).unwrap();
        assert!(matches!(outcome, AtBatOutcome::Walk | AtBatOutcome::Strikeout));

        let output = printed(&console.borrow());
        assert!(output.contains("--- NEW PITCH --- COUNT: 0-0 ---"));
        assert!(output.contains("--- REVEAL! ---"));
        assert!(output.contains("AT-BAT OVER"));
        assert_eq!(
            output.matches("Pitcher rolls the dice:").count(),
            output.matches("--- NEW PITCH ---").count()
        );
    }

    #[test]
    fn test_session_ends_when_declined() {
        let input = format!("{}n\n", "t\n".repeat(6));
        let console = RefCell::new(console(&input));
        run_session(AtBatConfig::default(), true, seed(), &console).unwrap();
        let output = printed(&console.borrow());
        assert!(output.contains("dice seed 000102030405060708090a0b0c0d0e0f"));
        assert!(output.ends_with("Thanks for playing!\n"));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let console = RefCell::new(console(""));
        let mut dice = RandomDice::with_seed(seed());
        let result = play_at_bat(AtBatConfig::default(), true, &mut dice, &console);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_arg_matches_default_config() {
        let arg = PlayArg::default();
        assert_eq!(arg.pool_size, AtBatConfig::default().pool_size());
        assert!(!arg.cpu);
    }
}
