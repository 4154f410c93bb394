use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, ensure};
use diceball_engine::{
    AtBatConfig, DicePool, PitchCategory, PitchType, PowerTable, SitCommitment, Streak,
    SwingArchetype,
};
use diceball_evaluator::bats::{self, BatsQuery, BatsReport};
use serde::Serialize;

use crate::render::BatsTable;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatsArg {
    /// Dice the pitcher keeps, comma separated (e.g. `3,3,5`)
    #[clap(long, value_delimiter = ',')]
    kept: Vec<u8>,
    /// Number of dice the pitcher re-rolls
    #[clap(long, default_value_t = 0)]
    reroll: usize,
    /// Swing archetype: power, contact or balanced
    #[clap(long, default_value = "balanced")]
    swing: SwingArchetype,
    /// Pitch the hitter is sitting on (FB, CB, CU or the full name)
    #[clap(long, value_parser = parse_pitch)]
    sit: Option<PitchType>,
    /// Treat the sit as shifted after the pitcher's roll
    #[clap(long, requires = "sit")]
    shifted: bool,
    /// Bonus dice earned by taking pitches
    #[clap(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    bonus_dice: u8,
    /// Category of the pitcher's current streak: fastball or offspeed
    #[clap(long)]
    streak_category: Option<PitchCategory>,
    /// Length of the pitcher's current streak
    #[clap(long, requires = "streak_category")]
    streak_length: Option<u32>,
    /// Power table: tiered or hitsonly
    #[clap(long, default_value = "tiered")]
    power_table: PowerTable,
    /// Write the JSON report to this file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
    /// Also print the odds as a table on stderr
    #[clap(long)]
    table: bool,
}

#[derive(Debug, Serialize)]
struct BatsOutput<'a> {
    query: &'a BatsQuery,
    report: &'a BatsReport,
}

fn parse_pitch(s: &str) -> Result<PitchType, String> {
    PitchType::from_code(s)
        .map_or_else(|| s.parse::<PitchType>().map_err(|e| e.to_string()), Ok)
}

fn build_query(arg: &BatsArg) -> anyhow::Result<BatsQuery> {
    let kept = DicePool::from_values(&arg.kept).context("Invalid --kept dice")?;
    ensure!(
        kept.len() + arg.reroll <= AtBatConfig::MAX_POOL_SIZE,
        "kept and re-rolled dice exceed the largest pool ({} > {})",
        kept.len() + arg.reroll,
        AtBatConfig::MAX_POOL_SIZE
    );
    let sit = arg.sit.map(|guess| {
        let sit = SitCommitment::hard(guess);
        if arg.shifted { sit.shifted(guess) } else { sit }
    });
    let streak = arg
        .streak_category
        .map_or_else(Streak::new, |category| {
            Streak::with(category, arg.streak_length.unwrap_or(0))
        });

    Ok(BatsQuery {
        kept,
        reroll_count: arg.reroll,
        swing: arg.swing,
        sit,
        bonus_dice: arg.bonus_dice,
        streak,
        power_table: arg.power_table,
    })
}

pub(crate) fn run(arg: &BatsArg) -> anyhow::Result<()> {
    let query = build_query(arg)?;
    let report = bats::calculate(&query);
    if arg.table {
        eprintln!("{}", BatsTable(&report));
    }
    save_json(
        &BatsOutput {
            query: &query,
            report: &report,
        },
        arg.output.as_deref(),
    )
}

fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    let target = path.map_or_else(|| "stdout".to_owned(), |p| p.display().to_string());
    let writer: Box<dyn io::Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {target}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    write_json(writer, value).with_context(|| format!("Failed to write JSON to {target}"))?;
    tracing::debug!(path = %target, "wrote JSON report");
    Ok(())
}

fn write_json<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: io::Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        arg: BatsArg,
    }

    fn parse(args: &[&str]) -> BatsArg {
        Cli::try_parse_from(std::iter::once("bats").chain(args.iter().copied()))
            .unwrap()
            .arg
    }

    #[test]
    fn test_build_query_from_flags() {
        let arg = parse(&[
            "--kept",
            "3,3",
            "--reroll",
            "1",
            "--swing",
            "power",
            "--sit",
            "fb",
            "--shifted",
            "--streak-category",
            "offspeed",
            "--streak-length",
            "2",
        ]);
        let query = build_query(&arg).unwrap();
        assert_eq!(query.kept, DicePool::from_values(&[3, 3]).unwrap());
        assert_eq!(query.reroll_count, 1);
        assert_eq!(query.swing, SwingArchetype::Power);
        assert_eq!(
            query.sit,
            Some(SitCommitment::hard(PitchType::Fastball).shifted(PitchType::Fastball))
        );
        assert_eq!(query.streak, Streak::with(PitchCategory::Offspeed, 2));
        assert_eq!(query.power_table, PowerTable::Tiered);
    }

    #[test]
    fn test_sit_accepts_pitch_names() {
        let arg = parse(&["--sit", "Changeup"]);
        assert_eq!(arg.sit, Some(PitchType::Changeup));
    }

    #[test]
    fn test_too_many_dice_rejected() {
        let arg = parse(&["--kept", "1,2,3,4,5", "--reroll", "3"]);
        assert!(build_query(&arg).is_err());
    }

    #[test]
    fn test_more_dice_than_a_pool_holds_rejected() {
        let arg = parse(&["--kept", "1,1,1,1,1,1,1,1,1"]);
        let err = build_query(&arg).unwrap_err();
        assert!(format!("{err:#}").contains("at most 8 dice"));
    }

    #[test]
    fn test_invalid_die_rejected() {
        let arg = parse(&["--kept", "2,7"]);
        assert!(build_query(&arg).is_err());
    }

    #[test]
    fn test_bonus_dice_range() {
        assert!(Cli::try_parse_from(["bats", "--bonus-dice", "2"]).is_err());
    }

    #[test]
    fn test_streak_length_requires_category() {
        assert!(Cli::try_parse_from(["bats", "--streak-length", "2"]).is_err());
        let arg = parse(&["--streak-category", "fastball"]);
        assert_eq!(
            build_query(&arg).unwrap().streak,
            Streak::with(PitchCategory::Fastball, 0)
        );
    }

    #[test]
    fn test_report_serializes_with_query() {
        let arg = parse(&["--kept", "4,4,4"]);
        let query = build_query(&arg).unwrap();
        let report = bats::calculate(&query);
        let json = serde_json::to_value(BatsOutput {
            query: &query,
            report: &report,
        })
        .unwrap();
        assert_eq!(json["query"]["kept"], serde_json::json!([4, 4, 4]));
        assert!(json["report"]["entries"].as_array().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_write_json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({ "kept": [4, 4, 4] })).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"kept\""));
    }
}
