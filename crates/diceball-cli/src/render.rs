use std::fmt;

use diceball_engine::{
    AtBatOutcome, DicePool, HitterAction, PitchReport, PitchResult, SitCommitment, Streak,
    SwingModifiers, SwingOutcome, SwingResolution, SwingSetup,
};
use diceball_evaluator::bats::BatsReport;

const BORDER: &str = "+-------+";

/// Pips for faces 1 to 6, three rows each.
static DICE_ART: [[&str; 3]; 6] = [
    ["|       |", "|   o   |", "|       |"],
    ["| o     |", "|       |", "|     o |"],
    ["| o     |", "|   o   |", "|     o |"],
    ["| o   o |", "|       |", "| o   o |"],
    ["| o   o |", "|   o   |", "| o   o |"],
    ["| o   o |", "| o   o |", "| o   o |"],
];

/// ASCII art of a pool, with 1-based position labels under each die.
pub(crate) struct DiceArt<'a>(pub(crate) &'a DicePool);

impl fmt::Display for DiceArt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(no dice)");
        }
        let faces = self
            .0
            .iter()
            .map(|d| &DICE_ART[usize::from(d.value()) - 1])
            .collect::<Vec<_>>();
        let border = faces
            .iter()
            .map(|_| format!(" {BORDER} "))
            .collect::<String>();

        writeln!(f, "{border}")?;
        for line in 0..3 {
            let row = faces
                .iter()
                .map(|face| format!(" {} ", face[line]))
                .collect::<String>();
            writeln!(f, "{row}")?;
        }
        writeln!(f, "{border}")?;
        let labels = (1..=faces.len())
            .map(|i| {
                let label = format!("({i})");
                format!(" {label:^9} ")
            })
            .collect::<String>();
        f.write_str(&labels)
    }
}

/// One-line summary of the pitcher's streak, if any.
pub(crate) fn streak_line(streak: Streak) -> Option<String> {
    streak
        .category()
        .map(|_| format!("Current Pitcher Streak: {streak}."))
}

fn sit_comment(sit: SitCommitment, modifiers: SwingModifiers) -> String {
    let guess = sit.guess().code();
    if modifiers == SwingModifiers::HARD_SIT_CORRECT {
        format!("Hitter's hard sit on {guess} paid off! BONUS: +2 to every Contact die, +1 Power Die.")
    } else if modifiers == SwingModifiers::SOFT_SIT_CORRECT {
        format!("Hitter successfully shifted their sit to {guess}! BONUS: +1 to every Contact die.")
    } else {
        format!("Hitter sat on {guess}, the wrong pitch! PENALTY: -1 Contact Die, -1 Power Die.")
    }
}

fn swing_comment(outcome: SwingOutcome) -> &'static str {
    match outcome {
        SwingOutcome::HomeRun => "That ball is OBLITERATED! HOME RUN!",
        SwingOutcome::Double => "Smoked into the gap! That's a DOUBLE!",
        SwingOutcome::Single => "A sharp line drive for a SINGLE!",
        SwingOutcome::Out => "A routine grounder to the infield... OUT!",
        SwingOutcome::WeakOut => "A weak pop-up or dribbler... OUT!",
        SwingOutcome::Foul => "FOULED OFF! One die met the difficulty.",
        SwingOutcome::Miss => "Swing and a MISS!",
    }
}

/// What happened on one pitch, as told after both secrets are revealed.
pub(crate) struct Reveal<'a>(pub(crate) &'a PitchReport);

impl Reveal<'_> {
    fn fmt_swing(
        &self,
        f: &mut fmt::Formatter<'_>,
        setup: &SwingSetup,
        resolution: &SwingResolution,
    ) -> fmt::Result {
        if let Some(sit) = self.0.sit {
            writeln!(f, "{}", sit_comment(sit, setup.modifiers))?;
        }
        if let Some(bonus) = setup.bonus {
            writeln!(f, "Hitter adds the bonus die to {bonus}.")?;
        }
        writeln!(
            f,
            "Hitter is swinging with {} Contact Dice and {} Power Dice!",
            resolution.dice.contact, resolution.dice.power
        )?;
        writeln!(
            f,
            "Hitter rolls for Contact... {} (needs {} per die, +{} bonus)",
            resolution.contact_roll, setup.difficulty, setup.modifiers.contact_roll_bonus
        )?;
        if resolution.critical {
            writeln!(
                f,
                "NATURAL 6s! A critical hit, the batter connects no matter the difficulty!"
            )?;
        }
        if let Some(power) = &resolution.power_roll {
            writeln!(f, "CONTACT! The ball is in play!")?;
            writeln!(f, "Hitter rolls for Power... {power} = Sum: {}", power.sum())?;
        }
        writeln!(f, "{}", swing_comment(resolution.outcome))
    }
}

impl fmt::Display for Reveal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let name = report.pitch;
        writeln!(f, "\n--- REVEAL! ---")?;
        writeln!(f, "Pitcher secretly committed to a {name}.")?;
        let decision = match report.action {
            HitterAction::Swing { .. } => "SWING",
            HitterAction::Take | HitterAction::Watch => "NOT SWING",
        };
        writeln!(f, "Hitter chose to {decision}.")?;

        if !report.reroll.ignored.is_empty() {
            let ignored = report.reroll.ignored.iter().map(ToString::to_string);
            writeln!(
                f,
                "Ignoring re-roll positions outside the pool: {}",
                ignored.collect::<Vec<_>>().join(" ")
            )?;
        }
        if !report.reroll.over_budget.is_empty() {
            writeln!(
                f,
                "Re-roll budget exhausted, keeping {} more dice.",
                report.reroll.over_budget.len()
            )?;
        }
        if !report.reroll.is_empty() {
            writeln!(f, "\nPitcher adjusts... the final dice are:")?;
            writeln!(f, "{}", DiceArt(&report.final_pool))?;
        }

        let category = report.pitch.category();
        match report.streak_modifier {
            0 => {}
            modifier if modifier < 0 => writeln!(
                f,
                "\nPitcher is getting predictable with {category} pitches! PITCH DIFFICULTY {modifier}!"
            )?,
            modifier => writeln!(
                f,
                "\nA streak of {} sets up the {category}! PITCH DIFFICULTY +{modifier}!",
                report.streak_before
            )?,
        }

        let dice = report.attempt.dice().map(|d| d.value());
        writeln!(f, "\nPitcher's final dice for the {name} are {dice:?}.")?;
        match report.attempt.result() {
            PitchResult::Strike => writeln!(
                f,
                "It's a perfect {name}! A STRIKE with a final difficulty of {}.",
                report.effective_difficulty
            )?,
            PitchResult::Ball => writeln!(
                f,
                "It's a failed {name}! A BALL with a final difficulty of {}.",
                report.effective_difficulty
            )?,
        }

        match &report.action {
            HitterAction::Take | HitterAction::Watch => {
                match report.attempt.result() {
                    PitchResult::Strike => writeln!(f, "\nHitter takes for a called STRIKE!")?,
                    PitchResult::Ball => writeln!(f, "\nHitter takes for a BALL!")?,
                }
                if matches!(report.action, HitterAction::Take) {
                    writeln!(
                        f,
                        "Patience rewarded! Hitter gets +1 bonus die on their next swing for taking the pitch."
                    )?;
                }
            }
            HitterAction::Swing { setup, resolution } => {
                writeln!(f)?;
                self.fmt_swing(f, setup, resolution)?;
            }
        }

        match report.outcome {
            Some(AtBatOutcome::Strikeout) => write!(f, "\nSTRIKE THREE! You're out!"),
            Some(AtBatOutcome::Walk) => write!(f, "\nBALL FOUR! Take your base."),
            Some(AtBatOutcome::InPlay(outcome)) => write!(f, "\nAt-bat over: {outcome}."),
            None => write!(f, "\nCount is now {}.", report.count_after),
        }
    }
}

/// B.A.T.S. odds as a table, one row per pitch and bonus allocation.
pub(crate) struct BatsTable<'a>(pub(crate) &'a BatsReport);

impl fmt::Display for BatsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |p: f64| format!("{:>6.1}%", p * 100.0);
        writeln!(f, "--- B.A.T.S. ---")?;
        write!(
            f,
            "{:<5} {:<8} {:>7} {:>4} {:>5} {:>7} {:>7} {:>7} {:>7}",
            "Pitch", "Bonus", "Pitch", "Diff", "C/P", "Contact", "Single", "Double", "HR"
        )?;
        for entry in &self.0.entries {
            let bonus = entry
                .bonus
                .map_or_else(|| "-".to_owned(), |b| b.to_string());
            let dice = format!("{}/{}", entry.dice.contact, entry.dice.power);
            write!(
                f,
                "\n{:<5} {:<8} {:>7} {:>4} {:>5} {:>7} {:>7} {:>7} {:>7}",
                entry.pitch.code(),
                bonus,
                pct(entry.pitch_success_prob),
                entry.estimated_difficulty,
                dice,
                pct(entry.contact_prob),
                pct(entry.single_prob),
                pct(entry.double_prob),
                pct(entry.home_run_prob),
            )?;
        }
        Ok(())
    }
}
