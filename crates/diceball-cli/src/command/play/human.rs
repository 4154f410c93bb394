use std::{
    cell::RefCell,
    io::{self, BufRead},
};

use diceball_engine::{
    BonusAllocation, DicePool, HitterApproach, HitterDecider, HitterPlan, HitterView,
    PitchType, PitcherDecider, PitcherMove, PitcherView, RerollRequest, SitAdjustment,
    SitCommitment, SwingArchetype, SwingView,
};
use diceball_evaluator::{
    bats::{self, BatsQuery},
    pitcher_evaluator::PitcherEvaluator,
};

use crate::{console::Console, render::BatsTable};

const PITCH_OPTIONS: [(&str, PitchType); 3] = [
    ("fb", PitchType::Fastball),
    ("cb", PitchType::Curveball),
    ("cu", PitchType::Changeup),
];

fn choose_pitch<R, W>(console: &mut Console<R, W>, prompt: &str) -> PitchType
where
    R: BufRead,
    W: io::Write,
{
    console
        .choose(prompt, &PITCH_OPTIONS)
        .unwrap_or(PitchType::Fastball)
}

fn choose_archetype<R, W>(console: &mut Console<R, W>) -> SwingArchetype
where
    R: BufRead,
    W: io::Write,
{
    console
        .choose(
            "Choose your swing: [p]ower, [c]ontact, or [b]alanced: ",
            &[
                ("p", SwingArchetype::Power),
                ("c", SwingArchetype::Contact),
                ("b", SwingArchetype::Balanced),
            ],
        )
        .unwrap_or_default()
}

/// The hitter, prompted on the terminal.
#[derive(Debug)]
pub(crate) struct HumanHitter<'a, R, W> {
    console: &'a RefCell<Console<R, W>>,
}

impl<'a, R, W> HumanHitter<'a, R, W> {
    pub(crate) fn new(console: &'a RefCell<Console<R, W>>) -> Self {
        Self { console }
    }
}

impl<R, W> HitterDecider for HumanHitter<'_, R, W>
where
    R: BufRead,
    W: io::Write,
{
    fn choose_plan(&mut self, view: &HitterView) -> HitterPlan {
        let mut console = self.console.borrow_mut();
        if view.bonus_dice > 0 {
            console.say("You have a bonus die to add to your next swing.");
        }
        let approach = console.choose(
            "Hitter, choose your approach: [t]ake, [s]it, or [w]ait: ",
            &[
                ("t", HitterApproach::Take),
                ("s", HitterApproach::Sit),
                ("w", HitterApproach::Wait),
            ],
        );
        match approach {
            None | Some(HitterApproach::Take) => HitterPlan::Take,
            Some(HitterApproach::Sit) => {
                let guess =
                    choose_pitch(&mut *console, "Sit on which pitch? [fb], [cb], or [cu]: ");
                let swing = choose_archetype(&mut *console);
                HitterPlan::Sit { guess, swing }
            }
            Some(HitterApproach::Wait) => HitterPlan::Wait {
                swing: choose_archetype(&mut *console),
            },
        }
    }

    fn adjust_sit(&mut self, sit: SitCommitment, pool: &DicePool) -> SitAdjustment {
        let mut console = self.console.borrow_mut();
        console.show_roll(pool);
        console.say(format_args!(
            "You are sitting on {}. Shifting loses the hard-sit bonus.",
            sit.guess().code()
        ));
        let shift = console
            .choose("[k]eep your sit or [sh]ift it? ", &[("k", false), ("sh", true)])
            .unwrap_or(false);
        if !shift {
            return SitAdjustment::Keep;
        }
        SitAdjustment::Shift(choose_pitch(
            &mut *console,
            "Shift your sit to which pitch? [fb], [cb], or [cu]: ",
        ))
    }

    fn choose_swing(&mut self, view: &SwingView<'_>) -> bool {
        let mut console = self.console.borrow_mut();
        console.say(format_args!(
            "\nPitcher keeps {} and re-rolls {} dice.",
            view.kept,
            view.reroll.len()
        ));
        let report = bats::calculate(&BatsQuery::from_swing_view(view));
        console.say(BatsTable(&report));
        console
            .choose(
                "Hitter, do you want to [s]wing or [n]ot swing? ",
                &[("s", true), ("n", false)],
            )
            .unwrap_or(false)
    }

    fn choose_bonus_allocation(&mut self, _view: &SwingView<'_>) -> BonusAllocation {
        self.console
            .borrow_mut()
            .choose(
                "Add your bonus die to [c]ontact or [p]ower? ",
                &[("c", BonusAllocation::Contact), ("p", BonusAllocation::Power)],
            )
            .unwrap_or(BonusAllocation::Contact)
    }
}

/// The pitcher, prompted on the terminal.
#[derive(Debug)]
pub(crate) struct HumanPitcher<'a, R, W> {
    console: &'a RefCell<Console<R, W>>,
}

impl<'a, R, W> HumanPitcher<'a, R, W> {
    pub(crate) fn new(console: &'a RefCell<Console<R, W>>) -> Self {
        Self { console }
    }
}

impl<R, W> PitcherDecider for HumanPitcher<'_, R, W>
where
    R: BufRead,
    W: io::Write,
{
    fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove {
        let mut console = self.console.borrow_mut();
        console.show_roll(view.pool);
        if view.reroll_budget < view.pool.len() {
            console.say(format_args!("Re-rolls left this at-bat: {}", view.reroll_budget));
        }
        let line = console
            .read_line("Pitcher, which dice to re-roll? (e.g., '1 3', or Enter for none): ")
            .unwrap_or_default();
        let reroll = RerollRequest::parse_lenient(&line);
        if reroll.is_empty() && !line.is_empty() {
            console.say("Invalid re-roll input. Keeping all dice.");
        }

        console.say("\n--- Both players make their secret choice! ---");
        let pitch = choose_pitch(
            &mut *console,
            "Pitcher, choose your pitch: [fb], [cb], or [cu]: ",
        );
        PitcherMove { reroll, pitch }
    }
}

/// The automated pitcher, narrating its public reroll.
#[derive(Debug)]
pub(crate) struct CpuPitcher<'a, R, W> {
    console: &'a RefCell<Console<R, W>>,
    evaluator: PitcherEvaluator,
}

impl<'a, R, W> CpuPitcher<'a, R, W> {
    pub(crate) fn new(console: &'a RefCell<Console<R, W>>) -> Self {
        Self {
            console,
            evaluator: PitcherEvaluator::new(),
        }
    }
}

impl<R, W> PitcherDecider for CpuPitcher<'_, R, W>
where
    R: BufRead,
    W: io::Write,
{
    fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove {
        let pitcher_move = self.evaluator.choose_pitcher_move(view);
        let mut console = self.console.borrow_mut();
        console.show_roll(view.pool);
        if pitcher_move.reroll.is_empty() {
            console.say("The AI pitcher will not re-roll any dice.");
        } else {
            console.say(format_args!(
                "The AI pitcher will re-roll dice: {}",
                pitcher_move.reroll
            ));
        }
        console.say("--- AI pitcher has secretly chosen its pitch! ---");
        pitcher_move
    }
}

#[cfg(test)]
mod tests {
    use diceball_engine::{Count, PowerTable, ResolvedReroll, Streak};

    use super::*;
    use crate::console::tests::{TestConsole, console, printed};

    fn hitter_view() -> HitterView {
        HitterView {
            count: Count::new(),
            streak: Streak::new(),
            bonus_dice: 0,
        }
    }

    fn pitcher_view(pool: &DicePool) -> PitcherView<'_> {
        PitcherView {
            pool,
            count: Count::new(),
            streak: Streak::new(),
            reroll_budget: pool.len(),
        }
    }

    fn with_console<T>(input: &str, f: impl FnOnce(&RefCell<TestConsole<'_>>) -> T) -> (T, String) {
        let console = RefCell::new(console(input));
        let value = f(&console);
        let output = printed(&console.borrow());
        (value, output)
    }

    #[test]
    fn test_hitter_sit_plan() {
        let (plan, _) = with_console("s\nCB\np\n", |c| {
            HumanHitter::new(c).choose_plan(&hitter_view())
        });
        assert_eq!(
            plan,
            HitterPlan::Sit {
                guess: PitchType::Curveball,
                swing: SwingArchetype::Power,
            }
        );
    }

    #[test]
    fn test_hitter_reprompts_then_waits() {
        let (plan, output) = with_console("x\nw\nc\n", |c| {
            HumanHitter::new(c).choose_plan(&hitter_view())
        });
        assert_eq!(
            plan,
            HitterPlan::Wait {
                swing: SwingArchetype::Contact,
            }
        );
        assert!(output.contains("Invalid input"));
    }

    #[test]
    fn test_hitter_defaults_to_take_on_closed_input() {
        let console = RefCell::new(console(""));
        let plan = HumanHitter::new(&console).choose_plan(&hitter_view());
        assert_eq!(plan, HitterPlan::Take);
        assert!(console.borrow_mut().check().is_err());
    }

    #[test]
    fn test_hitter_shifts_sit() {
        let pool = DicePool::from_values(&[2, 3, 4, 6, 6]).unwrap();
        let (adjustment, output) = with_console("sh\ncb\n", |c| {
            HumanHitter::new(c).adjust_sit(SitCommitment::hard(PitchType::Fastball), &pool)
        });
        assert_eq!(adjustment, SitAdjustment::Shift(PitchType::Curveball));
        assert!(output.contains("(5)"));
    }

    #[test]
    fn test_hitter_sees_bats_before_swinging() {
        let pool = DicePool::from_values(&[3, 3, 3, 1, 2]).unwrap();
        let reroll = ResolvedReroll::default();
        let view = SwingView {
            pool: &pool,
            reroll: &reroll,
            kept: &pool,
            swing: SwingArchetype::Balanced,
            sit: None,
            count: Count::new(),
            streak: Streak::new(),
            bonus_dice: 0,
            power_table: PowerTable::Tiered,
        };
        let (swung, output) =
            with_console("s\n", |c| HumanHitter::new(c).choose_swing(&view));
        assert!(swung);
        assert!(output.contains("B.A.T.S."));
    }

    #[test]
    fn test_pitcher_reroll_and_pitch() {
        let pool = DicePool::from_values(&[1, 2, 3, 4, 5]).unwrap();
        let (pitcher_move, _) = with_console("2 4\ncu\n", |c| {
            HumanPitcher::new(c).choose_pitcher_move(&pitcher_view(&pool))
        });
        assert_eq!(pitcher_move.reroll.positions(), [2, 4]);
        assert_eq!(pitcher_move.pitch, PitchType::Changeup);
    }

    #[test]
    fn test_pitcher_malformed_reroll_keeps_dice() {
        let pool = DicePool::from_values(&[1, 2, 3, 4, 5]).unwrap();
        let (pitcher_move, output) = with_console("1 x\nfb\n", |c| {
            HumanPitcher::new(c).choose_pitcher_move(&pitcher_view(&pool))
        });
        assert!(pitcher_move.reroll.is_empty());
        assert_eq!(pitcher_move.pitch, PitchType::Fastball);
        assert!(output.contains("Invalid re-roll input. Keeping all dice."));
    }

    #[test]
    fn test_sitting_hitter_and_pitcher_share_one_roll() {
        let pool = DicePool::from_values(&[2, 3, 4, 6, 6]).unwrap();
        let (pitcher_move, output) = with_console("k\n\nfb\n", |c| {
            let adjustment = HumanHitter::new(c)
                .adjust_sit(SitCommitment::hard(PitchType::Fastball), &pool);
            assert_eq!(adjustment, SitAdjustment::Keep);
            HumanPitcher::new(c).choose_pitcher_move(&pitcher_view(&pool))
        });
        assert!(pitcher_move.reroll.is_empty());
        assert_eq!(output.matches("Pitcher rolls the dice:").count(), 1);
        assert!(!output.contains("Invalid re-roll input"));
    }

    #[test]
    fn test_cpu_pitcher_announces_reroll() {
        let pool = DicePool::from_values(&[4, 4, 4, 1, 2]).unwrap();
        let (pitcher_move, output) = with_console("", |c| {
            CpuPitcher::new(c).choose_pitcher_move(&pitcher_view(&pool))
        });
        assert_eq!(pitcher_move.pitch, PitchType::Fastball);
        assert!(output.contains("will not re-roll any dice"));
        assert!(output.contains("secretly chosen its pitch"));
    }
}
