use std::{
    fmt,
    io::{self, BufRead, StdinLock, Stdout},
};

use diceball_engine::DicePool;

use crate::render::DiceArt;

/// Line-based terminal I/O shared by both players.
///
/// Decision providers must always return a choice, so I/O failures are not
/// returned from the prompting methods. The first failure is stored, every
/// later prompt returns `None`, and the caller picks it up with
/// [`Console::check`] once the pitch is over.
#[derive(Debug)]
pub(crate) struct Console<R, W> {
    input: R,
    output: W,
    failure: Option<io::Error>,
    roll_shown: bool,
}

impl Console<StdinLock<'static>, Stdout> {
    pub(crate) fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: BufRead,
    W: io::Write,
{
    pub(crate) fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            failure: None,
            roll_shown: false,
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.failure.get_or_insert(e);
        }
    }

    /// Prints one or more lines.
    pub(crate) fn say(&mut self, text: impl fmt::Display) {
        if self.failure.is_some() {
            return;
        }
        let result = writeln!(self.output, "{text}");
        self.record(result);
    }

    /// Prints `prompt` and reads one trimmed line.
    pub(crate) fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.failure.is_some() {
            return None;
        }
        let result = write!(self.output, "{prompt}").and_then(|()| self.output.flush());
        self.record(result);

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.record(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed while waiting for a choice",
                )));
                None
            }
            Ok(_) => Some(line.trim().to_owned()),
            Err(e) => {
                self.record(Err(e));
                None
            }
        }
    }

    /// Asks until the answer is one of `options` (case-insensitive).
    pub(crate) fn choose<T>(&mut self, prompt: &str, options: &[(&str, T)]) -> Option<T>
    where
        T: Copy,
    {
        loop {
            let answer = self.read_line(prompt)?;
            if let Some((_, value)) = options
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&answer))
            {
                return Some(*value);
            }
            let keys = options.iter().map(|(key, _)| *key).collect::<Vec<_>>();
            self.say(format_args!(
                "Invalid input. Please choose from: {}",
                keys.join(", ")
            ));
        }
    }

    /// Forgets the roll drawn for the previous pitch.
    pub(crate) fn start_pitch(&mut self) {
        self.roll_shown = false;
    }

    /// Draws the pitcher's roll, once per pitch.
    pub(crate) fn show_roll(&mut self, pool: &DicePool) {
        if self.roll_shown {
            return;
        }
        self.roll_shown = true;
        self.say("\nPitcher rolls the dice:");
        self.say(DiceArt(pool));
    }

    /// Returns the first I/O failure since the last check.
    pub(crate) fn check(&mut self) -> io::Result<()> {
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.output
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) type TestConsole<'a> = Console<&'a [u8], Vec<u8>>;

    pub(crate) fn console(input: &str) -> TestConsole<'_> {
        Console::new(input.as_bytes(), Vec::new())
    }

    pub(crate) fn printed(console: &TestConsole<'_>) -> String {
        String::from_utf8_lossy(console.output()).into_owned()
    }

    #[test]
    fn test_choose_reprompts_on_invalid_input() {
        let mut console = console("x\nS\n");
        let choice = console.choose("? ", &[("t", 1), ("s", 2)]);
        assert_eq!(choice, Some(2));
        assert!(printed(&console).contains("Please choose from: t, s"));
        assert!(console.check().is_ok());
    }

    #[test]
    fn test_closed_input_is_reported_once() {
        let mut console = console("");
        assert_eq!(console.read_line("? "), None);
        assert_eq!(console.choose("? ", &[("y", true)]), None);
        let err = console.check().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(console.check().is_ok());
    }

    #[test]
    fn test_roll_is_drawn_once_per_pitch() {
        let pool = DicePool::from_values(&[1, 2, 3, 4, 5]).unwrap();
        let mut console = console("");
        console.show_roll(&pool);
        console.show_roll(&pool);
        assert_eq!(printed(&console).matches("Pitcher rolls the dice:").count(), 1);

        console.start_pitch();
        console.show_roll(&pool);
        assert_eq!(printed(&console).matches("Pitcher rolls the dice:").count(), 2);
    }
}
