// Operator decision source for auto-start

use std::io::{self, BufRead, Write};

/// What the operator answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptOutcome {
    pub dont_ask_again: bool,
    pub wants_auto_start: bool,
}

pub trait DecisionPrompt: Send + Sync {
    fn ask(&self) -> io::Result<PromptOutcome>;
}

/// Asks on the terminal. Anything but "y"/"yes" counts as no.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
        write!(output, "{} [y/N] ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer on standard input"));
        }
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "o" | "oui"))
    }

    pub fn ask_with<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<PromptOutcome> {
        let wants_auto_start = Self::ask_yes_no(input, output, "Start automatically when you log in?")?;
        let dont_ask_again = Self::ask_yes_no(input, output, "Don't ask again?")?;
        Ok(PromptOutcome {
            dont_ask_again,
            wants_auto_start,
        })
    }
}

impl DecisionPrompt for ConsolePrompt {
    fn ask(&self) -> io::Result<PromptOutcome> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        Self::ask_with(&mut input, &mut output)
    }
}
