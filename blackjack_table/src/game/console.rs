//! Console prompts for human seats.

use blackjack_engine::prelude::*;
use std::io::{BufRead, Write};
use tracing::warn;

/// Words that end the session when typed at any prompt.
const LEAVE_WORDS: [&str; 3] = ["q", "quit", "leave"];

/// Parses an action typed at the prompt, by first letter or full word.
pub fn parse_action(input: &str) -> Option<Action> {
    match input.trim().to_lowercase().as_str() {
        "s" | "stand" => Some(Action::Stand),
        "h" | "hit" => Some(Action::Hit),
        "d" | "double" => Some(Action::Double),
        "r" | "surrender" => Some(Action::Surrender),
        _ => None,
    }
}

fn shortcut(action: &Action) -> &'static str {
    match action {
        Action::Stand => "[s]tand",
        Action::Hit => "[h]it",
        Action::Double => "[d]ouble",
        Action::Surrender => "su[r]render",
    }
}

/// Reads human decisions from `reader` and writes prompts and round reports to `writer`.
/// End of input or one of the leave words makes the seat leave the table.
pub struct ConsoleInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, writer: W) -> ConsoleInput<R, W> {
        ConsoleInput { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Writes a line. The game goes on if the console cannot be written to.
    pub fn say<T: std::fmt::Display>(&mut self, text: T) {
        if let Err(e) = writeln!(self.writer, "{}", text) {
            warn!(error = %e, "unable to write to the console");
        }
    }

    fn prompt(&mut self, seat: &Seat, question: &str) -> Result<String, GameError> {
        let leave = || GameError::LeftTable(seat.name().to_string());
        write!(self.writer, "{}", question)
            .and_then(|_| self.writer.flush())
            .map_err(|_| leave())?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(|_| leave())?;
        let answer = line.trim().to_string();
        if read == 0 || LEAVE_WORDS.contains(&answer.to_lowercase().as_str()) {
            return Err(leave());
        }
        Ok(answer)
    }

    fn read_amount(&mut self, seat: &Seat, question: &str) -> Result<i64, GameError> {
        loop {
            let answer = self.prompt(seat, question)?;
            match answer.parse::<i64>() {
                Ok(amount) => return Ok(amount),
                Err(_) => self.say(format!("'{}' is not a whole number", answer)),
            }
        }
    }
}

impl<R: BufRead, W: Write> HumanInput for ConsoleInput<R, W> {
    fn bet(&mut self, seat: &Seat, minimum: i64) -> Result<i64, GameError> {
        let question = format!(
            "{}, you have ${}. Bet ({}-{}, q to leave): ",
            seat.name(),
            seat.bankroll(),
            minimum,
            seat.bankroll()
        );
        self.read_amount(seat, &question)
    }

    fn insurance(&mut self, seat: &Seat) -> Result<i64, GameError> {
        let max = (seat.bet() / 2).min(seat.bankroll().max(0));
        let question = format!(
            "The dealer shows an Ace. {}, your hand is {}. Insurance (0-{}): ",
            seat.name(),
            seat.hand(),
            max
        );
        self.read_amount(seat, &question)
    }

    fn action(
        &mut self,
        seat: &Seat,
        dealers_up_card: &Card,
        options: &[Action],
    ) -> Result<Action, GameError> {
        let choices = options.iter().map(shortcut).collect::<Vec<&str>>().join(" ");
        let question = format!(
            "Dealer shows {}. {}, your hand is {}. {}: ",
            dealers_up_card,
            seat.name(),
            seat.hand(),
            choices
        );
        loop {
            let answer = self.prompt(seat, &question)?;
            match parse_action(&answer) {
                Some(action) => return Ok(action),
                None => self.say(format!("'{}' is not an option", answer)),
            }
        }
    }

    fn rejected(&mut self, _seat: &Seat, error: &GameError) {
        self.say(error);
    }

    fn announce(&mut self, report: &RoundReport) {
        self.say(report);
    }
}
