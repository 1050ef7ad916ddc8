#![forbid(unsafe_code)]

use rand::Rng;

use catbot_tokenize::Tokenizer;

use crate::generator::ResponseGenerator;
use crate::model::SequenceModel;

/// Words that end the chat loop, matched case-insensitively.
pub const QUIT_WORDS: &[&str] = &["quit", "exit", "bye"];

/// Farewell printed when the user quits.
pub const GOODBYE: &str = "Goodbye!";

/// Reply to an empty line.
pub const SAY_SOMETHING: &str = "Please say something!";

/// What the chat loop does with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplStep {
    /// print the farewell and stop
    Quit(String),
    /// print the reply and read the next line
    Reply(String),
}

impl ReplStep {
    /// Text shown after the `Chatbot:` prefix.
    pub fn text(&self) -> &str {
        match self {
            ReplStep::Quit(t) | ReplStep::Reply(t) => t,
        }
    }
}

/// Handle one REPL line: quit words stop, blank lines prompt, anything
/// else goes through the generator.
pub fn respond_line<M, T, R>(bot: &ResponseGenerator<M, T>, line: &str, rng: &mut R) -> ReplStep
where
    M: SequenceModel,
    T: Tokenizer,
    R: Rng + ?Sized,
{
    let input = line.trim();
    if QUIT_WORDS.iter().any(|q| input.eq_ignore_ascii_case(q)) {
        return ReplStep::Quit(GOODBYE.to_string());
    }
    if input.is_empty() {
        return ReplStep::Reply(SAY_SOMETHING.to_string());
    }
    ReplStep::Reply(bot.generate_response_with(input, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serving, FixedModel};
    use catbot_core::make_rng;

    #[test]
    fn quit_words_end_the_loop() {
        let bot = serving(FixedModel::uniform(20, 5));
        let mut rng = make_rng(3);
        for line in ["quit", "EXIT", "  Bye  "] {
            assert_eq!(respond_line(&bot, line, &mut rng), ReplStep::Quit(GOODBYE.to_string()));
        }
    }

    #[test]
    fn blank_line_asks_for_input() {
        let bot = serving(FixedModel::uniform(20, 5));
        let mut rng = make_rng(3);
        for line in ["", "   ", "\t"] {
            assert_eq!(
                respond_line(&bot, line, &mut rng),
                ReplStep::Reply(SAY_SOMETHING.to_string())
            );
        }
    }

    #[test]
    fn other_lines_get_a_reply() {
        let bot = serving(FixedModel::uniform(20, 5));
        let mut rng = make_rng(3);
        let step = respond_line(&bot, "quit smoking", &mut rng);
        assert!(matches!(step, ReplStep::Reply(_)));
        assert!(!step.text().is_empty());
        assert_ne!(step.text(), SAY_SOMETHING);
    }
}
