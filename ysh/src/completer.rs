use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// Completes command names in command position and variable names elsewhere.
pub struct YshHelper {
    commands: Vec<String>,
    variables: Vec<String>,
}

impl YshHelper {
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            variables: Vec::new(),
        }
    }

    pub fn set_variables(&mut self, variables: Vec<String>) {
        self.variables = variables;
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let line_to_cursor = &line[..pos];
        let (start, word) = find_word_start(line_to_cursor);
        if word.is_empty() {
            return (pos, Vec::new());
        }

        let is_first_word = line_to_cursor[..start].trim().is_empty();
        let pool = if is_first_word {
            &self.commands
        } else {
            &self.variables
        };
        let matches = pool
            .iter()
            .filter(|name| name.starts_with(word))
            .cloned()
            .collect();
        (start, matches)
    }
}

impl Completer for YshHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(line, pos);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

fn find_word_start(line: &str) -> (usize, &str) {
    let mut start = line.len();
    for (i, c) in line.char_indices().rev() {
        if !(c.is_alphanumeric() || c == '_') {
            break;
        }
        start = i;
    }
    (start, &line[start..])
}

impl Hinter for YshHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for YshHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }
}

impl Validator for YshHelper {}

impl Helper for YshHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> YshHelper {
        let mut helper = YshHelper::new(vec!["echo".into(), "exit".into(), "vars".into()]);
        helper.set_variables(vec!["total".into(), "tmp".into(), "x".into()]);
        helper
    }

    #[test]
    fn test_completes_commands_first() {
        let (start, names) = helper().candidates("e", 1);
        assert_eq!(start, 0);
        assert_eq!(names, vec!["echo", "exit"]);
    }

    #[test]
    fn test_completes_variables_in_expressions() {
        let line = "echo (1 + t";
        let (start, names) = helper().candidates(line, line.len());
        assert_eq!(start, line.len() - 1);
        assert_eq!(names, vec!["total", "tmp"]);
    }

    #[test]
    fn test_nothing_to_complete() {
        let (start, names) = helper().candidates("echo ", 5);
        assert_eq!(start, 5);
        assert!(names.is_empty());
    }
}
