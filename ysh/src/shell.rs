//! Shell state and line execution

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use tracing::{debug, warn};
use ysh_config::{FaultPolicy, YshConfig};

use crate::error::{Fault, YshError, YshResult};
use crate::eval::{Env, Evaluator};
use crate::help;
use crate::lexer::{tokenize, unquote, Token, TokenKind};
use crate::value::Value;

/// A native command: receives the shell, its argument tokens and the output.
pub type CommandFn = fn(&mut Shell, &[Token], &mut dyn Write) -> YshResult<i32>;

/// Whether a physical line ends in an unescaped backslash.
pub fn is_continued(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// `line` without its trailing continuation backslash.
pub fn strip_continuation(line: &str) -> &str {
    &line[..line.len() - 1]
}

/// Join backslash-continued physical lines into logical lines.
pub fn join_continued<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = Vec::new();
    let mut pending: Option<String> = None;
    for line in lines {
        let line = line.as_ref();
        let buf = pending.get_or_insert_with(String::new);
        if is_continued(line) {
            buf.push_str(strip_continuation(line));
        } else {
            buf.push_str(line);
            joined.extend(pending.take());
        }
    }
    joined.extend(pending);
    joined
}

/// Logical lines from a reader, continuation lines already joined.
pub struct LineReader<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pending: Option<String> = None;
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Some(Err(e)),
                None => return pending.map(Ok),
            };
            let buf = pending.get_or_insert_with(String::new);
            if is_continued(&line) {
                buf.push_str(strip_continuation(&line));
            } else {
                buf.push_str(&line);
                return pending.map(Ok);
            }
        }
    }
}

pub struct Shell {
    pub env: Env,
    pub config: YshConfig,
    commands: HashMap<String, CommandFn>,
    running: bool,
    evaluator: Evaluator,
}

impl Shell {
    pub fn new(config: YshConfig) -> Self {
        let mut shell = Self {
            env: Env::new(),
            evaluator: Evaluator::from_config(&config.eval),
            config,
            commands: HashMap::new(),
            running: true,
        };
        shell.install_builtins();
        shell
    }

    /// Add or replace a command.
    pub fn register(&mut self, name: impl Into<String>, command: CommandFn) {
        self.commands.insert(name.into(), command);
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Variable names, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.env.keys().cloned().collect();
        names.sort();
        names
    }

    /// False once `exit` ran or a fault ended the session.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn evaluate(&mut self, expr: &str) -> Result<Value, Fault> {
        self.evaluator.evaluate(expr, &mut self.env)
    }

    /// Render an argument token as text. Expressions are evaluated, strings
    /// and names have their escapes resolved, packs and options stay as is.
    pub fn expand(&mut self, token: &Token) -> YshResult<String> {
        Ok(match token.kind {
            TokenKind::Expression => self.evaluate(&token.lexeme)?.to_string(),
            TokenKind::String | TokenKind::Name => unquote(&token.lexeme),
            _ => token.lexeme.clone(),
        })
    }

    pub fn expand_all(&mut self, tokens: &[Token]) -> YshResult<Vec<String>> {
        tokens.iter().map(|t| self.expand(t)).collect()
    }

    /// The value of an argument token: expressions are evaluated, anything
    /// else is its expanded text.
    pub fn value_of(&mut self, token: &Token) -> YshResult<Value> {
        match token.kind {
            TokenKind::Expression => Ok(self.evaluate(&token.lexeme)?),
            _ => Ok(Value::Str(self.expand(token)?)),
        }
    }

    /// Execute one logical line and return its status.
    ///
    /// A line made of a single expression prints the value; otherwise the
    /// first word names a command.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> YshResult<i32> {
        let tokens: Vec<Token> = tokenize(line)?
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Empty))
            .collect();
        let Some((first, args)) = tokens.split_first() else {
            return Ok(0);
        };

        match first.kind {
            TokenKind::Expression if args.is_empty() => {
                let value = self.evaluate(&first.lexeme)?;
                writeln!(out, "{value}")?;
                Ok(i32::from(value.is_error()))
            }
            TokenKind::Name => {
                let name = unquote(&first.lexeme);
                let command = self
                    .commands
                    .get(&name)
                    .copied()
                    .ok_or_else(|| YshError::CommandNotFound(name.clone()))?;

                let words: Vec<String> = args.iter().map(|t| t.lexeme.clone()).collect();
                if help::wants_help(&words) {
                    if let Some(h) = help::get_help(&name) {
                        write!(out, "{}", help::format_help(h))?;
                        return Ok(0);
                    }
                }

                debug!(command = %name, args = args.len(), "dispatch");
                command(self, args, out)
            }
            _ => Err(YshError::InvalidArgument(format!(
                "cannot execute '{}'",
                first.lexeme
            ))),
        }
    }

    /// Execute every line of `reader`, writing results to `out` and
    /// diagnostics to `err`. Returns the status of the last line.
    pub fn run(
        &mut self,
        reader: impl BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> YshResult<i32> {
        let mut status = 0;
        for line in LineReader::new(reader) {
            let line = line?;
            status = self.run_line(&line, out, err)?;
            if !self.running {
                break;
            }
        }
        out.flush()?;
        Ok(status)
    }

    /// Execute one line, reporting failures to `err`. Only I/O failures on
    /// the output escape.
    pub fn run_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> YshResult<i32> {
        match self.execute_line(line, out) {
            Ok(code) => Ok(code),
            Err(YshError::Exit(code)) => {
                self.running = false;
                Ok(code)
            }
            Err(YshError::Io(e)) => Err(YshError::Io(e)),
            Err(e) => {
                writeln!(err, "ysh: {e}")?;
                if matches!(e, YshError::Fault(_))
                    && self.config.eval.fault_policy == FaultPolicy::AbortSession
                {
                    warn!(error = %e, "fault ends the session");
                    self.running = false;
                }
                Ok(1)
            }
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(YshConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(shell: &mut Shell, script: &str) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = shell.run(script.as_bytes(), &mut out, &mut err).unwrap();
        (
            status,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_join_continued() {
        assert_eq!(
            join_continued(["echo a \\", "b", "c"]),
            vec!["echo a b", "c"]
        );
        assert_eq!(join_continued(["x \\\\", "y"]), vec!["x \\\\", "y"]);
        assert_eq!(join_continued(["tail \\"]), vec!["tail "]);
    }

    #[test]
    fn test_strip_continuation() {
        assert!(is_continued("echo a \\"));
        assert_eq!(strip_continuation("echo a \\"), "echo a ");
    }

    #[test]
    fn test_line_reader_joins() {
        let lines: Vec<String> = LineReader::new("a\\\nb\nc\n".as_bytes())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["ab", "c"]);
    }

    #[test]
    fn test_expression_line_prints_value() {
        let mut shell = Shell::default();
        let (status, out, _) = run_script(&mut shell, "(2 + 3 * 4)\n");
        assert_eq!(status, 0);
        assert_eq!(out, "14\n");
    }

    #[test]
    fn test_environment_persists_across_lines() {
        let mut shell = Shell::default();
        let (_, out, _) = run_script(&mut shell, "(x <- 4)\n(x * x)\n");
        assert_eq!(out, "4\n16\n");
        assert_eq!(shell.env.get("x"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let mut shell = Shell::default();
        let (status, out, err) = run_script(&mut shell, "# note\n\n   \n");
        assert_eq!((status, out.as_str(), err.as_str()), (0, "", ""));
    }

    #[test]
    fn test_unknown_command() {
        let mut shell = Shell::default();
        let (status, _, err) = run_script(&mut shell, "frobnicate\n");
        assert_eq!(status, 1);
        assert_eq!(err, "ysh: Command not found: frobnicate\n");
    }

    #[test]
    fn test_lex_error_is_reported() {
        let mut shell = Shell::default();
        let (status, out, err) = run_script(&mut shell, "echo (1 + 2\necho ok\n");
        assert_eq!(status, 0);
        assert_eq!(out, "ok\n");
        assert!(err.starts_with("ysh: Grammar error: unterminated group"));
    }

    #[test]
    fn test_fault_aborts_line_by_default() {
        let mut shell = Shell::default();
        let (status, out, err) = run_script(&mut shell, "(1 = \"1\")\n(2)\n");
        assert_eq!(status, 0);
        assert_eq!(out, "2\n");
        assert_eq!(err, "ysh: Type mismatch: cannot compare Int with Str\n");
        assert!(shell.is_running());
    }

    #[test]
    fn test_fault_can_end_session() {
        let mut config = YshConfig::default();
        config.eval.fault_policy = FaultPolicy::AbortSession;
        let mut shell = Shell::new(config);
        let (status, out, _) = run_script(&mut shell, "(1 = \"1\")\n(2)\n");
        assert_eq!(status, 1);
        assert_eq!(out, "");
        assert!(!shell.is_running());
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let mut shell = Shell::default();
        let (status, out, _) = run_script(&mut shell, "exit 3\n(1)\n");
        assert_eq!(status, 3);
        assert_eq!(out, "");
        assert!(!shell.is_running());
    }

    #[test]
    fn test_grammar_error_value_sets_status() {
        let mut shell = Shell::default();
        let (status, out, _) = run_script(&mut shell, "(1 +)\n");
        assert_eq!(status, 1);
        assert_eq!(out, "Grammar Error: missing operand for '+'\n");
    }

    #[test]
    fn test_register_custom_command() {
        fn twice(shell: &mut Shell, args: &[Token], out: &mut dyn Write) -> YshResult<i32> {
            for word in shell.expand_all(args)? {
                writeln!(out, "{word}{word}")?;
            }
            Ok(0)
        }

        let mut shell = Shell::default();
        shell.register("twice", twice);
        assert!(shell.command_names().contains(&"twice".to_string()));
        let (_, out, _) = run_script(&mut shell, "twice ab (1 + 1)\n");
        assert_eq!(out, "abab\n22\n");
    }

    #[test]
    fn test_help_flag_on_builtin() {
        let mut shell = Shell::default();
        let (_, out, _) = run_script(&mut shell, "vars --help\n");
        assert!(out.starts_with("vars - List variable bindings"));
    }
}
