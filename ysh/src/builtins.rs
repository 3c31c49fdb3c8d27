//! Built-in commands
//!
//! Every command receives its raw argument tokens and expands them itself, so
//! `type` can see an expression's value rather than its text.

use std::io::Write;

use crate::error::{YshError, YshResult};
use crate::help;
use crate::lexer::Token;
use crate::options::{parse_args, OptionMap};
use crate::shell::{CommandFn, Shell};

/// The commands every shell starts with.
pub const BUILTINS: &[(&str, CommandFn)] = &[
    ("echo", Shell::cmd_echo),
    ("exit", Shell::cmd_exit),
    ("help", Shell::cmd_help),
    ("type", Shell::cmd_type),
    ("unset", Shell::cmd_unset),
    ("vars", Shell::cmd_vars),
];

impl Shell {
    pub(crate) fn install_builtins(&mut self) {
        for &(name, command) in BUILTINS {
            self.register(name, command);
        }
    }

    fn cmd_echo(&mut self, args: &[Token], out: &mut dyn Write) -> YshResult<i32> {
        let words = self.expand_all(args)?;
        let optmap = OptionMap::new()
            .with("no-newline", 'n')
            .with("separator", 's');
        let parsed = parse_args(&words, &optmap)?;

        let sep = parsed.args_of('s').first().map_or(" ", String::as_str);
        write!(out, "{}", parsed.positional.join(sep))?;
        if !parsed.has('n') {
            writeln!(out)?;
        }
        Ok(0)
    }

    fn cmd_exit(&mut self, args: &[Token], _out: &mut dyn Write) -> YshResult<i32> {
        let code = match args.first() {
            Some(arg) => {
                let text = self.expand(arg)?;
                text.trim()
                    .parse::<i32>()
                    .map_err(|_| YshError::InvalidArgument(format!("exit: bad code '{text}'")))?
            }
            None => 0,
        };
        Err(YshError::Exit(code))
    }

    fn cmd_help(&mut self, args: &[Token], out: &mut dyn Write) -> YshResult<i32> {
        let Some(topic) = args.first() else {
            write!(out, "{}", help::format_help_list())?;
            return Ok(0);
        };
        let name = self.expand(topic)?;
        match help::get_help(&name) {
            Some(cmd) => {
                write!(out, "{}", help::format_help(cmd))?;
                Ok(0)
            }
            None => Err(YshError::CommandNotFound(name)),
        }
    }

    fn cmd_type(&mut self, args: &[Token], out: &mut dyn Write) -> YshResult<i32> {
        let [arg] = args else {
            return Err(YshError::InvalidArgument(
                "type: expected exactly one argument".to_string(),
            ));
        };
        let value = self.value_of(arg)?;
        writeln!(out, "{}", value.kind())?;
        Ok(0)
    }

    fn cmd_unset(&mut self, args: &[Token], _out: &mut dyn Write) -> YshResult<i32> {
        for name in self.expand_all(args)? {
            self.env.remove(&name);
        }
        Ok(0)
    }

    fn cmd_vars(&mut self, args: &[Token], out: &mut dyn Write) -> YshResult<i32> {
        let words = self.expand_all(args)?;
        let parsed = parse_args(&words, &OptionMap::new().with("json", 'j'))?;

        let mut bindings: Vec<_> = self.env.iter().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));

        if parsed.has('j') {
            let object: serde_json::Map<String, serde_json::Value> = bindings
                .into_iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect();
            writeln!(out, "{:#}", serde_json::Value::Object(object))?;
        } else {
            for (name, value) in bindings {
                writeln!(out, "{name} = {value}")?;
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::shell::Shell;
    use crate::value::Value;

    fn exec(shell: &mut Shell, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute_line(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_every_builtin_is_installed() {
        let shell = Shell::default();
        let names: Vec<&str> = super::BUILTINS.iter().map(|(name, _)| *name).collect();
        assert_eq!(shell.command_names(), names);
    }

    #[test]
    fn test_echo() {
        let mut shell = Shell::default();
        assert_eq!(exec(&mut shell, "echo hello \"big world\""), "hello big world\n");
        assert_eq!(exec(&mut shell, "echo -n a b"), "a b");
        assert_eq!(exec(&mut shell, "echo [-s \", \"] a b c"), "a, b, c\n");
        assert_eq!(exec(&mut shell, "echo sum (1 + 2)"), "sum 3\n");
    }

    #[test]
    fn test_echo_unknown_option() {
        let mut shell = Shell::default();
        let mut out = Vec::new();
        let err = shell.execute_line("echo -q", &mut out).unwrap_err();
        assert!(matches!(err, crate::YshError::UnknownOption(o) if o == "-q"));
    }

    #[test]
    fn test_exit_codes() {
        let mut shell = Shell::default();
        let mut out = Vec::new();
        assert!(matches!(
            shell.execute_line("exit", &mut out),
            Err(crate::YshError::Exit(0))
        ));
        assert!(matches!(
            shell.execute_line("exit (40 + 2)", &mut out),
            Err(crate::YshError::Exit(42))
        ));
        assert!(matches!(
            shell.execute_line("exit soon", &mut out),
            Err(crate::YshError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_type() {
        let mut shell = Shell::default();
        assert_eq!(exec(&mut shell, "type (1.5)"), "Real\n");
        assert_eq!(exec(&mut shell, "type (1 , 2)"), "Tuple\n");
        assert_eq!(exec(&mut shell, "type word"), "Str\n");
        assert_eq!(exec(&mut shell, "type (5 / 0)"), "Error\n");
    }

    #[test]
    fn test_vars_and_unset() {
        let mut shell = Shell::default();
        shell.env.insert("b".to_string(), Value::from("two"));
        shell.env.insert("a".to_string(), Value::Int(1));
        assert_eq!(exec(&mut shell, "vars"), "a = 1\nb = two\n");

        let json: serde_json::Value = serde_json::from_str(&exec(&mut shell, "vars -j")).unwrap();
        assert_eq!(json, serde_json::json!({ "a": 1, "b": "two" }));

        exec(&mut shell, "unset a");
        assert_eq!(exec(&mut shell, "vars"), "b = two\n");
    }

    #[test]
    fn test_help() {
        let mut shell = Shell::default();
        assert!(exec(&mut shell, "help").contains("Available commands"));
        assert!(exec(&mut shell, "help echo").starts_with("echo - "));
        let mut out = Vec::new();
        assert!(matches!(
            shell.execute_line("help nope", &mut out),
            Err(crate::YshError::CommandNotFound(_))
        ));
    }
}
