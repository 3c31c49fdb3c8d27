pub struct CommandHelp {
    pub name: &'static str,
    pub summary: &'static str,
    pub usage: &'static str,
    pub options: &'static [(&'static str, &'static str)],
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "echo",
        summary: "Print arguments separated by spaces",
        usage: "echo [-n] [[-s SEP]] [ARG]...",
        options: &[
            ("-n", "Do not output trailing newline"),
            ("[-s SEP]", "Separate arguments with SEP instead of a space"),
        ],
    },
    CommandHelp {
        name: "exit",
        summary: "Exit the shell",
        usage: "exit [CODE]",
        options: &[],
    },
    CommandHelp {
        name: "help",
        summary: "Display help for commands",
        usage: "help [COMMAND]",
        options: &[],
    },
    CommandHelp {
        name: "type",
        summary: "Print the kind of a value",
        usage: "type (EXPR)",
        options: &[],
    },
    CommandHelp {
        name: "unset",
        summary: "Remove variable bindings",
        usage: "unset NAME...",
        options: &[],
    },
    CommandHelp {
        name: "vars",
        summary: "List variable bindings",
        usage: "vars [-j]",
        options: &[("-j", "Print bindings as a JSON object")],
    },
];

pub fn get_help(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub fn format_help(cmd: &CommandHelp) -> String {
    let mut out = format!("{} - {}\n\nUsage: {}\n", cmd.name, cmd.summary, cmd.usage);
    if !cmd.options.is_empty() {
        out.push_str("\nOptions:\n");
        for (opt, desc) in cmd.options {
            out.push_str(&format!("  {opt:16} {desc}\n"));
        }
    }
    out
}

pub fn format_help_list() -> String {
    let mut out = String::from("ysh - commands and expressions\n\nAvailable commands:\n\n");
    for cmd in COMMANDS {
        out.push_str(&format!("  {:12} {}\n", cmd.name, cmd.summary));
    }
    out.push_str("\nA line made of one (EXPR) is evaluated and its value printed.\n");
    out.push_str("Use 'help COMMAND' or 'COMMAND --help' for more information.\n");
    out
}

pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_has_help() {
        for (name, _) in crate::builtins::BUILTINS {
            assert!(get_help(name).is_some(), "missing help for {name}");
        }
    }

    #[test]
    fn test_format_help() {
        let text = format_help(get_help("vars").unwrap());
        assert!(text.starts_with("vars - List variable bindings"));
        assert!(text.contains("Usage: vars [-j]"));
        assert!(text.contains("-j"));
    }

    #[test]
    fn test_help_list_names_commands() {
        let text = format_help_list();
        for cmd in COMMANDS {
            assert!(text.contains(cmd.name));
        }
    }

    #[test]
    fn test_wants_help() {
        assert!(wants_help(&["--help".to_string()]));
        assert!(!wants_help(&["-n".to_string()]));
    }
}
