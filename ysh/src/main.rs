use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};
use ysh::streams::{input_stream, output_stream, STDIN, STDOUT};
use ysh::Shell;
use ysh_config::YshConfig;

mod completer;

/// ysh - A small shell with a broadcasting expression language
#[derive(Parser, Debug)]
#[command(name = "ysh", version, about)]
struct Args {
    /// Keep an interactive session open after the input has been consumed
    #[arg(short = 'c', long = "continue")]
    continue_interactive: bool,

    /// Run the interpreter in a child process and report its status
    #[arg(short = 'p', long)]
    separate_process: bool,

    /// Where values are written: a file path, "stdout" or "stderr"
    #[arg(short, long, default_value = STDOUT)]
    output_stream: String,

    /// Path to a config file
    #[arg(long, env = "YSH_CONFIG")]
    config: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Script to execute, or "stdin"
    #[arg(default_value = STDIN)]
    input: String,
}

impl Args {
    /// Arguments for a child interpreter: everything but `-p`.
    fn child_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.continue_interactive {
            args.push("--continue".to_string());
        }
        args.extend(["--output-stream".to_string(), self.output_stream.clone()]);
        if let Some(config) = &self.config {
            args.extend(["--config".to_string(), config.clone()]);
        }
        if self.debug {
            args.push("--debug".to_string());
        }
        args.push(self.input.clone());
        args
    }
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ysh_config::load_from_file(path).unwrap_or_else(|e| {
            eprintln!("ysh: failed to load config from {path}: {e}");
            YshConfig::default()
        }),
        None => ysh_config::load().unwrap_or_default(),
    };

    let log_filter = if args.debug {
        "debug".to_string()
    } else if config.logging.filter.is_empty() {
        config.logging.level.as_str().to_string()
    } else {
        config.logging.filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let code = if args.separate_process {
        run_separate_process(&args)
    } else {
        run(&args, config)
    };
    std::process::exit(code.unwrap_or_else(|e| {
        eprintln!("ysh: {e}");
        1
    }));
}

fn run_separate_process(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let exe = std::env::current_exe()?;
    let child_args = args.child_args();
    info!(exe = ?exe, args = ?child_args, "starting child interpreter");
    let status = Command::new(exe).args(&child_args).status()?;
    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

fn run(args: &Args, config: YshConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let mut out = output_stream(&args.output_stream)?;
    let mut shell = Shell::new(config);

    let interactive = args.input == STDIN && io::stdin().is_terminal();
    if !interactive {
        debug!(input = %args.input, "running script");
        let status = shell.run(input_stream(&args.input)?, &mut *out, &mut io::stderr())?;
        let resume = args.continue_interactive && args.input != STDIN && shell.is_running();
        if !resume {
            return Ok(status);
        }
    }
    run_repl(&mut shell, &mut *out)
}

fn run_repl(shell: &mut Shell, out: &mut dyn Write) -> Result<i32, Box<dyn std::error::Error>> {
    use completer::YshHelper;
    use rustyline::error::ReadlineError;
    use rustyline::{CompletionType, Config, Editor};

    let shell_config = shell.config.shell.clone();
    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .max_history_size(shell_config.history.max_entries)?
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .build();

    let mut rl = Editor::with_config(rl_config)?;
    rl.set_helper(Some(YshHelper::new(shell.command_names())));

    let history_path = shell_config.history.path();
    if shell_config.history.enabled {
        let _ = rl.load_history(&history_path);
    }

    let mut status = 0;
    let mut pending = String::new();

    while shell.is_running() {
        if let Some(helper) = rl.helper_mut() {
            helper.set_variables(shell.variable_names());
        }

        let prompt = if pending.is_empty() {
            &shell_config.prompt
        } else {
            &shell_config.continuation_prompt
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if ysh::shell::is_continued(&line) {
                    pending.push_str(ysh::shell::strip_continuation(&line));
                    continue;
                }
                pending.push_str(&line);
                let line = std::mem::take(&mut pending);
                if line.trim().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());
                status = shell.run_line(&line, out, &mut io::stderr())?;
                out.flush()?;
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if shell_config.history.enabled {
        let _ = rl.save_history(&history_path);
    }
    Ok(status)
}
