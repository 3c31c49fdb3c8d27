//! Input and output streams selected by name.
//!
//! `stdin`, `stdout` and `stderr` name the process streams; any other name is
//! a file path.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use tracing::debug;

pub const STDIN: &str = "stdin";
pub const STDOUT: &str = "stdout";
pub const STDERR: &str = "stderr";

/// Open an input stream: `stdin` or a file to read.
pub fn input_stream(name: &str) -> io::Result<Box<dyn BufRead>> {
    if name == STDIN {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    debug!(path = name, "opening input file");
    let file = File::open(name)?;
    Ok(Box::new(BufReader::new(file)))
}

/// Open an output stream: `stdout`, `stderr` or a file to create.
pub fn output_stream(name: &str) -> io::Result<Box<dyn Write>> {
    match name {
        STDOUT => Ok(Box::new(io::stdout())),
        STDERR => Ok(Box::new(io::stderr())),
        path => {
            debug!(path, "creating output file");
            Ok(Box::new(File::create(path)?))
        }
    }
}
