//! Command option parsing
//!
//! Flags are single characters kept in a 64-bit set. Long names are mapped to
//! their short letter per command through an [`OptionMap`]. An option can also
//! carry arguments through a pack: `[-s ", "]` or `[--sep x y]`.

use std::collections::HashMap;

use crate::error::{YshError, YshResult};
use crate::lexer::unquote;

/// Bit position of an option letter: `0-9` are 1..=10, `A-Z` 11..=36 and
/// `a-z` 37..=62.
pub fn order(opt: char) -> Option<u32> {
    let offset = |base: char, first: u32| u32::from(opt) - u32::from(base) + first;
    match opt {
        '0'..='9' => Some(offset('0', 1)),
        'A'..='Z' => Some(offset('A', 11)),
        'a'..='z' => Some(offset('a', 37)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSet(u64);

impl OptionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add an option letter. Returns `false` for characters with no bit.
    pub fn insert(&mut self, opt: char) -> bool {
        match order(opt) {
            Some(bit) => {
                self.0 |= 1 << bit;
                true
            }
            None => false,
        }
    }

    pub fn contains(self, opt: char) -> bool {
        order(opt).is_some_and(|bit| self.0 & (1 << bit) != 0)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u64 {
        self.0
    }
}

impl FromIterator<char> for OptionSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut set = Self::empty();
        for opt in iter {
            set.insert(opt);
        }
        set
    }
}

/// The options a command accepts, with their long names.
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    long: HashMap<String, char>,
    short: OptionSet,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `-short`, and `--long` as a synonym for it.
    #[must_use]
    pub fn with(mut self, long: &str, short: char) -> Self {
        self.long.insert(long.to_string(), short);
        self.short.insert(short);
        self
    }

    pub fn short_for(&self, long: &str) -> Option<char> {
        self.long.get(long).copied()
    }

    pub fn accepts(&self, short: char) -> bool {
        self.short.contains(short)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub flags: OptionSet,
    pub option_args: HashMap<char, Vec<String>>,
    pub positional: Vec<String>,
}

impl ParsedArgs {
    pub fn has(&self, opt: char) -> bool {
        self.flags.contains(opt)
    }

    /// Arguments bound to `opt` by a pack, empty when there were none.
    pub fn args_of(&self, opt: char) -> &[String] {
        self.option_args.get(&opt).map_or(&[], Vec::as_slice)
    }
}

/// Resolve one option word (`-abc` or `--long`) to its letters.
fn option_letters(word: &str, optmap: &OptionMap) -> YshResult<Vec<char>> {
    if let Some(long) = word.strip_prefix("--") {
        return optmap
            .short_for(long)
            .map(|short| vec![short])
            .ok_or_else(|| YshError::UnknownOption(word.to_string()));
    }
    let letters: Vec<char> = word.trim_start_matches('-').chars().collect();
    match letters.iter().find(|c| !optmap.accepts(**c)) {
        Some(bad) => Err(YshError::UnknownOption(format!("-{bad}"))),
        None => Ok(letters),
    }
}

/// Split a pack `[-o a "b c"]` into its option word and arguments.
fn pack_parts(pack: &str) -> Vec<String> {
    let inner = pack
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(pack);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn is_option_word(word: &str) -> bool {
    word.len() > 1
        && word.starts_with('-')
        && !word[1..].chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse command arguments into flags, option arguments and positionals.
///
/// A bare `--` ends option parsing; a lone `-` and negative numbers are
/// positional.
pub fn parse_args<S: AsRef<str>>(args: &[S], optmap: &OptionMap) -> YshResult<ParsedArgs> {
    let mut parsed = ParsedArgs::default();
    let mut options_done = false;

    for arg in args {
        let arg = arg.as_ref();
        if options_done {
            parsed.positional.push(arg.to_string());
        } else if arg == "--" {
            options_done = true;
        } else if arg.starts_with('[') {
            let mut parts = pack_parts(arg).into_iter();
            let Some(word) = parts.next().filter(|w| is_option_word(w)) else {
                return Err(YshError::InvalidArgument(format!(
                    "pack without an option: {arg}"
                )));
            };
            let values: Vec<String> = parts.map(|p| unquote(&p)).collect();
            for letter in option_letters(&word, optmap)? {
                parsed.flags.insert(letter);
                parsed.option_args.insert(letter, values.clone());
            }
        } else if is_option_word(arg) {
            for letter in option_letters(arg, optmap)? {
                parsed.flags.insert(letter);
            }
        } else {
            parsed.positional.push(arg.to_string());
        }
    }
    Ok(parsed)
}
