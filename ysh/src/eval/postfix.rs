//! Operator table and the shunting-yard conversion to postfix order.

use tracing::trace;

use super::GrammarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub precedence: u8,
    pub assoc: Assoc,
}

/// Precedence and associativity of a binary operator symbol.
pub fn operator(symbol: &str) -> Option<OpInfo> {
    let (precedence, assoc) = match symbol {
        "$" => (100, Assoc::Right),
        ":" => (90, Assoc::Right),
        "<-" => (85, Assoc::Right),
        "^" => (80, Assoc::Left),
        "*" | "/" | "%" => (70, Assoc::Left),
        "+" | "-" | "++" => (60, Assoc::Left),
        "<" | ">" | "=" | "!=" | "<=" | ">=" | "<=>" => (50, Assoc::Left),
        "&" | "|" => (40, Assoc::Left),
        "<<" | ">>" => (30, Assoc::Left),
        "," => (20, Assoc::Left),
        "->" => (10, Assoc::Right),
        ";" => (0, Assoc::Left),
        _ => return None,
    };
    Some(OpInfo { precedence, assoc })
}

/// A fragment made only of punctuation that is not a binary operator,
/// e.g. the postfix `!`.
pub fn is_postfix_symbol(fragment: &str) -> bool {
    !fragment.is_empty()
        && fragment != "("
        && fragment != ")"
        && fragment.chars().all(|c| c.is_ascii_punctuation() && c != '"')
        && operator(fragment).is_none()
}

/// Reorder infix fragments into postfix order.
///
/// An operand directly followed by postfix symbols is emitted together with
/// them, so `x ! + 1` becomes `x ! 1 +`.
pub fn shunting_yard<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>, GrammarError> {
    let mut output: Vec<String> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_ref();
        if token == "(" {
            stack.push(token);
        } else if token == ")" {
            loop {
                match stack.pop() {
                    Some("(") => break,
                    Some(op) => output.push(op.to_string()),
                    None => return Err(GrammarError::UnbalancedParen),
                }
            }
        } else if let Some(current) = operator(token) {
            while let Some(top) = stack.last().and_then(|top| operator(top)) {
                let pops = match current.assoc {
                    Assoc::Left => current.precedence <= top.precedence,
                    Assoc::Right => current.precedence < top.precedence,
                };
                if !pops {
                    break;
                }
                if let Some(op) = stack.pop() {
                    output.push(op.to_string());
                }
            }
            stack.push(token);
        } else {
            output.push(token.to_string());
            while let Some(next) = tokens.get(i + 1).map(AsRef::as_ref) {
                if !is_postfix_symbol(next) {
                    break;
                }
                output.push(next.to_string());
                i += 1;
            }
        }
        i += 1;
    }

    while let Some(op) = stack.pop() {
        if op == "(" {
            return Err(GrammarError::UnbalancedParen);
        }
        output.push(op.to_string());
    }

    trace!(postfix = ?output, "shunting-yard");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(tokens: &[&str]) -> Vec<String> {
        shunting_yard(tokens).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix(&["1", "+", "2", "*", "3"]), vec!["1", "2", "3", "*", "+"]);
        assert_eq!(postfix(&["1", "*", "2", "+", "3"]), vec!["1", "2", "*", "3", "+"]);
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(postfix(&["1", "-", "2", "-", "3"]), vec!["1", "2", "-", "3", "-"]);
    }

    #[test]
    fn test_right_associative() {
        assert_eq!(
            postfix(&["a", "<-", "b", "<-", "1"]),
            vec!["a", "b", "1", "<-", "<-"]
        );
        assert_eq!(postfix(&["1", ":", "2", ":", "x"]), vec!["1", "2", "x", ":", ":"]);
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            postfix(&["(", "1", "+", "2", ")", "*", "3"]),
            vec!["1", "2", "+", "3", "*"]
        );
    }

    #[test]
    fn test_operand_with_postfix_run() {
        assert_eq!(postfix(&["x", "!", "+", "1"]), vec!["x", "!", "1", "+"]);
        assert_eq!(postfix(&["x", "!", "!"]), vec!["x", "!", "!"]);
        assert_eq!(postfix(&["x", "@", "y"]), vec!["x", "@", "y"]);
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(shunting_yard(&["(", "1"]), Err(GrammarError::UnbalancedParen));
        assert_eq!(shunting_yard(&["1", ")"]), Err(GrammarError::UnbalancedParen));
    }

    #[test]
    fn test_operator_table() {
        assert_eq!(
            operator("<-"),
            Some(OpInfo {
                precedence: 85,
                assoc: Assoc::Right
            })
        );
        assert_eq!(operator("!"), None);
        assert!(is_postfix_symbol("!"));
        assert!(!is_postfix_symbol("+"));
        assert!(!is_postfix_symbol("x"));
        assert!(!is_postfix_symbol(")"));
    }
}
