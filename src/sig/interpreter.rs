//! Sequence interpreter for the signature grammar
//!
//! Applies an extracted [`OpSequence`] to a token. Pure and deterministic:
//! the same sequence and input always produce the same output, and the
//! sequence itself is never mutated.

use tracing::trace;

use crate::error::DescrambleError;
use crate::ops::{Op, OpSequence};
use crate::Result;

/// Apply a signature operation sequence to a token.
///
/// Indices wrap via modulo and prefix removal clamps to the current length,
/// matching observed platform behavior, so a sequence produced by the
/// signature parser cannot fail here. The rich n-token operations are not
/// valid in a signature sequence and surface a fault if one slips through.
pub fn apply(seq: &OpSequence, token: &str) -> Result<String> {
    let mut chars: Vec<char> = token.chars().collect();

    for op in seq {
        trace!(?op, len = chars.len(), "applying signature op");
        match op {
            Op::Reverse => chars.reverse(),
            Op::RemovePrefix(n) => {
                let n = (*n).min(chars.len());
                chars.drain(..n);
            }
            Op::SwapWithFirst(i) => {
                if !chars.is_empty() {
                    let idx = i % chars.len();
                    chars.swap(0, idx);
                }
            }
            other => {
                return Err(DescrambleError::InterpreterFault(format!(
                    "operation {:?} is not part of the signature grammar",
                    other
                )))
            }
        }
    }

    Ok(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sequence() {
        // swap(0, 3 % 8) -> "dbcaefgh"; drop 2 -> "caefgh"; reverse -> "hgfeac"
        let seq = OpSequence::new(vec![
            Op::SwapWithFirst(3),
            Op::RemovePrefix(2),
            Op::Reverse,
        ]);
        assert_eq!(apply(&seq, "abcdefgh").unwrap(), "hgfeac");
    }

    #[test]
    fn test_remove_prefix_clamps() {
        let seq = OpSequence::new(vec![Op::RemovePrefix(100)]);
        assert_eq!(apply(&seq, "abcd").unwrap(), "");
    }

    #[test]
    fn test_swap_uses_modulo_of_current_length() {
        // After dropping 4 of 6 chars, swap(7) must wrap against length 2,
        // not the original 6: 7 % 2 = 1.
        let seq = OpSequence::new(vec![Op::RemovePrefix(4), Op::SwapWithFirst(7)]);
        assert_eq!(apply(&seq, "abcdef").unwrap(), "fe");
    }

    #[test]
    fn test_swap_on_empty_is_noop() {
        let seq = OpSequence::new(vec![Op::RemovePrefix(10), Op::SwapWithFirst(3)]);
        assert_eq!(apply(&seq, "ab").unwrap(), "");
    }

    #[test]
    fn test_determinism() {
        let seq = OpSequence::new(vec![Op::Reverse, Op::SwapWithFirst(5), Op::RemovePrefix(1)]);
        let first = apply(&seq, "0123456789").unwrap();
        let second = apply(&seq, "0123456789").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rich_op_is_rejected() {
        use crate::ops::Expr;
        let seq = OpSequence::new(vec![Op::Return(Expr::Num(1.0))]);
        assert!(matches!(
            apply(&seq, "abc"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }
}
