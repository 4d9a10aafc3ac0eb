//! Categorized highlight spans derived from the token stream.
//!
//! The scanner keeps `+` and its digit run as separate tokens; for display
//! the pair reads as one padding marker. This module folds the raw stream
//! into `(kind, text)` events and leaves presentation (color or otherwise)
//! to the caller.

use crate::lexer::{Lexer, ScanError};
use crate::token::TokenKind;

/// Display category of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Name,
    FlagName,
    String,
    Number,
    Length,
    Padding,
}

/// One categorized span: the category plus the token's captured text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub kind: HighlightKind,
    pub text: String,
}

/// Categorize `source` for syntax highlighting. Group braces and an
/// unpaired `+` are delimiters and emit nothing.
pub fn highlight(source: &str) -> Result<Vec<HighlightSpan>, ScanError> {
    let mut out = Vec::new();
    let mut pending_pad = false;
    for tok in Lexer::new(source)? {
        let tok = tok?;
        let kind = match tok.kind {
            TokenKind::Append => {
                pending_pad = true;
                continue;
            }
            TokenKind::GroupOpen | TokenKind::GroupClose => {
                pending_pad = false;
                continue;
            }
            TokenKind::NumberLiteral(_) if pending_pad => HighlightKind::Padding,
            TokenKind::NumberLiteral(_) => HighlightKind::Number,
            TokenKind::Name => HighlightKind::Name,
            TokenKind::FlagName => HighlightKind::FlagName,
            TokenKind::StringLiteral => HighlightKind::String,
            TokenKind::LengthLiteral(_) => HighlightKind::Length,
        };
        pending_pad = false;
        out.push(HighlightSpan {
            kind,
            text: tok.text,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<HighlightKind> {
        highlight(source).expect("highlight").into_iter().map(|s| s.kind).collect()
    }

    #[test]
    fn append_and_zero_fold_into_padding() {
        let spans = highlight("ID:\"SLLCPv\"+0").expect("highlight");
        assert_eq!(
            spans.iter().map(|s| s.kind).collect::<Vec<_>>(),
            vec![HighlightKind::Name, HighlightKind::String, HighlightKind::Padding]
        );
        assert_eq!(spans[2].text, "0");
    }

    #[test]
    fn bare_numbers_stay_numbers() {
        assert_eq!(kinds("x 7"), vec![HighlightKind::Name, HighlightKind::Number]);
    }

    #[test]
    fn group_members_categorize_as_flags() {
        assert_eq!(
            kinds("Flags:{Re[2] HW}"),
            vec![
                HighlightKind::Name,
                HighlightKind::FlagName,
                HighlightKind::Length,
                HighlightKind::FlagName,
            ]
        );
    }
}
