//! Character-level scanner for the packet notation.
//!
//! A finite-state machine: states that accumulate text own their buffer, so
//! one transition is `(state, char) -> (state, completed token?, replay?)`.
//! One character of lookahead (the terminator) closes any token; a replayed
//! terminator is fed again to the follow state, which is what lets `HW}`
//! both finish the flag name and close its group. Characters with no
//! transition rule (whitespace, `:`) are separators and are skipped.
//!
//! Anything still under accumulation when the input ends is flushed as a
//! final token; a dangling quote or `{` is an error instead.

use crate::token::{Token, TokenKind};
use std::str::CharIndices;

/// The scanner refuses sources longer than this (bytes). Notation is a few
/// lines at most; the cap bounds traversal of hostile input.
pub const MAX_SOURCE_LEN: usize = 64 * 1024;

/// Scanner errors. Offsets are byte positions in the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated flag group opened at byte {0}")]
    UnterminatedGroup(usize),
    #[error("`}}` at byte {0} without a matching `{{`")]
    MismatchedGroupClose(usize),
    #[error("number starting at byte {0} does not fit in 64 bits")]
    InvalidNumber(usize),
    #[error("empty `[]` length at byte {0}")]
    EmptyArrayDeclaration(usize),
    #[error("source is {0} bytes, longer than the 64 KiB scan limit")]
    SourceTooLong(usize),
}

/// Scanner states. Accumulating states carry their buffer; `start` is the
/// byte offset of the construct's first character (`"` for strings, `[` for
/// lengths, the first letter or digit otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Ready,
    GroupReady,
    ReadName { start: usize, buf: String },
    ReadString { start: usize, buf: String },
    ReadNumber { start: usize, buf: String },
    ReadFlagName { start: usize, buf: String },
    ReadLength { start: usize, buf: String },
    Append,
}

/// The state machine proper: the current state plus the group flag that
/// decides where a completed length or string returns to, and the offset of
/// the last `{` for the unterminated-group report.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Machine {
    state: State,
    in_group: bool,
    group_start: usize,
}

impl Machine {
    fn new() -> Self {
        Machine {
            state: State::Ready,
            in_group: false,
            group_start: 0,
        }
    }

    /// State a completed token returns to.
    fn rest(&self) -> State {
        if self.in_group {
            State::GroupReady
        } else {
            State::Ready
        }
    }

    /// Feed one character at byte offset `at`. Returns the token this
    /// character completed, if any, and whether the character must be fed
    /// again in the new state (a terminator that was not consumed).
    fn step(&mut self, at: usize, c: char) -> Result<(Option<Token>, bool), ScanError> {
        match std::mem::replace(&mut self.state, State::Ready) {
            State::Ready => self.open(at, c, false),
            // `+` passes exactly one following character through Append back to Ready
            State::Append => self.open(at, c, false),
            State::GroupReady => self.open(at, c, true),
            State::ReadName { start, mut buf } => {
                if c.is_alphabetic() {
                    buf.push(c);
                    self.state = State::ReadName { start, buf };
                    Ok((None, false))
                } else {
                    let tok = Token::new(TokenKind::Name, buf, start);
                    if c == '[' {
                        self.state = State::ReadLength {
                            start: at,
                            buf: String::new(),
                        };
                        Ok((Some(tok), false))
                    } else {
                        self.state = State::Ready;
                        Ok((Some(tok), true))
                    }
                }
            }
            State::ReadFlagName { start, mut buf } => {
                if c.is_alphabetic() {
                    buf.push(c);
                    self.state = State::ReadFlagName { start, buf };
                    Ok((None, false))
                } else {
                    let tok = Token::new(TokenKind::FlagName, buf, start);
                    if c == '[' {
                        self.state = State::ReadLength {
                            start: at,
                            buf: String::new(),
                        };
                        Ok((Some(tok), false))
                    } else {
                        self.state = State::GroupReady;
                        Ok((Some(tok), true))
                    }
                }
            }
            State::ReadString { start, mut buf } => {
                if c == '"' {
                    let tok = Token::new(TokenKind::StringLiteral, buf, start + 1);
                    self.state = self.rest();
                    Ok((Some(tok), false))
                } else {
                    buf.push(c);
                    self.state = State::ReadString { start, buf };
                    Ok((None, false))
                }
            }
            State::ReadNumber { start, mut buf } => {
                if c.is_ascii_digit() {
                    buf.push(c);
                    self.state = State::ReadNumber { start, buf };
                    Ok((None, false))
                } else {
                    let tok = number_token(buf, start)?;
                    self.state = self.rest();
                    Ok((Some(tok), true))
                }
            }
            State::ReadLength { start, mut buf } => {
                if c.is_ascii_digit() {
                    buf.push(c);
                    self.state = State::ReadLength { start, buf };
                    Ok((None, false))
                } else {
                    let tok = length_token(buf, start)?;
                    self.state = self.rest();
                    Ok((Some(tok), c != ']'))
                }
            }
        }
    }

    /// Transitions out of an open state (`Ready`, `GroupReady`, or one
    /// character past `Append`).
    fn open(&mut self, at: usize, c: char, grouped: bool) -> Result<(Option<Token>, bool), ScanError> {
        if c.is_alphabetic() {
            self.state = if grouped {
                State::ReadFlagName {
                    start: at,
                    buf: c.to_string(),
                }
            } else {
                State::ReadName {
                    start: at,
                    buf: c.to_string(),
                }
            };
            return Ok((None, false));
        }
        if c.is_ascii_digit() {
            self.state = State::ReadNumber {
                start: at,
                buf: c.to_string(),
            };
            return Ok((None, false));
        }
        match c {
            '{' if !grouped => {
                self.in_group = true;
                self.group_start = at;
                self.state = State::GroupReady;
                Ok((Some(Token::new(TokenKind::GroupOpen, "{", at)), false))
            }
            '}' if grouped => {
                self.in_group = false;
                self.state = State::Ready;
                Ok((Some(Token::new(TokenKind::GroupClose, "}", at)), false))
            }
            '}' => Err(ScanError::MismatchedGroupClose(at)),
            '"' => {
                self.state = State::ReadString {
                    start: at,
                    buf: String::new(),
                };
                Ok((None, false))
            }
            '+' if !grouped => {
                self.state = State::Append;
                Ok((Some(Token::new(TokenKind::Append, "+", at)), false))
            }
            '[' => {
                self.state = State::ReadLength {
                    start: at,
                    buf: String::new(),
                };
                Ok((None, false))
            }
            // separator: whitespace, `:`, stray `]`, and inside a group also `{` and `+`
            _ => {
                self.state = if grouped { State::GroupReady } else { State::Ready };
                Ok((None, false))
            }
        }
    }

    /// End of input: close whatever is still accumulating.
    fn flush(&mut self) -> Result<Option<Token>, ScanError> {
        match std::mem::replace(&mut self.state, State::Ready) {
            State::Ready | State::GroupReady | State::Append => Ok(None),
            State::ReadName { start, buf } => Ok(Some(Token::new(TokenKind::Name, buf, start))),
            State::ReadFlagName { start, buf } => {
                Ok(Some(Token::new(TokenKind::FlagName, buf, start)))
            }
            State::ReadNumber { start, buf } => number_token(buf, start).map(Some),
            State::ReadLength { start, buf } => length_token(buf, start).map(Some),
            State::ReadString { start, .. } => Err(ScanError::UnterminatedString(start)),
        }
    }
}

fn number_token(buf: String, offset: usize) -> Result<Token, ScanError> {
    // digit-only accumulation: the parse can only fail on overflow
    let value: u64 = buf.parse().map_err(|_| ScanError::InvalidNumber(offset))?;
    Ok(Token::new(TokenKind::NumberLiteral(value), buf, offset))
}

fn length_token(buf: String, bracket: usize) -> Result<Token, ScanError> {
    if buf.is_empty() {
        return Err(ScanError::EmptyArrayDeclaration(bracket));
    }
    let offset = bracket + 1;
    let value: u64 = buf.parse().map_err(|_| ScanError::InvalidNumber(offset))?;
    Ok(Token::new(TokenKind::LengthLiteral(value), buf, offset))
}

/// Lazy scanner over a notation source. Yields tokens in source order and is
/// fused after the first error.
pub struct Lexer<'a> {
    chars: CharIndices<'a>,
    machine: Machine,
    queued_tok: Option<Token>,
    queued_err: Option<ScanError>,
    flushed: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Result<Self, ScanError> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(ScanError::SourceTooLong(source.len()));
        }
        Ok(Lexer {
            chars: source.char_indices(),
            machine: Machine::new(),
            queued_tok: None,
            queued_err: None,
            flushed: false,
            failed: false,
        })
    }

    fn feed(&mut self, at: usize, c: char) -> Result<Option<Token>, ScanError> {
        let (emitted, replay) = self.machine.step(at, c)?;
        if replay {
            // the terminator acts in the follow state; it can complete a
            // second token (`}` closing a group) or fail (`}` at top level)
            match self.machine.step(at, c) {
                Ok((second, _)) => self.queued_tok = second,
                Err(e) => self.queued_err = Some(e),
            }
        }
        Ok(emitted)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(tok) = self.queued_tok.take() {
            return Some(Ok(tok));
        }
        if let Some(e) = self.queued_err.take() {
            self.failed = true;
            return Some(Err(e));
        }
        while let Some((at, c)) = self.chars.next() {
            match self.feed(at, c) {
                Ok(Some(tok)) => return Some(Ok(tok)),
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        if !self.flushed {
            self.flushed = true;
            match self.machine.flush() {
                Ok(Some(tok)) => return Some(Ok(tok)),
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        if self.machine.in_group {
            self.failed = true;
            return Some(Err(ScanError::UnterminatedGroup(self.machine.group_start)));
        }
        None
    }
}

/// Scan the whole source eagerly.
pub fn scan(source: &str) -> Result<Vec<Token>, ScanError> {
    Lexer::new(source)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).expect("scan").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn names_split_on_character_class() {
        let toks = scan("ID:OpCode").expect("scan");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].text, "ID");
        assert_eq!(toks[0].offset, 0);
        assert_eq!(toks[1].text, "OpCode");
        assert_eq!(toks[1].offset, 3);
    }

    #[test]
    fn trailing_token_is_flushed() {
        // the end of input closes a token just like a terminator would
        let toks = scan("Manufacturer").expect("scan");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Name);
        assert_eq!(toks[0].text, "Manufacturer");

        let toks = scan("Port[13").expect("scan");
        assert_eq!(toks[1].kind, TokenKind::LengthLiteral(13));
    }

    #[test]
    fn string_literal_excludes_quotes() {
        let toks = scan("ID:\"SLLCPv\"").expect("scan");
        assert_eq!(toks[1].kind, TokenKind::StringLiteral);
        assert_eq!(toks[1].text, "SLLCPv");
        assert_eq!(toks[1].offset, 4);
    }

    #[test]
    fn group_tokens_and_flag_widths() {
        assert_eq!(
            kinds("Flags:{Re[2] HW}"),
            vec![
                TokenKind::Name,
                TokenKind::GroupOpen,
                TokenKind::FlagName,
                TokenKind::LengthLiteral(2),
                TokenKind::FlagName,
                TokenKind::GroupClose,
            ]
        );
    }

    #[test]
    fn replayed_terminator_closes_group() {
        // `}` first terminates the flag name, then acts in GroupReady
        let toks = scan("{HW}").expect("scan");
        assert_eq!(
            toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::GroupOpen, TokenKind::FlagName, TokenKind::GroupClose]
        );
    }

    #[test]
    fn append_is_its_own_token() {
        assert_eq!(
            kinds("+0"),
            vec![TokenKind::Append, TokenKind::NumberLiteral(0)]
        );
    }

    #[test]
    fn append_passes_the_next_character_through_to_ready() {
        // a letter right after `+` starts a name, not a flag
        assert_eq!(kinds("+pad"), vec![TokenKind::Append, TokenKind::Name]);
    }

    #[test]
    fn digits_inside_group_scan_as_numbers() {
        assert_eq!(
            kinds("{7}"),
            vec![
                TokenKind::GroupOpen,
                TokenKind::NumberLiteral(7),
                TokenKind::GroupClose,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_the_opening_quote() {
        let err = scan("ID:\"SLLC").unwrap_err();
        assert_eq!(err, ScanError::UnterminatedString(3));
    }

    #[test]
    fn unterminated_group_reports_the_opening_brace() {
        let err = scan("Flags:{HW").unwrap_err();
        assert_eq!(err, ScanError::UnterminatedGroup(6));
    }

    #[test]
    fn flag_name_is_still_flushed_before_the_group_error() {
        let mut lexer = Lexer::new("{HW").expect("lexer");
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::GroupOpen);
        assert_eq!(lexer.next().unwrap().unwrap().text, "HW");
        assert_eq!(
            lexer.next().unwrap().unwrap_err(),
            ScanError::UnterminatedGroup(0)
        );
        assert!(lexer.next().is_none());
    }

    #[test]
    fn mismatched_close_at_top_level() {
        assert_eq!(scan("a} b").unwrap_err(), ScanError::MismatchedGroupClose(1));
        // the name completed by the `}` is still delivered first
        let mut lexer = Lexer::new("a}").expect("lexer");
        assert_eq!(lexer.next().unwrap().unwrap().text, "a");
        assert!(lexer.next().unwrap().is_err());
    }

    #[test]
    fn empty_length_rejected() {
        assert_eq!(
            scan("Port[]").unwrap_err(),
            ScanError::EmptyArrayDeclaration(4)
        );
        assert_eq!(
            scan("Port[ ]").unwrap_err(),
            ScanError::EmptyArrayDeclaration(4)
        );
    }

    #[test]
    fn number_overflow_rejected() {
        let err = scan("99999999999999999999 ").unwrap_err();
        assert_eq!(err, ScanError::InvalidNumber(0));
    }

    #[test]
    fn oversized_source_fails_fast() {
        let big = "a".repeat(MAX_SOURCE_LEN + 1);
        assert!(matches!(
            Lexer::new(&big),
            Err(ScanError::SourceTooLong(_))
        ));
    }

    #[test]
    fn iterator_is_fused_after_an_error() {
        let mut lexer = Lexer::new("}x").expect("lexer");
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
        assert!(lexer.next().is_none());
    }
}
