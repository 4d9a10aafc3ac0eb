//! Build the packet layout tree from the token stream.
//!
//! The builder keeps at most one pending `Simple` (the last bare name seen)
//! and at most one open flag group. A following `[n]` upgrades the pending
//! name to an array, a following `{` turns it into the group's name, and a
//! following string literal attaches to it; anything else commits it as a
//! zero-length marker.

use crate::ast::{Field, Packet, Unit};
use crate::lexer::{Lexer, ScanError};
use crate::token::TokenKind;

/// Name given to the implicit one-byte elements of an array.
const ELEMENT_NAME: &str = "byte";
/// Name given to `+0` padding fields.
const PAD_NAME: &str = "pad";
/// Cap on any single declared length and on total array cells. Bounds the
/// materialized tree on hostile input.
const MAX_DECLARED: u64 = 1 << 16;

/// Builder errors: scanning failures plus structural rules the token stream
/// cannot express.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("`+` at byte {0} must be followed by a literal 0")]
    UnsupportedAppendValue(usize),
    #[error("length at byte {0} exceeds the supported packet size")]
    LengthTooLarge(usize),
}

/// Parse notation source into a packet layout tree.
pub fn parse(source: &str) -> Result<Packet, ParseError> {
    let mut fields: Vec<Field> = Vec::new();
    // last bare name, waiting to become an array, a group name, or a marker
    let mut pending: Option<Field> = None;
    // open flag group: name and children collected so far
    let mut group: Option<(String, Vec<Field>)> = None;
    // offset of a `+` whose operand has not arrived yet
    let mut append_at: Option<usize> = None;
    // array cells materialized so far, kept under MAX_DECLARED
    let mut cells: u64 = 0;

    for tok in Lexer::new(source)? {
        let tok = tok?;

        if let Some(at) = append_at.take() {
            match tok.kind {
                TokenKind::NumberLiteral(0) => {
                    commit(&mut fields, pending.take());
                    fields.push(Field::Simple {
                        name: PAD_NAME.to_string(),
                        size: 1,
                        unit: Unit::Byte,
                        literal: None,
                    });
                    continue;
                }
                _ => return Err(ParseError::UnsupportedAppendValue(at)),
            }
        }

        match tok.kind {
            TokenKind::Name => {
                commit(&mut fields, pending.take());
                pending = Some(Field::Simple {
                    name: tok.text,
                    size: 0,
                    unit: Unit::Byte,
                    literal: None,
                });
            }
            TokenKind::StringLiteral => {
                // documents the value of the field named just before it;
                // with no such field it stays a token-stream-only annotation
                if let Some(Field::Simple { literal, .. }) = pending.as_mut() {
                    *literal = Some(tok.text);
                }
            }
            TokenKind::LengthLiteral(n) => {
                if n > MAX_DECLARED {
                    return Err(ParseError::LengthTooLarge(tok.offset));
                }
                if let Some((_, flags)) = group.as_mut() {
                    // bit-width of the flag declared just before
                    if let Some(Field::Simple { size, .. }) = flags.last_mut() {
                        *size = n;
                    }
                } else if let Some(Field::Simple { name, .. }) = pending.take() {
                    cells += n;
                    if cells > MAX_DECLARED {
                        return Err(ParseError::LengthTooLarge(tok.offset));
                    }
                    fields.push(Field::Array {
                        name,
                        element_size: 1,
                        children: vec![
                            Field::Simple {
                                name: ELEMENT_NAME.to_string(),
                                size: 1,
                                unit: Unit::Byte,
                                literal: None,
                            };
                            n as usize
                        ],
                    });
                }
                // a stray length with nothing before it has no structural meaning
            }
            TokenKind::GroupOpen => {
                let name = match pending.take() {
                    Some(Field::Simple { name, .. }) => name,
                    _ => String::new(),
                };
                group = Some((name, Vec::new()));
            }
            TokenKind::FlagName => {
                if let Some((_, flags)) = group.as_mut() {
                    flags.push(Field::Simple {
                        name: tok.text,
                        size: 1,
                        unit: Unit::Bit,
                        literal: None,
                    });
                }
            }
            TokenKind::GroupClose => {
                if let Some((name, children)) = group.take() {
                    fields.push(Field::FlagGroup { name, children });
                }
            }
            TokenKind::Append => {
                append_at = Some(tok.offset);
            }
            TokenKind::NumberLiteral(_) => {
                // a bare number documents a value; it adds nothing to the layout
            }
        }
    }

    if let Some(at) = append_at {
        return Err(ParseError::UnsupportedAppendValue(at));
    }
    commit(&mut fields, pending.take());
    Ok(Packet { fields })
}

fn commit(fields: &mut Vec<Field>, pending: Option<Field>) {
    if let Some(field) = pending {
        fields.push(field);
    }
}
