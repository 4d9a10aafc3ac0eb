//! # pktmark — Packet Layout Markup
//!
//! A compact notation for describing binary packet layouts, with a
//! highlighting tokenizer and an ASCII byte/bit diagram renderer. Meant for
//! protocol documentation: write the layout in one line, get a colored
//! token view and a fixed-width diagram back.
//!
//! ## Notation
//!
//! - `Name` — a zero-length named marker
//! - `Name:"literal"` — marker with an attached string value (magic bytes)
//! - `Name[n]` — array of n one-byte elements
//! - `+0` — one byte of zero padding
//! - `Name:{A B[2] C}` — packed bit flags; `[n]` is a bit-width (default 1)
//!
//! Whitespace and `:` are separators; they never change meaning.
//!
//! ## Example
//!
//! ```
//! use pktmark::{parse, render};
//!
//! let packet = parse("Flags:{Re[2] DL[2] HW HE DC[2]}").unwrap();
//! assert_eq!(packet.byte_len(), 1);
//! assert_eq!(render(&packet), vec!["| Re DL HW HE DC"]);
//! ```
//!
//! ## Pipeline
//!
//! Raw text → tokens ([`Lexer`]) → field tree ([`parse`]) → diagram
//! ([`render`]). [`highlight`] categorizes the token stream for display;
//! the `draw_packet` binary maps the categories to terminal colors.

pub mod ast;
pub mod highlight;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;

pub use ast::{Field, Packet, Unit};
pub use highlight::{highlight, HighlightKind, HighlightSpan};
pub use lexer::{scan, Lexer, ScanError, MAX_SOURCE_LEN};
pub use parser::{parse, ParseError};
pub use render::{render, render_to_string};
pub use token::{Token, TokenKind};
