//! Draw a packet layout diagram from its markup notation.
//!
//! Usage:
//!   draw_packet [OPTIONS] [NOTATION]
//!   draw_packet < layout.pkt
//!
//! Options:
//!   --example        Use the bundled SLLCP discovery-reply layout
//!   --tokens, -t     Print only the highlighted token stream
//!   --diagram, -d    Print only the ASCII diagram
//!   --no-color, -n   Plain output (no ANSI styling)
//!
//! With no notation argument, reads from stdin. Exit code 1 on scan or
//! parse errors, reported with their byte offset.

use anyhow::Context;
use crossterm::style::Stylize;
use pktmark::{highlight, parse, render, HighlightKind};
use std::io::Read;

/// Discovery-reply header of the SLLCP lighting-control protocol.
const EXAMPLE: &str = "ID:\"SLLCPv\"+0 OpCode Manufacturer[13]+0 ModelName[14]+0 Flags:{Re[2] DL[2] HW HE DC[2]} Interfaces:{DmxIn[4] DmxOut[4] MidiIn[4] MidiOut[4] LaserOut[4] StripOut[4]}";

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let use_example = if let Some(pos) = args.iter().position(|a| a == "--example") {
        args.remove(pos);
        true
    } else {
        false
    };
    let tokens_only = if let Some(pos) = args.iter().position(|a| a == "--tokens" || a == "-t") {
        args.remove(pos);
        true
    } else {
        false
    };
    let diagram_only = if let Some(pos) = args.iter().position(|a| a == "--diagram" || a == "-d") {
        args.remove(pos);
        true
    } else {
        false
    };
    let no_color = if let Some(pos) = args.iter().position(|a| a == "--no-color" || a == "-n") {
        args.remove(pos);
        true
    } else {
        false
    };

    let source = if use_example {
        EXAMPLE.to_string()
    } else if !args.is_empty() {
        args.join(" ")
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read notation from stdin")?;
        buf
    };
    let source = source.trim();

    if !diagram_only {
        let spans = match highlight(source) {
            Ok(spans) => spans,
            Err(e) => {
                eprintln!("draw_packet: {}", e);
                std::process::exit(1);
            }
        };
        for span in &spans {
            // padding values read best the way they land on the wire
            let text = match span.kind {
                HighlightKind::Padding => {
                    format!("0x{:X}", span.text.parse::<u64>().unwrap_or(0))
                }
                _ => span.text.clone(),
            };
            if no_color {
                print!(" {}", text);
            } else {
                let styled = match span.kind {
                    HighlightKind::Name => text.cyan(),
                    HighlightKind::FlagName => text.dark_cyan(),
                    HighlightKind::String => text.green(),
                    HighlightKind::Number | HighlightKind::Padding => text.yellow(),
                    HighlightKind::Length => text.white(),
                };
                print!(" {}", styled);
            }
        }
        println!();
    }

    if !tokens_only {
        let packet = match parse(source) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("draw_packet: {}", e);
                std::process::exit(1);
            }
        };
        for line in render(&packet) {
            println!("{}", line);
        }
    }
    Ok(())
}
