//! Chunk dump utility for inspecting how a log is split and parsed.
//!
//! Usage: chunks <file> [--balanced] [--strict]
//!
//! Prints every chunk as `#INDEX<TAB>LEN bytes`, followed by its field tree
//! and any diagnostics. With `--strict`, exits with status 1 if any chunk
//! produced a diagnostic.

use std::env;
use std::fs;
use std::process;

use poselog_core::ChunkMode;
use poselog_core::ast::{RawBlock, Value};
use poselog_core::chunk::chunks;
use poselog_core::lexer::Severity;
use poselog_core::parser::parse_chunk;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut path = None;
    let mut mode = ChunkMode::Legacy;
    let mut strict = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--balanced" => mode = ChunkMode::Balanced,
            "--strict" => strict = true,
            _ if path.is_none() && !arg.starts_with('-') => path = Some(arg.as_str()),
            _ => {
                eprintln!("Unexpected argument `{arg}`");
                path = None;
                break;
            }
        }
    }

    let Some(path) = path else {
        eprintln!(
            "Usage: {} <file> [--balanced] [--strict]",
            args.first().map_or("chunks", String::as_str)
        );
        process::exit(1);
    };

    let source = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{path}: {e}");
            process::exit(1);
        }
    };

    let mut diagnostics = 0;
    for (index, chunk) in chunks(&source, mode).enumerate() {
        println!("#{index}\t{} bytes", chunk.len());

        let parsed = parse_chunk(chunk);
        print_block(&parsed.root);

        for diag in &parsed.diagnostics {
            let severity = match diag.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            println!(
                "  {severity} at {}..{}: {}",
                diag.span.start, diag.span.end, diag.message
            );
        }
        diagnostics += parsed.diagnostics.len();
    }

    if strict && diagnostics > 0 {
        eprintln!("{path}: {diagnostics} diagnostics");
        process::exit(1);
    }
}

/// Print a block's fields, one per line, indented by depth.
///
/// Walks the tree with an explicit stack so deeply nested records print
/// without recursion.
fn print_block(block: &RawBlock) {
    // (fields still to print, depth); a finished nested block prints its `}`.
    let mut stack = vec![(block.fields.iter(), 1usize)];
    while let Some((fields, depth)) = stack.last_mut() {
        let depth = *depth;
        let Some(field) = fields.next() else {
            stack.pop();
            if depth > 1 {
                println!("{}}}", "  ".repeat(depth - 1));
            }
            continue;
        };

        let indent = "  ".repeat(depth);
        match &field.value {
            Value::Scalar(scalar) if scalar.quoted => {
                println!("{indent}{}: {:?}", field.key.name, scalar.as_str());
            }
            Value::Scalar(scalar) => println!("{indent}{}: {}", field.key.name, scalar.as_str()),
            Value::Block(child) => {
                println!("{indent}{} {{", field.key.name);
                stack.push((child.fields.iter(), depth + 1));
            }
        }
    }
}
