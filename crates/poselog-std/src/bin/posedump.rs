//! Pose stream dump utility.
//!
//! Usage: posedump <file> [options]
//!
//! Options:
//!   --strict             Exit with status 1 if any chunk has diagnostics
//!   --hand-offset <F>    Add F to the y position of hand poses
//!   --per-track-carry    Carry forward per track instead of globally
//!   --zero-fill          Missing axes of a present block read as zero
//!   --balanced           Match record braces instead of cutting at the last `}`
//!   --forward-z-up-y     Write positions as (z, x, y)
//!   --cache <path>       Read/refresh a `.plog` cache next to the log
//!   --format <fmt>       csv (default), summary or frames
//!   -v, -vv              Trace parsing to stderr

use std::env;
use std::process;

use poselog_core::model::Position;
use poselog_core::table::{AxisMapping, write_csv};
use poselog_core::timeline::frames;
use poselog_core::trace::{TraceEvent, TraceLevel, Tracer};
use poselog_core::{AxisFill, CarryScope, ChunkMode, ParseOptions, PoseStream, Track};
use poselog_std::{load_stream_cached, load_stream_traced};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Summary,
    Frames,
}

struct Args {
    path: String,
    options: ParseOptions,
    mapping: AxisMapping,
    cache: Option<String>,
    format: Format,
    strict: bool,
    verbosity: u8,
}

/// Prints events to stderr.
struct StderrTracer {
    level: TraceLevel,
}

impl Tracer for StderrTracer {
    fn level(&self) -> TraceLevel {
        self.level
    }

    fn trace(&mut self, level: TraceLevel, event: TraceEvent<'_>) {
        eprintln!("[{level:?}] {event}");
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!(
                "Usage: {} <file> [--strict] [--hand-offset F] [--per-track-carry] [--zero-fill] \
                 [--balanced] [--forward-z-up-y] [--cache PATH] [--format csv|summary|frames] [-v]",
                args.first().map_or("posedump", String::as_str)
            );
            process::exit(1);
        }
    };

    let result = match &args.cache {
        Some(cache) => load_stream_cached(&args.path, cache, &args.options),
        None => {
            let level = match args.verbosity {
                0 => TraceLevel::Warn,
                1 => TraceLevel::Debug,
                _ => TraceLevel::Trace,
            };
            load_stream_traced(&args.path, &args.options, &mut StderrTracer { level })
        }
    };
    let stream = match result {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("{}: {e}", args.path);
            process::exit(1);
        }
    };

    match args.format {
        Format::Csv => {
            let mut out = String::new();
            if write_csv(&stream.records, &args.mapping, &mut out).is_err() {
                eprintln!("failed to render CSV");
                process::exit(1);
            }
            print!("{out}");
        }
        Format::Summary => print_summary(&stream),
        Format::Frames => print_frames(&stream, &args.mapping),
    }

    if args.strict && !stream.diagnostics.is_empty() {
        for d in &stream.diagnostics {
            eprintln!(
                "{}: chunk {}: {:?}: {}",
                args.path, d.chunk, d.diagnostic.severity, d.diagnostic.message
            );
        }
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut options = ParseOptions::default();
    let mut mapping = AxisMapping::IDENTITY;
    let mut cache = None;
    let mut format = Format::Csv;
    let mut strict = false;
    let mut verbosity = 0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strict" => strict = true,
            "--per-track-carry" => options = options.with_carry_scope(CarryScope::PerTrack),
            "--zero-fill" => options = options.with_axis_fill(AxisFill::Zero),
            "--balanced" => options = options.with_chunk_mode(ChunkMode::Balanced),
            "--forward-z-up-y" => mapping = AxisMapping::FORWARD_Z_UP_Y,
            "--hand-offset" => {
                let value = iter.next().ok_or("Missing value for --hand-offset")?;
                let offset = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid --hand-offset value `{value}`"))?;
                options = options.with_hand_vertical_offset(offset);
            }
            "--cache" => {
                cache = Some(iter.next().ok_or("Missing value for --cache")?.clone());
            }
            "--format" => {
                format = match iter.next().map(String::as_str) {
                    Some("csv") => Format::Csv,
                    Some("summary") => Format::Summary,
                    Some("frames") => Format::Frames,
                    Some(other) => return Err(format!("Unknown format `{other}`")),
                    None => return Err("Missing value for --format".into()),
                };
            }
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = 2,
            flag if flag.starts_with('-') => return Err(format!("Unknown option `{flag}`")),
            file => {
                if path.replace(file.to_owned()).is_some() {
                    return Err("Expected exactly one file".into());
                }
            }
        }
    }

    Ok(Args {
        path: path.ok_or("Missing file argument")?,
        options,
        mapping,
        cache,
        format,
        strict,
        verbosity,
    })
}

fn print_summary(stream: &PoseStream) {
    println!("chunks:      {}", stream.chunks);
    println!("records:     {}", stream.len());
    println!("dropped:     {}", stream.dropped);
    println!("diagnostics: {}", stream.diagnostics.len());

    for (track, name) in Track::ALL
        .into_iter()
        .zip(["hmd", "left hand", "right hand", "other"])
    {
        println!("  {name:<12}{}", stream.track(track).count());
    }

    let first = stream.iter().map(|r| r.timestamp).min();
    let last = stream.iter().map(|r| r.timestamp).max();
    if let (Some(first), Some(last)) = (first, last) {
        println!("time range:  {first}..={last}");
    }
}

fn print_frames(stream: &PoseStream, mapping: &AxisMapping) {
    let cell = |position: Option<Position>| match position {
        Some(p) => {
            let p = mapping.apply(p);
            format!("{:.4},{:.4},{:.4}", p.x, p.y, p.z)
        }
        None => "-".to_owned(),
    };

    println!("timestamp\thmd\tright_hand\tleft_hand");
    for frame in frames(&stream.records) {
        println!(
            "{}\t{}\t{}\t{}",
            frame.timestamp,
            cell(frame.hmd),
            cell(frame.right_hand),
            cell(frame.left_hand)
        );
    }
}
