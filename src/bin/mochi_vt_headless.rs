//! Mochi VT Headless Runner
//!
//! Feeds a byte stream from stdin or a file through the interpreter and
//! prints the resulting screen. Useful for checking how a recorded
//! session renders without a display.

use std::io::{self, Read};
use std::process::ExitCode;

use mochi_vt::{Terminal, VtConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut config_file: Option<String> = None;
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_events = false;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().ok();
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().ok();
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-e" | "--events" => {
                show_events = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_file {
        Some(path) => match VtConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => VtConfig::default(),
    };
    if let Some(cols) = cols {
        config.columns = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    let mut terminal = Terminal::new(config);
    terminal.interpret_bytes(&input_data);
    let snapshot = terminal.snapshot();

    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", snapshot.columns, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.column);
            if !snapshot.title.is_empty() {
                println!("Title: {}", snapshot.title);
            }
            println!("---");
            println!("{}", snapshot.to_text());
            println!("---");
        },
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    if show_events {
        for event in terminal.take_events() {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error serializing event: {}", e),
            }
        }
        for response in terminal.take_responses() {
            println!("response: {:?}", response);
        }
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Mochi VT Headless Runner");
    println!();
    println!("Usage: mochi-vt-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("      --config <PATH>  Load interpreter settings from a JSON file");
    println!("  -f, --file <PATH>    Read input from file");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -e, --events         Also print emitted events and replies");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Set RUST_LOG=debug to see how sequences were handled.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\x1b[31mWorld\\x1b[0m' | mochi-vt-headless");
    println!("  mochi-vt-headless -c 120 -r 40 session.log");
    println!("  mochi-vt-headless --json < session.log > snapshot.json");
}
