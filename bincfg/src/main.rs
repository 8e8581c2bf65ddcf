//! cfgtool: check configuration files and transcode them to other formats.
//!
//! Usage: cfgtool [OPTIONS] <COMMAND> [FILE|DIR]
//!
//! Commands:
//!   check    Parse the input and report `<file>: ok`
//!   json     Print the parsed tree as JSON
//!   yaml     Print the parsed tree as YAML
//!   toml     Print the parsed tree as TOML
//!
//! Options:
//!   --strict               Require a [mode] header before any key
//!   -m, --mode <NAME>      Output the catch-all section merged with NAME
//!   -w, --write            Write output next to the input with the format's extension
//!   -o, --output <FILE>    Write output to FILE
//!   -h, --help             Print help
//!   -V, --version          Print version

use libcfg::{parse, parse_strict, Document, Map};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Check,
    Json,
    Yaml,
    Toml,
}

impl Command {
    fn from_name(s: &str) -> Option<Command> {
        match s {
            "check" => Some(Command::Check),
            "json" => Some(Command::Json),
            "yaml" | "yml" => Some(Command::Yaml),
            "toml" => Some(Command::Toml),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Command::Check => "",
            Command::Json => "json",
            Command::Yaml => "yaml",
            Command::Toml => "toml",
        }
    }
}

struct Options<'a> {
    command: Command,
    strict: bool,
    mode: Option<&'a str>,
    write_back: bool,
    output_file: Option<&'a str>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut command: Option<Command> = None;
    let mut strict = false;
    let mut mode: Option<&str> = None;
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("cfgtool {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--strict" => {
                strict = true;
            }
            "-m" | "--mode" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --mode requires a mode name");
                    process::exit(1);
                }
                mode = Some(&args[i]);
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "-" => {
                // Explicit stdin
                if command.is_none() {
                    eprintln!("Error: missing command before input");
                    process::exit(1);
                }
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            arg if command.is_none() => match Command::from_name(arg) {
                Some(c) => command = Some(c),
                None => {
                    eprintln!("Error: {} sub command unknown", arg);
                    process::exit(1);
                }
            },
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        process::exit(1);
    };

    if write_back && output_file.is_some() {
        eprintln!("Error: --write and --output are mutually exclusive");
        process::exit(1);
    }
    if command == Command::Check && (write_back || output_file.is_some()) {
        eprintln!("Error: check does not produce output");
        process::exit(1);
    }

    let options = Options {
        command,
        strict,
        mode,
        write_back,
        output_file,
    };

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &options));
        }
    }

    let source: Vec<u8> = match input_path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&source, input_path, &options));
}

/// Process every `.conf` file in a directory; returns the exit code.
fn process_directory(dir_path: &str, options: &Options) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "conf").unwrap_or(false))
        .collect();
    paths.sort();

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let source = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&source, Some(&path_str), options) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Parse one input and emit the requested output; returns the exit code.
fn process_input(source: &[u8], input_file: Option<&str>, options: &Options) -> i32 {
    let label = input_file.unwrap_or("<stdin>");

    let parsed = if options.strict {
        parse_strict(source)
    } else {
        parse(source)
    };
    let doc = match parsed {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}: {}", label, e);
            return 1;
        }
    };

    let tree = match select(&doc, options.mode) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{}: {}", label, e);
            return 1;
        }
    };

    let output = match options.command {
        Command::Check => {
            println!("{}: ok", label);
            return 0;
        }
        Command::Json => serde_json::to_string_pretty(&tree).map_err(|e| e.to_string()),
        Command::Yaml => transcode::yaml::encode(&tree),
        Command::Toml => transcode::toml::encode(&tree),
    };

    match output {
        Ok(output) => write_text_output(&output, input_file, options),
        Err(e) => {
            eprintln!(
                "Error: Cannot convert to {}: {}",
                options.command.extension().to_uppercase(),
                e
            );
            1
        }
    }
}

/// The whole tree, or the merged view of one mode.
fn select(doc: &Document, mode: Option<&str>) -> Result<Map, libcfg::ConfigError> {
    match mode {
        Some(mode) => doc.merged(mode),
        None => Ok(doc.data().clone()),
    }
}

fn write_text_output(output: &str, input_file: Option<&str>, options: &Options) -> i32 {
    if let Some(path) = options.output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            return 1;
        }
    } else if options.write_back {
        let Some(input_path) = input_file else {
            eprintln!("Error: --write requires an input file");
            return 1;
        };
        let output_path = Path::new(input_path).with_extension(options.command.extension());
        if let Err(e) = fs::write(&output_path, output) {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            return 1;
        }
    } else {
        print!("{}", output);
        // Ensure output ends with newline
        if !output.ends_with('\n') {
            println!();
        }
    }
    0
}

fn print_help() {
    println!(
        "cfgtool - configuration file checker and transcoder

USAGE:
    cfgtool [OPTIONS] <COMMAND> [FILE|DIR]

COMMANDS:
    check    Check configuration file (exit 0 if valid, 1 if invalid)
    json     Configuration file to JSON
    yaml     Configuration file to YAML
    toml     Configuration file to TOML

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .conf files in it

OPTIONS:
    --strict               Require a [mode] header before the first key.
                           Without it, leading keys belong to the _all_ section.

    -m, --mode <NAME>      Output the _all_ section merged with mode NAME
                           instead of the whole tree

    -w, --write            Write output to file with inferred extension

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Check a configuration file
    cfgtool check app.conf

    # Check every .conf file in a directory, requiring mode headers
    cfgtool --strict check ./configs/

    # Convert to JSON
    cfgtool json app.conf

    # Production settings layered over the defaults, as YAML
    cfgtool --mode production yaml app.conf

    # Convert to TOML next to the input (app.toml)
    cfgtool -w toml app.conf
"
    );
}
