use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use runegram::json;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file to parse (stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let input = match args.file.as_ref() {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("Failed to read {}: {}", path, err);
            std::process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).unwrap_or_else(|err| {
                eprintln!("Failed to read stdin: {}", err);
                std::process::exit(1);
            });
            buffer
        }
    };

    match json::parse_str(&input) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
