//! Line-oriented REPL for durakv.
//!
//! Commands: `set <k> <v…>`, `get <k>`, `del <k>`, `begin`, `commit`,
//! `abort`, `debug`, `clear`, `exit`/`quit`. No sub-primitives to route
//! between, so this stays a plain `bufio`-style read loop rather than
//! a `clap`/`rustyline` shell.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use durakv_engine::{Store, StoreConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./durakv-data".to_string());

    let mut store = match Store::open(StoreConfig::new(dir)) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open durakv: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("durakv CLI. Commands: set <k> <v…>, get <k>, del <k>, begin, commit, abort, debug, clear, exit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else { continue };

        match cmd {
            "set" => {
                let key = parts.next();
                let rest: Vec<&str> = parts.collect();
                match key {
                    Some(key) if !rest.is_empty() => {
                        let value = rest.join(" ");
                        if let Err(err) = store.set(key, &value) {
                            println!("error: {err}");
                        }
                    }
                    _ => println!("usage: set <key> <value...>"),
                }
            }
            "get" => match parts.next() {
                Some(key) => match store.get(key) {
                    Some(value) => println!("{value:?}"),
                    None => println!("(nil)"),
                },
                None => println!("usage: get <key>"),
            },
            "del" => match parts.next() {
                Some(key) => {
                    if let Err(err) = store.del(key) {
                        println!("error: {err}");
                    }
                }
                None => println!("usage: del <key>"),
            },
            "begin" => store.begin(),
            "commit" => {
                if let Err(err) = store.commit() {
                    println!("error: {err}");
                }
            }
            "abort" => store.abort(),
            "debug" => println!("{}", store.debug_summary()),
            "exit" | "quit" => break,
            "clear" => {
                print!("Are you sure you want to clear the database? (Y/N): ");
                let _ = io::stdout().flush();
                let Some(Ok(confirm)) = lines.next() else {
                    continue;
                };
                if matches!(confirm.trim(), "Y" | "y") {
                    match store.clear() {
                        Ok(()) => println!("Database cleared."),
                        Err(err) => println!("Error clearing database: {err}"),
                    }
                } else {
                    println!("Clear cancelled.");
                }
            }
            _ => println!("Unknown command."),
        }
    }

    if let Err(err) = store.close() {
        eprintln!("error on close: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
