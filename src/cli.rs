//! Command-line surface: an optional script to load, plus verbosity and
//! prompt-string overrides for the REPL.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, author, about = "An interactive interpreter for Lispy")]
pub struct CliArgs {
    /// A Lispy source file to load and run non-interactively.
    pub script: Option<String>,

    /// Increase logging verbosity (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Override the REPL prompt string.
    #[arg(long, default_value = "lispy> ")]
    pub prompt: String,
}

impl CliArgs {
    /// Translates the repeated `-v` count into an `EnvFilter` directive,
    /// deferring to `RUST_LOG` when it's set.
    pub fn log_filter(&self) -> String {
        if std::env::var("RUST_LOG").is_ok() {
            return std::env::var("RUST_LOG").unwrap();
        }
        match self.verbose {
            0 => "warn".to_string(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
