use clap::Parser;
use lispy::cli::CliArgs;
use lispy::driver;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(args.log_filter()))
        .init();

    match &args.script {
        Some(path) => {
            if driver::run_script(path) {
                std::process::ExitCode::SUCCESS
            } else {
                std::process::ExitCode::FAILURE
            }
        }
        None => {
            driver::run_repl(&args.prompt);
            std::process::ExitCode::SUCCESS
        }
    }
}
