use clap::Parser;
use sigbench::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
