//! The `wac` binary.

use std::process::ExitCode;

use clap::Parser;
use wac_cli::{CliArgs, WacCli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let cli = match WacCli::from_args("wac", &args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("wac: {e}");
            return ExitCode::from(2);
        }
    };

    match cli.run(args, &mut std::io::stdout()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("wac: {e}");
            ExitCode::from(2)
        }
    }
}
