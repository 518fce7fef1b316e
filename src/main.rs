use clap::Parser;
use repoguard::cli::{Cli, Output, init_tracing};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let output = Output::new(cli.verbose > 0, cli.quiet);
    match cli.run().await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            output.error(&format!("{err:#}"));
            ExitCode::from(2)
        }
    }
}
