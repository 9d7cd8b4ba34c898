use clap::Parser;
use imp::cli::{Cli, Commands};
use imp::output::Printer;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => imp::cli::process::run(args)?,
        Commands::Sample(args) => imp::cli::sample::run(args, &Printer::new())?,
        Commands::Completions(args) => imp::cli::completions::run(args)?,
    }

    Ok(())
}
