use clap::Parser;

use britescript_cli::{run, Cli};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    run(cli)
}
