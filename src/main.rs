use boxjoint::cli::{run, Cli};
use boxjoint::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    if !run(&cli)? {
        std::process::exit(2);
    }

    Ok(())
}
