use answer_cli::Cli;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    answer_render::logging::init(cli.verbose);
    answer_cli::run(&cli)
}
