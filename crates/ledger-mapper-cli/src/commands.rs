use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ledger-mapper")]
#[command(
    about = "Plan normalized destinations for accounting ledger spreadsheets",
    long_about = None
)]
pub struct Cli {
    /// Folder holding one subfolder per entity. Defaults to `root_path` from Config.toml
    #[arg(env = "LEDGER_MAPPER_ROOT")]
    pub root: Option<String>,
}
