#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod fill;
mod labels;
mod llm;
mod prelude;
mod template;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Fill the blank fields of a DOCX template with values resolved from a JSON data file"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DOCFILL_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Fill a template's blank fields from a JSON data file
    Fill(fill::FillOptions),

    /// List the blank-field labels detected in a template
    Labels(labels::LabelsOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Fill(options) => crate::fill::run(options, app.global).await,
        SubCommands::Labels(options) => crate::labels::run(options, app.global).await,
    }
}
