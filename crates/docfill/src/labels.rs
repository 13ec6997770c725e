use std::path::PathBuf;

use crate::prelude::{println, *};
use colored::Colorize;
use prettytable::{Cell, Row};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct LabelsOptions {
    /// Template DOCX file with blank fields (____ or ....)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: LabelsOptions, global: crate::Global) -> Result<()> {
    let doc = docx::Document::open(&options.template)
        .wrap_err_with(|| f!("Failed to open template '{}'", options.template.display()))?;

    let labels = crate::template::extract_document_labels(&doc);

    if global.verbose {
        println!("Scanned {} text blocks", doc.block_count());
    }

    if options.json {
        println!("{}", format_labels_json(&labels)?);
        return Ok(());
    }

    if labels.is_empty() {
        println!("{}", "No blank fields found.".yellow());
        return Ok(());
    }

    let table = labels_table(&labels);
    table.printstd();
    println!(
        "\n{} distinct labels in {}",
        labels.len().to_string().bold(),
        options.template.display()
    );

    Ok(())
}

/// Convert the label set to a JSON array string
fn format_labels_json(labels: &[String]) -> Result<String> {
    serde_json::to_string_pretty(labels).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Render the label set as a two-column table
fn labels_table(labels: &[String]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(Row::new(vec![Cell::new("#"), Cell::new("Label")]));
    for (idx, label) in labels.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&(idx + 1).to_string()),
            Cell::new(label),
        ]));
    }
    table
}
