use std::path::{Path, PathBuf};

use crate::prelude::{println, *};
use colored::Colorize;
use docfill_core::scan::FieldMapping;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct FillOptions {
    /// Template DOCX file with blank fields (____ or ....)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// JSON data file with the values to fill in
    #[clap(long, short = 'd')]
    pub data: PathBuf,

    /// Output DOCX path (defaults to the template name with a ".filled" suffix)
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Model used to map field labels to data values
    #[arg(long, env = "DOCFILL_MODEL", default_value = "gpt-4.1-mini")]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// API key for the mapping service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

pub async fn run(options: FillOptions, global: crate::Global) -> Result<()> {
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.template));

    println!(
        "{} Loading data from {}...",
        "[1/4]".cyan().bold(),
        options.data.display()
    );
    let data = load_data(&options.data)?;

    println!(
        "{} Extracting field labels from {}...",
        "[2/4]".cyan().bold(),
        options.template.display()
    );
    let mut doc = docx::Document::open(&options.template)
        .wrap_err_with(|| f!("Failed to open template '{}'", options.template.display()))?;
    let labels = crate::template::extract_document_labels(&doc);
    if global.verbose {
        println!(
            "  {} text blocks, {} distinct labels",
            doc.block_count(),
            labels.len()
        );
        for label in &labels {
            println!("    {}", label);
        }
    }

    let mapping = if labels.is_empty() {
        println!(
            "{} No blank fields found, skipping the mapping request",
            "[3/4]".cyan().bold()
        );
        FieldMapping::new()
    } else {
        println!(
            "{} Requesting label mapping from {}...",
            "[3/4]".cyan().bold(),
            options.model
        );
        crate::llm::map_labels(
            &labels,
            &data,
            &options.api_key,
            &options.base_url,
            &options.model,
        )
        .await?
    };
    if global.verbose {
        for (label, value) in &mapping {
            println!("    {} = {:?}", label.green(), value);
        }
    }

    println!("{} Filling template...", "[4/4]".cyan().bold());
    let rewritten = crate::template::fill_document(&mut doc, &mapping)?;
    doc.save(&output)
        .wrap_err_with(|| f!("Failed to save filled document to '{}'", output.display()))?;

    println!(
        "{} Saved filled document to {} ({} blocks rewritten)",
        "[DONE]".green().bold(),
        output.display(),
        rewritten
    );

    Ok(())
}

/// Default output path: the template name with `.filled` inserted before
/// the extension.
fn default_output_path(template: &Path) -> PathBuf {
    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");
    template.with_file_name(f!("{stem}.filled.docx"))
}

fn load_data(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("Failed to read data file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .wrap_err_with(|| f!("Invalid JSON in data file '{}'", path.display()))
}
