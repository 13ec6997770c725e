use crate::prelude::*;
use docfill_core::mapping::{build_mapping_prompt, extract_mapping};
use docfill_core::scan::FieldMapping;
use indicatif::{ProgressBar, ProgressStyle};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

const SYSTEM_PREAMBLE: &str = "\
You fill structured document templates from JSON data.
You receive a list of field labels extracted from a template and a JSON data object.

Rules:
- For every label with a plausible correspondent in the data, return its value as a string.
- Return \"\" (empty string) for labels with no suitable correspondent.
- Do not invent labels that are not in the list.
- Output STRICTLY a single JSON object mapping labels to string values. No markdown fences. No explanations. No commentary.";

fn create_client(api_key: &str, base_url: &str) -> Result<openai::Client> {
    openai::Client::builder()
        .api_key(api_key)
        .base_url(base_url)
        .build()
        .map_err(|e| eyre!("Failed to create OpenAI client: {}", e))
}

/// Ask the model which data value belongs in each labeled field.
///
/// Invoked exactly once per fill, between the extraction pass and the fill
/// pass. Any failure here is fatal to the run; the fill pass never executes
/// without a complete mapping.
pub async fn map_labels(
    labels: &[String],
    data: &serde_json::Value,
    api_key: &str,
    base_url: &str,
    model: &str,
) -> Result<FieldMapping> {
    let prompt = build_mapping_prompt(labels, data);
    log::debug!(
        "mapping prompt: {} chars for {} labels",
        prompt.len(),
        labels.len()
    );

    let client = create_client(api_key, base_url)?;
    let agent = client.agent(model).preamble(SYSTEM_PREAMBLE).build();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(f!("Waiting for {model}..."));

    let response = agent.prompt(&prompt).await;
    spinner.finish_and_clear();

    let response = response.map_err(|e| eyre!("Mapping request failed: {}", e))?;
    log::debug!("mapping response: {} chars", response.len());

    let mapping =
        extract_mapping(&response).map_err(|e| eyre!("Malformed mapping response: {}", e))?;

    // The contract forbids invented labels; drop any the model added anyway
    // so stray keys can never collide with a real label elsewhere.
    let mapping: FieldMapping = mapping
        .into_iter()
        .filter(|(label, _)| labels.contains(label))
        .collect();

    Ok(mapping)
}
