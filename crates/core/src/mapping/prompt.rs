use serde_json::Value;

/// Build the mapping-service prompt from the extracted labels and the raw
/// data object.
///
/// The prompt restates the provider contract: a value for every label with
/// a plausible correspondent in the data, an empty string otherwise, no
/// invented labels, and a bare JSON object as the only output.
pub fn build_mapping_prompt(labels: &[String], data: &Value) -> String {
    let labels_json = serde_json::to_string_pretty(labels).unwrap();
    let data_json = serde_json::to_string_pretty(data).unwrap();

    format!(
        "You receive:\n\
         1) A list of field labels extracted from a document template\n\
         2) A JSON object with data\n\
         \n\
         Your task:\n\
         - For each label, decide which value from the data belongs in that field\n\
         - If no suitable correspondent exists, use \"\" (empty string)\n\
         - Do not invent labels that are not in the list\n\
         - Return STRICTLY a single JSON object mapping each label to a string value\n\
         \n\
         Labels:\n{labels_json}\n\
         \n\
         Data:\n{data_json}"
    )
}
