pub mod extract;
pub mod prompt;

pub use extract::{extract_mapping, MappingError};
pub use prompt::build_mapping_prompt;
