use serde::{Deserialize, Serialize};

/// Naming knobs for the emitted class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Appended to the capitalized generator name
    pub class_suffix: String,
    /// Name of the private field holding the state record
    pub state_field: String,
    /// Program-counter key inside the state record
    pub counter_field: String,
    /// Preferred name of the `nextStep` parameter
    pub resume_param: String,
    /// Message of the error thrown for an unknown program counter
    pub invalid_step_message: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            class_suffix: "Generator".to_string(),
            state_field: "state".to_string(),
            counter_field: "nextStep".to_string(),
            resume_param: "value".to_string(),
            invalid_step_message: "Invalid next step".to_string(),
        }
    }
}
