//! Typed access to tool call arguments.

use crate::error::AuroraError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AuroraError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuroraError::InvalidArgument(format!("Missing string argument: {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_str_reads_present_keys_and_rejects_absent_ones() {
        let args = ToolArguments::new(serde_json::json!({ "query": "hello" }));
        assert_eq!(args.get_str("query").unwrap(), "hello");

        let err = args.get_str("missing").unwrap_err();
        assert!(matches!(err, AuroraError::InvalidArgument(_)));
    }
}
