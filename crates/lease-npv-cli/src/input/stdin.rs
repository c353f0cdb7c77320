use serde_json::Value;
use std::io::{self, Read};

/// Piped stdin as a JSON value. YAML is accepted when the text is not JSON.
/// `None` for an interactive terminal or blank input.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    parse_piped(&text)
}

fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => {
            tracing::debug!(error = %json_err, "stdin is not JSON, trying YAML");
            let value: Value = serde_yaml::from_str(text)
                .map_err(|_| format!("stdin is neither valid JSON nor YAML: {json_err}"))?;
            Ok(Some(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_and_yaml_accepted() {
        let from_json = parse_piped(r#"{"time_period": 5}"#).unwrap();
        let from_yaml = parse_piped("time_period: 5\n").unwrap();
        assert_eq!(from_json, Some(json!({ "time_period": 5 })));
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_piped("{ not: [valid").is_err());
    }
}
