use std::fmt;

use serde::de::DeserializeOwned;

/// A JSON decode failure with the document path where it happened.
#[derive(Debug)]
pub struct JsonPathError {
    pub path: String,
    pub source: serde_json::Error,
}

impl fmt::Display for JsonPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() || self.path == "." {
            write!(f, "{}", self.source)
        } else {
            write!(f, "at {}: {}", self.path, self.source)
        }
    }
}

impl std::error::Error for JsonPathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn parse_json_with_path<T: DeserializeOwned>(text: &str) -> Result<T, JsonPathError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let value = serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        JsonPathError {
            path,
            source: error.into_inner(),
        }
    })?;
    deserializer.end().map_err(|source| JsonPathError {
        path: String::new(),
        source,
    })?;
    Ok(value)
}
