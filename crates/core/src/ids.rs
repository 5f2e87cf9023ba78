use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TempolensError};

/// A trace ID as the backend knows it. Hex, base64 or anything else is kept
/// verbatim; escaping for a URL is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(TempolensError::InvalidArgument(format!(
                "invalid trace id: {input:?}"
            )));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
