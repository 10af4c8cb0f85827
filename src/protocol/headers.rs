//! # Header lines.
//!
//! Both the event header block and the first line of a `PROCESS_STATE_*`
//! payload use the same shape: whitespace separated `key:value` tokens.
//!
//! ```text
//! ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:PROCESS_STATE_FATAL len:71
//! ```

use std::collections::HashMap;

use crate::error::ListenerError;

/// Parsed header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    /// Parses a header line.
    ///
    /// Each token is split at its first `:`. A token without `:` is a
    /// protocol error.
    ///
    /// # Example
    /// ```
    /// use fatalvisor::Headers;
    ///
    /// let h = Headers::parse("eventname:TICK_5 len:15").unwrap();
    /// assert_eq!(h.eventname(), Some("TICK_5"));
    /// assert_eq!(h.get("len"), Some("15"));
    /// ```
    pub fn parse(line: &str) -> Result<Self, ListenerError> {
        let mut fields = HashMap::new();
        for token in line.split_whitespace() {
            let (key, value) = token
                .split_once(':')
                .ok_or_else(|| ListenerError::protocol(format!("header token {token:?} has no ':'")))?;
            fields.insert(key.to_string(), value.to_string());
        }
        Ok(Self { fields })
    }

    /// Returns the raw value of a header.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the `eventname` header.
    pub fn eventname(&self) -> Option<&str> {
        self.get("eventname")
    }

    /// Returns the declared payload length (`len` header).
    pub fn payload_len(&self) -> Result<usize, ListenerError> {
        let raw = self
            .get("len")
            .ok_or_else(|| ListenerError::protocol("missing `len` header"))?;
        raw.parse()
            .map_err(|e| ListenerError::protocol(format!("invalid `len` {raw:?}: {e}")))
    }

    /// Number of parsed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no field was parsed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
