//! # Received events and acknowledgment tokens.

use super::Headers;

/// Event name that triggers the cleanup path. Compared case-sensitively.
pub const FATAL_EVENT: &str = "PROCESS_STATE_FATAL";

/// Token announcing that the listener can accept the next event.
pub const READY_TOKEN: &[u8] = b"READY\n";

/// One event delivered by the supervisor.
///
/// Created by a [`Transport`](super::Transport), inspected once by the loop
/// and dropped at the end of the iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Header block of the event.
    pub headers: Headers,
    /// Raw payload (`len` bytes, lossily decoded as UTF-8).
    pub payload: String,
}

impl Envelope {
    /// Creates an envelope from already parsed parts.
    pub fn new(headers: Headers, payload: impl Into<String>) -> Self {
        Self {
            headers,
            payload: payload.into(),
        }
    }

    /// Returns the `eventname` header, if any.
    pub fn eventname(&self) -> Option<&str> {
        self.headers.eventname()
    }

    /// True if this is exactly a `PROCESS_STATE_FATAL` notification.
    ///
    /// # Example
    /// ```
    /// use fatalvisor::{Envelope, Headers};
    ///
    /// let ev = Envelope::new(Headers::parse("eventname:PROCESS_STATE_FATAL").unwrap(), "");
    /// assert!(ev.is_fatal());
    /// let ev = Envelope::new(Headers::parse("eventname:process_state_fatal").unwrap(), "");
    /// assert!(!ev.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        self.eventname() == Some(FATAL_EVENT)
    }

    /// Parses the first payload line of a `PROCESS_STATE_*` event.
    ///
    /// Returns `None` for other event kinds or when the line is not a header line.
    pub fn process_headers(&self) -> Option<Headers> {
        if !self.eventname()?.starts_with("PROCESS_STATE") {
            return None;
        }
        let line = self.payload.lines().next()?;
        Headers::parse(line).ok().filter(|h| !h.is_empty())
    }
}

/// Acknowledgment sent back after each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Event handled (`RESULT 2\nOK`).
    Ok,
    /// Event rejected; the supervisor will redeliver it (`RESULT 4\nFAIL`).
    Fail,
}

impl Ack {
    /// Wire representation of the token.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Ack::Ok => b"RESULT 2\nOK",
            Ack::Fail => b"RESULT 4\nFAIL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(header: &str, payload: &str) -> Envelope {
        Envelope::new(Headers::parse(header).unwrap(), payload)
    }

    #[test]
    fn result_tokens_carry_body_length() {
        for ack in [Ack::Ok, Ack::Fail] {
            let wire = std::str::from_utf8(ack.as_bytes()).unwrap();
            let (head, body) = wire.split_once('\n').unwrap();
            let declared: usize = head.trim_start_matches("RESULT ").parse().unwrap();
            assert_eq!(declared, body.len());
        }
    }

    #[test]
    fn process_headers_read_first_payload_line() {
        let ev = envelope(
            "eventname:PROCESS_STATE_FATAL len:60",
            "processname:ibgateway groupname:ibgateway from_state:BACKOFF",
        );
        let ph = ev.process_headers().unwrap();
        assert_eq!(ph.get("processname"), Some("ibgateway"));
        assert_eq!(ph.get("from_state"), Some("BACKOFF"));
    }

    #[test]
    fn process_headers_ignored_for_other_events() {
        let ev = envelope("eventname:TICK_5 len:15", "when:1201063880");
        assert!(ev.process_headers().is_none());

        let ev = envelope("eventname:PROCESS_STATE_FATAL len:3", "???");
        assert!(ev.process_headers().is_none());
    }

    #[test]
    fn missing_eventname_is_not_fatal() {
        let ev = envelope("len:0", "");
        assert!(!ev.is_fatal());
    }
}
