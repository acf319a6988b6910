//! Change notifications pushed on `/api/stream`.
//!
//! A message only says *that* something changed. Its tag picks the toast text;
//! the data itself is always refetched.

use status_registry::parse_envelope;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTag {
    ServiceCreated,
    ServiceUpdated,
    ServiceDeleted,
    IncidentCreated,
    IncidentUpdated,
    IncidentDeleted,
    UpdateAdded,
    Unrecognized(String),
}

impl EventTag {
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "service_created" => EventTag::ServiceCreated,
            "service_updated" => EventTag::ServiceUpdated,
            "service_deleted" => EventTag::ServiceDeleted,
            "incident_created" => EventTag::IncidentCreated,
            "incident_updated" => EventTag::IncidentUpdated,
            "incident_deleted" => EventTag::IncidentDeleted,
            "incident_update_added" => EventTag::UpdateAdded,
            other => EventTag::Unrecognized(other.to_string()),
        }
    }

    pub fn notification(&self) -> Option<&'static str> {
        match self {
            EventTag::ServiceCreated => Some("Service created"),
            EventTag::ServiceUpdated => Some("Service updated"),
            EventTag::ServiceDeleted => Some("Service deleted"),
            EventTag::IncidentCreated => Some("Incident created"),
            EventTag::IncidentUpdated => Some("Incident updated"),
            EventTag::IncidentDeleted => Some("Incident deleted"),
            EventTag::UpdateAdded => Some("Incident update added"),
            EventTag::Unrecognized(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamEvent {
    pub tag: EventTag,
    pub id: Option<String>,
}

/// `None` when the payload is not a `{ "event": ... }` object.
pub fn parse_message(data: &str) -> Option<StreamEvent> {
    let envelope = parse_envelope(data).ok()?;
    if !envelope.is_known() {
        debug!(event = %envelope.event, "unrecognized stream event");
    }
    Some(StreamEvent {
        tag: EventTag::from_wire(&envelope.event),
        id: envelope.id,
    })
}

/// Largest line or event the decoder buffers. Anything longer is dropped
/// up to its next terminator.
pub const MAX_EVENT_BYTES: usize = 256 * 1024;

/// Incremental `text/event-stream` framing. Yields the joined `data:` lines of
/// each event once its terminating blank line has arrived. Lines end in
/// `\n`, `\r\n` or a lone `\r`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    data_len: usize,
    after_cr: bool,
    skip_line: bool,
    skip_event: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<String> {
        if self.after_cr && !chunk.is_empty() {
            self.after_cr = false;
            if chunk[0] == b'\n' {
                chunk = &chunk[1..];
            }
        }
        self.pending.extend_from_slice(chunk);
        let mut out = Vec::new();

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n' || *b == b'\r') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            if raw[pos] == b'\r' {
                match self.pending.first() {
                    Some(b'\n') => {
                        self.pending.drain(..1);
                    }
                    Some(_) => {}
                    None => self.after_cr = true,
                }
            }
            if std::mem::take(&mut self.skip_line) {
                continue;
            }
            let line = String::from_utf8_lossy(&raw[..pos]);
            self.take_line(&line, &mut out);
        }

        if self.pending.len() > MAX_EVENT_BYTES {
            warn!(len = self.pending.len(), "dropping oversized event stream line");
            self.pending.clear();
            self.skip_line = true;
        }
        out
    }

    fn take_line(&mut self, line: &str, out: &mut Vec<String>) {
        if line.is_empty() {
            if !self.skip_event && !self.data.is_empty() {
                out.push(self.data.join("\n"));
            }
            self.data.clear();
            self.data_len = 0;
            self.skip_event = false;
            return;
        }
        if line.starts_with(':') || self.skip_event {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field != "data" {
            return;
        }
        self.data_len += value.len() + 1;
        if self.data_len > MAX_EVENT_BYTES {
            warn!(len = self.data_len, "dropping oversized event");
            self.data.clear();
            self.skip_event = true;
            return;
        }
        self.data.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_tags_have_notifications() {
        for tag in status_registry::EVENT_TAGS {
            assert!(
                EventTag::from_wire(tag).notification().is_some(),
                "no notification for {tag}"
            );
        }
        assert_eq!(EventTag::from_wire("heartbeat").notification(), None);
    }

    #[test]
    fn parses_backend_payload() {
        let event = parse_message(r#"{"event":"incident_update_added","id":"i1"}"#).expect("event");
        assert_eq!(event.tag, EventTag::UpdateAdded);
        assert_eq!(event.id.as_deref(), Some("i1"));
        assert_eq!(parse_message("not json"), None);
    }

    #[test]
    fn unknown_events_still_parse() {
        let event = parse_message(r#"{"event":"service_archived"}"#).expect("event");
        assert_eq!(event.tag, EventTag::Unrecognized("service_archived".into()));
        assert_eq!(event.tag.notification(), None);
    }

    #[test]
    fn decoder_splits_on_blank_lines() {
        let mut decoder = SseDecoder::new();
        let out = decoder.feed(b"data: {\"event\":\"service_created\"}\n\ndata: second\n\n");
        assert_eq!(out, vec![r#"{"event":"service_created"}"#.to_string(), "second".into()]);
    }

    #[test]
    fn decoder_handles_split_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"ev").is_empty());
        assert!(decoder.feed(b"ent\":\"x\"}\r\n").is_empty());
        assert_eq!(decoder.feed(b"\r\n"), vec![r#"{"event":"x"}"#.to_string()]);
    }

    #[test]
    fn decoder_accepts_lone_carriage_returns() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"data: a\rdata: b\r\r"), vec!["a\nb".to_string()]);

        assert!(decoder.feed(b"data: c\r").is_empty());
        assert_eq!(decoder.feed(b"\n\r\n"), vec!["c".to_string()]);
    }

    #[test]
    fn decoder_drops_unterminated_flood() {
        let mut decoder = SseDecoder::new();
        let flood = vec![b'x'; MAX_EVENT_BYTES + 1];
        assert!(decoder.feed(&flood).is_empty());
        assert!(decoder.pending.len() <= MAX_EVENT_BYTES);

        let out = decoder.feed(b"xxx\ndata: ok\n\n");
        assert_eq!(out, vec!["ok".to_string()]);
    }

    #[test]
    fn decoder_drops_oversized_event() {
        let mut decoder = SseDecoder::new();
        let line = format!("data: {}\n", "y".repeat(MAX_EVENT_BYTES / 2));
        let mut big = line.repeat(3);
        big.push_str("\ndata: next\n\n");
        assert_eq!(decoder.feed(big.as_bytes()), vec!["next".to_string()]);
    }

    #[test]
    fn decoder_skips_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let out = decoder.feed(b": keep-alive\n\nevent: message\nid: 7\ndata: a\ndata: b\n\n");
        assert_eq!(out, vec!["a\nb".to_string()]);
    }
}
