//! One JSON object per notification. Optional fields are omitted rather than
//! written as null so the output stays greppable.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct TraceRecord<'a> {
    /// Notification kind, e.g. `task_begin`.
    pub ev: &'static str,
    /// Timestamp in nanoseconds, 0 for records that carry none.
    pub ts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl<'a> TraceRecord<'a> {
    pub fn new(ev: &'static str, ts: u64) -> Self {
        Self {
            ev,
            ts,
            name: None,
            domain: None,
            seq: None,
            id: None,
            parent: None,
            tid: None,
            depth: None,
            value: None,
        }
    }

    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn domain(mut self, domain: &'a str) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn tid(mut self, tid: u32) -> Self {
        self.tid = Some(tid);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let json = serde_json::to_string(&TraceRecord::new("pause", 0)).unwrap();
        assert_eq!(json, r#"{"ev":"pause","ts":0}"#);
    }

    #[test]
    fn populated_fields_serialize_in_declaration_order() {
        let record = TraceRecord::new("task_begin", 12)
            .name("parse")
            .seq(1)
            .tid(7)
            .value(json!({"k": 1}));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"ev":"task_begin","ts":12,"name":"parse","seq":1,"tid":7,"value":{"k":1}}"#
        );
    }
}
