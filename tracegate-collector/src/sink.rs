//! Where records go. A sink is a line-oriented writer picked once at init:
//! the file named by `TRACEGATE_TRACE_FILE`, or stderr when the variable is
//! unset. Locking lives with the caller; the sink itself is single-threaded.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};

use anyhow::Context;

use crate::record::TraceRecord;

/// Environment variable naming the output file. Records are appended, so an
/// existing trace survives a re-attach.
pub(crate) const TRACE_FILE_ENV: &str = "TRACEGATE_TRACE_FILE";

pub(crate) struct Sink {
    writer: Box<dyn Write + Send>,
}

/// Build the sink the environment asks for.
pub(crate) fn from_env() -> anyhow::Result<Sink> {
    match env::var_os(TRACE_FILE_ENV) {
        Some(path) if !path.is_empty() => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening trace file {}", path.to_string_lossy()))?;
            Ok(Sink {
                writer: Box::new(BufWriter::new(file)),
            })
        }
        _ => Ok(Sink::stderr()),
    }
}

impl Sink {
    pub(crate) fn stderr() -> Self {
        Self {
            writer: Box::new(io::stderr()),
        }
    }

    pub(crate) fn write_record(&mut self, record: &TraceRecord<'_>) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, record).context("serializing record")?;
        self.writer.write_all(b"\n").context("writing record")?;
        Ok(())
    }

    pub(crate) fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    /// A sink writing into memory, plus a handle to read it back.
    #[cfg(test)]
    pub(crate) fn capture() -> (Self, Capture) {
        use std::sync::Arc;

        let buffer = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Self {
            writer: Box::new(CaptureWriter(Arc::clone(&buffer))),
        };
        (sink, Capture(buffer))
    }
}

#[cfg(test)]
pub(crate) struct Capture(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

#[cfg(test)]
impl Capture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("records are UTF-8")
    }
}

#[cfg(test)]
struct CaptureWriter(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");

        for ev in ["first", "second"] {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .unwrap();
            let mut sink = Sink {
                writer: Box::new(BufWriter::new(file)),
            };
            sink.write_record(&TraceRecord::new(ev, 0)).unwrap();
            sink.flush();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first"));
        assert!(lines[1].contains("second"));
    }

    #[test]
    fn capture_sink_round_trips() {
        let (mut sink, capture) = Sink::capture();
        sink.write_record(&TraceRecord::new("pause", 3)).unwrap();
        assert_eq!(capture.contents(), "{\"ev\":\"pause\",\"ts\":3}\n");
    }
}
