//! Output steps writing the current chunk out of the pipeline.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use stepflow_common::types::Value;

use crate::execution::block::OutputBlock;
use crate::execution::context::ExecutionContext;
use crate::execution::error::OperatorError;
use crate::execution::step::PipelineStep;

/// Converts a value into its JSON form.
///
/// Node and edge references are written as their raw ids. Non-finite
/// floats become `null`.
#[must_use]
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int64(i) => serde_json::Value::from(*i),
        Value::UInt64(u) => serde_json::Value::from(*u),
        Value::Float64(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Node(id) => serde_json::Value::from(id.as_raw()),
        Value::Edge(id) => serde_json::Value::from(id.as_raw()),
    }
}

/// In-memory sink whose clones share one buffer.
///
/// Hand a clone to a [`JsonEncoderStep`] and read the output through the
/// one you kept.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the bytes written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Returns the bytes written so far as text.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One row serialized as a JSON object with keys in column order.
struct JsonRow<'a>(&'a [(&'a str, Value)]);

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, &value_to_json(value))?;
        }
        map.end()
    }
}

/// Streams the current chunk as JSON lines.
///
/// Every row of the block becomes one JSON object on its own line. The
/// sink is flushed after each chunk.
pub struct JsonEncoderStep {
    block: OutputBlock,
    sink: Box<dyn Write + Send>,
    rows_written: u64,
}

impl JsonEncoderStep {
    /// Creates an encoder writing `block` to `sink`.
    pub fn new(block: OutputBlock, sink: impl Write + Send + 'static) -> Self {
        Self {
            block,
            sink: Box::new(sink),
            rows_written: 0,
        }
    }

    /// Returns the number of rows written since `prepare`.
    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl PipelineStep for JsonEncoderStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        self.rows_written = 0;
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        let rows = self.block.rows()?;
        for row in &rows {
            serde_json::to_writer(&mut self.sink, &JsonRow(row)).map_err(io::Error::from)?;
            self.sink.write_all(b"\n")?;
        }
        self.sink.flush()?;
        self.rows_written += rows.len() as u64;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!(
            "JsonEncoder [{}]",
            self.block.names().collect::<Vec<_>>().join(", ")
        )
    }
}

/// Logs every row of the current chunk at debug level.
///
/// Rows go to the `stepflow::dump` tracing target.
pub struct DebugDumpStep {
    block: OutputBlock,
    label: String,
}

impl DebugDumpStep {
    /// Creates a dump of `block`.
    #[must_use]
    pub fn new(block: OutputBlock) -> Self {
        Self {
            block,
            label: String::from("dump"),
        }
    }

    /// Sets the label attached to every logged row.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl PipelineStep for DebugDumpStep {
    fn prepare(&mut self, _ctx: &ExecutionContext) -> Result<(), OperatorError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn execute(&mut self) -> Result<(), OperatorError> {
        for (i, row) in self.block.rows()?.iter().enumerate() {
            let fields: Vec<String> = row
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            tracing::debug!(
                target: "stepflow::dump",
                label = %self.label,
                row = i,
                "{}",
                fields.join(" ")
            );
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("DebugDump {}", self.label)
    }
}
