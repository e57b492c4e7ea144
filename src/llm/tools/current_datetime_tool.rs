use crate::error::Result;
use crate::llm::tools::{LlmTool, ToolDescriptor};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Point-in-time view of "now" in UTC and in the host's local zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSnapshot {
    pub utc_iso: String,
    pub local_iso: String,
    pub date: String,
    pub time: String,
    pub weekday: String,
    pub timestamp: i64,
}

impl TimeSnapshot {
    /// Capture the current moment
    ///
    /// The clock is read once and the local view derived from it, so the UTC and
    /// local fields always describe the same instant.
    pub fn now() -> Self {
        let utc = Utc::now();
        let local = utc.with_timezone(&Local).fixed_offset();
        Self::from_instants(utc, local)
    }

    /// Build a snapshot from explicit UTC and local instants
    pub fn from_instants(utc: DateTime<Utc>, local: DateTime<FixedOffset>) -> Self {
        Self {
            utc_iso: utc.to_rfc3339_opts(SecondsFormat::Micros, false),
            local_iso: local.to_rfc3339_opts(SecondsFormat::Micros, false),
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
            weekday: local.format("%A").to_string(),
            timestamp: utc.timestamp(),
        }
    }

    /// Compact one-line description for LLM consumption
    pub fn summary(&self) -> String {
        format!(
            "Current Date/Time Context => UTC: {}; Local: {}; Date: {} ({})",
            self.utc_iso, self.local_iso, self.date, self.weekday
        )
    }
}

/// Tool that tells the agent what "now" is
///
/// Agents should call it before reasoning about recent events or building
/// time-sensitive search queries. Takes no arguments.
///
/// # Examples
///
/// ```ignore
/// use agent_tools::llm::tools::current_datetime_tool::CurrentDateTimeTool;
///
/// let tool = CurrentDateTimeTool::new();
/// let result = tool.run(&HashMap::new())?;
/// // "Current Date/Time Context => UTC: ...; Local: ...; Date: 2024-05-01 (Wednesday)"
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurrentDateTimeTool;

impl CurrentDateTimeTool {
    pub fn new() -> Self {
        Self
    }

    /// Structured snapshot, for callers that want the individual fields
    pub fn snapshot(&self) -> TimeSnapshot {
        TimeSnapshot::now()
    }
}

impl LlmTool for CurrentDateTimeTool {
    fn run(&self, _args: &HashMap<String, Value>) -> Result<Value> {
        Ok(Value::String(self.snapshot().summary()))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            "CurrentDateTime",
            "Returns the current UTC and local date/time so the agent is aware of 'now'. \
             Use this before asking about recent events or when crafting time-sensitive search queries.",
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        )
    }

    fn clone_box(&self) -> Box<dyn LlmTool> {
        Box::new(self.clone())
    }
}
