//! Command channel messages between the popup and the timer service

use serde::{Deserialize, Serialize};

use crate::state::TimeReport;

/// Request sent to the timer, e.g. `{"action": "getTime"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    Start,
    Stop,
    Reset,
    GetTime,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Reset => "reset",
            Command::GetTime => "getTime",
        }
    }
}

/// Reply to `stop`: seconds of the run that just ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReport {
    pub elapsed: u64,
}

/// Reply payloads. `start` and `reset` have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Stopped(StopReport),
    Time(TimeReport),
}
