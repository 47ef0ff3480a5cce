//! One request/stream cycle of a run.

use crate::tools::ToolDescriptor;
use crate::transport::RunRequest;
use crate::types::OutgoingMessage;

#[derive(Debug, Clone)]
pub struct RunRound {
    pub round_number: usize,
    pub previous_run_id: Option<String>,
    pub outgoing_message: OutgoingMessage,
    pub tools_offered: Vec<ToolDescriptor>,
}

impl RunRound {
    pub fn new(
        round_number: usize,
        previous_run_id: Option<String>,
        outgoing_message: OutgoingMessage,
        tools_offered: Vec<ToolDescriptor>,
    ) -> Self {
        Self {
            round_number,
            previous_run_id,
            outgoing_message,
            tools_offered,
        }
    }

    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            message: self.outgoing_message.clone(),
            tools: (!self.tools_offered.is_empty()).then(|| self.tools_offered.clone()),
            previous_run_id: self.previous_run_id.clone(),
        }
    }
}
