use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Search = 1,
    Transcribe = 2,
    Customize = 3,
    Result = 4,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Search,
        Stage::Transcribe,
        Stage::Customize,
        Stage::Result,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.number() == number)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Search => "Search",
            Stage::Transcribe => "Transcribe",
            Stage::Customize => "Customize",
            Stage::Result => "Result",
        }
    }

    pub fn next(self) -> Option<Stage> {
        Stage::from_number(self.number() + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Snapshot of the accumulated data the forward transitions depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preconditions {
    pub has_selection: bool,
    pub has_transcripts: bool,
    pub has_script: bool,
}

/// True iff `to` is the stage right after `from` and its entry condition holds.
pub fn can_advance(from: Stage, to: Stage, facts: &Preconditions) -> bool {
    if from.next() != Some(to) {
        return false;
    }
    match to {
        Stage::Search => false,
        Stage::Transcribe => facts.has_selection,
        Stage::Customize => facts.has_transcripts,
        Stage::Result => facts.has_script,
    }
}

pub fn can_retreat(from: Stage, to: Stage) -> bool {
    to < from
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTracker {
    current: Stage,
}

impl StageTracker {
    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn advance(&mut self, to: Stage, facts: &Preconditions) -> Result<(), WorkflowError> {
        if !can_advance(self.current, to, facts) {
            return Err(WorkflowError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        Ok(())
    }

    /// Moving back keeps everything accumulated in later stages.
    pub fn retreat(&mut self, to: Stage) -> Result<(), WorkflowError> {
        if !can_retreat(self.current, to) {
            return Err(WorkflowError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        Ok(())
    }
}
