// reconcile-core/src/domain/session/phase.rs

use std::fmt;

/// Where the reviewer is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing,
    Reviewing,
    /// Re-deciding the record that carried this sequence number.
    Revising(u32),
    Finalizing,
    Applied,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Analyzing => "analyzing",
            Phase::Reviewing => "reviewing",
            Phase::Revising(_) => "revising",
            Phase::Finalizing => "finalizing",
            Phase::Applied => "applied",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Revising(n) => write!(f, "revising #{}", n),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Collaborator calls the session waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    Apply,
    Export,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Analyze => "analyze",
            Operation::Apply => "apply",
            Operation::Export => "export",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handed out when a collaborator call starts; the response is only
/// accepted if the session has not been reset in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub(super) generation: u64,
    pub(super) operation: Operation,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// Result of handing a collaborator response back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Accepted,
    /// The session moved on; the response was dropped.
    Stale,
}
