// reconcile-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(reconcile::domain::validation),
        help("Fix the input and try again; the session was not changed.")
    )]
    Validation(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(reconcile::domain::not_found))]
    NotFound(String),

    #[error("Conflict: {0}")]
    #[diagnostic(
        code(reconcile::domain::conflict),
        help("Repeat the operation with an explicit override (e.g. --force).")
    )]
    Conflict(String),

    #[error("Cannot {operation} while the session is {phase}")]
    #[diagnostic(code(reconcile::domain::transition))]
    InvalidTransition {
        operation: &'static str,
        phase: &'static str,
    },

    #[error("Another {0} request is still in flight")]
    #[diagnostic(
        code(reconcile::domain::busy),
        help("Wait for the pending request to finish, or reset the session.")
    )]
    Busy(&'static str),
}
