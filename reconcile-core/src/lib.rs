// reconcile-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts of the external collaborators: detector, processor, exporter,
// rule store, batch source.
pub mod ports;

// 2. Domain (business core)
// Incongruences, decisions, rules, the wizard state machine.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// HTTP backend, JSON rule file, local exports, config files.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Wizard orchestration, apply phase, rule service, export, upload.
// Depends on the Domain, the Infra and the Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use reconcile_core::ReconcileError;
pub use error::ReconcileError;
