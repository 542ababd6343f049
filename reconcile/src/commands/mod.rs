// reconcile/src/commands/mod.rs

pub mod backend;
pub mod files;
pub mod output;
pub mod review;
pub mod rules;
pub mod upload;
