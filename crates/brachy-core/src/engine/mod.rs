//! # Engine Module
//!
//! This module implements the planning engine: everything between a loaded patient and
//! an optimized seed arrangement.
//!
//! ## Overview
//!
//! A planning run prepares adjoint data for each requested seed type, ranks every
//! admissible seed position by how much off-target dose it trades for prostate dose,
//! and hands the ranked candidates to one of three placement strategies. All
//! strategies mutate the same `Patient` state machine and report a [`state::PlanOutcome`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Planner choice, prescription, seed list, organ weights
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//! - **Tasks** ([`tasks`]) - Adjoint generation, candidate enumeration and the IIEM,
//!   DWDMM and SCM planners
//!
//! Adjoint data is cached in the patient data store between runs, and speculative
//! insertions are wrapped in transactional trials that roll the patient back on
//! rejection.

pub(crate) mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
pub(crate) mod transaction;
