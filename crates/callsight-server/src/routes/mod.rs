//! Callsight API Routes
//!
//! - /api/transcribe - Upload audio, run the pipeline
//! - /api/domains - Known domain/category pairs
//! - /api/calls/:call_id - Stored call with its domain-specific payload
//! - /api/stats - Row counts

pub mod call;
pub mod domain;
pub mod swagger;
pub mod transcribe;
