//! Intake for the public website forms: body parsing, spam and rate checks,
//! request metadata and field extraction.

pub mod fields;
pub mod honeypot;
pub mod metadata;
pub mod parser;
pub mod pipeline;
