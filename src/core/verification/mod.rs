//! Post-write verification of generated files
//!
//! This module checks a closed file against the digest computed while it was
//! written and against the structure of pain.008.001.02. Findings are
//! diagnostic unless `verification.enforce_schema` is set.

pub mod checksum;
pub mod report;
pub mod schema;
pub mod verify;

pub use report::{SchemaIssue, VerificationReport};
pub use schema::StructuralSchemaCheck;
pub use verify::Verifier;
