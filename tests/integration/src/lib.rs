//! Integration test crate
//!
//! All content lives under `tests/`; this library target exists only so
//! Cargo treats the directory as a workspace member.
