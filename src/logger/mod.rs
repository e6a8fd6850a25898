//! Session activity logging: a background thread appending JSONL.

pub mod activity;
pub mod jsonl;
