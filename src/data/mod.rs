//! Mock data layer: record types, static fixtures, and the keyed accessor.

pub mod fixtures;
pub mod records;
pub mod service;
