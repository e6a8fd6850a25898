#![forbid(unsafe_code)]

//! NOFOMO: headless core of an investment dashboard.
//!
//! Three cooperating layers:
//! 1. **Mock data service**: keyed fixture slots with simulated latency,
//!    stale-ticket rejection, and local mutation
//! 2. **Dashboard state machine**: Elm-style model/update driven by a
//!    virtual-clock runtime, rendered onto any [`dashboard::surface::Surface`]
//! 3. **Scripted advisor**: keyword rules answering chat messages after a delay
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use nofomo_dashboard::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use nofomo_dashboard::core::config::Config;
//! use nofomo_dashboard::dashboard::surface::TextSurface;
//! ```

pub mod prelude;

pub mod advisor;
pub mod core;
pub mod dashboard;
pub mod data;
pub mod logger;
