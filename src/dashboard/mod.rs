//! Dashboard view: Elm-style model/update plus a command runtime.
//!
//! `model` holds state, `update` is the pure transition function, `runtime`
//! executes the commands it returns on a virtual-clock `scheduler`, and
//! `render` projects the model onto a `surface`.

#![allow(missing_docs)]

pub mod model;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod sentiment;
pub mod summary;
pub mod surface;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use model::{DashboardCmd, DashboardModel, DashboardMsg, LoadState, Tab, UserType};
pub use runtime::DashboardRuntime;
