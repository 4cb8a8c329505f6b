//! Backend worker wiring for the document editor.
//!
//! The controller sends [`CoreCmd`] values over a channel; the worker runs
//! each one as an independent async task so network operations overlap, and
//! replies with [`CoreEvent`] values the controller polls.

mod protocol;
mod worker;

pub use protocol::{CoreCmd, CoreErrorSource, CoreEvent};
pub use worker::{spawn_backend, BackendHandle};
