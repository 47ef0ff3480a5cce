//! Core types for Orbit.

pub mod event;
pub mod message;
pub mod tool_call;

pub use event::*;
pub use message::*;
pub use tool_call::*;
