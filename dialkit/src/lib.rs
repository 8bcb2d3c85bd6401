//! Framework-agnostic core for live-tweakable parameter panels: declare a
//! schema, read typed values back, and let any UI adapter edit them through a
//! shared [`control::DialStore`].

pub mod control;
pub mod core;
pub mod motion;
pub mod prelude;
pub mod runtime;
