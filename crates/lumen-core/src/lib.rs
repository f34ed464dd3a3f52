//! Lumen Core
//!
//! Process-level utilities shared by the Lumen crates: hashed collections,
//! generational storage, the per-frame arena, profiling and logging setup.

pub mod alloc;
pub mod logging;
pub mod profiling;
