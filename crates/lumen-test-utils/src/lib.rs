//! Test utilities for Lumen.
//!
//! The main component is `MockGfxDevice` (requires the `mock` feature), a
//! [`GfxDevice`](lumen_gfx::GfxDevice) that records every call instead of
//! talking to a GPU, with knobs to inject the failures the material pipeline
//! has to survive: shader compile failures, missing textures, tight hardware
//! limits and device loss.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use lumen_gfx::{GfxDevice, ShaderDesc};
//! use lumen_test_utils::MockGfxDevice;
//!
//! let mock = MockGfxDevice::new();
//! let shader = mock.create_shader(&ShaderDesc::default()).unwrap();
//!
//! assert_eq!(mock.count_shader_creates(), 1);
//! assert!(mock.shader_desc(shader).is_some());
//! # }
//! ```
//!
//! Mock state sits behind `parking_lot::Mutex` so the device stays
//! `Send + Sync` and every trait method can take `&self`.

#[cfg(feature = "mock")]
pub mod mock_device;

#[cfg(feature = "mock")]
pub use mock_device::*;
