//! Opaque handles to device-owned objects.
//!
//! Handles are plain ids issued by the device. They carry no lifetime, are
//! `Copy`, and are only meaningful to the device that issued them.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw id issued by a device.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw id.
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_handle!(
    /// A compiled shader program.
    ShaderHandle
);
define_handle!(
    /// A fixed-function state object.
    StateBlockHandle
);
define_handle!(
    /// A loaded texture.
    TextureHandle
);
define_handle!(
    /// A vertex or index buffer.
    BufferHandle
);
define_handle!(
    /// An offscreen render target.
    RenderTargetHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip_and_ordering() {
        let a = ShaderHandle::from_raw(3);
        let b = ShaderHandle::from_raw(7);
        assert_eq!(a.raw(), 3);
        assert!(a < b);
        assert_eq!(a, ShaderHandle::from_raw(3));
    }
}
