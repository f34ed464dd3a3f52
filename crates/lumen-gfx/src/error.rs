//! Error types reported by graphics devices.

use std::fmt;

/// Errors a [`GfxDevice`](crate::GfxDevice) may report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxError {
    /// The backend rejected the generated program.
    ShaderCompile {
        /// Label of the program that failed.
        label: String,
        /// Compiler output.
        message: String,
    },

    /// A texture referenced by a material could not be loaded.
    TextureNotFound {
        /// The texture path as authored.
        path: String,
    },

    /// An offscreen target could not be created.
    TargetCreation {
        /// Description of the failure.
        message: String,
    },

    /// The device was lost; every device object must be recreated.
    DeviceLost,
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::ShaderCompile { label, message } => {
                write!(f, "Failed to compile shader '{}': {}", label, message)
            }
            GfxError::TextureNotFound { path } => {
                write!(f, "Texture not found: {}", path)
            }
            GfxError::TargetCreation { message } => {
                write!(f, "Failed to create render target: {}", message)
            }
            GfxError::DeviceLost => write!(f, "Graphics device lost"),
        }
    }
}

impl std::error::Error for GfxError {}

/// Result type alias for device operations.
pub type GfxResult<T> = Result<T, GfxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GfxError::TextureNotFound {
            path: "rock_d.png".into(),
        };
        assert!(format!("{}", err).contains("rock_d.png"));

        let err = GfxError::ShaderCompile {
            label: "terrain".into(),
            message: "too many temporaries".into(),
        };
        let text = err.to_string();
        assert!(text.contains("terrain"));
        assert!(text.contains("too many temporaries"));
    }
}
