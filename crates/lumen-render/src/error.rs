//! Error types for material building.

use std::fmt;

use lumen_gfx::GfxError;

/// Reasons pass construction for a material can fail.
///
/// Resource overflow and compile failure are only errors once the retry has
/// been reduced to a single layer; before that they drive the halving retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PassBuildError {
    /// A single stage still exceeds the hardware budget.
    SingleLayerOverflow {
        stage: usize,
        textures: u32,
        interpolators: u32,
    },

    /// A single stage still fails to compile.
    SingleLayerCompile { stage: usize, source: GfxError },

    /// The resolved features for a stage produced nothing to compile.
    EmptyFeatureSet { stage: usize },

    /// The material resolved to zero layers.
    NoLayers,
}

impl fmt::Display for PassBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassBuildError::SingleLayerOverflow {
                stage,
                textures,
                interpolators,
            } => write!(
                f,
                "Stage {} alone exceeds hardware limits ({} texture slots, {} interpolators)",
                stage, textures, interpolators
            ),
            PassBuildError::SingleLayerCompile { stage, source } => {
                write!(f, "Stage {} alone failed to compile: {}", stage, source)
            }
            PassBuildError::EmptyFeatureSet { stage } => {
                write!(f, "Stage {} resolved to an empty feature set", stage)
            }
            PassBuildError::NoLayers => write!(f, "Material has no layers to build"),
        }
    }
}

impl std::error::Error for PassBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PassBuildError::SingleLayerCompile { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors that leave a material instance unrenderable.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// The material declares no stages.
    NoStages,

    /// The material declares more stages than supported.
    TooManyStages { count: usize, max: usize },

    /// A stage references a texture the device could not load.
    TextureLoad {
        stage: usize,
        path: String,
        source: GfxError,
    },

    /// Pass construction failed.
    PassBuild(PassBuildError),

    /// Hooks cannot carry hooks of their own.
    HookOnHook,

    /// The instance id is stale or was never issued.
    UnknownInstance,
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialError::NoStages => write!(f, "Material has no stages"),
            MaterialError::TooManyStages { count, max } => {
                write!(f, "Material has {} stages, at most {} are supported", count, max)
            }
            MaterialError::TextureLoad {
                stage,
                path,
                source,
            } => write!(f, "Stage {} failed to load '{}': {}", stage, path, source),
            MaterialError::PassBuild(err) => write!(f, "Pass build failed: {}", err),
            MaterialError::HookOnHook => write!(f, "A material hook cannot own hooks"),
            MaterialError::UnknownInstance => write!(f, "Unknown material instance"),
        }
    }
}

impl std::error::Error for MaterialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MaterialError::TextureLoad { source, .. } => Some(source),
            MaterialError::PassBuild(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PassBuildError> for MaterialError {
    fn from(err: PassBuildError) -> Self {
        MaterialError::PassBuild(err)
    }
}

/// Result type alias for material operations.
pub type MaterialResult<T> = Result<T, MaterialError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = MaterialError::TooManyStages { count: 9, max: 8 };
        assert!(err.to_string().contains('9'));

        let err: MaterialError = PassBuildError::SingleLayerOverflow {
            stage: 2,
            textures: 9,
            interpolators: 4,
        }
        .into();
        assert!(err.to_string().contains("Stage 2"));
        assert!(err.source().is_some());
    }
}
