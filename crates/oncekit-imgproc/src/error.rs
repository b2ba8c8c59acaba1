use oncekit_image::ImageError;

/// An error type for the image processing module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// Error coming from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The distortion vector does not have a supported length.
    #[error("Expected 4, 5 or 8 distortion coefficients, got {0}")]
    InvalidDistortionCoefficients(usize),

    /// The free scaling parameter is outside of `[0, 1]`.
    #[error("The free scaling parameter must be in [0, 1], got {0}")]
    InvalidAlpha(f64),

    /// The camera intrinsics cannot be used to normalize coordinates.
    #[error("Invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),
}
