use crate::{Image, ImageError};

/// Round a floating point image into 8 bit pixels, saturating at `[0, 255]`.
///
/// Non finite values are written as zero.
pub fn saturate_to_u8<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| {
            *out = if inp.is_finite() {
                inp.round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
        });

    Ok(())
}
