use crate::error::{MediaError, MediaResult};

/// Width and height in (possibly fractional) pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Scales `width`x`height` so the longer side equals `max_dim`, keeping the aspect ratio.
///
/// Both dimensions must be finite and strictly positive.
pub fn scale(width: f64, height: f64, max_dim: f64) -> MediaResult<Size> {
    let valid = |v: f64| v.is_finite() && v > 0.;
    if !valid(width) || !valid(height) {
        return Err(MediaError::InvalidDimensions { width, height });
    }

    let k = max_dim / width.max(height);
    Ok(Size {
        width: width * k,
        height: height * k,
    })
}
