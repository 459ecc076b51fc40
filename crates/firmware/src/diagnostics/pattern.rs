//! Gradient test pattern.

use platform::PixelBuffer;

/// Packed RGB565 value of the gradient at `(x, y)` in a `width × height`
/// image. Red ramps along x, green along y, blue along the diagonal.
///
/// Callers guarantee `x < width` and `y < height`.
pub fn gradient_pixel(x: u16, y: u16, width: u16, height: u16) -> u16 {
    let (x, y) = (u32::from(x), u32::from(y));
    let (w, h) = (u32::from(width).max(1), u32::from(height).max(1));
    let r = x * 31 / w;
    let g = y * 63 / h;
    let b = (x + y) * 31 / (w + h);
    ((r << 11) | (g << 5) | b) as u16
}

/// Full gradient buffer, little-endian. A zero dimension yields an empty
/// buffer.
pub fn gradient(width: u16, height: u16) -> PixelBuffer {
    let mut buf = PixelBuffer::zeroed(width, height);
    if buf.is_empty() {
        return buf;
    }
    for (y, row) in (0u16..).zip(buf.rows_mut()) {
        for (x, px) in (0u16..).zip(row.chunks_exact_mut(2)) {
            px.copy_from_slice(&gradient_pixel(x, y, width, height).to_le_bytes());
        }
    }
    buf
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::pixel::raw;

    #[test]
    fn corners() {
        assert_eq!(gradient_pixel(0, 0, 60, 60), 0);
        // x = 59: r = 59*31/60 = 30; y = 59: g = 59*63/60 = 61; b = 118*31/120 = 30
        assert_eq!(gradient_pixel(59, 59, 60, 60), (30 << 11) | (61 << 5) | 30);
    }

    #[test]
    fn buffer_matches_pixel_function_lsb_first() {
        let buf = gradient(240, 60);
        assert_eq!(buf.len(), 28_800);
        let expected = gradient_pixel(200, 40, 240, 60);
        assert_eq!(raw(buf.get(200, 40).unwrap()), expected);
        let offset = (40 * 240 + 200) * 2;
        assert_eq!(buf.as_bytes()[offset], (expected & 0xFF) as u8);
        assert_eq!(buf.as_bytes()[offset + 1], (expected >> 8) as u8);
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(gradient(0, 10).is_empty());
        assert!(gradient(10, 0).is_empty());
    }
}
