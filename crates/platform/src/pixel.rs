//! RGB565 pixel buffers
//!
//! Pixel data travels as raw little-endian RGB565 bytes: two bytes per
//! pixel, row-major, no header. This is the on-card image format and the
//! format the controller driver's `blit` expects.

use alloc::vec;
use alloc::vec::Vec;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Byte length of a `width × height` RGB565 buffer.
pub const fn framebuffer_len(width: u16, height: u16) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

/// Pack a colour into its two little-endian storage bytes.
#[inline]
pub fn pack_rgb565(color: Rgb565) -> [u8; 2] {
    color.into_storage().to_le_bytes()
}

/// Unpack two little-endian storage bytes.
#[inline]
pub fn unpack_rgb565(bytes: [u8; 2]) -> Rgb565 {
    Rgb565::from(RawU16::new(u16::from_le_bytes(bytes)))
}

/// Buffer length did not match the declared geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferSizeError {
    /// Bytes required by the geometry
    pub expected: usize,
    /// Bytes supplied
    pub actual: usize,
}

impl core::fmt::Display for BufferSizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "buffer size mismatch: expected {} bytes, got {}",
            self.expected, self.actual
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferSizeError {}

/// An owned RGB565 image whose byte length always equals
/// `width * height * 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// All-black buffer.
    pub fn zeroed(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            data: vec![0; framebuffer_len(width, height)],
        }
    }

    /// Buffer filled with one colour.
    pub fn filled(width: u16, height: u16, color: Rgb565) -> Self {
        let px = pack_rgb565(color);
        let mut buf = Self::zeroed(width, height);
        for chunk in buf.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&px);
        }
        buf
    }

    /// Wrap raw bytes, validating their length against the geometry.
    pub fn from_bytes(data: Vec<u8>, width: u16, height: u16) -> Result<Self, BufferSizeError> {
        let expected = framebuffer_len(width, height);
        if data.len() != expected {
            return Err(BufferSizeError {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw little-endian bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel rows, one `width * 2`-byte slice per row.
    pub fn rows_mut(&mut self) -> core::slice::ChunksExactMut<'_, u8> {
        let stride = (usize::from(self.width) * BYTES_PER_PIXEL).max(1);
        self.data.chunks_exact_mut(stride)
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` for a zero-area buffer
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Colour at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (usize::from(y) * usize::from(self.width) + usize::from(x)) * BYTES_PER_PIXEL;
        let bytes = self.data.get(offset..offset + BYTES_PER_PIXEL)?;
        <[u8; 2]>::try_from(bytes).ok().map(unpack_rgb565)
    }

    /// Set `(x, y)`; out-of-range writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, color: Rgb565) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (usize::from(y) * usize::from(self.width) + usize::from(x)) * BYTES_PER_PIXEL;
        if let Some(slot) = self.data.get_mut(offset..offset + BYTES_PER_PIXEL) {
            slot.copy_from_slice(&pack_rgb565(color));
        }
    }

    /// Consume into raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Raw `u16` storage value of a colour
pub fn raw(color: Rgb565) -> u16 {
    color.into_storage()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn red_packs_as_f800_little_endian() {
        assert_eq!(pack_rgb565(Rgb565::RED), [0x00, 0xF8]);
        assert_eq!(pack_rgb565(Rgb565::WHITE), [0xFF, 0xFF]);
        assert_eq!(raw(Rgb565::GREEN), 0x07E0);
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let err = PixelBuffer::from_bytes(vec![0; 10], 4, 4).unwrap_err();
        assert_eq!(
            err,
            BufferSizeError {
                expected: 32,
                actual: 10
            }
        );
    }

    #[test]
    fn set_get_respects_bounds() {
        let mut buf = PixelBuffer::zeroed(3, 2);
        buf.set(2, 1, Rgb565::BLUE);
        buf.set(3, 0, Rgb565::RED);
        assert_eq!(buf.get(2, 1), Some(Rgb565::BLUE));
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(buf.as_bytes()[10..12], pack_rgb565(Rgb565::BLUE));
    }

    #[test]
    fn filled_buffer_has_uniform_pixels() {
        let buf = PixelBuffer::filled(5, 5, Rgb565::YELLOW);
        assert_eq!(buf.len(), 50);
        assert!(buf
            .as_bytes()
            .chunks_exact(2)
            .all(|px| px == pack_rgb565(Rgb565::YELLOW)));
    }
}
