//! Property-based tests for RGB565 buffer handling.
#![allow(
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use platform::pixel::{raw, unpack_rgb565};
use platform::{framebuffer_len, pack_rgb565, PixelBuffer, Rgb565};

proptest::proptest! {
    /// Packing is little-endian and lossless for every 16-bit value.
    #[test]
    fn pack_is_lsb_first(value in 0u16..=u16::MAX) {
        let bytes = value.to_le_bytes();
        let color = unpack_rgb565(bytes);
        assert_eq!(raw(color), value);
        assert_eq!(pack_rgb565(color), bytes);
    }

    /// from_bytes accepts exactly width * height * 2 bytes.
    #[test]
    fn from_bytes_validates_length(w in 0u16..64, h in 0u16..64, delta in -3i32..=3) {
        let expected = framebuffer_len(w, h);
        let len = (expected as i64 + i64::from(delta)).max(0) as usize;
        let result = PixelBuffer::from_bytes(vec![0; len], w, h);
        if len == expected {
            assert_eq!(result.unwrap().len(), expected);
        } else {
            let err = result.unwrap_err();
            assert_eq!((err.expected, err.actual), (expected, len));
        }
    }

    /// set then get returns the written colour inside the buffer and None outside.
    #[test]
    fn set_get_in_bounds(w in 1u16..32, h in 1u16..32, x in 0u16..40, y in 0u16..40, v in 0u16..=u16::MAX) {
        let color = unpack_rgb565(v.to_le_bytes());
        let mut buf = PixelBuffer::zeroed(w, h);
        buf.set(x, y, color);
        if x < w && y < h {
            assert_eq!(buf.get(x, y), Some(color));
        } else {
            assert_eq!(buf.get(x, y), None);
            assert!(buf.as_bytes().iter().all(|&b| b == 0));
        }
        assert_eq!(buf.len(), framebuffer_len(w, h));
    }
}

#[test]
fn filled_buffer_repeats_colour() {
    let buf = PixelBuffer::filled(3, 2, Rgb565::new(31, 0, 0));
    assert_eq!(buf.as_bytes(), &[0x00, 0xF8].repeat(6)[..]);
}
