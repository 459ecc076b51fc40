//! Display abstraction layer

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

/// RGB565 framebuffer display driver.
///
/// These are the primitives the LCD controller driver provides; pixel data
/// passed to [`Rgb565Display::blit`] is packed little-endian RGB565.
pub trait Rgb565Display {
    /// Error type for display operations
    type Error: core::fmt::Debug;

    /// Run the controller initialisation sequence
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Fill the whole frame with one colour
    fn fill(&mut self, color: Rgb565) -> Result<(), Self::Error>;

    /// Set a single pixel
    fn pixel(&mut self, at: Point, color: Rgb565) -> Result<(), Self::Error>;

    /// Draw a one-pixel line between two points (inclusive)
    fn line(&mut self, start: Point, end: Point, color: Rgb565) -> Result<(), Self::Error>;

    /// Copy `buffer` into display memory at `area`
    fn blit(&mut self, buffer: &[u8], area: Rectangle) -> Result<(), Self::Error>;

    /// Push display memory to the panel
    fn show(&mut self) -> Result<(), Self::Error>;
}

/// Panel rotation, in the controller's 0–3 index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Native orientation
    #[default]
    Deg0,
    /// 90° clockwise
    Deg90,
    /// 180°
    Deg180,
    /// 270° clockwise
    Deg270,
}

impl Rotation {
    /// Build from the controller's rotation index (wraps modulo 4).
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// The controller's rotation index.
    pub const fn index(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error
    Communication,
    /// Controller used before `init`
    NotInitialized,
    /// Blit rectangle outside the panel
    OutOfBounds,
    /// Invalid state
    InvalidState,
}

#[cfg(feature = "std")]
impl std::error::Error for DisplayError {}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Communication => write!(f, "Display communication error"),
            Self::NotInitialized => write!(f, "Display controller not initialized"),
            Self::OutOfBounds => write!(f, "Blit area outside the panel"),
            Self::InvalidState => write!(f, "Display in invalid state"),
        }
    }
}
