//! Firmware error taxonomy.

use platform::BufferSizeError;

/// A hardware resource managed by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    /// Shared SPI bus
    Bus,
    /// LCD controller
    Display,
    /// SD card
    Storage,
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "SPI bus"),
            Self::Display => write!(f, "display"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// Which bring-up step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpFailure {
    /// Board refused to construct the SPI host
    BusCreate,
    /// SPI host `init` failed
    BusInit,
    /// Board refused to construct the LCD panel-IO adapter
    LcdBusCreate,
    /// Board refused to construct the display driver
    DisplayCreate,
    /// Controller initialisation sequence failed
    DisplayInit,
    /// Board refused to construct the SD handle
    StorageCreate,
    /// Card handshake failed
    StorageInit,
}

impl BringUpFailure {
    /// The resource this step belongs to
    pub const fn resource(self) -> Resource {
        match self {
            Self::BusCreate | Self::BusInit => Resource::Bus,
            Self::LcdBusCreate | Self::DisplayCreate | Self::DisplayInit => Resource::Display,
            Self::StorageCreate | Self::StorageInit => Resource::Storage,
        }
    }
}

impl core::fmt::Display for BringUpFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusCreate => write!(f, "SPI bus creation failed"),
            Self::BusInit => write!(f, "SPI bus init failed"),
            Self::LcdBusCreate => write!(f, "LCD bus adapter creation failed"),
            Self::DisplayCreate => write!(f, "display driver creation failed"),
            Self::DisplayInit => write!(f, "display controller init failed"),
            Self::StorageCreate => write!(f, "SD driver creation failed"),
            Self::StorageInit => write!(f, "SD card init failed"),
        }
    }
}

/// File access failure in the image loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoFailure {
    /// Mount point plus file name exceed the path buffer
    PathTooLong,
    /// File could not be opened
    Open,
    /// Read failed partway through
    Read,
}

impl core::fmt::Display for IoFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PathTooLong => write!(f, "path too long"),
            Self::Open => write!(f, "open failed"),
            Self::Read => write!(f, "read failed"),
        }
    }
}

/// Mount-state transition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountStateError {
    /// Mount attempted without a storage handle
    StorageNotReady,
    /// Filesystem layer rejected the mount
    MountFailed,
    /// Filesystem layer rejected the unmount
    UnmountFailed,
}

impl core::fmt::Display for MountStateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StorageNotReady => write!(f, "storage not ready"),
            Self::MountFailed => write!(f, "mount failed"),
            Self::UnmountFailed => write!(f, "unmount failed"),
        }
    }
}

/// Firmware errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A bring-up step failed; the handle stays empty
    BringUp(BringUpFailure),
    /// Operation needs a resource that has not been brought up
    NotReady(Resource),
    /// File access failed
    Io(IoFailure),
    /// Buffer length does not match the target rectangle
    SizeMismatch {
        /// `width * height * 2`
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
    /// Mount/unmount failed
    MountState(MountStateError),
    /// Display driver call failed during a blit or show
    Transfer,
    /// Backlight PWM write failed
    Backlight,
    /// Diagnostic configuration cannot run on this panel
    InvalidConfig,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BringUp(step) => write!(f, "bring-up failed: {step}"),
            Self::NotReady(resource) => write!(f, "{resource} not ready"),
            Self::Io(e) => write!(f, "I/O failure: {e}"),
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::MountState(e) => write!(f, "mount state: {e}"),
            Self::Transfer => write!(f, "display transfer failed"),
            Self::Backlight => write!(f, "backlight PWM write failed"),
            Self::InvalidConfig => write!(f, "invalid diagnostic configuration"),
        }
    }
}

impl From<BringUpFailure> for Error {
    fn from(e: BringUpFailure) -> Self {
        Self::BringUp(e)
    }
}

impl From<IoFailure> for Error {
    fn from(e: IoFailure) -> Self {
        Self::Io(e)
    }
}

impl From<MountStateError> for Error {
    fn from(e: MountStateError) -> Self {
        Self::MountState(e)
    }
}

impl From<BufferSizeError> for Error {
    fn from(e: BufferSizeError) -> Self {
        Self::SizeMismatch {
            expected: e.expected,
            actual: e.actual,
        }
    }
}
