//! Storage abstraction: SD block device and the FAT mount layer

/// SD/MMC sector size in bytes
pub const BLOCK_SIZE: usize = 512;

/// Block-device control requests, numbered like the FAT layer's disk ioctl
/// codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoctlOp {
    /// Initialise the card
    Init = 1,
    /// Release the card
    Deinit = 2,
    /// Flush pending writes
    Sync = 3,
    /// Number of sectors on the card
    SectorCount = 4,
    /// Sector size in bytes
    SectorSize = 5,
}

/// SD card block device on the shared SPI bus.
pub trait BlockDevice {
    /// Error type
    type Error: core::fmt::Debug;

    /// Initialise the card (CMD0/CMD8/ACMD41 handshake)
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Read whole sectors starting at `start_block` into `buf`
    /// (`buf.len()` must be a multiple of [`BLOCK_SIZE`])
    fn read_blocks(&mut self, start_block: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write whole sectors starting at `start_block`
    fn write_blocks(&mut self, start_block: u32, buf: &[u8]) -> Result<(), Self::Error>;

    /// Control request; the return value is op-specific (0 for success
    /// on ops without a result)
    fn ioctl(&mut self, op: IoctlOp) -> Result<u32, Self::Error>;
}

/// Mount layer exposing the card as a byte-stream filesystem.
pub trait Filesystem {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File;

    /// Mount the volume on `device` under `mount_point`
    fn mount<D: BlockDevice>(&mut self, device: &mut D, mount_point: &str)
        -> Result<(), Self::Error>;

    /// Unmount the volume at `mount_point`
    fn unmount(&mut self, mount_point: &str) -> Result<(), Self::Error>;

    /// Open a file for reading by absolute path (including the mount point)
    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error>;
}

/// File trait for reading files
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position; `Ok(0)` means end of file
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Get file size
    fn size(&self) -> u64;
}

/// Storage errors shared by the host-side filesystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No card answered the handshake
    NoCard,
    /// Sector I/O failed or was out of range
    Io,
    /// Operation requires a mounted volume
    NotMounted,
    /// A volume is already mounted at that point
    AlreadyMounted,
    /// Path does not start with the mount point
    InvalidPath,
    /// File not found
    NotFound,
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCard => write!(f, "No SD card detected"),
            Self::Io => write!(f, "Block I/O error"),
            Self::NotMounted => write!(f, "Filesystem not mounted"),
            Self::AlreadyMounted => write!(f, "Filesystem already mounted"),
            Self::InvalidPath => write!(f, "Path outside the mount point"),
            Self::NotFound => write!(f, "File not found"),
        }
    }
}

/// Strip `mount_point` (and the following `/`) from `path`.
///
/// Returns `None` if `path` is not under `mount_point`.
pub fn strip_mount_point<'a>(path: &'a str, mount_point: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(mount_point)?;
    let rest = rest.strip_prefix('/')?;
    (!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_mount_point_requires_separator() {
        assert_eq!(strip_mount_point("/sd/Test.rgb565", "/sd"), Some("Test.rgb565"));
        assert_eq!(strip_mount_point("/sdcard/x", "/sd"), None);
        assert_eq!(strip_mount_point("/sd/", "/sd"), None);
        assert_eq!(strip_mount_point("/other/x", "/sd"), None);
    }

    #[test]
    fn ioctl_codes_match_disk_layer() {
        assert_eq!(IoctlOp::SectorCount as u8, 4);
        assert_eq!(IoctlOp::SectorSize as u8, 5);
    }
}
