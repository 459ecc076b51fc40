//! Local filesystem implementation for the desktop emulator.
//!
//! `LocalFilesystem` implements [`Filesystem`] using `std::fs`.
//! Used when the `std` feature is enabled (emulator builds and tests).
//! Once mounted at e.g. `/sd`, the path `/sd/Test.rgb565` resolves to
//! `<root>/Test.rgb565`.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::storage::{strip_mount_point, BlockDevice, File, Filesystem, IoctlOp, StorageError};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub enum LocalStorageError {
    /// Host I/O failure
    Io(std::io::Error),
    /// Mount-state or path violation
    Storage(StorageError),
}

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "local storage error: {e}"),
            Self::Storage(e) => write!(f, "local storage error: {e}"),
        }
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Storage(_) => None,
        }
    }
}

impl From<StorageError> for LocalStorageError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError::Io)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A [`Filesystem`] backed by a host directory.
///
/// # Example
/// ```no_run
/// use platform::mocks::MockBlockDevice;
/// use platform::storage_local::LocalFilesystem;
/// use platform::Filesystem;
///
/// let mut fs = LocalFilesystem::new("/tmp/sdcard");
/// let mut card = MockBlockDevice::new(64);
/// fs.mount(&mut card, "/sd").unwrap();
/// let file = fs.open_file("/sd/Test.rgb565").unwrap();
/// ```
pub struct LocalFilesystem {
    root: PathBuf,
    mounted_at: Option<heapless::String<32>>,
}

impl LocalFilesystem {
    /// Create a new filesystem rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mounted_at: None,
        }
    }

    /// Create from the `SD_ROOT` environment variable.
    ///
    /// Returns `None` if `SD_ROOT` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("SD_ROOT").ok().map(Self::new)
    }

    /// Whether a volume is currently mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted_at.is_some()
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let mount_point = self.mounted_at.as_deref().ok_or(StorageError::NotMounted)?;
        let relative = strip_mount_point(path, mount_point).ok_or(StorageError::InvalidPath)?;
        Ok(self.root.join(relative))
    }
}

impl Filesystem for LocalFilesystem {
    type Error = LocalStorageError;
    type File = LocalFile;

    fn mount<D: BlockDevice>(&mut self, device: &mut D, mount_point: &str) -> Result<(), Self::Error> {
        if self.mounted_at.is_some() {
            return Err(StorageError::AlreadyMounted.into());
        }
        device
            .ioctl(IoctlOp::Init)
            .map_err(|_| StorageError::NoCard)?;
        let mut point = heapless::String::new();
        point
            .push_str(mount_point)
            .map_err(|_| StorageError::InvalidPath)?;
        self.mounted_at = Some(point);
        Ok(())
    }

    fn unmount(&mut self, mount_point: &str) -> Result<(), Self::Error> {
        match self.mounted_at.as_deref() {
            Some(current) if current == mount_point => {
                self.mounted_at = None;
                Ok(())
            }
            Some(_) => Err(StorageError::InvalidPath.into()),
            None => Err(StorageError::NotMounted.into()),
        }
    }

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full).map_err(LocalStorageError::Io)?;
        let meta = file.metadata().map_err(LocalStorageError::Io)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::MockBlockDevice;
    use std::fs;
    use tempfile::TempDir;

    fn mounted(tmp: &TempDir) -> LocalFilesystem {
        let mut fs = LocalFilesystem::new(tmp.path());
        let mut card = MockBlockDevice::new(16);
        fs.mount(&mut card, "/sd").unwrap();
        fs
    }

    #[test]
    fn local_fs_read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.bin"), b"hello world").unwrap();
        let mut fs = mounted(&tmp);
        let mut file = fs.open_file("/sd/test.bin").unwrap();
        let mut buf = [0u8; 11];
        let n = file.read(&mut buf).unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
    }

    #[test]
    fn local_fs_size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.bin"), [0u8; 64]).unwrap();
        let mut fs = mounted(&tmp);
        let file = fs.open_file("/sd/size.bin").unwrap();
        assert_eq!(file.size(), 64);
    }

    #[test]
    fn local_fs_requires_mount() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.bin"), b"x").unwrap();
        let mut fs = LocalFilesystem::new(tmp.path());
        assert!(matches!(
            fs.open_file("/sd/x.bin"),
            Err(LocalStorageError::Storage(StorageError::NotMounted))
        ));
    }

    #[test]
    fn local_fs_rejects_paths_outside_mount_point() {
        let tmp = TempDir::new().unwrap();
        let mut fs = mounted(&tmp);
        assert!(matches!(
            fs.open_file("/flash/x.bin"),
            Err(LocalStorageError::Storage(StorageError::InvalidPath))
        ));
    }

    #[test]
    fn local_fs_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let mut fs = mounted(&tmp);
        assert!(matches!(
            fs.open_file("/sd/missing.bin"),
            Err(LocalStorageError::Io(_))
        ));
    }

    #[test]
    fn local_fs_unmount_then_remount() {
        let tmp = TempDir::new().unwrap();
        let mut fs = mounted(&tmp);
        fs.unmount("/sd").unwrap();
        assert!(!fs.is_mounted());
        assert!(matches!(
            fs.unmount("/sd"),
            Err(LocalStorageError::Storage(StorageError::NotMounted))
        ));
        let mut card = MockBlockDevice::new(16);
        fs.mount(&mut card, "/sd").unwrap();
        assert!(fs.is_mounted());
    }
}
