//! RAM-disk block device and in-memory filesystem mocks.

use std::collections::BTreeMap;

use super::{Event, FailPoint, MockProbe};
use crate::storage::{
    strip_mount_point, BlockDevice, File, Filesystem, IoctlOp, StorageError, BLOCK_SIZE,
};

/// RAM-backed SD card whose sector 0 carries a valid boot signature.
pub struct MockBlockDevice {
    sectors: Vec<u8>,
    block_count: u32,
    initialized: bool,
    probe: MockProbe,
}

impl MockBlockDevice {
    /// Card of `block_count` sectors with its own probe
    pub fn new(block_count: u32) -> Self {
        Self::with_probe(block_count, MockProbe::new())
    }

    /// Card wired to a shared probe
    pub fn with_probe(block_count: u32, probe: MockProbe) -> Self {
        let mut sectors = vec![0u8; block_count as usize * BLOCK_SIZE];
        if let Some(sig) = sectors.get_mut(BLOCK_SIZE - 2..BLOCK_SIZE) {
            sig.copy_from_slice(&[0x55, 0xAA]);
        }
        Self {
            sectors,
            block_count,
            initialized: false,
            probe,
        }
    }

    /// Whether the card handshake has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn range(&self, start_block: u32, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        if !self.initialized {
            return Err(StorageError::NoCard);
        }
        if len % BLOCK_SIZE != 0 {
            return Err(StorageError::Io);
        }
        let start = start_block as usize * BLOCK_SIZE;
        let end = start.checked_add(len).ok_or(StorageError::Io)?;
        if end > self.sectors.len() {
            return Err(StorageError::Io);
        }
        Ok(start..end)
    }
}

impl BlockDevice for MockBlockDevice {
    type Error = StorageError;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.probe.should_fail(FailPoint::StorageInit) {
            return Err(StorageError::NoCard);
        }
        self.initialized = true;
        self.probe.record(Event::StorageInit);
        Ok(())
    }

    fn read_blocks(&mut self, start_block: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(start_block, buf.len())?;
        let src = self.sectors.get(range).ok_or(StorageError::Io)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write_blocks(&mut self, start_block: u32, buf: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(start_block, buf.len())?;
        let dst = self.sectors.get_mut(range).ok_or(StorageError::Io)?;
        dst.copy_from_slice(buf);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn ioctl(&mut self, op: IoctlOp) -> Result<u32, Self::Error> {
        match op {
            IoctlOp::Init => self.init().map(|()| 0),
            IoctlOp::Deinit => {
                self.initialized = false;
                Ok(0)
            }
            IoctlOp::Sync => Ok(0),
            IoctlOp::SectorCount => Ok(self.block_count),
            IoctlOp::SectorSize => Ok(BLOCK_SIZE as u32),
        }
    }
}

/// In-memory FAT stand-in: a flat map from file name to contents.
pub struct MockFilesystem {
    files: BTreeMap<String, Vec<u8>>,
    mounted_at: Option<String>,
    read_chunk: usize,
    probe: MockProbe,
}

impl Default for MockFilesystem {
    fn default() -> Self {
        Self::new(MockProbe::new())
    }
}

impl MockFilesystem {
    /// Empty volume wired to `probe`
    pub fn new(probe: MockProbe) -> Self {
        Self {
            files: BTreeMap::new(),
            mounted_at: None,
            read_chunk: 4096,
            probe,
        }
    }

    /// Add or replace `name` (relative to the volume root)
    pub fn write_file(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.to_string(), contents.into());
    }

    /// Remove `name`
    pub fn remove_file(&mut self, name: &str) {
        self.files.remove(name);
    }

    /// Cap on bytes returned by a single `File::read`
    #[must_use]
    pub fn with_read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes.max(1);
        self
    }

    /// Whether a volume is mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted_at.is_some()
    }
}

impl Filesystem for MockFilesystem {
    type Error = StorageError;
    type File = MockFile;

    fn mount<D: BlockDevice>(&mut self, device: &mut D, mount_point: &str) -> Result<(), Self::Error> {
        if self.probe.should_fail(FailPoint::Mount) {
            return Err(StorageError::NoCard);
        }
        if self.mounted_at.is_some() {
            return Err(StorageError::AlreadyMounted);
        }
        let mut boot = [0u8; BLOCK_SIZE];
        device
            .read_blocks(0, &mut boot)
            .map_err(|_| StorageError::Io)?;
        self.mounted_at = Some(mount_point.to_string());
        self.probe.record(Event::Mount);
        Ok(())
    }

    fn unmount(&mut self, mount_point: &str) -> Result<(), Self::Error> {
        if self.probe.should_fail(FailPoint::Unmount) {
            return Err(StorageError::Io);
        }
        match self.mounted_at.as_deref() {
            Some(current) if current == mount_point => {
                self.mounted_at = None;
                self.probe.record(Event::Unmount);
                Ok(())
            }
            Some(_) => Err(StorageError::InvalidPath),
            None => Err(StorageError::NotMounted),
        }
    }

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        if self.probe.should_fail(FailPoint::Open) {
            return Err(StorageError::Io);
        }
        let mount_point = self.mounted_at.as_deref().ok_or(StorageError::NotMounted)?;
        let name = strip_mount_point(path, mount_point).ok_or(StorageError::InvalidPath)?;
        let data = self.files.get(name).ok_or(StorageError::NotFound)?.clone();
        self.probe.record(Event::Open);
        Ok(MockFile {
            data,
            pos: 0,
            read_chunk: self.read_chunk,
            probe: self.probe.clone(),
        })
    }
}

/// Open handle onto a [`MockFilesystem`] file.
pub struct MockFile {
    data: Vec<u8>,
    pos: usize,
    read_chunk: usize,
    probe: MockProbe,
}

impl File for MockFile {
    type Error = StorageError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.probe.should_fail(FailPoint::Read) {
            return Err(StorageError::Io);
        }
        let remaining = self.data.get(self.pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len()).min(self.read_chunk);
        let (Some(dst), Some(src)) = (buf.get_mut(..n), remaining.get(..n)) else {
            return Err(StorageError::Io);
        };
        dst.copy_from_slice(src);
        self.pos += n;
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
