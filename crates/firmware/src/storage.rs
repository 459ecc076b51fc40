//! SD card handle.
//!
//! Mounting is tracked by the orchestrator, not here: the handle stays the
//! same object across any number of mount/unmount cycles.

use platform::{BlockDevice, IoctlOp, BLOCK_SIZE};

/// An initialised SD card
pub struct StorageHandle<S> {
    device: S,
}

impl<S: BlockDevice> StorageHandle<S> {
    pub(crate) fn new(device: S) -> Self {
        Self { device }
    }

    /// Underlying block device
    pub fn device(&self) -> &S {
        &self.device
    }

    /// Underlying block device, mutably
    pub fn device_mut(&mut self) -> &mut S {
        &mut self.device
    }

    /// Read whole sectors starting at `start_block`
    pub fn read_blocks(&mut self, start_block: u32, buf: &mut [u8]) -> Result<(), S::Error> {
        self.device.read_blocks(start_block, buf)
    }

    /// Write whole sectors starting at `start_block`
    pub fn write_blocks(&mut self, start_block: u32, buf: &[u8]) -> Result<(), S::Error> {
        self.device.write_blocks(start_block, buf)
    }

    /// Number of sectors on the card
    pub fn sector_count(&mut self) -> Result<u32, S::Error> {
        self.device.ioctl(IoctlOp::SectorCount)
    }

    /// Sector size in bytes (512 on every SD card seen so far)
    pub fn sector_size(&mut self) -> Result<u32, S::Error> {
        self.device.ioctl(IoctlOp::SectorSize)
    }

    /// Read sector 0 into a fresh buffer
    pub fn read_boot_sector(&mut self) -> Result<[u8; BLOCK_SIZE], S::Error> {
        let mut sector = [0u8; BLOCK_SIZE];
        self.device.read_blocks(0, &mut sector)?;
        Ok(sector)
    }
}
