//! Raw RGB565 image loader.
//!
//! Images are headerless little-endian RGB565 dumps stored at the root of
//! the SD volume. The loader returns whatever bytes the file holds; the blit
//! pipeline's size check is what keeps a short file off the panel.

use alloc::vec::Vec;
use core::fmt::Write as _;

use platform::{Board, File, Filesystem};

use crate::error::{Error, IoFailure};
use crate::orchestrator::ResourceOrchestrator;

/// Capacity of the `<mount point>/<file name>` path buffer.
pub const PATH_CAPACITY: usize = 64;

const READ_CHUNK: usize = 512;

impl<B: Board> ResourceOrchestrator<B> {
    /// Read `<mount point>/<filename>` into memory.
    ///
    /// Brings up any missing resource, the display ahead of the SD card, and
    /// mounts the volume. When `keep_mounted` is false the volume is
    /// unmounted again before returning, whether or not the read succeeded.
    pub fn try_load_image(&mut self, filename: &str, keep_mounted: bool) -> Result<Vec<u8>, Error> {
        self.ensure_bus_ready()?;
        self.ensure_display_ready()?;
        self.ensure_storage_ready()?;
        self.mount_storage()?;

        let result = self.read_file(filename);

        if !keep_mounted {
            if let Err(e) = self.unmount_storage() {
                warn!("unmount after load failed: {}", e);
            }
        }
        result
    }

    /// [`try_load_image`](Self::try_load_image), logging and discarding the
    /// error.
    pub fn load_image(&mut self, filename: &str, keep_mounted: bool) -> Option<Vec<u8>> {
        match self.try_load_image(filename, keep_mounted) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!("image load failed: {}", e);
                None
            }
        }
    }

    fn read_file(&mut self, filename: &str) -> Result<Vec<u8>, Error> {
        let mut path: heapless::String<PATH_CAPACITY> = heapless::String::new();
        let mount_point = self.config().storage.mount_point;
        write!(path, "{mount_point}/{filename}").map_err(|_| Error::Io(IoFailure::PathTooLong))?;

        let mut file = self
            .board_mut()
            .filesystem()
            .open_file(&path)
            .map_err(|_| {
                error!("cannot open {}", path.as_str());
                Error::Io(IoFailure::Open)
            })?;

        let declared = usize::try_from(file.size()).unwrap_or(0);
        let mut data = Vec::with_capacity(declared);
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = file.read(&mut chunk).map_err(|_| {
                error!("read of {} failed after {} bytes", path.as_str(), data.len());
                Error::Io(IoFailure::Read)
            })?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(chunk.get(..n).ok_or(Error::Io(IoFailure::Read))?);
        }
        info!("loaded {} ({} bytes)", path.as_str(), data.len());
        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MountStateError;
    use platform::mocks::{Event, FailPoint, MockBoard};
    use platform::BoardConfig;

    fn staged(name: &str, bytes: &[u8]) -> ResourceOrchestrator<MockBoard> {
        let mut board = MockBoard::new();
        board.fs_mut().write_file(name, bytes.to_vec());
        ResourceOrchestrator::new(board, BoardConfig::default())
    }

    #[test]
    fn missing_file_is_absent_and_unmounts() {
        let mut orch = staged("other.rgb565", &[1, 2]);
        assert_eq!(orch.load_image("Test.rgb565", false), None);
        assert!(!orch.status().storage_mounted);
    }

    #[test]
    fn read_error_still_releases_mount() {
        let mut orch = staged("Test.rgb565", &[0u8; 1024]);
        orch.board().probe().fail(FailPoint::Read);
        assert_eq!(
            orch.try_load_image("Test.rgb565", false),
            Err(Error::Io(IoFailure::Read))
        );
        assert!(!orch.status().storage_mounted);
    }

    #[test]
    fn overlong_name_is_rejected() {
        let mut orch = staged("x", &[]);
        let name = "n".repeat(PATH_CAPACITY);
        assert_eq!(
            orch.try_load_image(&name, true),
            Err(Error::Io(IoFailure::PathTooLong))
        );
        assert!(orch.status().storage_mounted);
    }

    #[test]
    fn mount_failure_surfaces_as_mount_state() {
        let mut orch = staged("Test.rgb565", &[0u8; 4]);
        orch.board().probe().fail(FailPoint::Mount);
        assert_eq!(
            orch.try_load_image("Test.rgb565", true),
            Err(Error::MountState(MountStateError::MountFailed))
        );
        assert_eq!(orch.board().probe().count(&Event::Open), 0);
    }

    #[test]
    fn empty_file_loads_as_empty_buffer() {
        let mut orch = staged("empty.rgb565", &[]);
        assert_eq!(orch.load_image("empty.rgb565", true), Some(Vec::new()));
    }
}
