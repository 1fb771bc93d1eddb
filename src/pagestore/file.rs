//! Segment-file page store
//!
//! Append-only segment files with CRC-framed records.
//!
//! ## File Format
//!
//! Each segment is a sequence of frames:
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────┐
//! │ Len (4)  │ CRC (4)  │ Flags(1) │     Payload     │
//! └──────────┴──────────┴──────────┴─────────────────┘
//! ```
//!
//! - `Len`: payload length, little-endian
//! - `CRC`: crc32 over the payload only, so flipping the flags byte never
//!   invalidates the checksum
//! - `Flags`: bit 0 set marks the record dead (deleted in place)
//!
//! Segments roll once they exceed the configured size limit. A record's
//! location is `(segment id, frame start offset)`; records are never moved,
//! so locations stay valid until compaction (an external policy) rewrites
//! the segment.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{CairnError, Result};

use super::{Location, PageStore};

/// Frame header size: 4 bytes length + 4 bytes CRC + 1 byte flags
const FRAME_HEADER_SIZE: u64 = 9;

/// Flags bit marking a deleted record
const FLAG_DEAD: u8 = 0x01;

/// Upper bound on a single payload (guards against reading garbage lengths
/// when handed a location that does not point at a frame start)
const MAX_PAYLOAD_SIZE: u32 = 1 << 30;

/// Append-only segment-file page store
///
/// ## Concurrency:
/// - `appender`: Mutex over the active segment writer (single flush at a
///   time drives writes)
/// - Reads open their own file handle, so they never contend with the
///   appender or each other
pub struct FilePageStore {
    /// Directory holding the segment files
    dir: PathBuf,

    /// Roll to a new segment once the active one exceeds this size
    segment_size_limit: u64,

    /// Active segment writer state
    appender: Mutex<Appender>,
}

/// Writer state for the active segment
struct Appender {
    segment_id: u32,
    file: File,
    offset: u64,
}

impl FilePageStore {
    /// Open or create a segment store in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Discover existing segment files
    /// 3. Reopen the highest-numbered segment for appending
    pub fn open(dir: &Path, segment_size_limit: u64) -> Result<Self> {
        fs::create_dir_all(dir)?;

        // Discover existing segments
        let mut segment_ids: Vec<u32> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(id) = Self::parse_segment_id(&path) {
                    segment_ids.push(id);
                }
            }
        }
        segment_ids.sort_unstable();

        // Continue in the newest segment, or start segment 1
        let segment_id = segment_ids.last().copied().unwrap_or(1);
        let path = Self::segment_path_in(dir, segment_id);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        let offset = file.metadata()?.len();

        tracing::debug!(
            segments = segment_ids.len(),
            active = segment_id,
            offset,
            "opened segment store"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            segment_size_limit,
            appender: Mutex::new(Appender {
                segment_id,
                file,
                offset,
            }),
        })
    }

    /// IDs of all segment files currently on disk, ascending
    pub fn segment_ids(&self) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(id) = Self::parse_segment_id(&path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// The segment directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Generate the file path for a segment with the given ID
    fn segment_path(&self, id: u32) -> PathBuf {
        Self::segment_path_in(&self.dir, id)
    }

    /// Generate a segment path given a directory and ID
    fn segment_path_in(dir: &Path, id: u32) -> PathBuf {
        dir.join(format!("segment_{:06}.seg", id))
    }

    /// Parse a segment ID from a filename
    /// "segment_000042.seg" → Some(42)
    fn parse_segment_id(path: &Path) -> Option<u32> {
        if path.extension()?.to_str()? != "seg" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix("segment_")?;
        id_str.parse().ok()
    }

    /// Roll the appender to a fresh segment
    fn roll_segment(&self, appender: &mut Appender) -> Result<()> {
        appender.file.sync_all()?;

        let next_id = appender.segment_id + 1;
        let path = self.segment_path(next_id);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        tracing::debug!(segment = next_id, "rolled to new segment");

        appender.segment_id = next_id;
        appender.file = file;
        appender.offset = 0;
        Ok(())
    }

    /// Read and validate the frame header at `offset`
    ///
    /// Returns `(payload_len, crc, flags)`.
    fn read_frame_header(file: &mut File, offset: u64) -> Result<(u32, u32, u8)> {
        file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; FRAME_HEADER_SIZE as usize];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            // Past the end of the segment — no record was ever written here
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(CairnError::AddressNotFound)
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let crc = u32::from_le_bytes(header[4..8].try_into().unwrap());
        let flags = header[8];

        if len > MAX_PAYLOAD_SIZE {
            return Err(CairnError::Corrupt(format!(
                "frame length {} exceeds maximum {}",
                len, MAX_PAYLOAD_SIZE
            )));
        }

        Ok((len, crc, flags))
    }
}

impl PageStore for FilePageStore {
    fn write(&self, bytes: &[u8]) -> Result<Location> {
        let mut appender = self.appender.lock();

        let frame_len = FRAME_HEADER_SIZE + bytes.len() as u64;
        if appender.offset > 0 && appender.offset + frame_len > self.segment_size_limit {
            self.roll_segment(&mut appender)?;
        }

        let location = Location::new(appender.segment_id, appender.offset)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(bytes);
        let crc = hasher.finalize();

        let mut header = [0u8; FRAME_HEADER_SIZE as usize];
        header[0..4].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
        header[4..8].copy_from_slice(&crc.to_le_bytes());
        header[8] = 0;

        appender.file.write_all(&header)?;
        appender.file.write_all(bytes)?;
        appender.offset += frame_len;

        Ok(location)
    }

    fn read(&self, location: Location) -> Result<Bytes> {
        let path = self.segment_path(location.segment());
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CairnError::AddressNotFound),
            Err(e) => return Err(e.into()),
        };

        let (len, expected_crc, flags) = Self::read_frame_header(&mut file, location.offset())?;

        if flags & FLAG_DEAD != 0 {
            return Err(CairnError::AddressNotFound);
        }

        let mut payload = vec![0u8; len as usize];
        file.read_exact(&mut payload).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                CairnError::Corrupt(format!(
                    "truncated record at segment {} offset {}",
                    location.segment(),
                    location.offset()
                ))
            } else {
                e.into()
            }
        })?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&payload);
        if hasher.finalize() != expected_crc {
            return Err(CairnError::Corrupt(format!(
                "CRC mismatch at segment {} offset {}",
                location.segment(),
                location.offset()
            )));
        }

        Ok(Bytes::from(payload))
    }

    fn delete(&self, location: Location) -> Result<()> {
        let path = self.segment_path(location.segment());
        let mut file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CairnError::AddressNotFound),
            Err(e) => return Err(e.into()),
        };

        // Validate there really is a live record here before flipping its flag
        let (_, _, flags) = Self::read_frame_header(&mut file, location.offset())?;
        if flags & FLAG_DEAD != 0 {
            return Err(CairnError::AddressNotFound);
        }

        file.seek(SeekFrom::Start(location.offset() + 8))?;
        file.write_all(&[FLAG_DEAD])?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        let appender = self.appender.lock();
        appender.file.sync_all()?;
        Ok(())
    }
}
