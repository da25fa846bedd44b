use super::consts::*;
use encoding_rs::UTF_16LE;
use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;
use tracing::trace;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw compound file header (512 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 8],
    _clsid: [u8; 16],
    _minor_version: U16<LE>,
    dll_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    _reserved: [u8; 6],
    _num_dir_sectors: U32<LE>,
    _num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    _transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Raw OLE directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    _node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    _clsid: [u8; 16],
    _state_bits: U32<LE>,
    _creation_time: U64<LE>,
    _modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Error types for OLE file parsing
#[derive(Debug, Error)]
pub enum OleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not an OLE file")]
    NotOleFile,
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
}

/// Represents an OLE directory entry (stream or storage)
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Storage ID (index in directory)
    pub sid: u32,
    /// Entry name (UTF-16 decoded)
    pub name: String,
    /// Entry type (stream, storage, root)
    pub entry_type: u8,
    /// Index of left sibling in red-black tree
    pub sid_left: u32,
    /// Index of right sibling in red-black tree
    pub sid_right: u32,
    /// Index of child node in red-black tree
    pub sid_child: u32,
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
}

impl DirectoryEntry {
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    pub fn is_storage(&self) -> bool {
        self.entry_type == STGTY_STORAGE || self.entry_type == STGTY_ROOT
    }
}

/// An OLE2 structured storage file.
///
/// The FAT, MiniFAT and directory are loaded by [`OleFile::open`]; stream
/// contents are read lazily by [`OleFile::open_stream`].
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    sector_size: usize,
    mini_sector_size: usize,
    /// File Allocation Table - maps sector to next sector in chain
    fat: Vec<u32>,
    /// Mini FAT - for streams smaller than cutoff size
    minifat: Vec<u32>,
    /// Directory entries indexed by SID; `None` for unreachable slots
    entries: Vec<Option<DirectoryEntry>>,
    /// Mini stream data (loaded on first use)
    ministream: Option<Vec<u8>>,
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse an OLE file from a reader
    pub fn open(mut reader: R) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(OleError::NotOleFile);
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = RawHeader::read_from_bytes(&header_bytes[..])
            .map_err(|_| OleError::InvalidFormat("Failed to parse header".to_string()))?;

        if &header.magic != MAGIC {
            return Err(OleError::NotOleFile);
        }
        if header.byte_order.get() != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }

        let sector_shift = header.sector_shift.get();
        let mini_sector_shift = header.mini_sector_shift.get();
        if !(7..=16).contains(&sector_shift) || mini_sector_shift >= sector_shift {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported sector shift {sector_shift}/{mini_sector_shift}"
            )));
        }
        let sector_size = 1usize << sector_shift;
        let dll_version = header.dll_version.get();
        if (dll_version == 3 && sector_size != 512) || (dll_version == 4 && sector_size != 4096) {
            return Err(OleError::InvalidFormat("Sector size mismatch".to_string()));
        }

        if header.mini_stream_cutoff.get() != MINI_STREAM_CUTOFF {
            return Err(OleError::InvalidFormat(format!(
                "Mini stream cutoff must be {MINI_STREAM_CUTOFF}, got {}",
                header.mini_stream_cutoff.get()
            )));
        }

        let mut ole = OleFile {
            reader,
            sector_size,
            mini_sector_size: 1usize << mini_sector_shift,
            fat: Vec::new(),
            minifat: Vec::new(),
            entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header)?;
        ole.load_directory(header.first_dir_sector.get())?;
        if header.num_minifat_sectors.get() > 0 {
            ole.load_minifat(header.first_minifat_sector.get())?;
        }
        trace!(
            sector_size,
            fat_entries = ole.fat.len(),
            minifat_entries = ole.minifat.len(),
            directory_entries = ole.entries.len(),
            "opened compound file"
        );

        Ok(ole)
    }

    /// Load the File Allocation Table.
    ///
    /// The first 109 FAT sector ids live in the header; further ids are
    /// chained through DIFAT sectors, whose last slot points to the next one.
    fn load_fat(&mut self, header: &RawHeader) -> Result<(), OleError> {
        let mut fat_sectors: Vec<u32> = header
            .difat
            .iter()
            .map(|v| v.get())
            .take_while(|&s| s != FREESECT && s != ENDOFCHAIN)
            .collect();

        let ids_per_sector = self.sector_size / 4;
        let mut difat_sector = header.first_difat_sector.get();
        for _ in 0..header.num_difat_sectors.get() {
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                break;
            }
            let ids = le_u32s(&self.read_sector(difat_sector)?);
            fat_sectors.extend(
                ids[..ids_per_sector - 1]
                    .iter()
                    .copied()
                    .take_while(|&s| s != FREESECT && s != ENDOFCHAIN),
            );
            difat_sector = ids[ids_per_sector - 1];
        }

        self.fat.reserve(fat_sectors.len() * ids_per_sector);
        for sector_id in fat_sectors {
            let sector = self.read_sector(sector_id)?;
            self.fat.extend(le_u32s(&sector));
        }
        Ok(())
    }

    /// Load the Mini FAT (for small streams)
    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let data = self.read_chain(first_minifat_sector)?;
        self.minifat = le_u32s(&data);
        Ok(())
    }

    /// Parse every directory entry reachable from the root.
    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let dir_data = self.read_chain(first_dir_sector)?;
        let slot_count = dir_data.len() / DIRENTRY_SIZE;
        if slot_count == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }
        self.entries = vec![None; slot_count];

        let mut pending = vec![0u32];
        while let Some(sid) = pending.pop() {
            if sid == NOSTREAM {
                continue;
            }
            let index = sid as usize;
            if index >= slot_count {
                return Err(OleError::CorruptedFile(format!(
                    "Directory entry {sid} out of range"
                )));
            }
            if self.entries[index].is_some() {
                continue;
            }
            let offset = index * DIRENTRY_SIZE;
            let entry = self.parse_directory_entry(&dir_data[offset..offset + DIRENTRY_SIZE], sid)?;
            pending.extend([entry.sid_left, entry.sid_right, entry.sid_child]);
            self.entries[index] = Some(entry);
        }
        Ok(())
    }

    fn parse_directory_entry(&self, data: &[u8], sid: u32) -> Result<DirectoryEntry, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| OleError::InvalidFormat("Failed to parse directory entry".to_string()))?;

        let name_len = (raw.name_len.get() as usize).saturating_sub(2).min(64);
        let (name, _) = UTF_16LE.decode_without_bom_handling(&raw.name[..name_len]);

        // 512-byte sector files only define the low 32 bits of the size
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Ok(DirectoryEntry {
            sid,
            name: name.trim_end_matches('\0').to_string(),
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
        })
    }

    /// Read a single sector from the file
    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>, OleError> {
        // Sector 0 starts right after the header, which is one sector long
        let position = (sector_id as u64 + 1) * self.sector_size as u64;
        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a regular stream by following its FAT chain
    fn read_chain(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut visited = 0usize;
        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(OleError::CorruptedFile(format!(
                    "Invalid sector index {sector} in FAT"
                )));
            }
            visited += 1;
            if visited > self.fat.len() {
                return Err(OleError::CorruptedFile("Cyclic FAT chain".to_string()));
            }
            data.extend_from_slice(&self.read_sector(sector)?);
            sector = self.fat[sector as usize];
        }
        Ok(data)
    }

    /// Read a small stream by following its MiniFAT chain
    fn read_mini_chain(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root_start = self
                .entries
                .first()
                .and_then(Option::as_ref)
                .map(|root| root.start_sector)
                .ok_or_else(|| OleError::CorruptedFile("No root entry".to_string()))?;
            self.ministream = Some(self.read_chain(root_start)?);
        }
        let ministream = self.ministream.as_deref().unwrap_or_default();

        // The declared size is untrusted; the mini stream bounds the chain.
        let mut data = Vec::with_capacity(size.min(ministream.len() as u64) as usize);
        let mut sector = start_sector;
        let mut visited = 0usize;
        while sector != ENDOFCHAIN {
            let next = *self.minifat.get(sector as usize).ok_or_else(|| {
                OleError::CorruptedFile(format!("Invalid sector index {sector} in MiniFAT"))
            })?;
            visited += 1;
            if visited > self.minifat.len() {
                return Err(OleError::CorruptedFile("Cyclic MiniFAT chain".to_string()));
            }
            let position = sector as usize * self.mini_sector_size;
            let chunk = ministream
                .get(position..position + self.mini_sector_size)
                .ok_or_else(|| OleError::CorruptedFile("Mini sector out of bounds".to_string()))?;
            data.extend_from_slice(chunk);
            sector = next;
        }
        data.truncate(size as usize);
        Ok(data)
    }

    /// Find a directory entry by path, comparing names case-insensitively
    fn find_entry(&self, path: &[&str]) -> Option<&DirectoryEntry> {
        let mut current = self.entries.first()?.as_ref()?;
        for name in path {
            current = self.find_child(current.sid_child, name)?;
        }
        Some(current)
    }

    /// Search one storage's red-black tree of children for `name`
    fn find_child(&self, first: u32, name: &str) -> Option<&DirectoryEntry> {
        let mut pending = vec![first];
        let mut budget = self.entries.len();
        while let Some(sid) = pending.pop() {
            if sid == NOSTREAM || budget == 0 {
                continue;
            }
            budget -= 1;
            let entry = self.entries.get(sid as usize)?.as_ref()?;
            if entry.name.to_lowercase() == name.to_lowercase() {
                return Some(entry);
            }
            pending.push(entry.sid_right);
            pending.push(entry.sid_left);
        }
        None
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_some()
    }

    /// Open a stream by path and return its contents
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self
            .find_entry(path)
            .ok_or_else(|| OleError::StreamNotFound(path.join("/")))?;
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!(
                "{} is not a stream",
                path.join("/")
            )));
        }
        let (start, size) = (entry.start_sector, entry.size);

        if size < MINI_STREAM_CUTOFF as u64 {
            self.read_mini_chain(start, size)
        } else {
            let mut data = self.read_chain(start)?;
            if (data.len() as u64) < size {
                return Err(OleError::CorruptedFile(format!(
                    "Stream {} shorter than its declared size",
                    path.join("/")
                )));
            }
            data.truncate(size as usize);
            Ok(data)
        }
    }

    /// List all streams as paths of storage/stream names
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        let Some(root) = self.entries.first().and_then(Option::as_ref) else {
            return streams;
        };
        let mut pending = vec![(root.sid_child, Vec::<String>::new())];
        let mut budget = self.entries.len();
        while let Some((sid, prefix)) = pending.pop() {
            if sid == NOSTREAM || budget == 0 {
                continue;
            }
            budget -= 1;
            let Some(entry) = self.entries.get(sid as usize).and_then(Option::as_ref) else {
                continue;
            };
            pending.push((entry.sid_left, prefix.clone()));
            pending.push((entry.sid_right, prefix.clone()));

            let mut path = prefix;
            path.push(entry.name.clone());
            if entry.is_stream() {
                streams.push(path);
            } else if entry.is_storage() {
                pending.push((entry.sid_child, path));
            }
        }
        streams.sort();
        streams
    }
}

/// Split a buffer into little-endian u32 values
fn le_u32s(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|chunk| {
            U32::<LE>::read_from_bytes(chunk)
                .map(|v| v.get())
                .unwrap_or_default()
        })
        .collect()
}

/// Check if a file/data is an OLE file by checking magic bytes
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}


#[cfg(test)]
mod tests {
    use super::fixture::{build_compound_file, build_compound_file_with_difat};
    use super::*;
    use std::io::Cursor;

    fn pattern(len: u32) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn sample_streams() -> (Vec<u8>, Vec<u8>) {
        (pattern(5000), pattern(300))
    }

    fn sample() -> OleFile<Cursor<Vec<u8>>> {
        let (big, small) = sample_streams();
        let bytes = build_compound_file(&[
            (&["FileHeader"], b"header bytes"),
            (&["BodyText", "Section0"], &big),
            (&["BodyText", "Section1"], b""),
            (&["BodyText", "Section2"], &small),
        ]);
        OleFile::open(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_open_and_read_streams() {
        let mut ole = sample();
        assert_eq!(ole.open_stream(&["FileHeader"]).unwrap(), b"header bytes");

        let section = ole.open_stream(&["BodyText", "Section0"]).unwrap();
        assert_eq!(section.len(), 5000);
        assert_eq!(section[4999], (4999 % 251) as u8);

        assert!(ole.open_stream(&["BodyText", "Section1"]).unwrap().is_empty());
    }

    #[test]
    fn test_small_streams_follow_minifat_chains() {
        let mut ole = sample();
        assert!(!ole.minifat.is_empty());
        assert!(ole.ministream.is_none());

        // 300 bytes span five 64-byte mini sectors.
        let (_, small) = sample_streams();
        assert_eq!(ole.open_stream(&["BodyText", "Section2"]).unwrap(), small);
        assert!(ole.ministream.is_some());
        assert_eq!(ole.open_stream(&["FileHeader"]).unwrap(), b"header bytes");
    }

    #[test]
    fn test_fat_located_through_difat_sector() {
        let (big, small) = sample_streams();
        let streams: [(&[&str], &[u8]); 2] = [(&["Big"], big.as_slice()), (&["Small"], small.as_slice())];
        let mut ole = OleFile::open(Cursor::new(build_compound_file_with_difat(&streams))).unwrap();
        assert_eq!(ole.fat[1], DIFSECT);
        assert_eq!(ole.open_stream(&["Big"]).unwrap(), big);
        assert_eq!(ole.open_stream(&["Small"]).unwrap(), small);
    }

    #[test]
    fn test_rejects_nonstandard_mini_cutoff() {
        let mut bytes = build_compound_file(&[(&["FileHeader"], b"header bytes")]);
        bytes[0x38..0x3C].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            OleFile::open(Cursor::new(bytes)),
            Err(OleError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_broken_minifat_chain_is_corruption() {
        let mut ole = sample();
        ole.minifat.clear();
        assert!(matches!(
            ole.open_stream(&["FileHeader"]),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_exists_is_case_insensitive() {
        let ole = sample();
        assert!(ole.exists(&["bodytext", "SECTION0"]));
        assert!(ole.exists(&["BodyText"]));
        assert!(!ole.exists(&["BodyText", "Section3"]));
    }

    #[test]
    fn test_missing_stream_and_storage_errors() {
        let mut ole = sample();
        assert!(matches!(
            ole.open_stream(&["DocInfo"]),
            Err(OleError::StreamNotFound(_))
        ));
        assert!(matches!(
            ole.open_stream(&["BodyText"]),
            Err(OleError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_list_streams() {
        let ole = sample();
        let streams = ole.list_streams();
        assert_eq!(
            streams,
            vec![
                vec!["BodyText".to_string(), "Section0".to_string()],
                vec!["BodyText".to_string(), "Section1".to_string()],
                vec!["BodyText".to_string(), "Section2".to_string()],
                vec!["FileHeader".to_string()],
            ]
        );
    }

    #[test]
    fn test_rejects_non_ole_data() {
        let data = vec![0u8; 2048];
        assert!(!is_ole_file(&data));
        assert!(matches!(
            OleFile::open(Cursor::new(data)),
            Err(OleError::NotOleFile)
        ));
    }
}
