//! Record framing and the level-based record tree.
//!
//! A section stream is a flat sequence of records. Each starts with a 32-bit
//! little-endian header word packing the tag id (bits 0-9), the nesting level
//! (bits 10-19) and the payload size (bits 20-31). A size of `0xFFF` is an
//! escape: the real size follows as a separate u32.
//!
//! Nesting is implied by levels alone. [`RecordTree`] rebuilds it with the
//! rule the format uses: a record of level `L` becomes the last child of the
//! record reached by descending `L` times through last children from the
//! root.

use super::consts::HwpTag;
use crate::common::{Error, Result};
use std::io::{self, Read};
use tracing::{debug, trace};

/// Size field value announcing an extended u32 size
pub const SIZE_ESCAPE: u32 = 0xFFF;

const TAG_MASK: u32 = 0x3FF;
const LEVEL_MASK: u32 = 0x3FF;
const LEVEL_SHIFT: u32 = 10;
const SIZE_SHIFT: u32 = 20;

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Tag id (10 bits)
    pub tag_id: u16,
    /// Nesting level (10 bits)
    pub level: u16,
    /// Payload size in bytes, after resolving the escape
    pub size: u32,
}

impl RecordHeader {
    /// Split a header word into its bit fields. `size` is the raw 12-bit
    /// field, so it equals [`SIZE_ESCAPE`] when an extended size follows.
    #[inline]
    pub fn from_word(word: u32) -> Self {
        Self {
            tag_id: (word & TAG_MASK) as u16,
            level: ((word >> LEVEL_SHIFT) & LEVEL_MASK) as u16,
            size: word >> SIZE_SHIFT,
        }
    }

    /// Read the next header from `reader`.
    ///
    /// Returns `Ok(None)` at a clean end of stream (no bytes left). A partial
    /// header word or a truncated extended size is a [`Error::Format`].
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut word = [0u8; 4];
        match read_full(reader, &mut word)? {
            0 => return Ok(None),
            4 => {},
            n => {
                return Err(Error::Format(format!(
                    "truncated record header: {n} of 4 bytes"
                )));
            },
        }

        let mut header = Self::from_word(u32::from_le_bytes(word));
        if header.size == SIZE_ESCAPE {
            let mut size = [0u8; 4];
            let n = read_full(reader, &mut size)?;
            if n < 4 {
                return Err(Error::Format(format!(
                    "truncated extended record size: {n} of 4 bytes"
                )));
            }
            header.size = u32::from_le_bytes(size);
        }
        Ok(Some(header))
    }

    /// Encode the header, using the escape form for sizes of `0xFFF` and up.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tag = u32::from(self.tag_id) & TAG_MASK;
        let level = (u32::from(self.level) & LEVEL_MASK) << LEVEL_SHIFT;
        if self.size >= SIZE_ESCAPE {
            let word = tag | level | (SIZE_ESCAPE << SIZE_SHIFT);
            let mut bytes = word.to_le_bytes().to_vec();
            bytes.extend_from_slice(&self.size.to_le_bytes());
            bytes
        } else {
            (tag | level | (self.size << SIZE_SHIFT)).to_le_bytes().to_vec()
        }
    }

    /// Bytes [`RecordHeader::to_bytes`] produces for this header.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        if self.size >= SIZE_ESCAPE { 8 } else { 4 }
    }

    #[inline]
    pub fn tag(&self) -> HwpTag {
        HwpTag::from(self.tag_id)
    }
}

/// Read until `buf` is full or the reader is exhausted; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(Error::from_stream_io(e)),
        }
    }
    Ok(filled)
}

/// Index of a record inside its [`RecordTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(usize);

impl RecordId {
    /// The synthetic root every level-0 record hangs from
    pub const ROOT: RecordId = RecordId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One record of a section stream.
#[derive(Debug, Clone)]
pub struct Record {
    pub tag_id: u16,
    pub level: u16,
    pub payload: Vec<u8>,
    parent: Option<RecordId>,
    children: Vec<RecordId>,
    index_in_parent: usize,
}

impl Record {
    #[inline]
    pub fn tag(&self) -> HwpTag {
        HwpTag::from(self.tag_id)
    }

    /// Parent record; `None` only for the root.
    #[inline]
    pub fn parent(&self) -> Option<RecordId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[RecordId] {
        &self.children
    }

    /// Position among the parent's children.
    #[inline]
    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent
    }
}

/// Records of one section arranged by level.
///
/// Records live in an arena in stream order; index 0 is a synthetic root
/// with tag 0 and an empty payload.
#[derive(Debug, Clone)]
pub struct RecordTree {
    records: Vec<Record>,
}

impl Default for RecordTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            records: vec![Record {
                tag_id: 0,
                level: 0,
                payload: Vec::new(),
                parent: None,
                children: Vec::new(),
                index_in_parent: 0,
            }],
        }
    }

    /// Parse every record from `reader` until it is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use hwp_tables::hwp::{HwpTag, RecordHeader, RecordTree};
    ///
    /// let mut stream = Vec::new();
    /// for (tag, level) in [(66u16, 0u16), (67, 1)] {
    ///     let header = RecordHeader { tag_id: tag, level, size: 2 };
    ///     stream.extend(header.to_bytes());
    ///     stream.extend([0x41, 0x00]);
    /// }
    ///
    /// let tree = RecordTree::from_reader(stream.as_slice()).unwrap();
    /// let para = tree.children(tree.root())[0];
    /// assert_eq!(tree.get(para).tag(), HwpTag::ParaHeader);
    /// assert_eq!(tree.get(tree.children(para)[0]).tag(), HwpTag::ParaText);
    /// ```
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut tree = Self::new();
        let mut consumed = 0u64;
        while let Some(header) = RecordHeader::read(&mut reader)? {
            let mut payload = Vec::new();
            (&mut reader)
                .take(u64::from(header.size))
                .read_to_end(&mut payload)
                .map_err(Error::from_stream_io)?;
            if payload.len() < header.size as usize {
                return Err(Error::Format(format!(
                    "truncated {} payload: {} of {} bytes",
                    header.tag().name(),
                    payload.len(),
                    header.size
                )));
            }
            trace!(
                tag = header.tag().name(),
                tag_id = header.tag_id,
                level = header.level,
                size = header.size,
                "record"
            );
            consumed += (header.encoded_len() + payload.len()) as u64;
            tree.push(header.tag_id, header.level, payload);
        }
        debug!(records = tree.len() - 1, bytes = consumed, "record tree built");
        Ok(tree)
    }

    /// Attach a record according to its level.
    ///
    /// Descent stops early when a record on the path has no children yet, so
    /// a level jump attaches to the deepest record available.
    pub fn push(&mut self, tag_id: u16, level: u16, payload: Vec<u8>) -> RecordId {
        let mut parent = RecordId::ROOT;
        for _ in 0..level {
            match self.records[parent.0].children.last() {
                Some(&child) => parent = child,
                None => break,
            }
        }

        let id = RecordId(self.records.len());
        let siblings = &mut self.records[parent.0].children;
        let index_in_parent = siblings.len();
        siblings.push(id);
        self.records.push(Record {
            tag_id,
            level,
            payload,
            parent: Some(parent),
            children: Vec::new(),
            index_in_parent,
        });
        id
    }

    #[inline]
    pub fn root(&self) -> RecordId {
        RecordId::ROOT
    }

    /// Record for `id`.
    ///
    /// # Panics
    ///
    /// If `id` belongs to a different tree.
    #[inline]
    pub fn get(&self, id: RecordId) -> &Record {
        &self.records[id.0]
    }

    #[inline]
    pub fn parent(&self, id: RecordId) -> Option<RecordId> {
        self.get(id).parent
    }

    #[inline]
    pub fn children(&self, id: RecordId) -> &[RecordId] {
        &self.get(id).children
    }

    /// Up to `count` siblings immediately after `id`, in order.
    pub fn next_siblings(&self, id: RecordId, count: usize) -> &[RecordId] {
        let record = self.get(id);
        let Some(parent) = record.parent else {
            return &[];
        };
        let siblings = self.children(parent);
        let start = (record.index_in_parent + 1).min(siblings.len());
        let end = start.saturating_add(count).min(siblings.len());
        &siblings[start..end]
    }

    /// First direct child of `id` carrying `tag`.
    pub fn first_child_with_tag(&self, id: RecordId, tag: HwpTag) -> Option<RecordId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.get(child).tag() == tag)
    }

    /// Pre-order walk of every record below `id` (excluding `id`).
    pub fn descendants(&self, id: RecordId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Number of records, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the tree holds nothing but the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.len() == 1
    }
}

/// Iterator returned by [`RecordTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a RecordTree,
    stack: Vec<RecordId>,
}

impl Iterator for Descendants<'_> {
    type Item = RecordId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
pub(crate) fn encode_record(tag_id: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let header = RecordHeader {
        tag_id,
        level,
        size: payload.len() as u32,
    };
    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(payload);
    bytes
}
