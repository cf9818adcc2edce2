//! Framing shared by every object the local node stores.
//!
//! ```text
//! "MFSO1" | kind: u8 | payload length: u64 LE | payload
//! ```
//!
//! An object's id is the BLAKE3 digest of its whole frame, so a blob and a
//! tree with the same payload never collide.

use std::fmt;

const MAGIC: &[u8; 5] = b"MFSO1";
const HEADER_LEN: usize = MAGIC.len() + 1 + 8;

/// What an object holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    Blob,
    Tree,
}

impl ObjectKind {
    fn tag(self) -> u8 {
        match self {
            Self::Blob => 1,
            Self::Tree => 2,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Blob),
            2 => Some(Self::Tree),
            _ => None,
        }
    }
}

/// Why a frame could not be opened.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FrameError {
    Truncated(usize),
    BadMagic,
    UnknownKind(u8),
    LengthMismatch { declared: u64, actual: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated(len) => write!(f, "frame of {} bytes has no header", len),
            Self::BadMagic => write!(f, "invalid magic bytes"),
            Self::UnknownKind(tag) => write!(f, "unknown kind: {}", tag),
            Self::LengthMismatch { declared, actual } => {
                write!(f, "header declares {} bytes, payload has {}", declared, actual)
            }
        }
    }
}

/// Wraps `payload` in a frame.
pub(crate) fn seal(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.push(kind.tag());
    frame.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Splits a frame back into its kind and payload.
pub(crate) fn open(frame: &[u8]) -> Result<(ObjectKind, &[u8]), FrameError> {
    if frame.len() < HEADER_LEN {
        return Err(FrameError::Truncated(frame.len()));
    }
    let (header, payload) = frame.split_at(HEADER_LEN);
    if &header[..MAGIC.len()] != MAGIC {
        return Err(FrameError::BadMagic);
    }

    let tag = header[MAGIC.len()];
    let kind = ObjectKind::from_tag(tag).ok_or(FrameError::UnknownKind(tag))?;

    let mut declared = [0u8; 8];
    declared.copy_from_slice(&header[MAGIC.len() + 1..]);
    let declared = u64::from_le_bytes(declared);
    if declared != payload.len() as u64 {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    Ok((kind, payload))
}
