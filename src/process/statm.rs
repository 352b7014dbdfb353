//! Memory accounting from `/proc/<pid>/statm`.
//!
//! The file holds seven page counts on a single line:
//! `size resident shared text lib data dt`. Each field is converted to
//! bytes using the host page size.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::trace;

use crate::process::page::PAGE_SIZE;
use crate::size::ByteSize;

/// Number of fields in a statm record.
pub const STATM_FIELDS: usize = 7;

const FIELD_NAMES: [&str; STATM_FIELDS] =
    ["size", "resident", "shared", "text", "lib", "data", "dirty"];

/// Decoded contents of one statm read, all values in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRecord {
    /// Total program size (VmSize).
    pub size: ByteSize,
    /// Resident set size.
    pub resident: ByteSize,
    /// Resident shared pages (file or shmem backed).
    pub shared: ByteSize,
    /// Text (code).
    pub text: ByteSize,
    /// Library, unused since Linux 2.6 and always zero.
    pub lib: ByteSize,
    /// Data plus stack.
    pub data: ByteSize,
    /// Dirty pages, unused since Linux 2.6 and always zero.
    pub dirty: ByteSize,
}

/// Why a statm payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedStatm {
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),

    #[error("field {field} is not an unsigned integer: \"{token}\"")]
    InvalidField { field: &'static str, token: String },

    #[error("field {field} overflows when converted to bytes")]
    Overflow { field: &'static str },
}

/// Failure to sample one process.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The statm file could not be read, usually because the process exited.
    #[error("no such pid ({pid}): {source}")]
    ProcessNotFound {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but does not hold a statm record.
    #[error("couldn't parse statm data for pid {pid}: {source}")]
    MalformedRecord {
        pid: u32,
        #[source]
        source: MalformedStatm,
    },
}

impl SampleError {
    pub fn pid(&self) -> u32 {
        match self {
            SampleError::ProcessNotFound { pid, .. } | SampleError::MalformedRecord { pid, .. } => {
                *pid
            }
        }
    }
}

/// Parses the text of a statm file, multiplying every field by `page_size`.
pub fn parse_statm(content: &str, page_size: u64) -> Result<MemoryRecord, MalformedStatm> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != STATM_FIELDS {
        return Err(MalformedStatm::FieldCount(tokens.len()));
    }

    let mut bytes = [ByteSize::ZERO; STATM_FIELDS];
    for ((slot, token), field) in bytes.iter_mut().zip(&tokens).zip(FIELD_NAMES) {
        let pages: u64 = token.parse().map_err(|_| MalformedStatm::InvalidField {
            field,
            token: token.to_string(),
        })?;
        let value = pages
            .checked_mul(page_size)
            .ok_or(MalformedStatm::Overflow { field })?;
        *slot = ByteSize::from_bytes(value);
    }

    let [size, resident, shared, text, lib, data, dirty] = bytes;
    Ok(MemoryRecord {
        size,
        resident,
        shared,
        text,
        lib,
        data,
        dirty,
    })
}

/// Reads statm records below a proc root.
#[derive(Debug, Clone)]
pub struct StatmReader {
    proc_root: PathBuf,
    page_size: u64,
}

impl Default for StatmReader {
    fn default() -> Self {
        Self::new()
    }
}

impl StatmReader {
    /// Reader for the live `/proc` using the host page size.
    pub fn new() -> Self {
        Self::with_root("/proc", *PAGE_SIZE)
    }

    /// Reader for an arbitrary proc-like tree, e.g. a test fixture.
    pub fn with_root(proc_root: impl Into<PathBuf>, page_size: u64) -> Self {
        Self {
            proc_root: proc_root.into(),
            page_size,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn statm_path(&self, pid: u32) -> PathBuf {
        self.proc_root.join(pid.to_string()).join("statm")
    }

    /// Reads and decodes the current statm record of `pid`.
    ///
    /// Every call performs exactly one file read; nothing is cached.
    pub fn sample(&self, pid: u32) -> Result<MemoryRecord, SampleError> {
        let path = self.statm_path(pid);
        let content = fs::read_to_string(&path)
            .map_err(|source| SampleError::ProcessNotFound { pid, source })?;

        trace!("Read {} bytes from {}", content.len(), path.display());

        parse_statm(&content, self.page_size)
            .map_err(|source| SampleError::MalformedRecord { pid, source })
    }
}
