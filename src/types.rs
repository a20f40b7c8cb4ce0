//! Shared types used across the codebase

use chrono::Utc;
use uuid::Uuid;

/// Length of a project identifier in hex characters (12 bytes)
pub const PROJECT_ID_LEN: usize = 24;

/// Project identifier: 24 hexadecimal characters, the id shape of the backing store.
///
/// The first 8 characters are the big-endian unix timestamp in seconds of creation,
/// the remaining 16 are random.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    /// Syntactic check only; never touches storage. Normalizes to lower-case hex,
    /// the form ids are stored in.
    pub fn parse(candidate: &str) -> Option<Self> {
        if Self::is_valid(candidate) {
            Some(Self(candidate.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn is_valid(candidate: &str) -> bool {
        candidate.len() == PROJECT_ID_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
