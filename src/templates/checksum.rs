//! Running SHA-1 digest over raw template bytes

use sha1::{Digest, Sha1};

/// Incremental checksum of every file read during one load
#[derive(Clone, Default)]
pub struct Checksum {
    hasher: Sha1,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Lowercase hex digest
    pub fn hexdigest(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
