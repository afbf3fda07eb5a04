use tiny_keccak::{Hasher as _, Keccak};
use types::phase0::primitives::{Slot, H256};

const WORD_SIZE: usize = 32;
const STATIC_FIELD_COUNT: usize = 5;

/// Report submitted to the report contract once a quorum agrees on its hash.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Report {
    pub consensus_version: u64,
    pub ref_slot: Slot,
    pub requests_count: u64,
    pub data_format: u64,
    pub data: Vec<u8>,
}

impl Report {
    /// ABI encoding of the report as a single
    /// `(uint256, uint256, uint256, uint256, bytes)` tuple parameter.
    #[must_use]
    pub fn abi_encode(&self) -> Vec<u8> {
        let padding = (WORD_SIZE - self.data.len() % WORD_SIZE) % WORD_SIZE;
        let capacity = (STATIC_FIELD_COUNT + 2) * WORD_SIZE + self.data.len() + padding;

        let mut bytes = Vec::with_capacity(capacity);

        // The tuple is dynamic because it contains `bytes`, so the encoding starts with its offset.
        bytes.extend_from_slice(&word(WORD_SIZE as u64));
        bytes.extend_from_slice(&word(self.consensus_version));
        bytes.extend_from_slice(&word(self.ref_slot));
        bytes.extend_from_slice(&word(self.requests_count));
        bytes.extend_from_slice(&word(self.data_format));
        bytes.extend_from_slice(&word((STATIC_FIELD_COUNT * WORD_SIZE) as u64));
        bytes.extend_from_slice(&word(self.data.len() as u64));
        bytes.extend_from_slice(&self.data);
        bytes.resize(capacity, 0);

        bytes
    }

    /// Keccak-256 hash of [`Report::abi_encode`], which is what report contracts compute.
    #[must_use]
    pub fn hash(&self) -> H256 {
        keccak256(&self.abi_encode())
    }
}

fn word(value: u64) -> [u8; WORD_SIZE] {
    H256::from_low_u64_be(value).to_fixed_bytes()
}

#[must_use]
fn keccak256(bytes: &[u8]) -> H256 {
    let mut hasher = Keccak::v256();
    let mut output = H256::zero();
    hasher.update(bytes);
    hasher.finalize(output.as_bytes_mut());
    output
}
