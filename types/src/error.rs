use std::borrow::Cow;

use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Conditions showing that chain data itself is self-contradictory or corrupted.
///
/// Retrying cannot fix these. A frame whose report fails with one of them is abandoned.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("inconsistent protocol state: {details}")]
    InconsistentProtocolState { details: Cow<'static, str> },
    #[error("malformed protocol data: {details}")]
    MalformedData { details: Cow<'static, str> },
}

impl ProtocolError {
    #[must_use]
    pub fn is_in_chain_of(error: &AnyhowError) -> bool {
        error.chain().any(|cause| cause.is::<Self>())
    }
}
