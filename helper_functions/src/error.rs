use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("epoch number overflowed")]
    EpochOverflow,
    #[error("timestamp overflowed")]
    TimestampOverflow,
}
