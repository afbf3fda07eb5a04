use thiserror::Error;
use types::phase0::primitives::BasisPoints;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("percentile of an empty series is undefined")]
    EmptySeries,
    #[error("percentile {basis_points} bp is out of range")]
    PercentileOutOfRange { basis_points: BasisPoints },
    #[error("reward rate overflowed")]
    RewardRateOverflow,
}
