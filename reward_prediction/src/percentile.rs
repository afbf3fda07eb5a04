use anyhow::{ensure, Result};
use types::phase0::{
    consts::BASIS_POINTS_DENOMINATOR,
    primitives::{BasisPoints, Wei},
};

use crate::error::Error;

/// Percentile of `values` with linear interpolation between order statistics.
///
/// The result is truncated to an integer.
pub fn percentile(values: impl IntoIterator<Item = Wei>, basis_points: BasisPoints) -> Result<Wei> {
    let mut values = values.into_iter().collect::<Vec<_>>();
    let scaled = scaled_percentile(&mut values, basis_points)?;
    Ok(scaled / Wei::from(BASIS_POINTS_DENOMINATOR))
}

/// Percentile of `values` multiplied by [`BASIS_POINTS_DENOMINATOR`].
///
/// The interpolation weight is a whole number of basis points, so the scaled result is exact.
/// `values` are sorted in place.
pub(crate) fn scaled_percentile(values: &mut [Wei], basis_points: BasisPoints) -> Result<Wei> {
    ensure!(
        basis_points <= BASIS_POINTS_DENOMINATOR,
        Error::PercentileOutOfRange { basis_points },
    );

    ensure!(!values.is_empty(), Error::EmptySeries);

    values.sort_unstable();

    let denominator = Wei::from(BASIS_POINTS_DENOMINATOR);
    let position = (Wei::try_from(values.len())? - 1) * Wei::from(basis_points);
    let floor_index = usize::try_from(position / denominator)?;
    let weight = position % denominator;

    let floor_value = values[floor_index];

    let interpolated = if weight == 0 {
        Some(0)
    } else {
        (values[floor_index + 1] - floor_value).checked_mul(weight)
    };

    floor_value
        .checked_mul(denominator)
        .zip(interpolated)
        .and_then(|(floor, interpolated)| floor.checked_add(interpolated))
        .ok_or_else(|| Error::RewardRateOverflow.into())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(vec![30, 10, 40, 20], 0 => 10; "minimum")]
    #[test_case(vec![30, 10, 40, 20], 10_000 => 40; "maximum")]
    #[test_case(vec![10, 20, 30, 40], 5000 => 25; "median of even count")]
    #[test_case(vec![10, 20, 30], 5000 => 20; "median of odd count")]
    #[test_case(vec![7], 0 => 7; "single element at minimum")]
    #[test_case(vec![7], 3333 => 7; "single element")]
    #[test_case(vec![7], 10_000 => 7; "single element at maximum")]
    #[test_case(vec![0, 3], 5000 => 1; "truncated")]
    fn percentile_of_series(values: Vec<Wei>, basis_points: BasisPoints) -> Wei {
        percentile(values, basis_points).expect("percentile should be defined")
    }

    #[test]
    fn scaled_percentile_keeps_fraction() -> Result<()> {
        assert_eq!(scaled_percentile(&mut [0, 3], 5000)?, 15_000);
        assert_eq!(scaled_percentile(&mut [10, 20, 30, 40], 2500)?, 175_000);
        Ok(())
    }

    #[test]
    fn percentile_of_empty_series_is_an_error() {
        percentile([], 5000).expect_err("empty series has no percentile");
    }

    #[test]
    fn percentile_above_maximum_is_an_error() {
        percentile([1, 2, 3], 10_001).expect_err("10001 bp is out of range");
    }
}
