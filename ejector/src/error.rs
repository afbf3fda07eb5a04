use thiserror::Error;
use types::staking::{NodeOperatorId, StakingModuleId};

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("churn limit is zero")]
    ChurnLimitZero,
    #[error("epoch number overflowed")]
    EpochOverflow,
    #[error("exit queue positions start at 1")]
    ExitPositionZero,
    #[error("staking module ID {module_id} does not fit in 3 bytes")]
    ModuleIdOverflow { module_id: StakingModuleId },
    #[error("node operator ID {operator_id} does not fit in 5 bytes")]
    OperatorIdOverflow { operator_id: NodeOperatorId },
}
