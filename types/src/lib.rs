pub mod config;
pub mod error;
pub mod nonstandard;
pub mod staking;

pub mod phase0 {
    pub mod consts;
    pub mod containers;
    pub mod primitives;
}
