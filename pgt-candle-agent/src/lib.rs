//! PGT actor-critic agent implemented with [candle](https://crates.io/crates/candle-core).
pub mod distribution;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod pgt;
mod tensor;
pub mod util;
use serde::{Deserialize, Serialize};
use thiserror::Error;
pub use tensor::BatchStates;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

/// Errors in converting devices.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Candle failed to open the device.
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    /// The device has no counterpart in [`Device`].
    #[error("Unsupported device: {0:?}")]
    Unsupported(candle_core::DeviceLocation),
}

impl TryFrom<&candle_core::Device> for Device {
    type Error = DeviceError;

    fn try_from(device: &candle_core::Device) -> Result<Self, Self::Error> {
        match device.location() {
            candle_core::DeviceLocation::Cpu => Ok(Self::Cpu),
            candle_core::DeviceLocation::Cuda { gpu_id } => Ok(Self::Cuda(gpu_id)),
            location => Err(DeviceError::Unsupported(location)),
        }
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = DeviceError;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}
