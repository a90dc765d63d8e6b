mod device;
mod engine;
mod tone;

pub use device::{DeviceError, ToneDevice, ToneOutput};
pub use engine::CpalOutput;
