use thiserror::Error;

/// Errors that can occur while bringing up or driving the GPU renderer.
#[derive(Debug, Error)]
pub enum NimbusError {
    #[error("GPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),

    #[error("Volume texture of {0}x{1}x{2} exceeds the device 3D texture limit {3}")]
    VolumeTooLarge(u32, u32, u32, u32),

    #[error("Frame readback failed: {0}")]
    ReadbackFailed(String),
}
