use candle_core::Device;

/// Picks the compute device for model inference.
///
/// GPU backends are only attempted when their feature is compiled in, in
/// the order Metal, then CUDA. A backend that fails to initialize is
/// logged and skipped; the CPU always works, so selection cannot fail.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            tracing::info!("Running inference on Metal");
            return device;
        }
        Err(e) => tracing::warn!(error = %e, "Metal backend failed to initialize, skipping"),
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            tracing::info!("Running inference on CUDA");
            return device;
        }
        Err(e) => tracing::warn!(error = %e, "CUDA backend failed to initialize, skipping"),
    }

    tracing::debug!("Running inference on CPU");
    Device::Cpu
}
