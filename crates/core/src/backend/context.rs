//! wgpu device acquisition for the GPU backend
//!
//! A missing adapter is normal on headless machines and is reported as
//! `NoGpuFound`; an adapter that exists but refuses to hand out a device is
//! `InitFailed`, which usually points at a driver problem.

/// Outcome of looking for a usable GPU
#[derive(Debug)]
pub enum GpuInitResult {
    /// Device and queue are ready
    #[cfg(feature = "gpu")]
    Success(GpuContext),
    /// No compatible adapter
    NoGpuFound,
    /// An adapter was found but device creation failed
    InitFailed {
        /// Adapter reported by the driver
        adapter_name: String,
        /// Driver error
        error: String,
    },
}

#[cfg(feature = "gpu")]
mod gpu_impl {
    use super::GpuInitResult;
    use tracing::{debug, info};

    /// Largest buffer the backend binds, in bytes, for an `n × n` grid:
    /// three `vec2<f32>` spectra stored back to back
    fn spectra_buffer_bytes(n: u64) -> Option<u64> {
        n.checked_mul(n)?.checked_mul(3 * 8)
    }

    fn request_adapter(instance: &wgpu::Instance) -> Option<wgpu::Adapter> {
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
    }

    /// Default limits raised to whatever the adapter allows for storage buffers,
    /// so 2048² and 4096² grids are not rejected by the conservative defaults
    fn ocean_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
        let supported = adapter.limits();
        wgpu::Limits {
            max_storage_buffer_binding_size: supported.max_storage_buffer_binding_size,
            max_buffer_size: supported.max_buffer_size,
            ..wgpu::Limits::default()
        }
    }

    /// Device, queue and the adapter they came from
    #[derive(Debug)]
    pub struct GpuContext {
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_info: wgpu::AdapterInfo,
    }

    impl GpuContext {
        /// Look for a high-performance adapter and open a compute device on it
        #[allow(clippy::new_ret_no_self)]
        pub fn new() -> GpuInitResult {
            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let Some(adapter) = request_adapter(&instance) else {
                debug!("No GPU adapter available");
                return GpuInitResult::NoGpuFound;
            };
            let adapter_info = adapter.get_info();
            debug!(
                "GPU adapter: {} ({:?}, {:?})",
                adapter_info.name, adapter_info.device_type, adapter_info.backend
            );

            let descriptor = wgpu::DeviceDescriptor {
                label: Some("OceanSim GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: ocean_limits(&adapter),
                memory_hints: wgpu::MemoryHints::Performance,
            };

            match pollster::block_on(adapter.request_device(&descriptor, None)) {
                Ok((device, queue)) => {
                    info!("Opened GPU device on {}", adapter_info.name);
                    GpuInitResult::Success(Self {
                        device,
                        queue,
                        adapter_info,
                    })
                }
                Err(e) => GpuInitResult::InitFailed {
                    adapter_name: adapter_info.name,
                    error: e.to_string(),
                },
            }
        }

        #[must_use]
        pub fn adapter_name(&self) -> &str {
            &self.adapter_info.name
        }

        /// Check the device limits against an `N × N` ocean
        ///
        /// # Errors
        ///
        /// Returns a description of the first limit the grid would exceed.
        pub fn check_capacity(&self, dimension: usize) -> Result<(), String> {
            let limits = self.device.limits();
            let n = u64::try_from(dimension).map_err(|e| e.to_string())?;
            let bytes = spectra_buffer_bytes(n)
                .ok_or_else(|| format!("{dimension}x{dimension} spectra overflow u64"))?;

            if bytes > u64::from(limits.max_storage_buffer_binding_size) {
                return Err(format!(
                    "spectra need {bytes} bytes, storage bindings are limited to {}",
                    limits.max_storage_buffer_binding_size
                ));
            }
            if bytes > limits.max_buffer_size {
                return Err(format!(
                    "spectra need {bytes} bytes, buffers are limited to {}",
                    limits.max_buffer_size
                ));
            }
            // Column passes dispatch one workgroup per grid line
            if n > u64::from(limits.max_compute_workgroups_per_dimension) {
                return Err(format!(
                    "{dimension} workgroups per dispatch exceed the limit of {}",
                    limits.max_compute_workgroups_per_dimension
                ));
            }
            Ok(())
        }

        /// Hand device and queue over to a backend
        #[must_use]
        pub fn into_parts(self) -> (wgpu::Device, wgpu::Queue, wgpu::AdapterInfo) {
            (self.device, self.queue, self.adapter_info)
        }
    }

}

#[cfg(feature = "gpu")]
pub use gpu_impl::GpuContext;
