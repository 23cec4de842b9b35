use crate::error::LoadFailure;
use crate::loader::LoadOnce;
use std::sync::Arc;

static RUNTIME: LoadOnce<RenderRuntime> = LoadOnce::new();

/// Process-wide GPU runtime: instance, adapter and device/queue pair.
/// Acquired at most once per process; every session shares the same handle.
pub struct RenderRuntime {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl RenderRuntime {
    /// Memoized acquisition. Concurrent callers share one in-flight
    /// acquisition; a failure is not cached, so a later toggle retries.
    pub fn ensure() -> Result<Arc<Self>, LoadFailure> {
        RUNTIME.get_or_try(|| pollster::block_on(Self::acquire()))
    }

    /// Whether the runtime has already been acquired. Monotonic.
    pub fn ready() -> bool {
        RUNTIME.is_ready()
    }

    async fn acquire() -> Result<Self, LoadFailure> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| LoadFailure::Unsupported)?;
        let device_desc = wgpu::DeviceDescriptor {
            label: Some("Backdrop Device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_desc)
            .await
            .map_err(|err| LoadFailure::Device(err.to_string()))?;
        log::info!("GPU runtime acquired: {}", adapter.get_info().name);
        Ok(Self { instance, adapter, device, queue })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
