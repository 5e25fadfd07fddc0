use std::sync::Arc;

use wgpu::{Adapter, Device, DeviceDescriptor, Instance, Limits, Queue, Surface};
use winit::window::Window;

use crate::error::{Error, Result};

/// Shared device and queue. Cloning is cheap (Arc).
#[derive(Clone)]
pub struct GpuContext {
    device: Arc<Device>,
    queue: Arc<Queue>,
}

/// A window surface together with the context that can draw to it
pub struct WindowGpu {
    pub context: GpuContext,
    pub surface: Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a context compatible with `window` and configure its surface.
    ///
    /// Instance, adapter and surface come from the same `Instance`.
    pub async fn for_window(window: Arc<Window>) -> Result<WindowGpu> {
        let size = window.inner_size();
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Gpu(format!("failed to create surface: {e}")))?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;
        let config = Self::surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(WindowGpu {
            context: Self {
                device: Arc::new(device),
                queue: Arc::new(queue),
            },
            surface,
            config,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(format!("failed to find appropriate adapter: {e:?}")))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Path Tracer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| Error::Gpu(format!("failed to create device: {e:?}")))
    }

    fn surface_config(
        surface: &Surface,
        adapter: &Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("surface reports no formats".to_string()))?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }
}
