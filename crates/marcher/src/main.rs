//! Full-screen raymarching demo on the marcher engine.

mod demo;
mod pointer;

use marcher_engine::device::GpuInit;
use marcher_engine::logging::{init_logging, LoggingConfig};
use marcher_engine::window::{Runtime, RuntimeConfig};
use marcher_engine::RendererConfig;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "marcher".to_string(),
        transparent: true,
        ..RuntimeConfig::default()
    };

    // Blending over the transparent clear leaves premultiplied pixels.
    let gpu_init = GpuInit {
        alpha_mode: Some(wgpu::CompositeAlphaMode::PreMultiplied),
        ..GpuInit::default()
    };

    Runtime::run(
        config,
        gpu_init,
        RendererConfig { target_fps: 60.0 },
        demo::Marcher::new(),
    )
}
