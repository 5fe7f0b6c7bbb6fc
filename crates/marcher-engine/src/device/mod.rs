//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - configuring the surface and its depth target
//! - recording each frame's clear pass and presenting it
//! - backing the resource factory with wgpu objects

mod context;
mod error;
mod frame;
mod init;
mod resources;
mod surface;

pub use context::GpuContext;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
pub use resources::{GpuBuffer, GpuProgram, GpuShader, GpuTransformFeedback, GpuVertexArray};
