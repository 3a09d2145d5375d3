//! WebGPU rendering module
//!
//! The scene is raymarched in a single fragment shader pass.

pub mod scene_pipeline;

pub use scene_pipeline::SceneRenderState;
