//! WebGPU rendering module
//!
//! Draws the whole scene in the fragment shader using signed distance
//! fields: one shaded sphere per orb over a dark backdrop.

pub mod orb_pipeline;

pub use orb_pipeline::OrbRenderState;
