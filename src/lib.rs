//! Blobvectors library - Audio-reactive blob formations
//!
//! Parametric and solid element meshes arranged in mathematical formations,
//! animated per frame and modulated by live or synthetic audio features.

pub mod animation;
pub mod audio;
pub mod camera;
pub mod color;
pub mod formation;
pub mod frame_loop;
pub mod mesh;
pub mod params;
pub mod scene;
pub mod surface;
