//! Resource management
//!
//! Handles loading of environment cube maps, material textures, meshes and materials.

mod environment;
mod material;
mod mesh;
mod texture;

pub use environment::*;
pub use material::*;
pub use mesh::*;
pub use texture::*;
