// src/picking/mod.rs
// Picking system for direct vertex editing on the terrain mesh
// Implements cursor unprojection, ray/mesh intersection, and drag sessions
// RELEVANT FILES:src/picking/ray.rs,src/picking/mesh_ray.rs,src/picking/drag.rs

mod drag;
mod mesh_ray;
mod ray;

pub use drag::{DragConfig, DragSession};
pub use mesh_ray::{intersect_mesh, pick_vertex, MeshHit, VertexPick};
pub use ray::{unproject_cursor, Ray};
