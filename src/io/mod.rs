//! Debug exchange formats for edited terrain meshes.

mod obj_write;

pub use obj_write::export_obj_to_path;
