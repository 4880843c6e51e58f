//! Resource loading: meshes from OBJ text, textures from BMP files.

pub mod bitmap;
pub mod mesh;

pub use bitmap::{attach_texture, load_bitmap_from_file, parse_bitmap, Bitmap, BitmapLoadError, Rgba};
pub use mesh::{load_mesh_from_obj, parse_obj, MeshLoadError};
