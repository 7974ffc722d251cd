//! Planar cross sections of triangle meshes. A [`mesh::Mesh`] is cut by one
//! or more [`plane::Plane`]s and the intersection is assembled into closed
//! [`contour::Contour`]s by the [`slicer::Slicer`].

use nalgebra::Vector3;

pub mod compute;
pub mod contour;
pub mod error;
pub mod intersection;
pub mod linalg;
pub mod mesh;
pub mod plane;
pub mod slicer;

pub use error::{Error, Result};

pub type Pos = Vector3<f32>;
