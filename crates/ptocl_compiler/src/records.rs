//! Fixed-layout records shared with the compute backend.
//!
//! Every record is `#[repr(C)]` with explicit trailing padding so the byte
//! image is fully determined by the field values. Matrices are row-major,
//! tuples are `[x, y, z, w]`, and cross references are `i32` indices into
//! the sibling arrays.

use bytemuck::{Pod, Zeroable};
use ptocl_core::Camera;

/// Child slots in an [`ObjectRecord`].
pub const OBJECT_CHILD_CAPACITY: usize = 64;

/// Child-group slots in a [`GroupRecord`].
pub const GROUP_CHILD_CAPACITY: usize = ptocl_core::MAX_CHILD_GROUPS;

/// Type tag stored in [`ObjectRecord::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ObjectKind {
    Plane = 0,
    Sphere = 1,
    Cylinder = 2,
    Cube = 3,
    Group = 5,
}

impl ObjectKind {
    pub fn tag(self) -> i64 {
        self as i64
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Self::Plane),
            1 => Some(Self::Sphere),
            2 => Some(Self::Cylinder),
            3 => Some(Self::Cube),
            5 => Some(Self::Group),
            _ => None,
        }
    }
}

/// One top-level shape.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectRecord {
    pub transform: [f64; 16],
    pub inverse: [f64; 16],
    pub inverse_transpose: [f64; 16],
    pub color: [f64; 4],
    pub emission: [f64; 4],
    pub refractive_index: f64,
    pub kind: i64,
    pub min_y: f64,
    pub max_y: f64,
    pub reflectivity: f64,
    pub texture_scale_x: f64,
    pub texture_scale_y: f64,
    pub normal_map_scale_x: f64,
    pub normal_map_scale_y: f64,
    pub bb_min: [f64; 4],
    pub bb_max: [f64; 4],
    pub child_count: i32,
    pub children: [i32; OBJECT_CHILD_CAPACITY],
    pub textured: u8,
    pub texture_index: u8,
    pub normal_mapped: u8,
    pub normal_map_index: u8,
    pub closed: u8,
    pub env_map: u8,
    pub padding: [u8; 174],
}

impl ObjectRecord {
    pub fn object_kind(&self) -> Option<ObjectKind> {
        ObjectKind::from_tag(self.kind)
    }
}

/// One triangle, already expressed in the space of its root group.
///
/// Flat triangles repeat the face normal in `n1..n3`, so a backend can
/// always interpolate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TriangleRecord {
    pub p1: [f64; 4],
    pub p2: [f64; 4],
    pub p3: [f64; 4],
    pub e1: [f64; 4],
    pub e2: [f64; 4],
    pub n: [f64; 4],
    pub n1: [f64; 4],
    pub n2: [f64; 4],
    pub n3: [f64; 4],
    pub color: [f64; 4],
    pub padding: [u8; 192],
}

/// One group node: a box, a contiguous triangle slice and up to
/// [`GROUP_CHILD_CAPACITY`] child groups.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GroupRecord {
    pub bb_min: [f64; 4],
    pub bb_max: [f64; 4],
    pub color: [f64; 4],
    pub emission: [f64; 4],
    pub triangle_offset: i32,
    pub triangle_count: i32,
    pub child_group_count: i32,
    pub children: [i32; GROUP_CHILD_CAPACITY],
    pub padding: [u8; 108],
}

impl GroupRecord {
    /// Indices of this group's triangles.
    pub fn triangle_range(&self) -> std::ops::Range<usize> {
        let start = self.triangle_offset.max(0) as usize;
        start..start + self.triangle_count.max(0) as usize
    }

    pub fn child_groups(&self) -> &[i32] {
        let n = (self.child_group_count.max(0) as usize).min(GROUP_CHILD_CAPACITY);
        &self.children[..n]
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraRecord {
    pub width: i32,
    pub height: i32,
    pub fov: f64,
    pub pixel_size: f64,
    pub half_width: f64,
    pub half_height: f64,
    pub aperture: f64,
    pub focal_length: f64,
    pub inverse: [f64; 16],
    pub padding: [u8; 72],
}

impl From<&Camera> for CameraRecord {
    fn from(camera: &Camera) -> Self {
        Self {
            width: camera.width as i32,
            height: camera.height as i32,
            fov: camera.fov,
            pixel_size: camera.pixel_size,
            half_width: camera.half_width,
            half_height: camera.half_height,
            aperture: camera.aperture,
            focal_length: camera.focal_length,
            inverse: camera.inverse().0,
            padding: [0; 72],
        }
    }
}

const _: () = assert!(std::mem::size_of::<ObjectRecord>() == 1024);
const _: () = assert!(std::mem::size_of::<TriangleRecord>() == 512);
const _: () = assert!(std::mem::size_of::<GroupRecord>() == 256);
const _: () = assert!(std::mem::size_of::<CameraRecord>() == 256);
