//! Drawable resource accounting (geometry and material handles)

use std::collections::HashMap;

use shared::{GeometryDesc, MaterialDesc};

/// Handle to an allocated geometry buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(u64);

/// Handle to an allocated material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u64);

/// Live resource counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceStats {
    pub geometries: usize,
    pub materials: usize,
}

impl ResourceStats {
    pub fn is_empty(&self) -> bool {
        self.geometries == 0 && self.materials == 0
    }
}

/// Owns every geometry and material referenced by live mesh nodes
#[derive(Default)]
pub struct ResourcePool {
    geometries: HashMap<GeometryHandle, GeometryDesc>,
    materials: HashMap<MaterialHandle, MaterialDesc>,
    next_handle: u64,
    released_total: u64,
}

impl ResourcePool {
    pub fn alloc_geometry(&mut self, desc: GeometryDesc) -> GeometryHandle {
        self.next_handle += 1;
        let handle = GeometryHandle(self.next_handle);
        self.geometries.insert(handle, desc);
        handle
    }

    pub fn alloc_material(&mut self, desc: MaterialDesc) -> MaterialHandle {
        self.next_handle += 1;
        let handle = MaterialHandle(self.next_handle);
        self.materials.insert(handle, desc);
        handle
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&GeometryDesc> {
        self.geometries.get(&handle)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialDesc> {
        self.materials.get(&handle)
    }

    /// Release a geometry. Double release is tolerated and only logged.
    pub fn release_geometry(&mut self, handle: GeometryHandle) {
        if self.geometries.remove(&handle).is_some() {
            self.released_total += 1;
        } else {
            tracing::debug!("geometry {:?} already released", handle);
        }
    }

    /// Release a material. Double release is tolerated and only logged.
    pub fn release_material(&mut self, handle: MaterialHandle) {
        if self.materials.remove(&handle).is_some() {
            self.released_total += 1;
        } else {
            tracing::debug!("material {:?} already released", handle);
        }
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
        }
    }

    /// Total number of handles released since creation
    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}
