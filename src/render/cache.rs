//! Keyed GPU resource caches.
//!
//! Every resource is created the first time a shape references it and then
//! reused for the rest of the session:
//!
//! | Resource        | Key                              |
//! |-----------------|----------------------------------|
//! | geometry        | [`GeometryKind`]                 |
//! | texture         | texture path                     |
//! | program         | shader key                       |
//! | pipeline        | shader key and [`RenderMode`]    |
//! | material        | (diffuse, normal, height) paths  |
//! | instance buffer | (object name, shape name)        |
//!
//! Instance buffers are the one resource whose content changes. A buffer is
//! reused while the instance count fits its capacity, reallocated at the new
//! count when it grows, never shrunk, and rewritten only when the instances
//! differ from what was last uploaded. Nothing is evicted until
//! [`ResourceCache::cleanup`].

use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::{self, GeometryKind};
use crate::shape::{Instance, Material, RenderMode};

use super::device::RenderDevice;

pub type MaterialKey = (String, String, String);
pub type PipelineKey = (String, RenderMode);
pub type InstanceKey = (String, String);

pub struct GeometryEntry<G> {
    pub buffers: G,
    pub index_count: u32,
}

pub struct InstanceEntry<B> {
    pub buffer: B,
    capacity: usize,
    data: Vec<Instance>,
}

impl<B> InstanceEntry<B> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Instances to draw: the last uploaded count, not the capacity.
    pub fn count(&self) -> usize {
        self.data.len()
    }
}

/// Number of live entries per cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub geometry: usize,
    pub textures: usize,
    pub programs: usize,
    pub pipelines: usize,
    pub materials: usize,
    pub instance_buffers: usize,
}

pub struct ResourceCache<D: RenderDevice> {
    device: D,
    geometry: HashMap<GeometryKind, GeometryEntry<D::Geometry>>,
    textures: HashMap<String, D::Texture>,
    programs: HashMap<String, D::Program>,
    pipelines: HashMap<PipelineKey, D::Pipeline>,
    materials: HashMap<MaterialKey, D::Material>,
    instances: HashMap<InstanceKey, InstanceEntry<D::InstanceBuffer>>,
}

impl<D: RenderDevice> ResourceCache<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            geometry: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            materials: HashMap::new(),
            instances: HashMap::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn ensure_geometry(&mut self, kind: GeometryKind) -> Result<()> {
        if self.geometry.contains_key(&kind) {
            return Ok(());
        }
        let mesh = geometry::generate(kind);
        let buffers = self.device.create_geometry(kind, &mesh)?;
        log::debug!(
            "Created {} geometry ({} vertices, {} indices)",
            kind.label(),
            mesh.vertices.len(),
            mesh.indices.len()
        );
        self.geometry.insert(
            kind,
            GeometryEntry {
                buffers,
                index_count: mesh.index_count(),
            },
        );
        Ok(())
    }

    pub fn geometry(&self, kind: GeometryKind) -> Option<&GeometryEntry<D::Geometry>> {
        self.geometry.get(&kind)
    }

    /// Loads `path` once. An empty path means the stage is unused.
    pub fn ensure_texture(&mut self, path: &str) -> Result<()> {
        if path.is_empty() || self.textures.contains_key(path) {
            return Ok(());
        }
        let texture = self.device.load_texture(path)?;
        log::debug!("Loaded texture {path}");
        self.textures.insert(path.to_owned(), texture);
        Ok(())
    }

    pub fn texture(&self, path: &str) -> Option<&D::Texture> {
        self.textures.get(path)
    }

    pub fn ensure_program(&mut self, key: &str) -> Result<()> {
        if self.programs.contains_key(key) {
            return Ok(());
        }
        let program = self.device.create_program(key)?;
        log::debug!("Built shader program {key}");
        self.programs.insert(key.to_owned(), program);
        Ok(())
    }

    /// Builds the pipeline for `key` in `mode`, creating the program first
    /// if needed.
    pub fn ensure_pipeline(&mut self, key: &str, mode: RenderMode) -> Result<()> {
        let pipeline_key = (key.to_owned(), mode);
        if self.pipelines.contains_key(&pipeline_key) {
            return Ok(());
        }
        self.ensure_program(key)?;
        let Some(program) = self.programs.get(key) else {
            return Ok(());
        };
        let pipeline = self.device.create_pipeline(key, program, mode)?;
        log::debug!("Built pipeline {key} ({mode:?})");
        self.pipelines.insert(pipeline_key, pipeline);
        Ok(())
    }

    pub fn pipeline(&self, key: &str, mode: RenderMode) -> Option<&D::Pipeline> {
        self.pipelines.get(&(key.to_owned(), mode))
    }

    /// Loads the material's textures and binds them together.
    pub fn ensure_material(&mut self, material: &Material) -> Result<()> {
        let key = material_key(material);
        if self.materials.contains_key(&key) {
            return Ok(());
        }
        let (diffuse, normal, height) = material.textures();
        for path in [diffuse, normal, height] {
            self.ensure_texture(path)?;
        }
        let bound = self.device.create_material(
            self.textures.get(diffuse),
            self.textures.get(normal),
            self.textures.get(height),
        )?;
        log::debug!("Bound material {key:?}");
        self.materials.insert(key, bound);
        Ok(())
    }

    pub fn material(&self, material: &Material) -> Option<&D::Material> {
        self.materials.get(&material_key(material))
    }

    /// Brings the instance buffer for one shape up to date with `instances`.
    pub fn sync_instances(
        &mut self,
        object: &str,
        shape: &str,
        instances: &[Instance],
    ) -> Result<()> {
        let key = (object.to_owned(), shape.to_owned());

        if let Some(entry) = self.instances.get_mut(&key) {
            if instances.len() <= entry.capacity {
                if entry.data != instances {
                    self.device.write_instances(&entry.buffer, instances);
                    entry.data.clear();
                    entry.data.extend_from_slice(instances);
                }
                return Ok(());
            }
        }

        let capacity = instances.len();
        let buffer = self
            .device
            .create_instance_buffer(&format!("{object}/{shape}"), instances, capacity)?;
        let grew = self.instances.contains_key(&key);
        log::debug!(
            "{} instance buffer {object}/{shape} for {capacity} instances",
            if grew { "Grew" } else { "Created" }
        );
        self.instances.insert(
            key,
            InstanceEntry {
                buffer,
                capacity,
                data: instances.to_vec(),
            },
        );
        Ok(())
    }

    pub fn instances(
        &self,
        object: &str,
        shape: &str,
    ) -> Option<&InstanceEntry<D::InstanceBuffer>> {
        self.instances.get(&(object.to_owned(), shape.to_owned()))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            geometry: self.geometry.len(),
            textures: self.textures.len(),
            programs: self.programs.len(),
            pipelines: self.pipelines.len(),
            materials: self.materials.len(),
            instance_buffers: self.instances.len(),
        }
    }

    /// Drops every cached resource and returns how many of each were released.
    pub fn cleanup(&mut self) -> CacheStats {
        let released = self.stats();
        self.instances.clear();
        self.materials.clear();
        self.pipelines.clear();
        self.programs.clear();
        self.textures.clear();
        self.geometry.clear();
        log::info!("Released render resources: {released:?}");
        released
    }
}

fn material_key(material: &Material) -> MaterialKey {
    let (diffuse, normal, height) = material.textures();
    (diffuse.to_owned(), normal.to_owned(), height.to_owned())
}
