use crate::core::dosimetry::kernel::DoseKernel;
use crate::core::models::mesh::MeshGeometry;
use crate::core::seeds::source::SourceInstance;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A source instance paired with its dose kernel on one patient mesh.
#[derive(Debug)]
pub struct PreparedSource {
    instance: SourceInstance,
    kernel: DoseKernel,
}

impl PreparedSource {
    pub fn new(instance: SourceInstance, mesh: &MeshGeometry, radius_floor: f64) -> Self {
        let kernel = DoseKernel::build(&instance, mesh, radius_floor);
        Self { instance, kernel }
    }

    pub fn instance(&self) -> &SourceInstance {
        &self.instance
    }

    pub fn kernel(&self) -> &DoseKernel {
        &self.kernel
    }

    pub fn name(&self) -> &str {
        self.instance.name()
    }
}

/// A candidate or inserted seed location.
///
/// Two positions are equal when they occupy the same voxel, regardless of weight
/// or source type.
#[derive(Debug, Clone)]
pub struct SeedPosition {
    indices: [usize; 3],
    weight: f64,
    source: Arc<PreparedSource>,
}

impl SeedPosition {
    pub fn new(indices: [usize; 3], weight: f64, source: Arc<PreparedSource>) -> Self {
        Self {
            indices,
            weight,
            source,
        }
    }

    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }

    #[inline]
    pub fn x(&self) -> usize {
        self.indices[0]
    }

    #[inline]
    pub fn y(&self) -> usize {
        self.indices[1]
    }

    #[inline]
    pub fn z(&self) -> usize {
        self.indices[2]
    }

    /// Static ranking weight assigned at enumeration time.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn source(&self) -> &PreparedSource {
        &self.source
    }

    pub fn seed_name(&self) -> &str {
        self.source.name()
    }
}

impl PartialEq for SeedPosition {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices
    }
}

impl Eq for SeedPosition {}

impl Hash for SeedPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indices.hash(state);
    }
}
