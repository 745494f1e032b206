use crate::core::models::mesh::MeshGeometry;
use crate::core::seeds::source::SourceInstance;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Total dose of one source tabulated over every integer voxel offset that can
/// occur between two voxels of a mesh, i.e. `[-(n-1), n-1]` along each axis.
///
/// Offsets inside the singular region of the source are clamped as described in
/// [`SourceInstance::clamped_total_dose`].
#[derive(Debug, Clone)]
pub struct DoseKernel {
    mesh: MeshGeometry,
    half_extent: [usize; 3],
    span: [usize; 3],
    data: Vec<f64>,
}

impl DoseKernel {
    pub fn build(source: &SourceInstance, mesh: &MeshGeometry, radius_floor: f64) -> Self {
        let half_extent = [mesh.nx() - 1, mesh.ny() - 1, mesh.nz() - 1];
        let span = half_extent.map(|h| 2 * h + 1);
        let len = span[0] * span[1] * span[2];
        let [ex, ey, ez] = mesh.element_dimensions();

        let evaluate = |n: usize| {
            let a = n % span[0];
            let b = (n / span[0]) % span[1];
            let c = n / (span[0] * span[1]);
            let dx = (a as f64 - half_extent[0] as f64) * ex;
            let dy = (b as f64 - half_extent[1] as f64) * ey;
            let dz = (c as f64 - half_extent[2] as f64) * ez;

            source.clamped_total_dose(dx, dy, dz, radius_floor)
        };

        #[cfg(not(feature = "parallel"))]
        let iterator = 0..len;

        #[cfg(feature = "parallel")]
        let iterator = (0..len).into_par_iter();

        let data: Vec<f64> = iterator.map(evaluate).collect();

        Self {
            mesh: *mesh,
            half_extent,
            span,
            data,
        }
    }

    /// Mesh the kernel was tabulated for.
    pub fn mesh(&self) -> &MeshGeometry {
        &self.mesh
    }

    /// Dose at the voxel offset `(di, dj, dk)`. Offsets beyond the mesh extent are a
    /// logic error.
    #[inline]
    pub fn dose_at_offset(&self, di: isize, dj: isize, dk: isize) -> f64 {
        let a = (di + self.half_extent[0] as isize) as usize;
        let b = (dj + self.half_extent[1] as isize) as usize;
        let c = (dk + self.half_extent[2] as isize) as usize;
        self.data[a + b * self.span[0] + c * self.span[0] * self.span[1]]
    }

    /// Dose delivered to voxel `to` by a source sitting in voxel `from`.
    #[inline]
    pub fn dose_between(&self, from: [usize; 3], to: [usize; 3]) -> f64 {
        self.dose_at_offset(
            to[0] as isize - from[0] as isize,
            to[1] as isize - from[1] as isize,
            to[2] as isize - from[2] as isize,
        )
    }

    /// Writes the dose field of a source at `origin` into `out`, one entry per voxel
    /// in flat mesh order.
    pub fn fill_field(&self, mesh: &MeshGeometry, origin: [usize; 3], out: &mut [f64]) {
        debug_assert_eq!(out.len(), mesh.voxel_count());
        for (index, value) in out.iter_mut().enumerate() {
            *value = self.dose_between(origin, mesh.coordinates(index));
        }
    }
}
