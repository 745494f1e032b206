use super::PatientError;

/// Voxel counts and voxel sizes (cm) of a patient mesh. Flat voxel indices run x
/// fastest, then y, then z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshGeometry {
    dimensions: [usize; 3],
    element_dimensions: [f64; 3],
}

impl MeshGeometry {
    pub fn new(dimensions: [usize; 3], element_dimensions: [f64; 3]) -> Result<Self, PatientError> {
        if dimensions.iter().any(|&n| n == 0) {
            return Err(PatientError::InvalidMesh(format!(
                "voxel counts must be positive, got {:?}",
                dimensions
            )));
        }
        if element_dimensions
            .iter()
            .any(|&d| !(d > 0.0 && d.is_finite()))
        {
            return Err(PatientError::InvalidMesh(format!(
                "voxel dimensions must be positive and finite, got {:?}",
                element_dimensions
            )));
        }
        Ok(Self {
            dimensions,
            element_dimensions,
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.dimensions[0]
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.dimensions[1]
    }

    #[inline]
    pub fn nz(&self) -> usize {
        self.dimensions[2]
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn element_dimensions(&self) -> [f64; 3] {
        self.element_dimensions
    }

    pub fn voxel_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    pub fn column_count(&self) -> usize {
        self.nx() * self.ny()
    }

    /// Voxel volume in cm³.
    pub fn voxel_volume(&self) -> f64 {
        self.element_dimensions.iter().product()
    }

    #[inline]
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.nx() && j < self.ny() && k < self.nz()
    }

    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.nx() + k * self.nx() * self.ny()
    }

    /// Needle column index of `(i, j)` in the (x, y) template plane.
    #[inline]
    pub fn column_index(&self, i: usize, j: usize) -> usize {
        i + j * self.nx()
    }

    #[inline]
    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let plane = self.nx() * self.ny();
        [index % self.nx(), (index / self.nx()) % self.ny(), index / plane]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_runs_x_fastest() {
        let mesh = MeshGeometry::new([2, 3, 4], [0.1, 0.1, 0.5]).unwrap();
        assert_eq!(mesh.flat_index(1, 0, 0), 1);
        assert_eq!(mesh.flat_index(0, 1, 0), 2);
        assert_eq!(mesh.flat_index(0, 0, 1), 6);
        assert_eq!(mesh.flat_index(1, 2, 3), 23);
    }

    #[test]
    fn coordinates_invert_flat_index() {
        let mesh = MeshGeometry::new([3, 4, 5], [0.1, 0.1, 0.5]).unwrap();
        for index in 0..mesh.voxel_count() {
            let [i, j, k] = mesh.coordinates(index);
            assert_eq!(mesh.flat_index(i, j, k), index);
        }
    }

    #[test]
    fn voxel_volume_is_product_of_dimensions() {
        let mesh = MeshGeometry::new([2, 2, 2], [0.1, 0.1, 0.5]).unwrap();
        assert!((mesh.voxel_volume() - 0.005).abs() < 1e-15);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            MeshGeometry::new([0, 1, 1], [0.1, 0.1, 0.5]),
            Err(PatientError::InvalidMesh(_))
        ));
    }

    #[test]
    fn non_positive_element_size_is_rejected() {
        assert!(MeshGeometry::new([1, 1, 1], [0.1, -0.1, 0.5]).is_err());
        assert!(MeshGeometry::new([1, 1, 1], [0.1, f64::NAN, 0.5]).is_err());
    }
}
