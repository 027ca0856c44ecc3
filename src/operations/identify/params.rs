use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Parameters controlling interface identification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceParams {
    /// Maximum number of neighbouring blocks tested per block (self included).
    pub nmax: usize,
    /// Maximum deviation from the base face plane still accepted as coplanar.
    pub tmax: f64,
    /// Minimum area of a face-face interface (inclusive).
    pub amin: f64,
    /// Minimum length of a face-edge interface. Reserved.
    pub lmin: f64,
    /// Test for face-face interfaces.
    pub face_face: bool,
    /// Test for face-edge interfaces. Not supported; logged and ignored.
    pub face_edge: bool,
    /// Test for face-vertex interfaces. Not supported; logged and ignored.
    pub face_vertex: bool,
}

impl Default for InterfaceParams {
    fn default() -> Self {
        Self {
            nmax: 10,
            tmax: 1e-6,
            amin: 1e-1,
            lmin: 1e-3,
            face_face: true,
            face_edge: false,
            face_vertex: false,
        }
    }
}

impl InterfaceParams {
    /// Sets the neighbour cap.
    #[must_use]
    pub fn with_nmax(mut self, nmax: usize) -> Self {
        self.nmax = nmax;
        self
    }

    /// Sets the coplanarity tolerance.
    #[must_use]
    pub fn with_tmax(mut self, tmax: f64) -> Self {
        self.tmax = tmax;
        self
    }

    /// Sets the minimum contact area.
    #[must_use]
    pub fn with_amin(mut self, amin: f64) -> Self {
        self.amin = amin;
        self
    }

    /// Sets the minimum contact length.
    #[must_use]
    pub fn with_lmin(mut self, lmin: f64) -> Self {
        self.lmin = lmin;
        self
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidNeighborCount` if `nmax` is zero,
    /// and `ConfigurationError::InvalidTolerance` if a tolerance is negative
    /// or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.nmax == 0 {
            return Err(ConfigurationError::InvalidNeighborCount(self.nmax).into());
        }
        for (name, value) in [("tmax", self.tmax), ("amin", self.amin), ("lmin", self.lmin)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidTolerance { name, value }.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::RbeError;

    #[test]
    fn defaults() {
        let params = InterfaceParams::default();
        assert_eq!(params.nmax, 10);
        assert!((params.tmax - 1e-6).abs() < f64::EPSILON);
        assert!((params.amin - 1e-1).abs() < f64::EPSILON);
        assert!((params.lmin - 1e-3).abs() < f64::EPSILON);
        assert!(params.face_face);
        assert!(!params.face_edge);
        assert!(!params.face_vertex);
        params.validate().unwrap();
    }

    #[test]
    fn zero_neighbors_rejected() {
        let err = InterfaceParams::default().with_nmax(0).validate().unwrap_err();
        assert!(matches!(
            err,
            RbeError::Configuration(ConfigurationError::InvalidNeighborCount(0))
        ));
    }

    #[test]
    fn bad_tolerances_rejected() {
        for params in [
            InterfaceParams::default().with_tmax(-1e-3),
            InterfaceParams::default().with_amin(f64::NAN),
            InterfaceParams::default().with_lmin(f64::INFINITY),
        ] {
            assert!(matches!(
                params.validate(),
                Err(RbeError::Configuration(ConfigurationError::InvalidTolerance { .. }))
            ));
        }
        InterfaceParams::default().with_tmax(0.0).with_amin(0.0).validate().unwrap();
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params: InterfaceParams = serde_json::from_str(r#"{"nmax": 4, "amin": 0.01}"#).unwrap();
        assert_eq!(params.nmax, 4);
        assert!((params.amin - 0.01).abs() < f64::EPSILON);
        assert!((params.tmax - 1e-6).abs() < f64::EPSILON);
        assert!(params.face_face);
    }
}
