//! Export configuration.

use bitflags::bitflags;

use crate::error::{ExportError, Result};
use crate::mesh::{AttributeValue, MeshModel};

bitflags! {
    /// Which of sets and zones are written for cells or faces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetZoneExport: u32 {
        /// Keep the `sets/` files.
        const SETS = 0x1;
        /// Write the zone file.
        const ZONES = 0x2;
        /// Both.
        const SETS_AND_ZONES = Self::SETS.bits() | Self::ZONES.bits();
    }
}

impl SetZoneExport {
    /// Neither sets nor zones.
    pub const NONE: Self = Self::empty();

    /// Parse an enum ordinal (0..=3) or one of `None`, `Sets`, `Zones`,
    /// `SetsAndZones`.
    pub fn from_attribute(name: &'static str, value: &AttributeValue) -> Result<Self> {
        if let Some(text) = value.as_text() {
            return match text.trim().to_ascii_lowercase().as_str() {
                "none" => Ok(Self::NONE),
                "sets" => Ok(Self::SETS),
                "zones" => Ok(Self::ZONES),
                "setsandzones" => Ok(Self::SETS_AND_ZONES),
                _ if value.as_uint().is_some() => Self::from_ordinal(name, value),
                _ => Err(ExportError::invalid_param(
                    name,
                    text,
                    "expected None, Sets, Zones or SetsAndZones",
                )),
            };
        }
        Self::from_ordinal(name, value)
    }

    fn from_ordinal(name: &'static str, value: &AttributeValue) -> Result<Self> {
        value
            .as_uint()
            .and_then(|v| u32::try_from(v).ok())
            .and_then(Self::from_bits)
            .ok_or_else(|| ExportError::invalid_param(name, format!("{:?}", value), "expected 0..=3"))
    }
}

impl Default for SetZoneExport {
    fn default() -> Self {
        Self::SETS_AND_ZONES
    }
}

/// Boundary conditions given to the base and top faces of an extruded
/// 2-D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideBcMode {
    /// Left as the unspecified condition.
    Unspecified,
    /// One `BaseAndTop` patch.
    #[default]
    Single,
    /// A `Base` and a `Top` patch.
    BaseTop,
    /// `<vc>-base` and `<vc>-top` patches per block.
    Multiple,
}

impl SideBcMode {
    /// Parse an enum ordinal (0..=3) or the mode name.
    pub fn from_attribute(value: &AttributeValue) -> Result<Self> {
        let ordinal = match value.as_text().map(|t| t.trim().to_ascii_lowercase()) {
            Some(name) => match name.as_str() {
                "unspecified" => Some(0),
                "single" => Some(1),
                "basetop" => Some(2),
                "multiple" => Some(3),
                _ => value.as_uint(),
            },
            None => value.as_uint(),
        };
        match ordinal {
            Some(0) => Ok(SideBcMode::Unspecified),
            Some(1) => Ok(SideBcMode::Single),
            Some(2) => Ok(SideBcMode::BaseTop),
            Some(3) => Ok(SideBcMode::Multiple),
            _ => Err(ExportError::invalid_param(
                "SideBCExport",
                format!("{:?}", value),
                "expected Unspecified, Single, BaseTop or Multiple",
            )),
        }
    }
}

impl std::str::FromStr for SideBcMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_attribute(&AttributeValue::Text(s.to_string()))
    }
}

/// Smallest and largest accepted point precision.
pub const PRECISION_RANGE: std::ops::RangeInclusive<usize> = 4..=16;

/// Options for an OpenFOAM export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Cell sets and zones.
    pub cell_export: SetZoneExport,

    /// Face sets and zones.
    pub face_export: SetZoneExport,

    /// Significant digits of point coordinates.
    pub point_precision: usize,

    /// Extrusion distance of a 2-D grid. Zero computes it from the average
    /// edge length.
    pub thickness: f64,

    /// Boundary conditions of the extruded base and top faces.
    pub side_bc_mode: SideBcMode,

    /// Largest Z deviation accepted for a planar 2-D grid.
    pub grid_point_tolerance: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cell_export: SetZoneExport::SETS_AND_ZONES,
            face_export: SetZoneExport::SETS_AND_ZONES,
            point_precision: 16,
            thickness: 0.0,
            side_bc_mode: SideBcMode::Single,
            grid_point_tolerance: 1e-10,
        }
    }
}

impl ExportOptions {
    /// Read options from the mesh attributes `CellExport`, `FaceExport`,
    /// `PointPrecision`, `Thickness`, `SideBCExport` and `GridPointTol`,
    /// using the defaults for missing ones.
    pub fn from_model<M: MeshModel + ?Sized>(model: &M) -> Result<Self> {
        let mut options = Self::default();
        if let Some(v) = model.attribute("CellExport") {
            options.cell_export = SetZoneExport::from_attribute("CellExport", v)?;
        }
        if let Some(v) = model.attribute("FaceExport") {
            options.face_export = SetZoneExport::from_attribute("FaceExport", v)?;
        }
        if let Some(v) = model.attribute("PointPrecision") {
            let precision = v.as_uint().ok_or_else(|| {
                ExportError::invalid_param("PointPrecision", format!("{:?}", v), "not an integer")
            })?;
            options.point_precision = precision as usize;
        }
        if let Some(v) = model.attribute("Thickness") {
            options.thickness = v.as_real().ok_or_else(|| {
                ExportError::invalid_param("Thickness", format!("{:?}", v), "not a number")
            })?;
        }
        if let Some(v) = model.attribute("SideBCExport") {
            options.side_bc_mode = SideBcMode::from_attribute(v)?;
        }
        if let Some(v) = model.attribute("GridPointTol") {
            options.grid_point_tolerance = v.as_real().ok_or_else(|| {
                ExportError::invalid_param("GridPointTol", format!("{:?}", v), "not a number")
            })?;
        }
        options.validate()?;
        Ok(options)
    }

    /// Set the cell set/zone policy.
    pub fn with_cell_export(mut self, export: SetZoneExport) -> Self {
        self.cell_export = export;
        self
    }

    /// Set the face set/zone policy.
    pub fn with_face_export(mut self, export: SetZoneExport) -> Self {
        self.face_export = export;
        self
    }

    /// Set the point precision.
    pub fn with_point_precision(mut self, precision: usize) -> Self {
        self.point_precision = precision;
        self
    }

    /// Set the 2-D extrusion thickness, zero for automatic.
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the side boundary condition mode.
    pub fn with_side_bc_mode(mut self, mode: SideBcMode) -> Self {
        self.side_bc_mode = mode;
        self
    }

    /// Set the planarity tolerance.
    pub fn with_grid_point_tolerance(mut self, tolerance: f64) -> Self {
        self.grid_point_tolerance = tolerance;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !PRECISION_RANGE.contains(&self.point_precision) {
            return Err(ExportError::invalid_param(
                "PointPrecision",
                self.point_precision,
                "must be in 4..=16",
            ));
        }
        if !self.thickness.is_finite() || self.thickness < 0.0 {
            return Err(ExportError::invalid_param(
                "Thickness",
                self.thickness,
                "must be a finite value >= 0",
            ));
        }
        if self.grid_point_tolerance.is_nan() || self.grid_point_tolerance < 0.0 {
            return Err(ExportError::invalid_param(
                "GridPointTol",
                self.grid_point_tolerance,
                "must be >= 0",
            ));
        }
        Ok(())
    }

    /// Whether the 2-D thickness is computed from the streamed edges.
    pub fn auto_thickness(&self) -> bool {
        self.thickness == 0.0
    }

    pub(crate) fn any_sets_or_zones(&self) -> bool {
        !self.cell_export.is_empty() || !self.face_export.is_empty()
    }
}
