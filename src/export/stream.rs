//! The face streaming pass.
//!
//! Faces arrive once each, internal faces first and boundary faces grouped
//! by boundary condition name. For every face the connectivity goes to `faces` and the owner
//! cell to `owner`, in lock-step. Internal faces also write `neighbour`;
//! boundary faces extend the current boundary patch run instead. Faces are
//! routed into the volume-condition face sets as they pass.
//!
//! After the last face a 2-D grid gets its extruded base and top faces, and
//! the `boundary` file is written from the accumulated runs.

use std::path::Path;

use crate::error::{ExportError, Result};
use crate::foam::{boundary_file, faces_file, neighbour_file, owner_file, FacesFile, LabelFile};
use crate::mesh::{Condition, FaceKind, FaceOrder, FaceRecord, MeshModel};
use crate::progress::ProgressSteps;

use super::bc_stats::BcStats;
use super::extrude::Extrusion;
use super::options::ExportOptions;
use super::vc_sets::VcSetManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Streaming,
    Done,
}

/// Counts gathered by a finished face pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    /// Faces written, including extruded base and top faces.
    pub faces: usize,
    /// Faces with a neighbour.
    pub internal_faces: usize,
    /// Boundary patches written.
    pub patches: usize,
    /// The 2-D extrusion thickness, computed when automatic.
    pub thickness: f64,
}

/// Writes `faces`, `owner`, `neighbour` and `boundary` from one face stream.
pub struct FaceStreamWriter<'a, M: MeshModel + ?Sized> {
    model: &'a M,
    options: &'a ExportOptions,
    mesh_dir: &'a Path,
    state: State,
    faces: FacesFile,
    owner: LabelFile,
    neighbour: LabelFile,
    bc_stats: BcStats,
    unspecified: Condition,
    num_faces: usize,
    internal_faces: usize,
    total_edge_length: f64,
    route_faces: bool,
    domain_sets: bool,
}

impl<'a, M: MeshModel + ?Sized> FaceStreamWriter<'a, M> {
    /// Create a writer for the polyMesh directory `mesh_dir`.
    pub fn new(model: &'a M, mesh_dir: &'a Path, options: &'a ExportOptions) -> Self {
        Self {
            model,
            options,
            mesh_dir,
            state: State::Idle,
            faces: faces_file(mesh_dir, model.is_2d(), model.vertex_count()),
            owner: owner_file(mesh_dir),
            neighbour: neighbour_file(mesh_dir),
            bc_stats: BcStats::new(),
            unspecified: Condition::unspecified(),
            num_faces: 0,
            internal_faces: 0,
            total_edge_length: 0.0,
            route_faces: false,
            domain_sets: false,
        }
    }

    /// Stream every face of the model and finish the face files.
    pub fn run(
        mut self,
        sets: &mut VcSetManager,
        steps: &mut ProgressSteps<'_>,
    ) -> Result<StreamSummary> {
        let stream = self.model.stream_faces(FaceOrder::BcGroupsLast)?;
        self.begin(stream.total(), sets, steps)?;
        for face in stream {
            self.face(&face, sets, steps)?;
        }
        self.end(sets, steps)
    }

    /// Open the face files and start the progress step.
    pub fn begin(
        &mut self,
        total: usize,
        sets: &VcSetManager,
        steps: &mut ProgressSteps<'_>,
    ) -> Result<()> {
        if self.state != State::Idle {
            return Err(ExportError::invalid_mesh("face stream started twice"));
        }
        let face_export = !self.options.face_export.is_empty();
        self.route_faces = face_export && !sets.is_empty();
        self.domain_sets = face_export;
        self.num_faces = total;
        self.total_edge_length = 0.0;

        steps.begin_step(total, "Writing faces")?;
        self.faces.open()?;
        self.owner.open()?;
        self.neighbour.open()?;
        self.state = State::Streaming;
        Ok(())
    }

    /// Write one streamed face.
    pub fn face(
        &mut self,
        face: &FaceRecord,
        sets: &mut VcSetManager,
        steps: &mut ProgressSteps<'_>,
    ) -> Result<()> {
        if self.state != State::Streaming {
            return Err(ExportError::NotOpen {
                object: self.faces.object().to_string(),
            });
        }
        let model = self.model;
        self.faces.write(&face.element)?;
        self.owner.write(&face.owner.cell)?;

        match face.neighbour {
            None => {
                let bc = face
                    .domain
                    .and_then(|d| model.domain_condition(d))
                    .unwrap_or(&self.unspecified);
                self.bc_stats.push(bc, face.index);
            }
            Some(neighbour) => {
                self.neighbour.write(&neighbour.cell)?;
                self.internal_faces += 1;
            }
        }

        if self.domain_sets && face.kind == FaceKind::Connection {
            if let Some(domain) = face.domain {
                let bc = model.domain_condition(domain).unwrap_or(&self.unspecified);
                sets.domain_set(domain, bc)?.write(&face.index)?;
            }
        }

        if self.route_faces {
            self.route_face(face, sets)?;
        }

        if model.is_2d() && self.options.auto_thickness() {
            self.total_edge_length += self.first_edge_length(face)?;
        }

        steps.increment()
    }

    /// Close the per-domain sets, extrude a 2-D grid and write `boundary`.
    pub fn end(
        &mut self,
        sets: &mut VcSetManager,
        steps: &mut ProgressSteps<'_>,
    ) -> Result<StreamSummary> {
        if self.state != State::Streaming {
            return Err(ExportError::NotOpen {
                object: self.faces.object().to_string(),
            });
        }
        sets.close_domain_sets()?;

        let mut written = self.num_faces;
        if self.model.is_2d() {
            let routed = if self.route_faces { Some(&mut *sets) } else { None };
            written += Extrusion::new(self.model, self.options.side_bc_mode, self.num_faces)
                .write(&mut self.faces, &mut self.owner, &mut self.bc_stats, routed)?;
        }
        self.faces.close()?;
        self.owner.close()?;
        self.neighbour.close()?;

        let mut boundary = boundary_file(self.mesh_dir);
        boundary.open()?;
        for run in self.bc_stats.runs() {
            boundary.write(run)?;
        }
        boundary.close()?;

        let mut thickness = self.options.thickness;
        if self.model.is_2d() && self.options.auto_thickness() && self.num_faces > 0 {
            thickness = self.total_edge_length / self.num_faces as f64;
            log::info!("2D thickness set to {}", thickness);
        }

        self.state = State::Done;
        steps.end_step()?;
        log::debug!(
            "{} faces ({} internal) in {} patches",
            written,
            self.internal_faces,
            self.bc_stats.len()
        );
        Ok(StreamSummary {
            faces: written,
            internal_faces: self.internal_faces,
            patches: self.bc_stats.len(),
            thickness,
        })
    }

    /// Route a face into the set files of the blocks it touches. A face
    /// between blocks of the same volume condition counts as interior.
    fn route_face(&self, face: &FaceRecord, sets: &mut VcSetManager) -> Result<()> {
        let mut kind = face.kind;
        if let (FaceKind::Connection, Some(n)) = (kind, face.neighbour) {
            if sets.same_condition(face.owner.block, n.block) {
                kind = FaceKind::Interior;
            }
        }
        sets.add_face(face.owner.block, kind, face.index)?;
        if let (FaceKind::Connection, Some(n)) = (kind, face.neighbour) {
            sets.add_face(n.block, kind, face.index)?;
        }
        Ok(())
    }

    fn first_edge_length(&self, face: &FaceRecord) -> Result<f64> {
        let v = face.element.vertices();
        let point = |i: usize| {
            v.get(i)
                .and_then(|&vi| self.model.vertex(vi))
                .ok_or_else(|| ExportError::invalid_mesh(format!("face {} has no edge", face.index)))
        };
        Ok((point(1)? - point(0)?).norm())
    }
}
