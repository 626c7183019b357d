//! Face derivation for the in-memory mesh.
//!
//! Every cell contributes its inward-oriented local faces. Faces are
//! matched by their sorted vertex list; the first cell to see a face (the
//! lower cell index) becomes its owner and keeps its orientation, a second
//! cell becomes the neighbour. Domain faces are matched against the same
//! keys to find the domain a face lies on.
//!
//! In [`FaceOrder::BcGroupsLast`] boundary faces are grouped by boundary
//! condition name, so domains sharing a name form one patch. Faces on a
//! domain without a condition join the faces on no domain, last.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::condition::UNSPECIFIED;
use super::element::Element;
use super::index::{BlockId, DomainId};
use super::model::{FaceKind, FaceOrder, FaceRecord, FaceSide};
use super::unstructured::{Block, Domain};
use crate::error::{ExportError, Result};

struct Slot {
    face: Element,
    owner: FaceSide,
    neighbour: Option<FaceSide>,
}

/// Derive all faces of the mesh, numbered in the requested order.
pub(crate) fn collect_faces(
    blocks: &[Block],
    domains: &[Domain],
    order: FaceOrder,
) -> Result<Vec<FaceRecord>> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut by_key: HashMap<Vec<usize>, usize> = HashMap::new();

    let mut cell = 0;
    for (b, block) in blocks.iter().enumerate() {
        let side = |cell| FaceSide {
            cell,
            block: BlockId::new(b),
        };
        for element in block.cells() {
            for face in element.faces() {
                match by_key.entry(face.key()) {
                    Entry::Vacant(e) => {
                        e.insert(slots.len());
                        slots.push(Slot {
                            face,
                            owner: side(cell),
                            neighbour: None,
                        });
                    }
                    Entry::Occupied(e) => {
                        let slot = &mut slots[*e.get()];
                        if slot.neighbour.is_some() || slot.owner.cell == cell {
                            return Err(ExportError::invalid_mesh(format!(
                                "face {:?} is shared by more than two cells",
                                face.vertices()
                            )));
                        }
                        slot.neighbour = Some(side(cell));
                    }
                }
            }
            cell += 1;
        }
    }

    let mut domain_of: HashMap<usize, DomainId> = HashMap::new();
    for (d, domain) in domains.iter().enumerate() {
        for face in domain.faces() {
            let slot = by_key.get(&face.key()).ok_or_else(|| {
                ExportError::invalid_mesh(format!(
                    "face {:?} of domain {} is not a face of any cell",
                    face.vertices(),
                    domain.name
                ))
            })?;
            domain_of.entry(*slot).or_insert(DomainId::new(d));
        }
    }

    let sequence: Vec<usize> = match order {
        FaceOrder::Natural => (0..slots.len()).collect(),
        FaceOrder::BcGroupsLast => {
            let (mut internal, mut boundary): (Vec<usize>, Vec<usize>) =
                (0..slots.len()).partition(|&s| slots[s].neighbour.is_some());
            internal.sort_by_key(|&s| {
                let slot = &slots[s];
                (slot.owner.cell, slot.neighbour.map_or(0, |n| n.cell))
            });
            let ranks = condition_ranks(domains);
            // stable: faces of one condition keep cell order
            boundary.sort_by_key(|s| domain_of.get(s).map_or(usize::MAX, |d| ranks[d.index()]));
            internal.extend(boundary);
            internal
        }
    };

    let records = sequence
        .into_iter()
        .enumerate()
        .map(|(index, s)| {
            let slot = &slots[s];
            let domain = domain_of.get(&s).copied();
            let kind = match slot.neighbour {
                None => FaceKind::Boundary,
                Some(n) if n.block != slot.owner.block || domain.is_some() => FaceKind::Connection,
                Some(_) => FaceKind::Interior,
            };
            FaceRecord {
                index,
                element: slot.face.clone(),
                owner: slot.owner,
                neighbour: slot.neighbour,
                domain,
                kind,
            }
        })
        .collect();
    Ok(records)
}

/// Rank of each domain's boundary condition name by first appearance.
/// Unnamed conditions rank last.
fn condition_ranks(domains: &[Domain]) -> Vec<usize> {
    let mut names: Vec<&str> = Vec::new();
    domains
        .iter()
        .map(|domain| match domain.condition.as_ref().map(|c| c.name.as_str()) {
            None | Some(UNSPECIFIED) => usize::MAX,
            Some(name) => names.iter().position(|&n| n == name).unwrap_or_else(|| {
                names.push(name);
                names.len() - 1
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::mesh::{
        Condition, Dimension, Element, ElementType, FaceKind, FaceOrder, MeshModel,
        UnstructuredMesh,
    };

    /// Two unit hexes stacked along x, in separate blocks.
    fn two_hexes(same_block: bool) -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Three);
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    mesh.add_vertex(Point3::new(i as f64, j as f64, k as f64));
                }
            }
        }
        let v = |i: usize, j: usize, k: usize| k * 6 + j * 3 + i;
        let hex = |i: usize| {
            Element::hex([
                v(i, 0, 0),
                v(i + 1, 0, 0),
                v(i + 1, 1, 0),
                v(i, 1, 0),
                v(i, 0, 1),
                v(i + 1, 0, 1),
                v(i + 1, 1, 1),
                v(i, 1, 1),
            ])
        };
        let a = mesh.add_block("a", None);
        mesh.add_cell(a, hex(0)).unwrap();
        let b = if same_block { a } else { mesh.add_block("b", None) };
        mesh.add_cell(b, hex(1)).unwrap();

        let wall = mesh.add_domain("wall", Some(Condition::boundary("wall", "wall")));
        let inlet = mesh.add_domain("inlet", Some(Condition::boundary("inlet", "patch")));
        mesh.add_domain_face(inlet, Element::quad([v(0, 0, 0), v(0, 1, 0), v(0, 1, 1), v(0, 0, 1)]))
            .unwrap();
        mesh.add_domain_face(wall, Element::quad([v(0, 0, 0), v(1, 0, 0), v(1, 1, 0), v(0, 1, 0)]))
            .unwrap();
        mesh
    }

    #[test]
    fn test_internal_faces_first() {
        let mesh = two_hexes(true);
        let faces: Vec<_> = mesh.stream_faces(FaceOrder::BcGroupsLast).unwrap().collect();
        assert_eq!(faces.len(), 11);
        assert_eq!(faces[0].kind, FaceKind::Interior);
        assert_eq!(faces[0].owner.cell, 0);
        assert_eq!(faces[0].neighbour.map(|n| n.cell), Some(1));
        assert!(faces[1..].iter().all(|f| f.kind == FaceKind::Boundary));
        for (i, f) in faces.iter().enumerate() {
            assert_eq!(f.index, i);
            assert_eq!(f.element.kind(), ElementType::Quad);
        }
    }

    #[test]
    fn test_boundary_grouped_by_domain() {
        let mesh = two_hexes(true);
        let faces: Vec<_> = mesh.stream_faces(FaceOrder::BcGroupsLast).unwrap().collect();
        let domains: Vec<_> = faces[1..].iter().map(|f| f.domain.map(|d| d.index())).collect();
        // wall (0), inlet (1), then the eight faces on no domain
        assert_eq!(domains[0], Some(0));
        assert_eq!(domains[1], Some(1));
        assert!(domains[2..].iter().all(|d| d.is_none()));
    }

    #[test]
    fn test_boundary_grouped_by_condition_name() {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let block = mesh.add_block("fluid", None);
        mesh.add_cell(block, Element::quad([0, 1, 2, 3])).unwrap();
        let sides = [
            ("bottom", Some(Condition::boundary("wall", "wall")), [0, 1]),
            ("right", Some(Condition::boundary("inlet", "patch")), [1, 2]),
            ("top", Some(Condition::boundary("wall", "wall")), [2, 3]),
            ("left", None, [3, 0]),
        ];
        for (name, bc, edge) in sides {
            let d = mesh.add_domain(name, bc);
            mesh.add_domain_face(d, Element::bar(edge)).unwrap();
        }

        let names: Vec<_> = mesh
            .stream_faces(FaceOrder::BcGroupsLast)
            .unwrap()
            .map(|f| {
                f.domain
                    .and_then(|d| mesh.domain_condition(d))
                    .map_or("Unspecified", |c| c.name.as_str())
            })
            .collect();
        assert_eq!(names, vec!["wall", "wall", "inlet", "Unspecified"]);
    }

    #[test]
    fn test_cross_block_face_is_connection() {
        let mesh = two_hexes(false);
        let faces: Vec<_> = mesh.stream_faces(FaceOrder::BcGroupsLast).unwrap().collect();
        assert_eq!(faces[0].kind, FaceKind::Connection);
        assert_ne!(faces[0].owner.block, faces[0].neighbour.unwrap().block);
    }

    #[test]
    fn test_owner_orientation_kept() {
        let mesh = two_hexes(true);
        let shared = mesh.stream_faces(FaceOrder::BcGroupsLast).unwrap().next().unwrap();
        // right face of the first hex, inward for cell 0
        assert_eq!(shared.element.vertices(), &[1, 7, 10, 4]);
    }

    #[test]
    fn test_orphan_domain_face_rejected() {
        let mut mesh = two_hexes(true);
        let d = mesh.add_domain("bad", None);
        mesh.add_domain_face(d, Element::tri([0, 1, 7])).unwrap();
        assert!(mesh.stream_faces(FaceOrder::BcGroupsLast).is_err());
    }
}
