//! Mesh elements.
//!
//! An [`Element`] is a typed polygon or polyhedron given by an ordered list
//! of vertex indices. Volume elements follow the usual VTK vertex ordering:
//!
//! ```text
//!  hex:  0-1-2-3 bottom (counter-clockwise seen from the top), 4-7 above 0-3
//!  wedge: 0-1-2 bottom, 3-5 above 0-2
//!  pyramid: 0-1-2-3 base, 4 apex
//!  tet: 0-1-2 base (counter-clockwise seen from 3), 3 apex
//! ```
//!
//! Local faces are listed so that their right-hand normal points into the
//! element. That is the host convention the exporter reverses on output.

use std::fmt;

/// Element topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Single vertex.
    Point,
    /// Two-vertex edge.
    Bar,
    /// Triangle.
    Tri,
    /// Quadrilateral.
    Quad,
    /// Tetrahedron.
    Tet,
    /// Hexahedron.
    Hex,
    /// Triangular prism.
    Wedge,
    /// Square pyramid.
    Pyramid,
}

const TET_FACES: &[&[usize]] = &[&[0, 1, 2], &[0, 3, 1], &[1, 3, 2], &[0, 2, 3]];

const HEX_FACES: &[&[usize]] = &[
    &[0, 1, 2, 3],
    &[4, 7, 6, 5],
    &[0, 4, 5, 1],
    &[3, 2, 6, 7],
    &[0, 3, 7, 4],
    &[1, 5, 6, 2],
];

const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[0, 2, 5, 3],
    &[1, 4, 5, 2],
];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 1, 2, 3],
    &[0, 4, 1],
    &[1, 4, 2],
    &[2, 4, 3],
    &[3, 4, 0],
];

impl ElementType {
    /// Number of vertices of this element type.
    pub fn vertex_count(self) -> usize {
        match self {
            ElementType::Point => 1,
            ElementType::Bar => 2,
            ElementType::Tri => 3,
            ElementType::Quad => 4,
            ElementType::Tet => 4,
            ElementType::Hex => 8,
            ElementType::Wedge => 6,
            ElementType::Pyramid => 5,
        }
    }

    /// Lower-case type name.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Point => "point",
            ElementType::Bar => "bar",
            ElementType::Tri => "tri",
            ElementType::Quad => "quad",
            ElementType::Tet => "tet",
            ElementType::Hex => "hex",
            ElementType::Wedge => "wedge",
            ElementType::Pyramid => "pyramid",
        }
    }

    /// Parse a type name as produced by [`ElementType::name`].
    pub fn from_name(name: &str) -> Option<ElementType> {
        match name.to_lowercase().as_str() {
            "point" => Some(ElementType::Point),
            "bar" => Some(ElementType::Bar),
            "tri" => Some(ElementType::Tri),
            "quad" => Some(ElementType::Quad),
            "tet" => Some(ElementType::Tet),
            "hex" => Some(ElementType::Hex),
            "wedge" => Some(ElementType::Wedge),
            "pyramid" => Some(ElementType::Pyramid),
            _ => None,
        }
    }

    /// Topological dimension of the element (0 for points, 3 for volumes).
    pub fn topological_dim(self) -> usize {
        match self {
            ElementType::Point => 0,
            ElementType::Bar => 1,
            ElementType::Tri | ElementType::Quad => 2,
            _ => 3,
        }
    }

    /// Local face table of a volume element, oriented inward.
    fn volume_faces(self) -> Option<&'static [&'static [usize]]> {
        match self {
            ElementType::Tet => Some(TET_FACES),
            ElementType::Hex => Some(HEX_FACES),
            ElementType::Wedge => Some(WEDGE_FACES),
            ElementType::Pyramid => Some(PYRAMID_FACES),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed element referencing mesh vertices by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: ElementType,
    vertices: Vec<usize>,
}

impl Element {
    /// Create an element, returning `None` if the vertex count does not
    /// match the element type.
    pub fn new(kind: ElementType, vertices: Vec<usize>) -> Option<Self> {
        (vertices.len() == kind.vertex_count()).then_some(Self { kind, vertices })
    }

    /// Create a bar.
    pub fn bar(v: [usize; 2]) -> Self {
        Self { kind: ElementType::Bar, vertices: v.to_vec() }
    }

    /// Create a triangle.
    pub fn tri(v: [usize; 3]) -> Self {
        Self { kind: ElementType::Tri, vertices: v.to_vec() }
    }

    /// Create a quadrilateral.
    pub fn quad(v: [usize; 4]) -> Self {
        Self { kind: ElementType::Quad, vertices: v.to_vec() }
    }

    /// Create a tetrahedron.
    pub fn tet(v: [usize; 4]) -> Self {
        Self { kind: ElementType::Tet, vertices: v.to_vec() }
    }

    /// Create a hexahedron.
    pub fn hex(v: [usize; 8]) -> Self {
        Self { kind: ElementType::Hex, vertices: v.to_vec() }
    }

    /// Create a wedge (triangular prism).
    pub fn wedge(v: [usize; 6]) -> Self {
        Self { kind: ElementType::Wedge, vertices: v.to_vec() }
    }

    /// Create a pyramid.
    pub fn pyramid(v: [usize; 5]) -> Self {
        Self { kind: ElementType::Pyramid, vertices: v.to_vec() }
    }

    /// The element type.
    #[inline]
    pub fn kind(&self) -> ElementType {
        self.kind
    }

    /// The vertex indices, in element order.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Largest referenced vertex index.
    pub fn max_vertex(&self) -> Option<usize> {
        self.vertices.iter().copied().max()
    }

    /// Faces of this element, oriented so their normals point into it.
    ///
    /// Volume elements yield their polygonal faces; planar elements yield
    /// their edges as bars, following the element's winding. Points and
    /// bars have no faces.
    pub fn faces(&self) -> Vec<Element> {
        if let Some(table) = self.kind.volume_faces() {
            return table
                .iter()
                .map(|local| {
                    let vertices: Vec<usize> = local.iter().map(|&i| self.vertices[i]).collect();
                    let kind = if vertices.len() == 3 { ElementType::Tri } else { ElementType::Quad };
                    Element { kind, vertices }
                })
                .collect();
        }
        match self.kind {
            ElementType::Tri | ElementType::Quad => {
                let n = self.vertices.len();
                (0..n)
                    .map(|i| Element::bar([self.vertices[i], self.vertices[(i + 1) % n]]))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Sorted vertex list, identical for both orientations of a face.
    pub fn key(&self) -> Vec<usize> {
        let mut key = self.vertices.clone();
        key.sort_unstable();
        key
    }

    /// Add `offset` to every vertex index.
    pub fn offset(&mut self, offset: usize) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Reverse the winding of a triangle or quad in place.
    ///
    /// Quads swap (0,3) and (1,2); triangles swap (0,2). Other types are
    /// left unchanged.
    pub fn flip(&mut self) {
        match self.kind {
            ElementType::Quad => {
                self.vertices.swap(0, 3);
                self.vertices.swap(1, 2);
            }
            ElementType::Tri => self.vertices.swap(0, 2),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn unit_hex_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    fn centroid(points: &[Point3<f64>], idx: &[usize]) -> Point3<f64> {
        let sum = idx.iter().fold(nalgebra::Vector3::zeros(), |acc, &i| acc + points[i].coords);
        Point3::from(sum / idx.len() as f64)
    }

    fn assert_inward(points: &[Point3<f64>], cell: &Element) {
        let c = centroid(points, cell.vertices());
        for face in cell.faces() {
            let v = face.vertices();
            let p0 = points[v[0]];
            let n = (points[v[1]] - p0).cross(&(points[v[v.len() - 1]] - p0));
            let to_center = c - centroid(points, v);
            assert!(n.dot(&to_center) > 0.0, "{} face {:?} points outward", cell.kind(), v);
        }
    }

    #[test]
    fn test_volume_faces_point_inward() {
        let mut pts = unit_hex_points();
        assert_inward(&pts, &Element::hex([0, 1, 2, 3, 4, 5, 6, 7]));
        assert_inward(&pts, &Element::wedge([0, 1, 3, 4, 5, 7]));
        assert_inward(&pts, &Element::tet([0, 1, 3, 4]));
        pts.push(Point3::new(0.5, 0.5, 1.0));
        assert_inward(&pts, &Element::pyramid([0, 1, 2, 3, 8]));
    }

    #[test]
    fn test_face_counts() {
        assert_eq!(Element::hex([0, 1, 2, 3, 4, 5, 6, 7]).faces().len(), 6);
        assert_eq!(Element::tet([0, 1, 2, 3]).faces().len(), 4);
        assert_eq!(Element::quad([0, 1, 2, 3]).faces().len(), 4);
        assert_eq!(Element::tri([0, 1, 2]).faces()[2], Element::bar([2, 0]));
        assert!(Element::bar([0, 1]).faces().is_empty());
    }

    #[test]
    fn test_flip_and_offset() {
        let mut q = Element::quad([0, 1, 2, 3]);
        q.offset(10);
        q.flip();
        assert_eq!(q.vertices(), &[13, 12, 11, 10]);

        let mut t = Element::tri([0, 1, 2]);
        t.flip();
        assert_eq!(t.vertices(), &[2, 1, 0]);
    }

    #[test]
    fn test_new_checks_vertex_count() {
        assert!(Element::new(ElementType::Quad, vec![0, 1, 2]).is_none());
        assert!(Element::new(ElementType::Tri, vec![0, 1, 2]).is_some());
        assert_eq!(ElementType::from_name("HEX"), Some(ElementType::Hex));
    }
}
