//! Run-length accumulation of boundary faces into patches.

use crate::foam::BcStat;
use crate::mesh::Condition;

/// Boundary patches accumulated while faces stream.
///
/// A face extends the last run when its condition has the same name,
/// otherwise it starts a new run. Runs are never merged after the fact, so
/// the stream must deliver each condition's faces contiguously.
#[derive(Debug, Clone, Default)]
pub struct BcStats {
    runs: Vec<BcStat>,
}

impl BcStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add boundary face `face` with condition `bc`.
    pub fn push(&mut self, bc: &Condition, face: usize) {
        match self.runs.last_mut() {
            Some(last) if last.name == bc.name => last.n_faces += 1,
            _ => self.runs.push(BcStat {
                name: bc.name.clone(),
                type_name: bc.type_name.clone(),
                n_faces: 1,
                start_face: face,
            }),
        }
    }

    /// The accumulated runs.
    pub fn runs(&self) -> &[BcStat] {
        &self.runs
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no boundary face was pushed.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discontiguous_names_are_not_merged() {
        let a = Condition::boundary("A", "wall");
        let b = Condition::boundary("B", "patch");
        let mut stats = BcStats::new();
        for (face, bc) in [&a, &a, &a, &b, &b, &a].into_iter().enumerate() {
            stats.push(bc, face);
        }

        let runs: Vec<_> = stats
            .runs()
            .iter()
            .map(|r| (r.name.as_str(), r.n_faces, r.start_face))
            .collect();
        assert_eq!(runs, vec![("A", 3, 0), ("B", 2, 3), ("A", 1, 5)]);
        assert_eq!(stats.runs()[1].type_name, "patch");
    }

    #[test]
    fn test_start_face_is_first_face_id() {
        let mut stats = BcStats::new();
        assert!(stats.is_empty());
        let wall = Condition::boundary("wall", "wall");
        stats.push(&wall, 40);
        stats.push(&wall, 41);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.runs()[0].start_face, 40);
        assert_eq!(stats.runs()[0].n_faces, 2);
    }
}
