//! File-system safe, unique file names for condition sets.

use std::collections::HashSet;

/// Characters allowed in addition to ASCII alphanumerics.
const SAFE_PUNCTUATION: &str = "-_.";

/// Replace every character that is not ASCII alphanumeric or one of `-_.`
/// with `_`.
///
/// ```
/// use foamport::foam::sanitize;
///
/// assert_eq!(sanitize("inlet wall/1"), "inlet_wall_1");
/// ```
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The set of names already handed out during one export.
#[derive(Debug, Default, Clone)]
pub struct UsedNames {
    names: HashSet<String>,
}

impl UsedNames {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize `name`, append `suffix`, and make the result unique within
    /// this set by appending `-1`, `-2`, ... as needed. The returned name
    /// is registered before returning.
    ///
    /// ```
    /// use foamport::foam::UsedNames;
    ///
    /// let mut used = UsedNames::new();
    /// assert_eq!(used.unique("fluid", "-cells"), "fluid-cells");
    /// assert_eq!(used.unique("fluid", "-cells"), "fluid-cells-1");
    /// ```
    pub fn unique(&mut self, name: &str, suffix: &str) -> String {
        let mut base = sanitize(name);
        base.push_str(&sanitize(suffix));
        let mut candidate = base.clone();
        let mut n = 0;
        while self.names.contains(&candidate) {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        self.names.insert(candidate.clone());
        candidate
    }

    /// Whether `name` has been handed out.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names handed out.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names have been handed out.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
