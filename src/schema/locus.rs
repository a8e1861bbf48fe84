//! Body segment descriptors.

use serde::{Deserialize, Serialize};

use super::{Color, Reactions};

/// Shortest segment a genome may carry.
pub const MIN_LENGTH: f32 = 2.0;
/// Longest segment a genome may carry.
pub const MAX_LENGTH: f32 = 18.0;

/// Where a segment attaches in the body plan.
///
/// Numerically this is `-1` for [`Branch::Previous`], `0` for
/// [`Branch::Origin`] and `target + 1` for [`Branch::Locus`]. A segment at
/// position `i` may only reference a target strictly before `i`, which makes
/// the segment sequence a forest rooted at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Branch {
    /// Attach at the end of the immediately preceding segment.
    Previous,
    /// Restart the body plan at the organism's origin.
    Origin,
    /// Attach at the end of the segment at this position.
    Locus(usize),
}

impl Branch {
    /// Decode the numeric form. Values below `-1` have no meaning.
    pub fn from_raw(raw: i32) -> Option<Branch> {
        match raw {
            -1 => Some(Branch::Previous),
            0 => Some(Branch::Origin),
            r if r > 0 => Some(Branch::Locus(r as usize - 1)),
            _ => None,
        }
    }

    /// Numeric form.
    pub fn raw(self) -> i32 {
        match self {
            Branch::Previous => -1,
            Branch::Origin => 0,
            Branch::Locus(target) => target as i32 + 1,
        }
    }

    /// Numeric value `0..=index` as a branch (`0` is the origin).
    pub fn numbered(value: usize) -> Branch {
        match value {
            0 => Branch::Origin,
            v => Branch::Locus(v - 1),
        }
    }

    /// Whether a segment at `index` may carry this branch.
    pub fn is_legal_at(self, index: usize) -> bool {
        match self {
            Branch::Previous | Branch::Origin => true,
            Branch::Locus(target) => target < index,
        }
    }

    /// Clamp the numeric value to `index`, so the result is legal at `index`.
    pub fn clamped_to(self, index: usize) -> Branch {
        match self {
            Branch::Locus(target) if target >= index => Branch::numbered(index),
            other => other,
        }
    }
}

impl From<Branch> for i32 {
    fn from(branch: Branch) -> Self {
        branch.raw()
    }
}

/// A numeric branch value below `-1`.
#[derive(Debug, thiserror::Error)]
#[error("branch value {0} is below -1")]
pub struct BranchValueError(pub i32);

impl TryFrom<i32> for Branch {
    type Error = BranchValueError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Branch::from_raw(raw).ok_or(BranchValueError(raw))
    }
}

/// One heritable body segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Locus {
    /// Segment length, in [`MIN_LENGTH`, `MAX_LENGTH`] when randomly drawn.
    pub length: f32,
    /// Segment angle in radians, in [0, 2π).
    pub theta: f32,
    /// Color (material) category.
    pub color: Color,
    /// Attachment point.
    pub branch: Branch,
    /// Response level per interaction category.
    pub reactions: Reactions,
}

impl Locus {
    /// Same segment with a different attachment point.
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branch = branch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        for raw in -1..20 {
            let branch = Branch::from_raw(raw).unwrap();
            assert_eq!(branch.raw(), raw);
        }
        assert_eq!(Branch::from_raw(-2), None);
    }

    #[test]
    fn test_legality() {
        assert!(Branch::Previous.is_legal_at(0));
        assert!(Branch::Origin.is_legal_at(0));
        assert!(!Branch::Locus(0).is_legal_at(0));
        assert!(Branch::Locus(0).is_legal_at(1));
        assert!(!Branch::Locus(3).is_legal_at(3));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Branch::Locus(5).clamped_to(2), Branch::Locus(1));
        assert_eq!(Branch::Locus(5).clamped_to(0), Branch::Origin);
        assert_eq!(Branch::Locus(1).clamped_to(4), Branch::Locus(1));
        assert_eq!(Branch::Previous.clamped_to(0), Branch::Previous);
        for index in 0..6 {
            assert!(Branch::Locus(10).clamped_to(index).is_legal_at(index));
        }
    }

    #[test]
    fn test_branch_serializes_numerically() {
        assert_eq!(serde_json::to_string(&Branch::Locus(2)).unwrap(), "3");
        assert_eq!(
            serde_json::from_str::<Branch>("-1").unwrap(),
            Branch::Previous
        );
        assert!(serde_json::from_str::<Branch>("-4").is_err());
    }
}
