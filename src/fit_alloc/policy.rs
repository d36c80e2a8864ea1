use core::fmt;
use core::str::FromStr;
use thiserror_no_std::Error;

/// Strategy used to pick the free block that serves an allocation.
///
/// All policies scan the block list and are deterministic for a given
/// list state; they differ in which qualifying free block they settle
/// on and therefore in how the region fragments over time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FitPolicy {
    /// Take the first free block that is large enough. Fast, tends to
    /// concentrate fragmentation near the start of the region.
    #[default]
    FirstFit,
    /// Like first-fit but resume scanning where the previous allocation
    /// left off, wrapping around at the end of the region.
    NextFit,
    /// Take the smallest free block that is large enough.
    BestFit,
    /// Take the largest free block that is large enough.
    WorstFit,
}

/// The error returned when a policy token is not recognized.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown placement policy token")]
pub struct ParsePolicyError;

impl FromStr for FitPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FirstFit" => Ok(Self::FirstFit),
            "NextFit" => Ok(Self::NextFit),
            "BestFit" => Ok(Self::BestFit),
            "WorstFit" => Ok(Self::WorstFit),
            _ => Err(ParsePolicyError),
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FirstFit => "FirstFit",
            Self::NextFit => "NextFit",
            Self::BestFit => "BestFit",
            Self::WorstFit => "WorstFit",
        })
    }
}
