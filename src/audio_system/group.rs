/// Audio group names and per-group attributes
///
/// Groups are free-form names taken from configuration. A few names carry
/// special meaning for focus handling and companion sounds.
use std::fmt;
use std::str::FromStr;

/// Background ambiance. Paused (never stopped) on focus loss.
pub const AMBIANCE: &str = "ambiance";

/// Catch-all group, also used for companion click sounds
pub const OTHER: &str = "other";

/// Maximum number of live entries per group
pub const GROUP_CAPACITY: usize = 10;

/// Check whether a group gets ambiance treatment
pub fn is_ambiance(group: &str) -> bool {
    group == AMBIANCE
}

/// Configurable per-group attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupAttribute {
    /// Volume, 0 to 100
    Volume,

    /// Pan, -100 (left) to 100 (right)
    Pan,
}

impl fmt::Display for GroupAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupAttribute::Volume => write!(f, "volume"),
            GroupAttribute::Pan => write!(f, "pan"),
        }
    }
}

impl FromStr for GroupAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "volume" | "vol" => Ok(GroupAttribute::Volume),
            "pan" => Ok(GroupAttribute::Pan),
            other => Err(format!("unknown attribute: {}", other)),
        }
    }
}

impl GroupAttribute {
    /// Value used when the group has nothing configured
    pub fn default_value(&self) -> i32 {
        match self {
            GroupAttribute::Volume => 100,
            GroupAttribute::Pan => 0,
        }
    }

    /// Inclusive range of valid values
    pub fn range(&self) -> (i32, i32) {
        match self {
            GroupAttribute::Volume => (0, 100),
            GroupAttribute::Pan => (-100, 100),
        }
    }

    /// Clamp a value into this attribute's range
    pub fn clamp(&self, value: i32) -> i32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Convert a configured value to the engine's native scale
    pub fn to_native(&self, value: f32) -> f32 {
        value / 100.0
    }
}
