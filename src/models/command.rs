use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const KEY_ENTER: &str = "${KEY_ENTER}";
pub const KEY_UP: &str = "${KEY_UP}";
pub const KEY_DOWN: &str = "${KEY_DOWN}";
pub const KEY_TAB: &str = "${KEY_TAB}";

/// Path of frame indices from the top window down to a frame.
///
/// Rendered as `root`, `root:0`, `root:0:2`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameLocation(Vec<usize>);

impl FrameLocation {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth below the top window
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FrameLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for idx in &self.0 {
            write!(f, ":{}", idx)?;
        }
        Ok(())
    }
}

impl FromStr for FrameLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        if parts.next() != Some("root") {
            return Err(format!("frame location must start with 'root': {}", s));
        }
        let indices = parts
            .map(|p| {
                p.parse::<usize>()
                    .map_err(|_| format!("invalid frame index '{}' in {}", p, s))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(indices))
    }
}

impl TryFrom<String> for FrameLocation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameLocation> for String {
    fn from(value: FrameLocation) -> Self {
        value.to_string()
    }
}

/// One candidate way of re-finding an element, e.g. `id=login` tagged `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl Locator {
    pub fn new(value: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            strategy: Some(strategy.into()),
        }
    }

    /// A bare target that is not an element locator (script text, page title)
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            strategy: None,
        }
    }
}

/// A recorded command as delivered to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,
    pub target: Vec<Locator>,
    pub value: String,
    #[serde(default)]
    pub insert_before_last_command: bool,
    pub frame_location: FrameLocation,
}

impl CommandRecord {
    /// Best candidate, i.e. the first one
    pub fn best_target(&self) -> Option<&str> {
        self.target.first().map(|l| l.value.as_str())
    }
}
