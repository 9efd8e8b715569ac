//! Package versions and dependency constraints
//!
//! Versions are dotted numeric strings (`3.8.5`, `2.5`, `1.0.10`). Missing
//! trailing components compare as zero, so `2.5` equals `2.5.0`. Dependency
//! lists follow the repository's `Depends` syntax:
//!
//! ```text
//! weka (>=3.8.0|<3.9.0), distributedWekaBase (>=1.0.12), kerasZoo
//! ```

use pmi_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Name under which packages declare their dependency on the base toolkit
pub const BASE_SYSTEM_NAME: &str = "weka";

/// A dotted numeric version
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    components: Vec<u64>,
    text: String,
}

impl Version {
    /// Build a version from numeric components
    pub fn from_components(components: &[u64]) -> Self {
        let text = components
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            components: components.to_vec(),
            text,
        }
    }

    /// Numeric components
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(Error::config("empty version string"));
        }

        let mut components = Vec::new();
        for part in text.split('.') {
            // Qualifiers such as "-SNAPSHOT" end the numeric part
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                if components.is_empty() {
                    return Err(Error::config(format!("invalid version '{}'", text)));
                }
                break;
            }
            let value = digits
                .parse()
                .map_err(|_| Error::config(format!("invalid version '{}'", text)))?;
            components.push(value);
            if digits.len() != part.len() {
                break;
            }
        }

        Ok(Self {
            components,
            text: text.to_string(),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.text
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// Comparison operator of a single version bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

/// A conjunction of version bounds, e.g. `>=3.8.0|<3.9.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    bounds: Vec<(Comparison, Version)>,
}

impl VersionConstraint {
    /// Whether `version` satisfies every bound
    pub fn matches(&self, version: &Version) -> bool {
        self.bounds
            .iter()
            .all(|(op, bound)| op.holds(version.cmp(bound)))
    }

    /// The individual bounds
    pub fn bounds(&self) -> &[(Comparison, Version)] {
        &self.bounds
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bounds = Vec::new();
        for raw in s.split('|') {
            let raw = raw.trim();
            let (op, rest) = if let Some(rest) = raw.strip_prefix(">=") {
                (Comparison::GreaterOrEqual, rest)
            } else if let Some(rest) = raw.strip_prefix("<=") {
                (Comparison::LessOrEqual, rest)
            } else if let Some(rest) = raw.strip_prefix('>') {
                (Comparison::Greater, rest)
            } else if let Some(rest) = raw.strip_prefix('<') {
                (Comparison::Less, rest)
            } else if let Some(rest) = raw.strip_prefix('=') {
                (Comparison::Equal, rest)
            } else {
                return Err(Error::config(format!("invalid version constraint '{}'", raw)));
            };
            bounds.push((op, rest.parse()?));
        }
        Ok(Self { bounds })
    }
}

/// One entry of a `Depends` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the required package (or the base system)
    pub name: String,

    /// Version bounds, if any
    pub constraint: Option<VersionConstraint>,
}

impl Dependency {
    /// Whether this entry refers to the base toolkit
    pub fn is_base_system(&self) -> bool {
        self.name.eq_ignore_ascii_case(BASE_SYSTEM_NAME)
    }
}

/// Parse a comma separated `Depends` list
pub fn parse_dependencies(depends: &str) -> Result<Vec<Dependency>> {
    let mut deps = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in depends.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_dependency(&depends[start..i], &mut deps)?;
                start = i + 1;
            }
            _ => {}
        }
    }
    push_dependency(&depends[start..], &mut deps)?;

    Ok(deps)
}

fn push_dependency(entry: &str, deps: &mut Vec<Dependency>) -> Result<()> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(());
    }

    let dependency = match entry.find('(') {
        Some(open) => {
            let close = entry
                .rfind(')')
                .filter(|&close| close > open)
                .ok_or_else(|| Error::config(format!("unbalanced dependency '{}'", entry)))?;
            Dependency {
                name: entry[..open].trim().to_string(),
                constraint: Some(entry[open + 1..close].parse()?),
            }
        }
        None => Dependency {
            name: entry.to_string(),
            constraint: None,
        },
    };

    if dependency.name.is_empty() {
        return Err(Error::config(format!("dependency without a name: '{}'", entry)));
    }
    deps.push(dependency);
    Ok(())
}
