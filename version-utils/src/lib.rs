// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

//! Dotted version comparison for gating features on reported
//! Pacemaker versions. Parsing is strict so callers can fail open when
//! a host reports something unrecognizable.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid version {0}")]
pub struct InvalidVersion(String);

#[derive(Debug, Clone, Eq)]
pub struct Version {
    version: String,
    parts: Vec<u32>,
}

impl Version {
    pub fn new(parts: Vec<u32>) -> Self {
        let version = parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");

        Self { version, parts }
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Distributions append a release tag after '-' (e.g. 1.1.16-12.el7);
        // only the dotted prefix takes part in comparison.
        let core = s.splitn(2, '-').next().unwrap_or(s);

        if core.is_empty() {
            return Err(InvalidVersion(s.to_string()));
        }

        let parts = core
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| InvalidVersion(s.to_string()))?;

        Ok(Version {
            version: s.to_string(),
            parts,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn test_version_eq() {
        assert_eq!(
            "1.1.7".parse::<Version>().unwrap(),
            Version::new(vec![1, 1, 7])
        );
        assert_eq!(
            "1.1.16-12.el7".parse::<Version>().unwrap(),
            "1.1.16".parse::<Version>().unwrap()
        );
    }

    #[test]
    fn test_version_ord() {
        let v = |s: &str| s.parse::<Version>().unwrap();

        assert!(v("1.1.6") < v("1.1.7"));
        assert!(v("1.1.8") > v("1.1.7"));
        assert!(v("1.2.0") > v("1.1.7"));
        assert!(v("2.0") > v("1.9.9"));
    }

    #[test]
    fn test_version_parse_failure() {
        assert!("pacemaker".parse::<Version>().is_err());
        assert!("1.1.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }
}
