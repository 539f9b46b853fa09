use derive_more::{Display, Error, From};
use miette::Diagnostic;
use node_semver::{Range, SemverError, Version};
use std::str::FromStr;

/// A resolved, exact version of a package (`MAJOR.MINOR.PATCH` plus optional
/// prerelease/build tags).
pub type ExactVersion = Version;

/// Error returned when a range token fails to parse.
#[derive(Debug, Display, Error, Diagnostic, From)]
#[display("invalid version range {input:?}: {source}")]
#[diagnostic(code(snpm_semver::unparseable_range))]
pub struct RangeParseError {
    input: String,
    #[error(source)]
    source: SemverError,
}

/// A dependency's declared version constraint.
///
/// `latest` is kept as its own variant rather than eagerly normalized to
/// [`VersionRange::Star`], because resolving it may require a dist-tag
/// lookup against the registry before it can be compared to a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// `*`, or no range supplied at all.
    Star,
    /// A non-`latest` dist-tag (e.g. `next`, `beta`). Unresolvable without a
    /// registry lookup; callers must substitute the tag's pinned version
    /// before calling [`max_satisfying`].
    Tag(String),
    /// Any semver range expression: exact, caret, tilde, wildcard, compound.
    Range(Range),
}

impl VersionRange {
    pub fn parse(input: &str) -> Result<Self, RangeParseError> {
        if input.is_empty() || input == "*" {
            return Ok(VersionRange::Star);
        }
        if input == "latest" {
            return Ok(VersionRange::Tag("latest".to_string()));
        }
        match Range::from_str(input) {
            Ok(range) => Ok(VersionRange::Range(range)),
            Err(_) if !looks_like_a_range(input) => Ok(VersionRange::Tag(input.to_string())),
            Err(source) => Err(RangeParseError { input: input.to_string(), source }),
        }
    }

    /// Whether `version` satisfies this range. `latest` is treated as `*`.
    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Star => true,
            VersionRange::Tag(tag) if tag == "latest" => true,
            VersionRange::Tag(_) => false,
            VersionRange::Range(range) => range.satisfies(version),
        }
    }
}

/// A token contains no digits and no recognized range operators: treat it as
/// an opaque dist-tag (e.g. `next`) rather than a malformed range.
fn looks_like_a_range(input: &str) -> bool {
    input.chars().any(|c| c.is_ascii_digit() || "^~*<>=".contains(c))
}

/// Return the highest-precedence version in `candidates` that satisfies
/// `range`, or `None` if no candidate does (including when `candidates` is
/// empty).
pub fn max_satisfying<'v>(
    candidates: impl IntoIterator<Item = &'v Version>,
    range: &VersionRange,
) -> Option<&'v Version> {
    candidates.into_iter().filter(|version| range.satisfies(version)).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn star_matches_every_version() {
        let range = VersionRange::parse("*").unwrap();
        assert!(range.satisfies(&v("0.0.1")));
        assert!(range.satisfies(&v("99.99.99")));
    }

    #[test]
    fn empty_range_is_star() {
        assert_eq!(VersionRange::parse("").unwrap(), VersionRange::Star);
    }

    #[test]
    fn caret_range_satisfaction() {
        let range = VersionRange::parse("^1.2.0").unwrap();
        assert!(range.satisfies(&v("1.3.0")));
        assert!(!range.satisfies(&v("2.0.0")));
    }

    #[test]
    fn unresolved_tag_satisfies_nothing() {
        let range = VersionRange::parse("next").unwrap();
        assert!(matches!(range, VersionRange::Tag(ref tag) if tag == "next"));
        assert!(!range.satisfies(&v("1.0.0")));
    }

    #[test]
    fn unparseable_range_is_an_error() {
        assert!(VersionRange::parse(">=1.0.0 <").is_err());
    }

    #[test]
    fn max_satisfying_picks_highest_matching_candidate() {
        let candidates = vec![v("1.0.0"), v("1.5.0"), v("2.0.0")];
        let range = VersionRange::parse("^1.0.0").unwrap();
        assert_eq!(max_satisfying(&candidates, &range), Some(&v("1.5.0")));
    }

    #[test]
    fn max_satisfying_returns_none_for_empty_candidates() {
        let range = VersionRange::parse("*").unwrap();
        assert_eq!(max_satisfying(Vec::new().iter(), &range), None);
    }

    #[test]
    fn max_satisfying_returns_none_when_nothing_matches() {
        let candidates = vec![v("1.0.0")];
        let range = VersionRange::parse("^2.0.0").unwrap();
        assert_eq!(max_satisfying(&candidates, &range), None);
    }
}
