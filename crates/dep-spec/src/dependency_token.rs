use crate::{LinkSpec, PackageName, ParsePackageNameError};
use derive_more::{Display, Error, From};
use miette::Diagnostic;
use snpm_semver::{RangeParseError, VersionRange};

/// The resolved value half of a dependency token: either a version
/// constraint to satisfy against the store/registry, or a direct link to an
/// already-built package on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyValue {
    Range(VersionRange),
    Link(LinkSpec),
}

/// Error parsing a `name`, `name@range`, or `@org/name@range` token.
#[derive(Debug, Display, Error, Diagnostic, From)]
pub enum ParseDependencyTokenError {
    #[diagnostic(code(snpm_dep_spec::bad_name))]
    Name(ParsePackageNameError),
    #[diagnostic(code(snpm_dep_spec::bad_range))]
    Range(RangeParseError),
}

/// Parse a dependency token in one of the three surface forms documented on
/// [`PackageName`]: `name`, `name@range`, `@org/name@range`. The range half
/// defaults to [`VersionRange::Star`] when omitted, and is classified as a
/// [`LinkSpec`] when it carries a `link:`/`file:` prefix.
pub fn parse_dependency_token(
    token: &str,
) -> Result<(PackageName, DependencyValue), ParseDependencyTokenError> {
    let (name, range) = split_name_and_range(token);
    let name = PackageName::parse(name)?;
    let value = match LinkSpec::parse(range) {
        Some(link) => DependencyValue::Link(link),
        None => DependencyValue::Range(VersionRange::parse(range)?),
    };
    Ok((name, value))
}

/// Split a token into its name and range halves, on the last `@` that is not
/// at position 0 (so the leading `@` of a scope is never mistaken for the
/// separator).
fn split_name_and_range(token: &str) -> (&str, &str) {
    let search_from = if token.starts_with('@') {
        token.find('/').map(|slash| slash + 1).unwrap_or(token.len())
    } else {
        0
    };

    match token[search_from..].rfind('@') {
        Some(at) => (&token[..search_from + at], &token[search_from + at + 1..]),
        None => (token, "*"),
    }
}
