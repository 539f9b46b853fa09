use derive_more::{Display, Error};
use pipe_trait::Pipe;
use split_first_char::SplitFirstChar;
use std::{fmt, str::FromStr};

/// The name of a package, with or without an `@scope`.
///
/// Syntax:
/// * Without scope: `{bare}`
/// * With scope: `@{scope}/{bare}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName {
    /// The scope, without the leading `@`, if the package is scoped.
    pub scope: Option<String>,
    pub bare: String,
}

/// Error when parsing [`PackageName`] from a string input.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ParsePackageNameError {
    #[display("missing bare name after scope")]
    MissingName,
    #[display("name is empty")]
    EmptyName,
}

impl PackageName {
    pub fn parse<Input>(input: Input) -> Result<Self, ParsePackageNameError>
    where
        Input: Into<String> + AsRef<str>,
    {
        match input.as_ref().split_first_char() {
            Some(('@', rest)) => {
                let (scope, bare) = rest.split_once('/').ok_or(ParsePackageNameError::MissingName)?;
                Ok(PackageName { scope: scope.to_string().pipe(Some), bare: bare.to_string() })
            }
            Some(_) => Ok(PackageName { scope: None, bare: input.into() }),
            None => Err(ParsePackageNameError::EmptyName),
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}

impl TryFrom<String> for PackageName {
    type Error = ParsePackageNameError;
    fn try_from(input: String) -> Result<Self, Self::Error> {
        PackageName::parse(input)
    }
}

impl<'a> TryFrom<&'a str> for PackageName {
    type Error = ParsePackageNameError;
    fn try_from(input: &'a str) -> Result<Self, Self::Error> {
        PackageName::parse(input)
    }
}

impl FromStr for PackageName {
    type Err = ParsePackageNameError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        PackageName::parse(input)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let PackageName { scope, bare } = self;
        if let Some(scope) = scope {
            write!(f, "@{scope}/")?;
        }
        write!(f, "{bare}")
    }
}

impl From<PackageName> for String {
    fn from(value: PackageName) -> Self {
        value.to_string()
    }
}
