mod dependency_token;
mod link_spec;
mod package_name;
mod shorthand;

pub use dependency_token::{parse_dependency_token, DependencyValue, ParseDependencyTokenError};
pub use link_spec::LinkSpec;
pub use package_name::{PackageName, ParsePackageNameError};
pub use shorthand::{expand_shorthand, ShorthandTarget};
