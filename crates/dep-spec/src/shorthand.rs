use crate::PackageName;

/// One expanded install target produced by a CLI shorthand.
pub struct ShorthandTarget {
    pub name: PackageName,
    /// Whether this target belongs in `devDependencies` rather than the
    /// group the user originally requested.
    pub force_dev: bool,
}

/// Expand a package name for the `:ts`/`:dts` CLI shorthands.
///
/// * `<name>:ts` installs both `<name>` and its matching `@types/<name>`
///   types package, both into the group the caller requested.
/// * `<name>:dts` installs `<name>` into the requested group and
///   `@types/<name>` into `devDependencies` specifically.
///
/// A scoped name `@org/name` maps to `@types/org__name` per the types
/// ecosystem's naming convention. Returns `None` when `token` doesn't carry
/// either suffix, so the caller can fall through to ordinary token parsing.
pub fn expand_shorthand(token: &str) -> Option<Vec<ShorthandTarget>> {
    let (base, force_dev) = if let Some(base) = token.strip_suffix(":ts") {
        (base, false)
    } else if let Some(base) = token.strip_suffix(":dts") {
        (base, true)
    } else {
        return None;
    };

    let name = PackageName::parse(base).ok()?;
    let types_name = types_package_name(&name);

    Some(vec![
        ShorthandTarget { name, force_dev: false },
        ShorthandTarget { name: types_name, force_dev },
    ])
}

fn types_package_name(name: &PackageName) -> PackageName {
    let bare = match &name.scope {
        Some(scope) => format!("{scope}__{}", name.bare),
        None => name.bare.clone(),
    };
    PackageName { scope: Some("types".to_string()), bare }
}
