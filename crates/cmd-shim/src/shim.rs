use crate::ShimError;
use dashmap::DashSet;
use rayon::prelude::*;
use snpm_manifest::BinField;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

/// snpm only materializes Node.js packages, so the interpreter injected into
/// a shim target lacking its own shebang is always `node`.
const DEFAULT_RUNTIME: &str = "node";

/// Tracks which target files have already had their shebang/executable-bit
/// handled this run, so two packages that happen to reference the same
/// target (or a re-run over an already-shimmed store entry) don't redo the
/// work.
#[derive(Debug, Default)]
pub struct ShimCache {
    processed: DashSet<PathBuf>,
}

impl ShimCache {
    pub fn new() -> Self {
        ShimCache::default()
    }
}

/// One package's `bin` field, ready to be turned into shims in `bin_dir`.
pub struct ShimTarget<'a> {
    /// The package's bare (scope-stripped) name, used as the shim name when
    /// `bin` is a single string rather than a map.
    pub name: &'a str,
    pub package_dir: &'a Path,
    pub bin: &'a BinField,
}

/// Install shims for every target, fanning out across packages with rayon —
/// this is a flat pass over already-linked packages, not a recursive
/// tree-walk, so unlike the symlink planner's passes it parallelizes safely.
pub fn install_all(targets: &[ShimTarget], bin_dir: &Path, cache: &ShimCache) -> Result<(), ShimError> {
    fs::create_dir_all(bin_dir)?;
    targets.par_iter().try_for_each(|target| install_shims(target.name, target.package_dir, target.bin, bin_dir, cache))
}

/// Install the shim(s) for one package's `bin` field.
pub fn install_shims(
    name: &str,
    package_dir: &Path,
    bin: &BinField,
    bin_dir: &Path,
    cache: &ShimCache,
) -> Result<(), ShimError> {
    fs::create_dir_all(bin_dir)?;
    match bin {
        BinField::Single(target) => install_one(name, package_dir, target, bin_dir, cache),
        BinField::Map(entries) => {
            for (shim_name, target) in entries {
                install_one(shim_name, package_dir, target, bin_dir, cache)?;
            }
            Ok(())
        }
    }
}

fn install_one(shim_name: &str, package_dir: &Path, target: &str, bin_dir: &Path, cache: &ShimCache) -> Result<(), ShimError> {
    let target_path = package_dir.join(target);

    if cache.processed.insert(target_path.clone()) {
        ensure_interpreter_directive(&target_path)?;
        let file = fs::File::open(&target_path)?;
        snpm_fs::make_file_executable(&file)?;
    }

    let shim_path = bin_dir.join(shim_name);
    if !shim_path.exists() {
        tracing::debug!(shim = shim_name, target = %target_path.display(), "creating command shim");
        snpm_fs::symlink_file_exists_ok(&target_path, &shim_path)?;
    }
    Ok(())
}

/// Prepend a `#!/usr/bin/env node` line unless `target_path` already starts
/// with `#` (its own shebang, or a `#!`-free first line we leave alone is
/// never the case here since `#` only starts a shebang in a shim target).
fn ensure_interpreter_directive(target_path: &Path) -> Result<(), ShimError> {
    let mut first_byte = [0u8; 1];
    let has_shebang = {
        let mut file = fs::File::open(target_path)?;
        file.read(&mut first_byte)? == 1 && first_byte[0] == b'#'
    };
    if has_shebang {
        return Ok(());
    }

    let original = fs::read(target_path)?;
    let mut rewritten = format!("#!/usr/bin/env {DEFAULT_RUNTIME}\n").into_bytes();
    rewritten.extend_from_slice(&original);

    let tmp_path = target_path.with_extension("snpm-shim-tmp");
    fs::write(&tmp_path, &rewritten)?;
    fs::rename(&tmp_path, target_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o111 != 0
    }

    #[test]
    fn single_bin_creates_a_shim_named_after_the_package() {
        let package_dir = tempdir().unwrap();
        fs::write(package_dir.path().join("cli.js"), "console.log('hi')").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();

        assert!(bin_dir.path().join("mytool").is_symlink());
    }

    #[test]
    fn map_bin_creates_one_shim_per_entry() {
        let package_dir = tempdir().unwrap();
        fs::write(package_dir.path().join("a.js"), "a").unwrap();
        fs::write(package_dir.path().join("b.js"), "b").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        let mut bin = BTreeMap::new();
        bin.insert("tool-a".to_string(), "a.js".to_string());
        bin.insert("tool-b".to_string(), "b.js".to_string());

        install_shims("unused", package_dir.path(), &BinField::Map(bin), bin_dir.path(), &cache).unwrap();

        assert!(bin_dir.path().join("tool-a").is_symlink());
        assert!(bin_dir.path().join("tool-b").is_symlink());
    }

    #[test]
    fn shebang_is_injected_when_missing() {
        let package_dir = tempdir().unwrap();
        let target = package_dir.path().join("cli.js");
        fs::write(&target, "console.log('hi')").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();

        let contents = fs::read_to_string(&target).unwrap();
        assert_eq!(contents, "#!/usr/bin/env node\nconsole.log('hi')");
    }

    #[test]
    fn existing_shebang_is_left_untouched() {
        let package_dir = tempdir().unwrap();
        let target = package_dir.path().join("cli.js");
        fs::write(&target, "#!/usr/bin/env node\nconsole.log('hi')").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();

        let contents = fs::read_to_string(&target).unwrap();
        assert_eq!(contents, "#!/usr/bin/env node\nconsole.log('hi')");
    }

    #[cfg(unix)]
    #[test]
    fn target_file_becomes_executable() {
        let package_dir = tempdir().unwrap();
        let target = package_dir.path().join("cli.js");
        fs::write(&target, "console.log('hi')").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();

        assert!(is_executable(&target));
    }

    #[test]
    fn dedup_cache_skips_a_target_already_processed_this_run() {
        let package_dir = tempdir().unwrap();
        let target = package_dir.path().join("cli.js");
        fs::write(&target, "console.log('hi')").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();
        // simulate a file that would need rewriting again if the cache didn't short-circuit it
        fs::write(&target, "console.log('changed')").unwrap();
        install_shims("mytool", package_dir.path(), &BinField::Single("cli.js".into()), bin_dir.path(), &cache).unwrap();

        let contents = fs::read_to_string(&target).unwrap();
        assert_eq!(contents, "console.log('changed')");
    }

    #[test]
    fn install_all_fans_out_across_packages() {
        let package_a = tempdir().unwrap();
        let package_b = tempdir().unwrap();
        fs::write(package_a.path().join("cli.js"), "a").unwrap();
        fs::write(package_b.path().join("cli.js"), "b").unwrap();
        let bin_dir = tempdir().unwrap();
        let cache = ShimCache::new();

        let bin_a = BinField::Single("cli.js".into());
        let bin_b = BinField::Single("cli.js".into());
        let targets = vec![
            ShimTarget { name: "tool-a", package_dir: package_a.path(), bin: &bin_a },
            ShimTarget { name: "tool-b", package_dir: package_b.path(), bin: &bin_b },
        ];

        install_all(&targets, bin_dir.path(), &cache).unwrap();

        assert!(bin_dir.path().join("tool-a").is_symlink());
        assert!(bin_dir.path().join("tool-b").is_symlink());
    }
}
