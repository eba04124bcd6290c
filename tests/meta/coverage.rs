//! Structural checks keeping `tests/unit` a mirror of `src`

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    // Harness roots and module declarations carry no tests of their own
    fn is_structural(relative: &str) -> bool {
        relative == "lib.rs" || relative.ends_with("main.rs") || relative.ends_with("mod.rs")
    }

    fn source_and_unit_paths() -> (BTreeSet<String>, BTreeSet<String>) {
        let src_dir = Path::new("src");
        let unit_dir = Path::new("tests/unit");
        assert!(src_dir.is_dir(), "tests must run from the package root");

        let src = collect_relative_paths(src_dir, src_dir).unwrap_or_default();
        let unit = collect_relative_paths(unit_dir, unit_dir).unwrap_or_default();
        (src, unit)
    }

    #[test]
    fn test_every_source_file_has_unit_tests() {
        let (src, unit) = source_and_unit_paths();

        let missing: Vec<_> = src
            .iter()
            .filter(|path| !is_structural(path) && !unit.contains(*path))
            .map(|path| format!("  - src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit test counterparts:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_every_unit_test_has_a_source_file() {
        let (src, unit) = source_and_unit_paths();

        let orphaned: Vec<_> = unit
            .iter()
            .filter(|path| !is_structural(path) && !src.contains(*path))
            .map(|path| format!("  - tests/unit/{path} (no src/{path})"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without source counterparts:\n{}",
            orphaned.join("\n")
        );
    }

    #[test]
    fn test_every_test_file_contains_tests() {
        let tests_dir = Path::new("tests");
        let mut empty = Vec::new();

        for relative in collect_relative_paths(tests_dir, tests_dir).unwrap_or_default() {
            let path = tests_dir.join(&relative);
            if path.is_dir() || is_structural(&relative) {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) if content.contains("#[test]") => {}
                Ok(_) => empty.push(format!("  - {}", path.display())),
                Err(error) => empty.push(format!("  - {} (unreadable: {error})", path.display())),
            }
        }

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }

    // Relative paths of every directory and .rs file below `dir`
    fn collect_relative_paths(dir: &Path, base: &Path) -> Result<BTreeSet<String>, io::Error> {
        let mut paths = BTreeSet::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let relative = path
                .strip_prefix(base)
                .map_err(|_| io::Error::other("Failed to strip prefix"))?
                .to_string_lossy()
                .into_owned();

            if path.is_dir() {
                paths.extend(collect_relative_paths(&path, base)?);
                paths.insert(relative);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                paths.insert(relative);
            }
        }

        Ok(paths)
    }
}
