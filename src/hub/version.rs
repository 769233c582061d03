//! Version tags for published dataset configs

use std::collections::HashSet;

/// First `vN` tag not already used in the repository
///
/// Files are laid out as `<root>/<config>/<file>`, so the config name is
/// the second path segment; single-segment paths are ignored.
pub fn next_version_tag<S: AsRef<str>>(files: &[S]) -> String {
    let existing: HashSet<&str> = files
        .iter()
        .filter_map(|f| f.as_ref().split('/').nth(1))
        .collect();

    let mut version = 0u32;
    while existing.contains(format!("v{}", version).as_str()) {
        version += 1;
    }
    format!("v{}", version)
}
