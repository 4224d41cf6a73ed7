//! Custom test assertions for extracted bundles

use super::fixtures::BundleEntry;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Every regular file under `root`, keyed by `/`-separated relative path
pub fn file_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (relative, std::fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Assert `root` holds exactly `entries`, byte for byte
pub fn assert_tree_matches(root: &Path, entries: &[BundleEntry]) {
    let expected: BTreeMap<String, Vec<u8>> = entries
        .iter()
        .map(|e| (e.path.to_string(), e.content.clone()))
        .collect();
    let actual = file_tree(root);

    assert_eq!(
        actual.keys().collect::<Vec<_>>(),
        expected.keys().collect::<Vec<_>>(),
        "extracted file list differs"
    );
    for (path, content) in &expected {
        assert!(actual[path] == *content, "content of {path} differs");
    }

    #[cfg(unix)]
    for entry in entries.iter().filter(|e| e.mode & 0o111 != 0) {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(root.join(entry.path))
            .unwrap()
            .permissions()
            .mode();
        assert!(mode & 0o100 != 0, "{} lost its executable bit", entry.path);
    }
}

/// Assert `dir` exists and is empty
pub fn assert_empty_dir(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert!(leftovers.is_empty(), "unexpected leftovers: {leftovers:?}");
}
