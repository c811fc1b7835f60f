// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use path_clean::clean;
use std::path::{Path, PathBuf};

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Pick the configuration file: an explicit path wins, then the nearest `default_filename` in
/// `cwd` or its parents, then `default_filename` inside `default_config_dir`.
pub fn resolve_config_path<P: Into<PathBuf>>(
    find_in_parent: FindInParent,
    cwd: P,
    default_config_dir: P,
    default_filename: &str,
    cli_file: Option<P>,
) -> PathBuf {
    let cli_file: Option<PathBuf> = cli_file.map(Into::into);
    let default_config_dir = default_config_dir.into();
    let cwd = cwd.into();

    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return cli_file;
        }
        return clean(cwd.join(cli_file));
    }

    if let Some(found) = find_in_parent(&cwd, default_filename) {
        return found;
    }

    clean(default_config_dir.join(default_filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/foo/contrib.config.yaml"))
    }

    #[test]
    fn falls_back_to_config_dir() {
        let path = resolve_config_path(
            not_found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            "contrib.config.yaml",
            None,
        );
        assert_eq!(path, PathBuf::from("/my/config/contrib.config.yaml"));
    }

    #[test]
    fn explicit_file_wins() {
        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            "contrib.config.yaml",
            Some(PathBuf::from("/my/absolute/conf.yaml")),
        );
        assert_eq!(path, PathBuf::from("/my/absolute/conf.yaml"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            "contrib.config.yaml",
            Some(PathBuf::from("../conf.yaml")),
        );
        assert_eq!(path, PathBuf::from("/foo/conf.yaml"));
    }

    #[test]
    fn searches_parents_before_default() {
        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            "contrib.config.yaml",
            None,
        );
        assert_eq!(path, PathBuf::from("/foo/contrib.config.yaml"));
    }

    #[test]
    fn find_in_parent_walks_up() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(dir.path().join("contrib.config.yaml"), "name: x\n")?;

        assert_eq!(
            find_in_parent(&nested, "contrib.config.yaml"),
            Some(dir.path().join("contrib.config.yaml"))
        );
        Ok(())
    }
}
