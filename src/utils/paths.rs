use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: drops `.` segments and trailing separators,
/// folds `..` into the preceding segment where one exists.
///
/// No filesystem access is performed, so symlinks are not resolved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Makes a path absolute against the current directory and normalizes it
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        let current_dir = std::env::current_dir().context("Could not read current directory")?;
        Ok(normalize(&current_dir.join(path)))
    }
}

/// Expands a leading `~` to the home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Some(path_str) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    if path_str == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }
    Ok(path.to_path_buf())
}

/// Whether two paths resolve to the same filesystem entry.
///
/// Both paths are followed through symlinks, so a symlink is the same file as
/// whatever it points at. A missing path is never the same file.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (Ok(ma), Ok(mb)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        ma.dev() == mb.dev() && ma.ino() == mb.ino()
    }

    #[cfg(not(unix))]
    {
        let _ = (ma, mb);
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }
}

/// Whether `target` already refers to `source`.
///
/// True when both resolve to the same entry, or when `target` is a symlink
/// whose stored value is the relative or absolute form of `source`. The
/// second check keeps links to dangling source symlinks recognizable.
#[must_use]
pub fn links_to(target: &Path, source: &Path) -> bool {
    if same_file(source, target) {
        return true;
    }
    let Ok(value) = fs::read_link(target) else {
        return false;
    };
    value == source || value == symlink_value(source, target, false)
}

/// Whether two existing paths live on the same device
///
/// # Errors
///
/// Returns an error if either path cannot be stat'ed
pub fn same_device(a: &Path, b: &Path) -> Result<bool> {
    let ma = fs::metadata(a).with_context(|| format!("Failed to stat {}", a.display()))?;
    let mb = fs::metadata(b).with_context(|| format!("Failed to stat {}", b.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        Ok(ma.dev() == mb.dev())
    }

    #[cfg(not(unix))]
    {
        let _ = (ma, mb);
        Ok(true)
    }
}

/// Value to store in a symlink at `target` that points at `source`.
///
/// With `absolute` the source path is used as is, otherwise it is expressed
/// relative to the directory that will contain the link.
#[must_use]
pub fn symlink_value(source: &Path, target: &Path, absolute: bool) -> PathBuf {
    if absolute {
        return source.to_path_buf();
    }
    let parent = target.parent().unwrap_or_else(|| Path::new("/"));
    pathdiff::diff_paths(source, parent).unwrap_or_else(|| source.to_path_buf())
}
