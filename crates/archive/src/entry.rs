use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::{Component, Path};

/// The components of `path` as stored in an archive.
///
/// Names are made relative the way GNU tar does it: leading roots are
/// dropped, `.` is skipped, and `..` cancels the component before it (or is
/// dropped when there is nothing left to cancel), so no stored name can climb
/// out of the extraction directory.
pub(crate) fn components(path: &Path) -> Result<Vec<&OsStr>> {
    let mut parts = Vec::new();
    let mut rewritten = false;
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {},
            Component::ParentDir => {
                parts.pop();
                rewritten = true;
            },
            Component::RootDir | Component::Prefix(_) => rewritten = true,
        }
    }
    if parts.is_empty() {
        exn::bail!(ErrorKind::Header(path.to_path_buf()));
    }
    if rewritten {
        tracing::debug!(path = %path.display(), "removing leading root and parent references from entry name");
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/abs/path/file", Some(&["abs", "path", "file"][..]))]
    #[case("./rel/file", Some(&["rel", "file"][..]))]
    #[case("rel/./file", Some(&["rel", "file"][..]))]
    #[case("file", Some(&["file"][..]))]
    #[case("../x/f", Some(&["x", "f"][..]))]
    #[case("a/../f", Some(&["f"][..]))]
    #[case("dir/a/../../../f", Some(&["f"][..]))]
    #[case("/", None)]
    #[case("..", None)]
    #[case("a/..", None)]
    fn test_components(#[case] path: &str, #[case] expected: Option<&[&str]>) {
        let result = components(Path::new(path)).ok();
        let expected = expected.map(|parts| parts.iter().map(OsStr::new).collect::<Vec<_>>());
        assert_eq!(result, expected);
    }
}
