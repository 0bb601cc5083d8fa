//! Utility functions

use crate::error::{SolcError, SolcIoError};
use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Extension of solidity source files
pub const SOLIDITY_EXTENSION: &str = "sol";

/// Permission bits of every file written to the artifacts directory, `rw-r--r--`
pub const ARTIFACT_FILE_MODE: u32 = 0o644;

/// Returns true if the file name ends with the solidity suffix
///
/// ```
/// use solbind_core::utils::is_solidity_file;
///
/// assert!(is_solidity_file("contracts/Greeter.sol"));
/// assert!(!is_solidity_file("contracts/Greeter.yul"));
/// ```
pub fn is_solidity_file(path: impl AsRef<Path>) -> bool {
    path.as_ref().extension().map_or(false, |ext| ext == SOLIDITY_EXTENSION)
}

/// Resolves `program` the way a shell would.
///
/// A program given with a directory component is checked as is, a bare name is searched for in
/// every directory of `PATH`. Returns `None` if no executable file was found.
pub fn find_executable(program: impl AsRef<Path>) -> Option<PathBuf> {
    let program = program.as_ref();
    if program.is_absolute() || program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        if env::consts::EXE_SUFFIX.is_empty() {
            return None;
        }
        let mut name = program.as_os_str().to_owned();
        name.push(env::consts::EXE_SUFFIX);
        let candidate = dir.join(name);
        is_executable(&candidate).then_some(candidate)
    })
}

/// Same as [`find_executable`] but returns a [`SolcError::ToolNotFound`] if nothing was found
pub fn resolve_executable(program: impl AsRef<Path>) -> Result<PathBuf, SolcError> {
    let program = program.as_ref();
    let resolved = find_executable(program).ok_or_else(|| SolcError::tool_not_found(program))?;
    trace!(program = %program.display(), resolved = %resolved.display(), "resolved executable");
    Ok(resolved)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Creates the directory and all of its missing parents
pub fn create_dir_all(dir: impl AsRef<Path>) -> Result<(), SolcIoError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|err| {
        error!(dir = %dir.display(), "failed to create directory");
        SolcIoError::new(err, dir)
    })
}

/// Creates the parent directory of the `file` and all its ancestors if it does not exist
///
/// See [`std::fs::create_dir_all()`]
pub fn create_parent_dir_all(file: impl AsRef<Path>) -> Result<(), SolcIoError> {
    let file = file.as_ref();
    if let Some(parent) = file.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes `contents` to `path`, truncating any existing file, and sets the file's permission bits
/// to `mode`.
///
/// The mode is applied after writing as well, so that an existing file with different permissions
/// ends up with `mode` too. On non-unix platforms the mode is ignored.
pub fn write_with_mode(
    path: impl AsRef<Path>,
    contents: impl AsRef<[u8]>,
    mode: u32,
) -> Result<(), SolcIoError> {
    let path = path.as_ref();
    let map_err = |err| SolcIoError::new(err, path);

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    let mut file = opts.open(path).map_err(map_err)?;
    file.write_all(contents.as_ref()).map_err(map_err)?;
    file.flush().map_err(map_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(map_err)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Returns the file stem as `String`, `Greeter` for `build/Greeter.abi`
pub fn file_stem(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref().file_stem().and_then(|s| s.to_str().map(|s| s.to_string()))
}

/// Returns the path as a string with `/` separators on every platform
pub fn to_slash_lossy(path: &Path) -> String {
    #[cfg(windows)]
    {
        use path_slash::PathExt;
        path.to_slash_lossy().into_owned()
    }
    #[cfg(not(windows))]
    {
        path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_detect_solidity_files() {
        assert!(is_solidity_file("A.sol"));
        assert!(is_solidity_file("nested/dir/B.sol"));
        assert!(!is_solidity_file("A.sol.bak"));
        assert!(!is_solidity_file("sol"));
        assert!(!is_solidity_file("README.md"));
    }

    #[test]
    fn missing_program_is_not_found() {
        assert!(find_executable("solbind-definitely-not-a-real-program").is_none());
        let err = resolve_executable("solbind-definitely-not-a-real-program").unwrap_err();
        assert!(matches!(err, SolcError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn finds_executables_by_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("tool");
        fs::write(&script, "#!/bin/sh\n").unwrap();

        // not executable yet
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(find_executable(&script).is_none());

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_executable(&script), Some(script.clone()));

        // directories are never executables
        assert!(find_executable(tmp.path()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn writes_with_mode_and_overwrites() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("A.bin");
        fs::write(&file, "stale content that is longer").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();

        write_with_mode(&file, "6080", ARTIFACT_FILE_MODE).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "6080");
        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, ARTIFACT_FILE_MODE);
    }

    #[test]
    fn creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a/b/c/Greeter.abi");
        create_parent_dir_all(&file).unwrap();
        assert!(tmp.path().join("a/b/c").is_dir());
    }

    #[test]
    fn file_stem_of_artifact() {
        assert_eq!(file_stem("build/Greeter.abi"), Some("Greeter".to_string()));
        assert_eq!(file_stem(""), None);
    }
}
