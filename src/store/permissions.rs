use std::fs;
use std::path::Path;

use super::StoreError;

#[cfg(unix)]
const WRITABLE_MODE: u32 = 0o666;
#[cfg(unix)]
const READ_ONLY_MODE: u32 = 0o444;

pub(crate) fn set_writable(path: &Path) -> Result<(), StoreError> {
    set_mode(path, false)
}

pub(crate) fn set_read_only(path: &Path) -> Result<(), StoreError> {
    set_mode(path, true)
}

#[cfg(unix)]
fn set_mode(path: &Path, read_only: bool) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if read_only { READ_ONLY_MODE } else { WRITABLE_MODE };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|err| StoreError::permission(path, err))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, read_only: bool) -> Result<(), StoreError> {
    let mut perms = fs::metadata(path)
        .map_err(|err| StoreError::permission(path, err))?
        .permissions();
    perms.set_readonly(read_only);
    fs::set_permissions(path, perms).map_err(|err| StoreError::permission(path, err))
}
