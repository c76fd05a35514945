//! File operations implemented with `std::fs`

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

use super::FileOps;

/// Backend using the platform's native file APIs
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileOps;

impl FileOps for NativeFileOps {
    fn copy(&self, src: &Path, dst: &Path) -> Result<()> {
        let dst = if dst.is_dir() {
            match src.file_name() {
                Some(name) => dst.join(name),
                None => dst.to_path_buf(),
            }
        } else {
            dst.to_path_buf()
        };
        fs::copy(src, dst)?;
        Ok(())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        let root = match (dst.is_dir(), src.file_name()) {
            (true, Some(name)) => dst.join(name),
            _ => dst.to_path_buf(),
        };

        // Directory modes are applied after their contents are in place,
        // deepest first, so read-only source directories can still be filled
        let mut dir_modes = Vec::new();
        for entry in WalkDir::new(src) {
            let entry = entry?;
            let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
            let target = root.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
                dir_modes.push((target, entry.metadata()?.permissions()));
            } else if file_type.is_symlink() {
                std::os::unix::fs::symlink(fs::read_link(entry.path())?, &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }

        for (dir, permissions) in dir_modes.into_iter().rev() {
            fs::set_permissions(dir, permissions)?;
        }
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32, recursive: bool) -> Result<()> {
        if !recursive {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
            return Ok(());
        }

        // Collect first so tightening a directory's mode does not stop the walk
        let entries = WalkDir::new(path)
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for entry in entries {
            if entry.depth() > 0 && entry.path_is_symlink() {
                continue;
            }
            fs::set_permissions(entry.path(), fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    }
}
