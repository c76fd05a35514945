use anyhow::{Result, bail};
use clap::Subcommand;
use command_runner::{FileHelper, FileOps, MkdirOptions};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum FsCommand {
    /// Copy a file
    Copy {
        /// Source file
        src: PathBuf,
        /// Destination
        dst: PathBuf,
    },

    /// Copy a directory tree
    Copytree {
        /// Source directory
        src: PathBuf,
        /// Destination
        dst: PathBuf,
    },

    /// Create a directory and force its mode
    Mkdir {
        /// Octal mode
        #[arg(short, long, default_value = "755", value_parser = parse_mode)]
        mode: u32,
        /// Create missing parents
        #[arg(short, long)]
        parents: bool,
        /// Do not fail if the directory exists
        #[arg(long)]
        exist_ok: bool,
        /// Directory to create
        path: PathBuf,
    },

    /// Set permissions
    Chmod {
        /// Octal mode
        #[arg(short, long, default_value = "755", value_parser = parse_mode)]
        mode: u32,
        /// Only change the path itself
        #[arg(long)]
        no_recursive: bool,
        /// Path to change
        path: PathBuf,
    },

    /// Print the permission string of a path
    Perms {
        /// Path to inspect
        path: PathBuf,
    },

    /// Normalize permissions of a tree to 0755 directories and 0644 files
    ForceAccess {
        /// Make every entry 0755
        #[arg(long)]
        executable: bool,
        /// Root of the tree
        path: PathBuf,
    },
}

/// Parse an octal mode such as `755` or `0o700`
pub fn parse_mode(value: &str) -> std::result::Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(_) => Err(format!("mode out of range: {value}")),
        Err(_) => Err(format!("not an octal mode: {value}")),
    }
}

pub fn run<O: FileOps>(files: &FileHelper<O>, command: FsCommand) -> Result<()> {
    match command {
        FsCommand::Copy { src, dst } => files.safe_copy(src, dst)?,
        FsCommand::Copytree { src, dst } => files.safe_copytree(src, dst)?,
        FsCommand::Mkdir {
            mode,
            parents,
            exist_ok,
            path,
        } => files.safe_mkdir(path, mode, MkdirOptions { parents, exist_ok })?,
        FsCommand::Chmod {
            mode,
            no_recursive,
            path,
        } => files.chmod(path, mode, !no_recursive)?,
        FsCommand::Perms { path } => match files.file_permissions(&path) {
            Some(mode) => println!("{mode} {}", path.display()),
            None => bail!("{} does not exist", path.display()),
        },
        FsCommand::ForceAccess { executable, path } => files.mac_force_access_all(path, executable)?,
    }
    Ok(())
}
