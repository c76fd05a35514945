//! Symbolic rendering of Unix permission bits

use std::os::unix::fs::MetadataExt;
use std::path::Path;

const S_IFMT: u32 = 0o170_000;
const S_IFSOCK: u32 = 0o140_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFREG: u32 = 0o100_000;
const S_IFBLK: u32 = 0o060_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFCHR: u32 = 0o020_000;
const S_IFIFO: u32 = 0o010_000;

/// Render a raw `st_mode` the way `ls -l` does, e.g. `drwxr-xr-x`
pub fn filemode(mode: u32) -> String {
    let kind = match mode & S_IFMT {
        S_IFDIR => 'd',
        S_IFLNK => 'l',
        S_IFREG => '-',
        S_IFCHR => 'c',
        S_IFBLK => 'b',
        S_IFIFO => 'p',
        S_IFSOCK => 's',
        _ => '?',
    };

    let mut out = String::with_capacity(10);
    out.push(kind);
    // (read, write, execute, special bit, special char when executable, when not)
    let triads = [
        (0o400, 0o200, 0o100, 0o4000, 's', 'S'),
        (0o040, 0o020, 0o010, 0o2000, 's', 'S'),
        (0o004, 0o002, 0o001, 0o1000, 't', 'T'),
    ];
    for (r, w, x, special, set_exec, set_plain) in triads {
        out.push(if mode & r != 0 { 'r' } else { '-' });
        out.push(if mode & w != 0 { 'w' } else { '-' });
        out.push(match (mode & x != 0, mode & special != 0) {
            (true, true) => set_exec,
            (false, true) => set_plain,
            (true, false) => 'x',
            (false, false) => '-',
        });
    }
    out
}

/// Permission string of an existing path, following symlinks
pub(crate) fn path_mode(path: &Path) -> Option<String> {
    std::fs::metadata(path).ok().map(|m| filemode(m.mode()))
}
