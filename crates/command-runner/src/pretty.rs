//! Human-readable command formatting for the log file

use std::ffi::OsStr;

const CONTINUATION: &str = " \\\n\t\t";

/// Format a command for logging, keeping `--flag value` pairs on one line.
///
/// The first token is emitted as-is. Every later token starts a new
/// shell-continuation line, unless the previous token was a flag and this
/// one is not, in which case it is joined to the flag with a space. A token
/// is a flag if it starts with `-`.
///
/// The output is meant for reading, not for re-execution.
pub fn pretty_string_cmd<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut tokens = tokens.into_iter();
    let Some(first) = tokens.next() else {
        return String::new();
    };

    let mut out = first.as_ref().to_string_lossy().into_owned();
    let mut pending_flag = false;
    for token in tokens {
        let token = token.as_ref().to_string_lossy();
        let is_flag = token.starts_with('-');
        if pending_flag && !is_flag {
            pending_flag = false;
            out.push(' ');
        } else {
            pending_flag |= is_flag;
            out.push_str(CONTINUATION);
        }
        out.push_str(&token);
    }
    out
}
