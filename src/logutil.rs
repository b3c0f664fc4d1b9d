//! Helpers for keeping operator-supplied text on a single log line.
//!
//! Sender names, command arguments and keys read from the limits file all
//! reach the audit log; none of them are trusted.

const MAX_PREVIEW: usize = 120;

/// Escape control characters (`\n`, `\r`, `\t`, backslash, anything else as
/// `\xNN`) and cut the result at a short preview length.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Command arguments as one escaped, space-separated string.
pub fn escape_args(args: &[&str]) -> String {
    args.iter()
        .map(|a| escape_log(a))
        .collect::<Vec<_>>()
        .join(" ")
}
