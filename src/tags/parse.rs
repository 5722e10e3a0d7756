//! Override-tag tokenization.
//!
//! A `{...}` block is scanned into raw commands: the name runs from a
//! backslash to the next `(` or backslash, an optional parenthesized
//! parameter list is split on commas — unless a backslash appears first, in
//! which case the whole remainder is one parameter (this is what lets a
//! `\t(...)` body carry nested tags with commas). Tags whose argument is
//! glued to the name (`\1c&HFF&`, `\fs20`) get the suffix peeled off into a
//! parameter by longest-prefix matching, in a fixed order where e.g. `blur`
//! must win over `bord`, `be` and `b`.

/// One raw override command as scanned from a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RawTag {
    pub cmd: String,
    pub params: Vec<String>,
}

/// Scan a block's text (braces excluded) into raw tags.
pub(crate) fn scan_tags(block: &str) -> Vec<RawTag> {
    let chars: Vec<char> = block.chars().collect();
    let mut out = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        let mut cmd = String::new();
        while j < chars.len() && chars[j] != '(' && chars[j] != '\\' {
            cmd.push(chars[j]);
            j += 1;
        }
        let cmd = cmd.trim().to_owned();

        if cmd.is_empty() {
            i = j.max(i + 1);
            continue;
        }

        let mut params = Vec::new();
        if j < chars.len() && chars[j] == '(' {
            j += 1;
            let mut inner = String::new();
            while j < chars.len() && chars[j] != ')' {
                inner.push(chars[j]);
                j += 1;
            }
            if j < chars.len() {
                j += 1;
            }
            split_params(inner.trim(), &mut params);
        }

        out.push(RawTag { cmd, params });
        i = j.max(i + 1);
    }

    out
}

fn split_params(mut param: &str, out: &mut Vec<String>) {
    while !param.is_empty() {
        let comma = param.find(',');
        let backslash = param.find('\\');

        match comma {
            Some(c) if backslash.is_none_or(|b| c < b) => {
                let s = param[..c].trim();
                if !s.is_empty() {
                    out.push(s.to_owned());
                }
                param = param.get(c + 1..).unwrap_or("");
            }
            _ => {
                // A backslash glues the rest together: nested tags keep
                // their own commas.
                let s = param.trim();
                if !s.is_empty() {
                    out.push(s.to_owned());
                }
                return;
            }
        }
    }
}

/// Split a glued argument off the command name.
///
/// Returns `false` for names no rule matches; the caller counts those and
/// skips them. Matching is ordered longest-prefix-first within each family.
pub(crate) fn peel(tag: &mut RawTag) -> bool {
    // (prefix, strip &H from the suffix)
    const RULES: &[(&str, bool)] = &[
        ("1c", true),
        ("2c", true),
        ("3c", true),
        ("4c", true),
        ("1a", true),
        ("2a", true),
        ("3a", true),
        ("4a", true),
        ("alpha", true),
        ("an", false),
        ("a", false),
        ("blur", false),
        ("bord", false),
        ("be", false),
        ("b", false),
        ("clip", false),
        ("c", true),
        ("fade", false),
        ("fe", false),
        ("fn", false),
        ("frx", false),
        ("fry", false),
        ("frz", false),
        ("fax", false),
        ("fay", false),
        ("fr", false),
        ("fscx", false),
        ("fscy", false),
        ("fsc", false),
        ("fsp", false),
        ("fs", false),
        ("i", false),
        ("kt", false),
        ("kf", false),
        ("ko", false),
        ("k", false),
        ("K", false),
        ("move", false),
        ("org", false),
        ("pbo", false),
        ("pos", false),
        ("p", false),
        ("q", false),
        ("r", false),
        ("shad", false),
        ("s", false),
        ("t", false),
        ("u", false),
        ("xbord", false),
        ("xshad", false),
        ("ybord", false),
        ("yshad", false),
    ];

    for &(prefix, strip_hex) in RULES {
        if let Some(suffix) = tag.cmd.strip_prefix(prefix) {
            // Tags whose arguments always come parenthesized keep their
            // name whole; nothing to peel.
            if !matches!(
                prefix,
                "clip" | "fade" | "move" | "org" | "pos" | "t"
            ) {
                let suffix = if strip_hex {
                    suffix.trim_matches(['&', 'H'])
                } else {
                    suffix
                };
                if !suffix.is_empty() {
                    tag.params.push(suffix.to_owned());
                }
                tag.cmd.truncate(prefix.len());
            }
            return true;
        }
    }

    false
}

#[cfg(test)]
#[path = "../../tests/unit/tags/parse.rs"]
mod tests;
