/// Strip a leading beatmap-set id such as `311328 ` from a folder or file name.
///
/// Removes every leading run of ASCII digits together with the separators
/// (whitespace, `.`, `_`, `-`) that follow it. A name that would become empty is
/// returned unchanged, which keeps the function idempotent.
pub fn strip_leading_numeric_prefix(name: &str) -> &str {
    let mut rest = name;
    loop {
        let candidate = rest.trim_start();
        let after_digits = candidate.trim_start_matches(|c: char| c.is_ascii_digit());
        if after_digits.len() == candidate.len() {
            break;
        }
        rest = after_digits.trim_start_matches(is_separator);
    }

    if rest.is_empty() { name } else { rest }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '_' | '-')
}
