//! Ordered regex rewrites over a consensus line.

use std::sync::OnceLock;

use regex::Regex;

struct Rewrite {
    pattern: Regex,
    replacement: &'static str,
}

/// The rewrite order matters: gap removal feeds the whitespace rules, and
/// whitespace compression feeds the punctuation rules.
fn rewrites() -> &'static [Rewrite] {
    static REWRITES: OnceLock<Vec<Rewrite>> = OnceLock::new();
    REWRITES.get_or_init(|| {
        [
            // Remove alignment gaps
            ("\u{22C4}", ""),
            // Underscores are almost always misread rules or creases
            ("_", " "),
            // A trademark sign is a misread double quote
            ("\u{2122}", "\""),
            // Remove space before trailing punctuation: "x ," -> "x,"
            (r"(\S)\s+([;:.,°\)\]\}])", "$1$2"),
            // Compress runs of whitespace
            (r"\s\s+", " "),
            // A capital followed by stray punctuation is an initial: "L'" -> "L."
            (r"(\p{L}\s\p{Lu})\p{Po}", "$1."),
            // Space out ampersands
            (r"(\w)&", "$1 &"),
            (r"&(\w)", "& $1"),
            // Runs of dots
            (r"\.\.+", "."),
            // Dots misread as colons
            ("::", ".:"),
            // Two single quotes are one double quote
            (r"['`]['`]", "\""),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Rewrite {
            pattern: Regex::new(pattern).expect("static rewrite pattern"),
            replacement,
        })
        .collect()
    })
}

/// An `@` with a digit on each side is a misread zero. The neighbor checks
/// are zero-width, so every `@` in a run like `1@2@3` qualifies against the
/// original digits and the whole run normalizes.
fn zero_between_digits(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut fixed = String::with_capacity(line.len());
    for (at, &ch) in chars.iter().enumerate() {
        let misread = ch == '@'
            && at > 0
            && chars[at - 1].is_ascii_digit()
            && chars.get(at + 1).is_some_and(|c| c.is_ascii_digit());
        fixed.push(if misread { '0' } else { ch });
    }
    fixed
}

/// Apply the rewrites to one line, in order.
pub fn substitute(line: &str) -> String {
    let mut line = line.to_string();
    for rewrite in rewrites() {
        if let std::borrow::Cow::Owned(replaced) =
            rewrite.pattern.replace_all(&line, rewrite.replacement)
        {
            line = replaced;
        }
    }
    let line = zero_between_digits(&line);
    // October spelled with a zero
    line.replace("0ct", "Oct")
}
