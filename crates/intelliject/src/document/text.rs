//! Page text cleanup

/// Typographic glyphs that PDF text layers commonly emit, mapped to plain text
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{00A0}', " "),
];

/// Normalise raw page text: drop NUL bytes, expand ligatures and curly quotes,
/// trim trailing whitespace on each line and at the end of the page
pub fn clean_page_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\0' {
            continue;
        }
        match REPLACEMENTS.iter().find(|(glyph, _)| *glyph == c) {
            Some((_, plain)) => text.push_str(plain),
            None => text.push(c),
        }
    }

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
