use unicode_normalization::UnicodeNormalization;

/// Canonicalize extracted document text.
///
/// Applies NFKC, turns every whitespace run (newlines and tabs included) into
/// a single space and trims both ends. Pure and idempotent; empty input gives
/// empty output.
pub fn normalize(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();

    let mut out = String::with_capacity(composed.len());
    for word in composed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Canonicalize a target name: trim, then NFKC.
///
/// Names are short single-line tokens, so inner whitespace is left alone.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfkc().collect()
}
