//! Default display names derived from function identifiers.

/// Turn a function identifier into a display name.
///
/// Underscores become spaces and every word is title-cased: the first letter
/// after a non-letter is uppercased, the remaining letters are lowercased.
///
/// ```
/// use vidixy::node::normalize_name;
///
/// assert_eq!(normalize_name("load_rgb_image"), "Load Rgb Image");
/// assert_eq!(normalize_name("add"), "Add");
/// ```
pub fn normalize_name(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    let mut word_start = true;

    for c in identifier.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }

    out
}
