//! Pluralization utilities.
//!
//! Besides the count helpers used in log lines, this derives collection
//! export names: `pages` from a `page` root, `Page` from `pages`.
//! Only regular English inflection plus a handful of common irregulars.

/// Return "s" suffix for plural counts
///
/// # Examples
///
/// - `plural_s(0)` -> `"s"` (0 files)
/// - `plural_s(1)` -> `""` (1 file)
/// - `plural_s(5)` -> `"s"` (5 files)
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// # Examples
///
/// - `plural_count(0, "file")` -> `"0 files"`
/// - `plural_count(1, "file")` -> `"1 file"`
/// - `plural_count(5, "entry")` -> `"5 entries"`
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {}", pluralize(noun))
    }
}

/// Words that do not change between singular and plural.
const UNCOUNTABLE: &[&str] = &[
    "content", "data", "docs", "equipment", "feedback", "info", "information", "media", "metadata",
    "news", "series", "software",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("index", "indices"),
    ("appendix", "appendices"),
    ("matrix", "matrices"),
    ("datum", "data"),
    ("criterion", "criteria"),
    ("leaf", "leaves"),
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Pluralize an English noun (the last word of `word`).
///
/// # Examples
///
/// - `pluralize("page")` -> `"pages"`
/// - `pluralize("category")` -> `"categories"`
/// - `pluralize("pages")` -> `"pages"`
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower.ends_with(plural) {
            return word.to_string();
        }
        if lower.ends_with(singular) {
            return replace_suffix(word, singular.len(), plural);
        }
    }
    if is_plural_form(&lower) {
        return word.to_string();
    }

    let mut rev = lower.chars().rev();
    let last = rev.next().unwrap_or_default();
    let before = rev.next().unwrap_or_default();

    if last == 'y' && !is_vowel(before) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if lower.ends_with("ss")
        || lower.ends_with("sh")
        || lower.ends_with("ch")
        || last == 'x'
        || last == 'z'
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singularize an English noun (the last word of `word`).
///
/// # Examples
///
/// - `singularize("Pages")` -> `"Page"`
/// - `singularize("Categories")` -> `"Category"`
/// - `singularize("Boxes")` -> `"Box"`
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower.ends_with(plural) {
            return replace_suffix(word, plural.len(), singular);
        }
    }
    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if lower.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') && lower.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Uppercase the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_plural_form(lower: &str) -> bool {
    lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && !lower.ends_with("is")
}

/// Replace the last `len` bytes of `word`, keeping the leading capital.
fn replace_suffix(word: &str, len: usize, with: &str) -> String {
    let stem = &word[..word.len() - len];
    let tail = &word[word.len() - len..];
    if tail.starts_with(|c: char| c.is_ascii_uppercase()) {
        format!("{stem}{}", capitalize(with))
    } else {
        format!("{stem}{with}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "file"), "1 file");
        assert_eq!(plural_count(5, "file"), "5 files");
        assert_eq!(plural_count(2, "entry"), "2 entries");
    }

    #[test]
    fn test_pluralize_regular() {
        assert_eq!(pluralize("page"), "pages");
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
    }

    #[test]
    fn test_pluralize_already_plural() {
        assert_eq!(pluralize("pages"), "pages");
        assert_eq!(pluralize("people"), "people");
        assert_eq!(pluralize("docs"), "docs");
    }

    #[test]
    fn test_pluralize_irregular() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("index"), "indices");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("Pages"), "Page");
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("Boxes"), "Box");
        assert_eq!(singularize("People"), "Person");
        assert_eq!(singularize("Docs"), "Docs");
        assert_eq!(singularize("BlogPosts"), "BlogPost");
        assert_eq!(singularize("Status"), "Status");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("pages"), "Pages");
        assert_eq!(capitalize(""), "");
    }
}
