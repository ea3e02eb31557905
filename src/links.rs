//! Wiki-link helpers
//!
//! Queue rows store bracketed wiki-links (`[[Note]]`, `[[Note#^block]]`).
//! Comparisons always go through the unbracketed form so that rows written
//! by hand and rows written by the engine dedup against each other.

/// Wrap a link target in `[[ ]]` if it isn't already.
pub fn add_brackets(link: &str) -> String {
    let mut link = link.to_string();
    if !link.starts_with("[[") {
        link = format!("[[{}", link);
    }
    if !link.ends_with("]]") {
        link = format!("{}]]", link);
    }
    link
}

/// Strip surrounding `[[ ]]` if present.
pub fn remove_brackets(link: &str) -> &str {
    let link = link.strip_prefix("[[").unwrap_or(link);
    link.strip_suffix("]]").unwrap_or(link)
}

/// Compare two links after bracket normalization.
pub fn links_match(a: &str, b: &str) -> bool {
    remove_brackets(a.trim()) == remove_brackets(b.trim())
}

/// The note part of a link, without any `#heading` or `#^block` suffix.
pub fn note_part(link: &str) -> &str {
    let link = remove_brackets(link);
    match link.find('#') {
        Some(idx) => &link[..idx],
        None => link,
    }
}

/// Append `.md` unless the name already ends with it.
pub fn with_md_extension(name: &str) -> String {
    if name.ends_with(".md") {
        name.to_string()
    } else {
        format!("{}.md", name)
    }
}
