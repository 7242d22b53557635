//! Table-name conventions.
//!
//! A model's table defaults to the snake_case form of its type name —
//! the convention is case conversion only, no pluralization.

/// Converts a type-style name to its snake_case table form:
/// `BlogPost` -> `blog_post`.
pub fn tableize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// The conventional table name for a Rust type: the last path segment
/// of its name, snake-cased.
pub fn table_name_of<T>() -> String {
    let full = std::any::type_name::<T>();
    // Strip any generic arguments before taking the last path segment
    let base = full.split('<').next().unwrap_or(full);
    let base = base.rsplit("::").next().unwrap_or(base);
    tableize(base)
}
