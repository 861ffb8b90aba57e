use uuid::Uuid;

/// Derive a URL-safe slug from a product name: lowercase, spaces and
/// underscores become hyphens, everything outside `[a-z0-9-]` is dropped.
pub fn generate(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Disambiguate a colliding slug with a prefix of the new row's own id.
pub fn disambiguate(slug: &str, id: Uuid) -> String {
    let id = id.simple().to_string();
    format!("{slug}-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(
            generate("Lucknow White Chikankari Cotton Saree"),
            "lucknow-white-chikankari-cotton-saree"
        );
        assert_eq!(generate("Kasavu_Saree 2024"), "kasavu-saree-2024");
    }

    #[test]
    fn drops_characters_outside_the_allowed_set() {
        assert_eq!(generate("Banarasi (Pure Silk!)"), "banarasi-pure-silk");
        assert_eq!(generate("100% Cotton & Zari"), "100-cotton--zari");
    }

    #[test]
    fn suffix_comes_from_the_new_rows_own_id() {
        let id = Uuid::new_v4();
        let slug = disambiguate("kasavu-saree", id);
        assert!(slug.starts_with("kasavu-saree-"));
        assert!(id.simple().to_string().starts_with(&slug["kasavu-saree-".len()..]));
    }
}
