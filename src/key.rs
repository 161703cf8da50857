use std::fmt;

/// Joins the two key parts. Sanitized cells never contain it.
const KEY_SEPARATOR: char = '\u{1f}';

/// Cache identity of a company: normalized name plus jurisdiction code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn normalize(name: Option<&str>, jurisdiction: Option<&str>) -> Self {
        let name = name.unwrap_or_default().trim().to_lowercase();
        let jurisdiction = jurisdiction.unwrap_or_default().trim().to_lowercase();
        Self(format!("{name}{KEY_SEPARATOR}{jurisdiction}"))
    }

    /// True when both the name and the jurisdiction normalized to nothing.
    pub fn is_degenerate(&self) -> bool {
        self.0.len() == KEY_SEPARATOR.len_utf8()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, jurisdiction) = self
            .0
            .split_once(KEY_SEPARATOR)
            .unwrap_or((self.0.as_str(), ""));
        write!(f, "{name}/{jurisdiction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_entity_normalizes_to_same_key() {
        let a = EntityKey::normalize(Some("  Acme GmbH "), Some("DE"));
        let b = EntityKey::normalize(Some("acme gmbh"), Some(" de"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "acme gmbh/de");
    }

    #[test]
    fn jurisdiction_separates_entities() {
        let de = EntityKey::normalize(Some("Acme"), Some("DE"));
        let fr = EntityKey::normalize(Some("Acme"), Some("FR"));
        assert_ne!(de, fr);
    }

    #[test]
    fn separator_prevents_boundary_collisions() {
        let a = EntityKey::normalize(Some("ab"), Some("c"));
        let b = EntityKey::normalize(Some("a"), Some("bc"));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_parts_still_produce_a_key() {
        let name_only = EntityKey::normalize(Some("Acme"), None);
        assert!(!name_only.is_degenerate());

        let code_only = EntityKey::normalize(None, Some("US"));
        assert!(!code_only.is_degenerate());

        let nothing = EntityKey::normalize(Some("   "), None);
        assert!(nothing.is_degenerate());
        assert_eq!(nothing.as_str(), "\u{1f}");
    }
}
