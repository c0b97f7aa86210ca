//! Deterministic naming for generated family/team tags.
//!
//! Tag identity survives a parent rename: callers rename the existing tag
//! rows to the new generated names instead of creating fresh tags, so
//! assignment history stays attached.

/// Role suffix of a generated tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedRole {
    Leader,
    Member,
    Head,
}

impl GeneratedRole {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Leader => "_LEADER",
            Self::Member => "_MEMBER",
            Self::Head => "_HEAD",
        }
    }
}

/// Normalizes a parent entity name for use in a tag name: uppercase,
/// with every run of non-alphanumeric characters collapsed to a single
/// underscore and stripped from the ends.
pub fn normalize_name(parent: &str) -> String {
    let mut out = String::with_capacity(parent.len());
    let mut pending_separator = false;

    for c in parent.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_uppercase());
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Builds the generated tag name for a parent entity and role.
pub fn generated_tag_name(parent: &str, role: GeneratedRole) -> String {
    format!("{}{}", normalize_name(parent), role.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(normalize_name("worship"), "WORSHIP");
        assert_eq!(normalize_name("Media Team"), "MEDIA_TEAM");
    }

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_name("grace -- house"), "GRACE_HOUSE");
        assert_eq!(normalize_name("a//b..c"), "A_B_C");
    }

    #[test]
    fn test_normalize_strips_edges() {
        assert_eq!(normalize_name("  ushering  "), "USHERING");
        assert_eq!(normalize_name("--x--"), "X");
    }

    #[test]
    fn test_generated_names_per_role() {
        assert_eq!(
            generated_tag_name("Media Team", GeneratedRole::Leader),
            "MEDIA_TEAM_LEADER"
        );
        assert_eq!(
            generated_tag_name("Media Team", GeneratedRole::Member),
            "MEDIA_TEAM_MEMBER"
        );
        assert_eq!(
            generated_tag_name("Grace House", GeneratedRole::Head),
            "GRACE_HOUSE_HEAD"
        );
    }

    #[test]
    fn test_rename_is_deterministic() {
        // Same input always yields the same name, so a rename maps old
        // generated names onto new ones one-to-one.
        assert_eq!(
            generated_tag_name("Faith Family", GeneratedRole::Head),
            generated_tag_name("Faith Family", GeneratedRole::Head)
        );
    }
}
