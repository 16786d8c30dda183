//! Object type to icon lookup.

pub const DEFAULT_ICON: &str = "standard:custom";

const OBJECT_ICONS: &[(&str, &str)] = &[
    ("Case", "standard:case"),
    ("Account", "standard:account"),
    ("Contact", "standard:contact"),
    ("Opportunity", "standard:opportunity"),
    ("Lead", "standard:lead"),
    ("Task", "standard:task"),
    ("Event", "standard:event"),
    ("Custom", "standard:custom"),
];

/// Read-only mapping from an object's schema (or display) name to an icon.
#[derive(Debug, Clone, Copy)]
pub struct IconTable {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for IconTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl IconTable {
    pub const fn standard() -> Self {
        Self {
            entries: OBJECT_ICONS,
        }
    }

    pub const fn with_entries(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, object_name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == object_name)
            .map(|(_, icon)| *icon)
    }

    /// First match among the candidates, else [`DEFAULT_ICON`].
    pub fn resolve<'a>(&self, candidates: impl IntoIterator<Item = Option<&'a str>>) -> &'static str {
        candidates
            .into_iter()
            .flatten()
            .find_map(|name| self.get(name))
            .unwrap_or(DEFAULT_ICON)
    }
}
