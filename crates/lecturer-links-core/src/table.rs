use crate::error::{Result, RewriteError};
use std::collections::BTreeMap;

/// Roster shipped with the deployed site: display name and directory slug.
const BUILTIN_ROSTER: &[(&str, &str)] = &[
    ("Васильев Андрей Владимирович", "Васильев_Андрей_Владимирович"),
    ("Пригодич Никита Дмитриевич", "Пригодич_Никита_Дмитриевич"),
    ("Вычеров Дмитрий Александрович", "Вычеров_Дмитрий_Александрович"),
    ("Богомазов Николай Иванович", "Богомазов_Николай_Иванович"),
    ("Жиркова Галина Петровна", "Жиркова_Галина_Петровна"),
    ("Белоусов Александр Сергеевич", "Белоусов_Александр_Сергеевич"),
    ("Мунжукова Светлана Игоревна", "Мунжукова_Светлана_Игоревна"),
];

/// Immutable mapping from a lecturer's display name to the slug of their page directory.
///
/// Built once and shared by reference with every rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugTable {
    entries: BTreeMap<String, String>,
}

impl SlugTable {
    /// The roster compiled into the crate.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ROSTER
                .iter()
                .map(|(name, slug)| (name.to_string(), slug.to_string()))
                .collect(),
        }
    }

    /// Build a table from configured entries, rejecting empty names or slugs.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, slug) in entries {
            let name = name.into();
            let slug = slug.into();
            if name.is_empty() {
                return Err(RewriteError::InvalidTable(
                    "lecturer name must not be empty".to_string(),
                ));
            }
            if slug.is_empty() {
                return Err(RewriteError::InvalidTable(format!(
                    "slug for {name:?} must not be empty"
                )));
            }
            map.insert(name, slug);
        }
        Ok(Self { entries: map })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, slug)| (name.as_str(), slug.as_str()))
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }
}

impl Default for SlugTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster() {
        let table = SlugTable::builtin();
        assert_eq!(table.len(), 7);
        assert_eq!(
            table.get("Белоусов Александр Сергеевич"),
            Some("Белоусов_Александр_Сергеевич")
        );
        assert_eq!(table.get("Unknown Person"), None);
        assert_eq!(table.get(""), None);
    }

    #[test]
    fn test_from_entries_rejects_empty() {
        assert!(SlugTable::from_entries([("", "x")]).is_err());
        assert!(SlugTable::from_entries([("Name", "")]).is_err());

        let table = SlugTable::from_entries([("Иванов Иван", "Иванов_Иван")]).unwrap();
        assert_eq!(table.get("Иванов Иван"), Some("Иванов_Иван"));
        assert_eq!(table.iter().count(), 1);
    }
}
