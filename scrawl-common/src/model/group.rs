use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::Display;
use thiserror::Error;

pub const SLUG_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct GroupMarker;

/// A named category posts can be filed under. Groups are managed
/// administratively, the service only ever reads them.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Group {
    pub id: Id<GroupMarker>,
    pub title: String,
    pub slug: Slug,
    pub description: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The group slug is invalid: {0:?}")]
pub struct InvalidSlugError(String);

impl Slug {
    pub fn new(slug: String) -> Result<Self, InvalidSlugError> {
        let len = slug.chars().count();
        if len >= 1 && len <= SLUG_MAX_LEN {
            Ok(Slug(slug))
        } else {
            Err(InvalidSlugError(slug))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.title, f)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Slug::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Slug"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::group::{Group, SLUG_MAX_LEN, Slug};

    #[test]
    fn slug_bounds() {
        assert!(Slug::new(String::new()).is_err());
        assert!(Slug::new("a".repeat(SLUG_MAX_LEN + 1)).is_err());
        assert!(Slug::new("test_slug".to_owned()).is_ok());
    }

    #[test]
    fn group_displays_title() {
        let group = Group {
            id: 1.into(),
            title: "Test group".to_owned(),
            slug: Slug::new("test_slug".to_owned()).unwrap(),
            description: String::new(),
        };

        assert_eq!(group.to_string(), "Test group");
    }
}
