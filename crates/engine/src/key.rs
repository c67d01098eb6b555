use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque chat identifier: a numeric id from a database or a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatKey {
    Id(i64),
    Name(String),
}

impl fmt::Display for ChatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ChatKey {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ChatKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Integers parse as ids, anything else is a name.
impl FromStr for ChatKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>().map_or_else(|_| Self::from(s), Self::Id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_ids_and_names() {
        assert_eq!("42".parse::<ChatKey>().unwrap(), ChatKey::Id(42));
        assert_eq!(" -3 ".parse::<ChatKey>().unwrap(), ChatKey::Id(-3));
        assert_eq!(
            "project-notes".parse::<ChatKey>().unwrap(),
            ChatKey::Name("project-notes".to_string())
        );
    }

    #[test]
    fn ids_and_names_are_distinct_keys() {
        assert_ne!(ChatKey::from(7), ChatKey::from("7"));
        assert_eq!(ChatKey::from(7).to_string(), ChatKey::from("7").to_string());
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&ChatKey::from(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&ChatKey::from("work")).unwrap(),
            "\"work\""
        );
        let key: ChatKey = serde_json::from_str("12").unwrap();
        assert_eq!(key, ChatKey::Id(12));
    }
}
