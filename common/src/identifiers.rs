use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(UserId);
string_id!(PlayerId);
string_id!(EntryId);
string_id!(SessionToken);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_conversion() {
        let id = PlayerId::new("active-1");
        assert_eq!(id.to_string(), "active-1");
        assert_eq!(id.as_str(), "active-1");
        let raw: String = id.into();
        assert_eq!(raw, "active-1");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let value = serde_yaml_ng::to_string(&UserId::new("user-7")).unwrap();
        assert_eq!(value.trim(), "user-7");
    }
}
