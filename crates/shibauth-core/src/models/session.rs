//! Identity attributes asserted by the upstream SSO agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute holding the asserted login (screen name or email).
pub const ATTR_LOGIN: &str = "login";
pub const ATTR_FIRST_NAME: &str = "firstname";
pub const ATTR_SURNAME: &str = "surname";
/// Comma-separated role names.
pub const ATTR_AFFILIATION: &str = "affiliation";

/// Read access to the raw attributes of an inbound session.
pub trait AttributeSource {
    fn attribute(&self, key: &str) -> Option<&str>;
}

/// A plain attribute bag, as handed over by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionAttributes(HashMap<String, String>);

impl SessionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AttributeSource for SessionAttributes {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
