//! Generator key grammar.
//!
//! A key is `base(.class)?(#id)?`. The base is an identifier
//! (`[A-Za-z_]\w*`) or an operator token such as `+` or `*`.

use crate::error::{Result, UGenError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BASE: &str = r"(?:[A-Za-z_]\w*|[-+*/%<=>!?&|^~]+)";
const SUFFIX: &str = r"(?:\.([A-Za-z_][\w-]*))?(?:#([A-Za-z_][\w-]*))?";

static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({BASE}){SUFFIX}$")).unwrap());
static QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({BASE})?{SUFFIX}$")).unwrap());
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"^{BASE}$")).unwrap());

/// A parsed generator key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub key: String,
    pub class: Option<String>,
    pub id: Option<String>,
}

/// Parse `base(.class)?(#id)?`.
pub fn parse(text: &str) -> Result<Selector> {
    let caps = KEY
        .captures(text)
        .ok_or_else(|| UGenError::InvalidKey(text.to_string()))?;

    Ok(Selector {
        key: caps[1].to_string(),
        class: caps.get(2).map(|m| m.as_str().to_string()),
        id: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

/// Whether `name` can be registered as a generator.
pub fn is_valid_ugen_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// A database lookup: any of key, class and id, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub key: Option<String>,
    pub class: Option<String>,
    pub id: Option<String>,
}

impl Query {
    /// Parse `key`, `.class`, `#id` or any combination. Returns `None` for
    /// malformed text.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = QUERY.captures(text)?;
        Some(Self {
            key: caps.get(1).map(|m| m.as_str().to_string()),
            class: caps.get(2).map(|m| m.as_str().to_string()),
            id: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        fn field(want: &Option<String>, have: Option<&str>) -> bool {
            match want {
                Some(want) => have == Some(want.as_str()),
                None => true,
            }
        }
        field(&self.key, Some(&selector.key))
            && field(&self.class, selector.class.as_deref())
            && field(&self.id, selector.id.as_deref())
    }
}
