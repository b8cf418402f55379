//! Query decoding for virtual module identifiers
//!
//! A virtual module identifier is `<directoryPath>?<queryString>`. The query
//! is a flat string of ampersand-separated tokens: a bare token sets a flag,
//! `key=v1,v2,...` sets an ordered list. Recognized keys are `lazy`, `ext`
//! and `extg`; unknown keys are preserved but otherwise ignored.

use crate::config::Dir2jsonConfig;

/// Default image extensions, used when the query selects no filter
pub const DEFAULT_IMAGE_EXTS: &[&str] = &[
    ".apng", ".png", ".jpg", ".jpeg", ".jfig", ".pjepg", ".pjp", ".gif", ".svg", ".ico", ".avif",
];

/// Default media extensions, used when the query selects no filter
pub const DEFAULT_MEDIA_EXTS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".mp3", ".wav", ".flac", ".aac", ".opus", ".mov",
];

/// Value of one query key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Bare token (`lazy`)
    Flag,
    /// `key=v1,v2,...` token
    List(Vec<String>),
}

/// Decoded query string
///
/// Entries keep decode order; a repeated key keeps its first position but the
/// last occurrence's value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    /// Decode a flat query string
    pub fn decode(query: &str) -> Self {
        let mut entries: Vec<(String, QueryValue)> = Vec::new();
        for token in query.split('&').filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once('=') {
                Some((key, values)) => {
                    let list = values
                        .split(',')
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect();
                    (key, QueryValue::List(list))
                }
                None => (token, QueryValue::Flag),
            };
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = value,
                None => entries.push((key.to_string(), value)),
            }
        }
        Self { entries }
    }

    /// Whether a key is present (as a flag or with values)
    pub fn flag(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The list value of a key, if any
    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.entries.iter().find_map(|(k, v)| match v {
            QueryValue::List(list) if k == key => Some(list.as_slice()),
            _ => None,
        })
    }

    /// Whether lazy (deferred import) mode is requested
    pub fn lazy(&self) -> bool {
        self.flag("lazy")
    }

    /// Explicit extension list (overrides groups and defaults)
    pub fn ext(&self) -> Option<&[String]> {
        self.list("ext")
    }

    /// Named extension groups to resolve against the host config
    pub fn extg(&self) -> Option<&[String]> {
        self.list("extg")
    }

    /// Stable textual form, used for module identity
    pub fn normalized(&self) -> String {
        let tokens: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| match value {
                QueryValue::Flag => key.clone(),
                QueryValue::List(list) => format!("{}={}", key, list.join(",")),
            })
            .collect();
        tokens.join("&")
    }

    /// Compute the effective extension filter for one build
    ///
    /// Precedence: explicit `ext` list, then concatenated `extg` groups
    /// (unknown group names resolve to nothing), then the built-in defaults.
    pub fn effective_ext_filter(&self, config: &Dir2jsonConfig) -> Vec<String> {
        if let Some(ext) = self.ext() {
            return ext.to_vec();
        }
        if let Some(groups) = self.extg() {
            let mut filter = Vec::new();
            for name in groups {
                if let Some(exts) = config.ext_group(name) {
                    filter.extend(exts.iter().cloned());
                }
            }
            return filter;
        }
        default_ext_filter()
    }
}

/// The built-in default extension filter (common image/media extensions)
pub fn default_ext_filter() -> Vec<String> {
    DEFAULT_IMAGE_EXTS
        .iter()
        .chain(DEFAULT_MEDIA_EXTS)
        .map(|e| e.to_string())
        .collect()
}
