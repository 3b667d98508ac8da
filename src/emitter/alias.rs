//! Join-path aliases for one compile pass

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Symbol table from path prefix keys to join aliases
///
/// Create one per compile pass. Fresh aliases are `<root>_P<n>` with `n`
/// counting up from 1, skipping any name a forced alias already claims;
/// forced aliases are used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMapping {
    root_alias: String,
    aliases: BTreeMap<String, String>,
    forced: HashMap<String, String>,
    reused: BTreeSet<String>,
    last_index: usize,
}

impl AliasMapping {
    pub fn new(root_alias: impl Into<String>) -> Self {
        Self {
            root_alias: root_alias.into(),
            ..Default::default()
        }
    }

    /// Aliases the caller wants specific prefix keys to use
    pub fn with_forced(mut self, forced: HashMap<String, String>) -> Self {
        self.forced = forced;
        self
    }

    /// Record the prefix keys used by more than one term
    pub fn with_reused<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reused.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Alias already bound to a key in this pass
    pub fn get(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    pub fn is_reused(&self, key: &str) -> bool {
        self.reused.contains(key)
    }

    pub fn is_forced(&self, key: &str) -> bool {
        self.forced.contains_key(key)
    }

    /// Alias the caller forced for `key`, bound or not
    pub fn forced_alias(&self, key: &str) -> Option<String> {
        self.forced.get(key).cloned()
    }

    /// Whether rendering `key` the first time must bind an alias
    pub fn needs_alias(&self, key: &str) -> bool {
        self.is_forced(key) || self.is_reused(key)
    }

    /// The alias of `key`, binding a forced or fresh one on first use
    pub fn allocate(&mut self, key: &str) -> String {
        if let Some(alias) = self.aliases.get(key) {
            return alias.clone();
        }
        let alias = match self.forced.get(key) {
            Some(forced) => forced.clone(),
            None => self.mint(),
        };
        debug!(sourcekey = %key, alias = %alias, "allocated path alias");
        self.aliases.insert(key.to_string(), alias.clone());
        alias
    }

    /// Mint an alias that is not tied to any key
    pub fn allocate_anonymous(&mut self) -> String {
        self.mint()
    }

    fn mint(&mut self) -> String {
        loop {
            self.last_index += 1;
            let alias = format!("{}_P{}", self.root_alias, self.last_index);
            if !self.forced.values().any(|forced| *forced == alias) {
                return alias;
            }
        }
    }

    /// Bind `key` to an alias chosen by the caller; an existing binding wins
    pub fn bind(&mut self, key: &str, alias: &str) -> String {
        self.aliases
            .entry(key.to_string())
            .or_insert_with(|| alias.to_string())
            .clone()
    }

    /// Every key bound so far
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }
}
