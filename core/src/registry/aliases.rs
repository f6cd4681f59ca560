//! # ALIAS TABLE
//!
//! **PURPOSE**: Stores alias edges exactly as registered, alongside a derived
//! `alias -> terminal key` map used on every lookup.
//! **GUARANTEE**: Both maps stay consistent after every batch, including a
//! batch that fails part-way through.

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::errors::{RegistryError, RegistryResult};

#[derive(Debug, Default)]
pub(crate) struct AliasTable {
    /// Edges as registered. Never rewritten except when an alias is redefined.
    aliases: HashMap<String, String>,

    /// Alias to terminal key. A terminal is never itself a key of `aliases`.
    resolved: HashMap<String, String>,
}

impl AliasTable {
    /// Terminal key for `key`, or `key` itself when it is not an alias.
    pub(crate) fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.resolved.get(key).map_or(key, String::as_str)
    }

    pub(crate) fn is_alias(&self, key: &str) -> bool {
        self.aliases.contains_key(key)
    }

    pub(crate) fn target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.aliases.len()
    }

    /// **APPLY AN ALIAS BATCH**
    ///
    /// **PARAMETERS**:
    /// - `batch` - Edges in registration order
    /// - `first` - Whether the owning registry has never been configured
    /// - `ensure_vacant` - Rejects alias keys that already hold an instance
    ///
    /// Edges are committed one at a time. On failure, edges committed before
    /// the failing one stay registered and resolved; the failing edge is not.
    pub(crate) fn configure<F>(
        &mut self,
        batch: &[(String, String)],
        first: bool,
        mut ensure_vacant: F,
    ) -> RegistryResult<()>
    where
        F: FnMut(&str) -> RegistryResult<()>,
    {
        let intersecting = is_intersecting(batch);
        let redefining = batch.iter().any(|(alias, _)| self.is_alias(alias));
        let full = first || intersecting || redefining;

        let mut added = Vec::with_capacity(batch.len());
        let mut outcome = Ok(());
        for (alias, target) in batch {
            if let Err(err) = ensure_vacant(alias).and_then(|()| self.register_edge(alias, target)) {
                outcome = Err(err);
                break;
            }
            added.push(alias.clone());
        }

        if added.is_empty() {
            return outcome;
        }

        if full {
            trace!("Recomputing all {} alias resolutions", self.len());
            let names: Vec<String> = self.aliases.keys().cloned().collect();
            self.resolve_aliases(&names)?;
        } else {
            self.resolve_aliases(&added)?;
            self.redirect_terminals(&added);
        }

        outcome
    }

    /// Maps every name in `names` to the end of its chain.
    pub(crate) fn resolve_aliases(&mut self, names: &[String]) -> RegistryResult<()> {
        for name in names {
            let terminal = self.walk(name)?;
            self.resolved.insert(name.clone(), terminal);
        }
        Ok(())
    }

    /// Inserts one edge, rolling it back if it closes a cycle.
    fn register_edge(&mut self, alias: &str, target: &str) -> RegistryResult<()> {
        let previous = self.aliases.insert(alias.to_string(), target.to_string());

        if let Err(err) = self.walk(alias) {
            match previous {
                Some(previous) => self.aliases.insert(alias.to_string(), previous),
                None => self.aliases.remove(alias),
            };
            return Err(err);
        }

        Ok(())
    }

    /// Follows `aliases` from `alias` until a name that is not an alias.
    fn walk(&self, alias: &str) -> RegistryResult<String> {
        let mut visited = HashSet::new();
        let mut name = alias;

        while let Some(next) = self.aliases.get(name) {
            if !visited.insert(name) {
                return Err(RegistryError::cyclic_alias(name));
            }
            name = next.as_str();
        }

        Ok(name.to_string())
    }

    /// Existing resolutions that ended on a newly added alias now continue
    /// through it.
    fn redirect_terminals(&mut self, added: &[String]) {
        let added: HashSet<&str> = added.iter().map(String::as_str).collect();

        let updates: Vec<(String, String)> = self
            .resolved
            .iter()
            .filter(|(_, terminal)| added.contains(terminal.as_str()))
            .filter_map(|(alias, terminal)| {
                self.resolved
                    .get(terminal)
                    .map(|extended| (alias.clone(), extended.clone()))
            })
            .collect();

        for (alias, terminal) in updates {
            self.resolved.insert(alias, terminal);
        }
    }
}

/// A batch chains through itself when one of its aliases is also one of its targets.
fn is_intersecting(batch: &[(String, String)]) -> bool {
    let targets: HashSet<&str> = batch.iter().map(|(_, target)| target.as_str()).collect();
    batch.iter().any(|(alias, _)| targets.contains(alias.as_str()))
}
