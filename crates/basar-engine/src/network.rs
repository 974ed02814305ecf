//! Network (retail chain) resolution for raw records.
//!
//! Identity signals are tried from most to least trusted:
//!
//! 1. the record's explicit `network` field;
//! 2. a network alias appearing in the `source` text;
//! 3. a chain barcode prefix appearing in the `source` text;
//! 4. the first entry of a `networks_available` list;
//! 5. aliases or barcode prefixes in the name of the input document;
//! 6. otherwise [`NetworkId::UNKNOWN`].
//!
//! Explicit names (steps 1 and 4) must equal a network id or alias. Free
//! text (steps 2, 3 and 5) uses case-insensitive substring matching, checked
//! network by network in knowledge-table order, so the first configured
//! network wins when a source mentions several.

use basar_core::{Knowledge, NetworkId, RawProductRecord};
use serde_json::Value;

/// Which signal produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    ExplicitField,
    SourceAlias,
    SourceBarcode,
    NetworksAvailable,
    Origin,
    Unresolved,
}

#[derive(Debug, Clone)]
struct NetworkRule {
    id: NetworkId,
    /// Lowercased; includes the id itself.
    aliases: Vec<String>,
    barcode_prefixes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NetworkResolver {
    rules: Vec<NetworkRule>,
}

impl NetworkResolver {
    #[must_use]
    pub fn from_knowledge(knowledge: &Knowledge) -> Self {
        let rules = knowledge
            .networks
            .iter()
            .map(|network| {
                let mut aliases = vec![network.id.to_lowercase()];
                aliases.extend(
                    network
                        .aliases
                        .iter()
                        .map(|a| a.trim().to_lowercase())
                        .filter(|a| !a.is_empty()),
                );
                NetworkRule {
                    id: network.network_id(),
                    aliases,
                    barcode_prefixes: network.barcode_prefixes.clone(),
                }
            })
            .collect();
        Self { rules }
    }

    /// Resolves a record's network, falling back to `unknown`.
    #[must_use]
    pub fn resolve(&self, record: &RawProductRecord) -> NetworkId {
        self.resolve_with_reason(record).0
    }

    #[must_use]
    pub fn resolve_with_reason(&self, record: &RawProductRecord) -> (NetworkId, ResolvedBy) {
        if let Some(id) = record.network.as_deref().and_then(|n| self.canonicalize(n)) {
            return (id, ResolvedBy::ExplicitField);
        }

        if let Some(source) = record.source.as_deref() {
            let source = source.to_lowercase();
            if let Some(id) = self.match_alias(&source) {
                return (id, ResolvedBy::SourceAlias);
            }
            if let Some(id) = self.match_barcode(&source) {
                return (id, ResolvedBy::SourceBarcode);
            }
        }

        if let Some(id) = record
            .field("networks_available")
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(Value::as_str)
            .and_then(|n| self.canonicalize(n))
        {
            return (id, ResolvedBy::NetworksAvailable);
        }

        if let Some(origin) = record.origin.as_deref() {
            let origin = origin.to_lowercase();
            if let Some(id) = self
                .match_alias(&origin)
                .or_else(|| self.match_barcode(&origin))
            {
                return (id, ResolvedBy::Origin);
            }
        }

        (NetworkId::unknown(), ResolvedBy::Unresolved)
    }

    /// Maps an explicitly named network onto a configured id.
    ///
    /// Only whole-value matches count: the id itself or an alias equal to the
    /// trimmed, lowercased value. Blank values and the `unknown` sentinel
    /// return `None`. Anything else is kept as a lowercase snake_case id.
    fn canonicalize(&self, raw: &str) -> Option<NetworkId> {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if let Some(id) = self.match_exact(&lowered) {
            return Some(id);
        }

        let slug = lowered
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace('-', "_");
        if slug == NetworkId::UNKNOWN {
            return None;
        }
        Some(self.match_exact(&slug).unwrap_or_else(|| NetworkId::new(&slug)))
    }

    fn match_exact(&self, value: &str) -> Option<NetworkId> {
        self.rules
            .iter()
            .find(|rule| rule.aliases.iter().any(|alias| alias == value))
            .map(|rule| rule.id.clone())
    }

    fn match_alias(&self, text: &str) -> Option<NetworkId> {
        self.rules
            .iter()
            .find(|rule| rule.aliases.iter().any(|alias| text.contains(alias.as_str())))
            .map(|rule| rule.id.clone())
    }

    fn match_barcode(&self, text: &str) -> Option<NetworkId> {
        self.rules
            .iter()
            .find(|rule| {
                rule.barcode_prefixes
                    .iter()
                    .any(|prefix| text.contains(prefix.as_str()))
            })
            .map(|rule| rule.id.clone())
    }
}
