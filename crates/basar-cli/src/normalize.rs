//! `normalize` command: show how product names reduce to matching keys.

use std::path::Path;

use basar_core::AppConfig;
use basar_engine::NameNormalizer;

use crate::unify::resolve_knowledge;

/// One tab-separated line per name: the name, its key, and whether the key
/// is long enough to be matched.
pub(crate) fn describe_keys(normalizer: &NameNormalizer, names: &[String], min_key_length: usize) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let key = normalizer.normalize(name);
            let status = if key.is_matchable(min_key_length) {
                "matchable"
            } else {
                "too-short"
            };
            format!("{name}\t{key}\t{status}")
        })
        .collect()
}

pub(crate) fn run_normalize(
    config: &AppConfig,
    knowledge_path: Option<&Path>,
    names: &[String],
) -> anyhow::Result<()> {
    let knowledge = resolve_knowledge(knowledge_path, config)?;
    let normalizer = NameNormalizer::from_knowledge(&knowledge);
    for line in describe_keys(&normalizer, names, config.min_key_length) {
        println!("{line}");
    }
    Ok(())
}
