// Extension list normalization

use crate::domain::{CapabilityRef, ExtensionSpec};
use std::collections::HashSet;

/// Deduplicate extensions by capability
///
/// Migration prepends its entries, so for a given capability the entry
/// declared last in the list wins (explicit user entries beat migrated
/// ones). Surviving entries keep their relative order.
pub fn normalize_extensions(extensions: Vec<ExtensionSpec>) -> Vec<ExtensionSpec> {
    let mut seen: HashSet<CapabilityRef> = HashSet::with_capacity(extensions.len());
    let mut kept: Vec<ExtensionSpec> = extensions
        .into_iter()
        .rev()
        .filter(|spec| seen.insert(spec.capability.clone()))
        .collect();
    kept.reverse();
    kept
}
