// Extension Domain Model

use super::option::{CapabilityRef, OptionSet, OptionValue};
use serde::Serialize;

/// An extension attached to a running instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionSpec {
    pub capability: CapabilityRef,
    pub options: OptionSet,
}

impl ExtensionSpec {
    pub fn new(capability: CapabilityRef, options: OptionSet) -> Self {
        Self {
            capability,
            options,
        }
    }

    /// Extension without options
    pub fn bare(capability: CapabilityRef) -> Self {
        Self::new(capability, OptionSet::new())
    }

    /// Same extension means same capability, options are not compared
    pub fn is_same_extension(&self, other: &ExtensionSpec) -> bool {
        self.capability == other.capability
    }
}

impl From<ExtensionSpec> for OptionValue {
    fn from(spec: ExtensionSpec) -> Self {
        OptionValue::extension(spec.capability, spec.options)
    }
}
