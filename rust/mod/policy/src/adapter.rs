use crate::error::PolicyError;
use crate::model::{Filter, PolicyModel};

/// Storage interface the policy engine drives.
///
/// `sec` is the model section (`"p"` or `"g"`); adapters store rules by
/// `ptype` alone and may ignore it.
pub trait Adapter: Send + Sync {
    /// Load every stored rule into the model.
    fn load_policy(&self, model: &mut PolicyModel) -> Result<(), PolicyError>;

    /// Replace the stored rules with the model's. `Ok(false)` means the store
    /// was cleared but not (fully) repopulated.
    fn save_policy(&self, model: &PolicyModel) -> Result<bool, PolicyError>;

    fn add_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> Result<(), PolicyError>;

    fn remove_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> Result<(), PolicyError>;

    fn add_policies(
        &self,
        sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> Result<(), PolicyError>;

    fn remove_policies(
        &self,
        sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> Result<(), PolicyError>;

    /// Remove rules whose values starting at `field_index` equal `field_values`.
    fn remove_filtered_policy(
        &self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<(), PolicyError>;
}

/// An adapter that can load a subset of the stored rules.
pub trait FilteredAdapter: Adapter {
    fn load_filtered_policy(
        &self,
        model: &mut PolicyModel,
        filter: &Filter,
    ) -> Result<(), PolicyError>;

    /// Whether the last load was filtered. Saving a filtered model would drop
    /// the rules that were not loaded.
    fn is_filtered(&self) -> bool;
}
