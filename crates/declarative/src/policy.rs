//! Replacement policy - which attribute changes force a new resource
//!
//! The diff engine does not know any resource kind. Callers plug their
//! rules in through [`ReplacementClassifier`].

/// Classifier for attributes that cannot be updated in place
///
/// Implement this trait to define your replacement policy.
pub trait ReplacementClassifier: Send + Sync {
    /// Check if changing an attribute forces replacement of the resource
    ///
    /// # Arguments
    /// * `resource_type` - The kind of resource (e.g., "subnet", "instance")
    /// * `attribute` - The attribute that changed
    fn forces_replacement(&self, resource_type: &str, attribute: &str) -> bool;
}

/// Classifier that updates everything in place
pub struct NeverReplace;

impl ReplacementClassifier for NeverReplace {
    fn forces_replacement(&self, _resource_type: &str, _attribute: &str) -> bool {
        false
    }
}

/// Classifier that replaces on any change
pub struct AlwaysReplace;

impl ReplacementClassifier for AlwaysReplace {
    fn forces_replacement(&self, _resource_type: &str, _attribute: &str) -> bool {
        true
    }
}

impl<F> ReplacementClassifier for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn forces_replacement(&self, resource_type: &str, attribute: &str) -> bool {
        self(resource_type, attribute)
    }
}
