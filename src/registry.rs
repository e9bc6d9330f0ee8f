//! Type-keyed storage of rulesets.
//!
//! The registry is populated during configuration and read-only afterwards;
//! lookups match the record type exactly, with no fallback. Both the generic
//! `register`/`find` pair and the internal downcast are checked by the
//! compiler, so a successful lookup always hands back a ruleset of the
//! requested type.

use std::{
    any::{Any, TypeId, type_name},
    collections::{HashMap, hash_map::Entry},
};

use log::{debug, warn};

use crate::{error::SerializationError, rule::Ruleset};

/// Maps record types to their [`Ruleset`]s.
///
/// # Examples
///
/// ```
/// use separated_text_rs::{
///     registry::RulesetRegistry,
///     rule::{Ruleset, Separator},
/// };
///
/// #[derive(Default)]
/// struct Order {
///     id: i64,
/// }
///
/// let mut registry = RulesetRegistry::new();
/// registry.register(Ruleset::<Order>::new().with_separator(Separator::Pipe));
///
/// assert!(registry.find::<Order>().is_ok());
/// assert!(registry.find::<String>().is_err());
/// ```
#[derive(Default)]
pub struct RulesetRegistry {
    rulesets: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RulesetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the ruleset for `T`.
    ///
    /// The first registration for a type wins; later duplicates are dropped
    /// with a warning.
    pub fn register<T: 'static>(&mut self, ruleset: Ruleset<T>) {
        match self.rulesets.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => {
                warn!(
                    "ignoring duplicate ruleset for type {}, the first registration wins",
                    type_name::<T>()
                );
            }
            Entry::Vacant(slot) => {
                debug!("registered ruleset for type {}", type_name::<T>());
                slot.insert(Box::new(ruleset));
            }
        }
    }

    /// Looks up the ruleset for `T` by exact type identity.
    pub fn find<T: 'static>(&self) -> Result<&Ruleset<T>, SerializationError> {
        self.rulesets
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Ruleset<T>>())
            .ok_or_else(|| {
                SerializationError::Configuration(format!(
                    "no ruleset registered for type {}",
                    type_name::<T>()
                ))
            })
    }

    /// Number of registered rulesets.
    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }
}
