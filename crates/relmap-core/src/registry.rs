//! Process-wide descriptor registry.
//!
//! The registry is the one shared mutable resource of the compiler: it
//! is read by any call site needing a type's physical shape and written
//! exactly once per type. It is an explicit instance constructed at
//! startup and passed to the orchestrator and to consumers; there is no
//! ambient global. Writes are all-or-nothing per type; readers never
//! observe partial state.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use relmap_model::MappingDescriptor;
use tracing::{debug, warn};

/// Per-type compilation state.
#[derive(Debug, Clone)]
enum EntryState {
    /// A worker has claimed the type and is compiling it.
    Compiling,
    /// The descriptor is published and immutable.
    Published(Arc<MappingDescriptor>),
    /// Compilation failed; the failure is terminal for this type.
    Failed(String),
}

/// Outcome of claiming a type for compilation.
#[derive(Debug, Clone)]
pub enum BeginOutcome {
    /// The type was unprocessed; the caller now holds the claim.
    Started,
    /// The type is already published; the cached descriptor is returned.
    AlreadyPublished(Arc<MappingDescriptor>),
    /// The type failed earlier; its failure reason is returned.
    AlreadyFailed(String),
    /// Another worker is compiling the type right now.
    InProgress,
}

/// Registry of compiled mapping descriptors keyed by type code.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    entries: DashMap<String, EntryState>,
}

impl DescriptorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a type for compilation, or report its current state.
    pub fn begin(&self, type_code: &str) -> BeginOutcome {
        match self.entries.entry(type_code.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(EntryState::Compiling);
                BeginOutcome::Started
            }
            Entry::Occupied(occupied) => match occupied.get() {
                EntryState::Compiling => BeginOutcome::InProgress,
                EntryState::Published(descriptor) => {
                    BeginOutcome::AlreadyPublished(descriptor.clone())
                }
                EntryState::Failed(reason) => BeginOutcome::AlreadyFailed(reason.clone()),
            },
        }
    }

    /// Publish a descriptor atomically.
    ///
    /// If another worker raced us to publication, our result is
    /// discarded and the first writer's descriptor is adopted.
    pub fn publish(
        &self,
        type_code: &str,
        descriptor: MappingDescriptor,
    ) -> Arc<MappingDescriptor> {
        match self.entries.entry(type_code.to_string()) {
            Entry::Occupied(mut occupied) => {
                if let EntryState::Published(existing) = occupied.get() {
                    warn!(type_code, "concurrent publish detected; adopting first result");
                    return existing.clone();
                }
                let published = Arc::new(descriptor);
                occupied.insert(EntryState::Published(published.clone()));
                debug!(type_code, "descriptor published");
                published
            }
            Entry::Vacant(vacant) => {
                let published = Arc::new(descriptor);
                vacant.insert(EntryState::Published(published.clone()));
                debug!(type_code, "descriptor published");
                published
            }
        }
    }

    /// Record a terminal compilation failure. A published descriptor is
    /// never overwritten.
    pub fn mark_failed(&self, type_code: &str, reason: impl Into<String>) {
        match self.entries.entry(type_code.to_string()) {
            Entry::Occupied(mut occupied) => {
                if matches!(occupied.get(), EntryState::Published(_)) {
                    return;
                }
                occupied.insert(EntryState::Failed(reason.into()));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(EntryState::Failed(reason.into()));
            }
        }
    }

    /// Get a published descriptor by type code.
    ///
    /// Types still compiling or failed are reported as not available.
    pub fn get_descriptor(&self, type_code: &str) -> Option<Arc<MappingDescriptor>> {
        self.entries.get(type_code).and_then(|entry| match entry.value() {
            EntryState::Published(descriptor) => Some(descriptor.clone()),
            _ => None,
        })
    }

    /// Check if a type has a published descriptor.
    pub fn is_compiled(&self, type_code: &str) -> bool {
        self.get_descriptor(type_code).is_some()
    }

    /// Type codes of all published descriptors, sorted.
    pub fn list_compiled_types(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| matches!(entry.value(), EntryState::Published(_)))
            .map(|entry| entry.key().clone())
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Number of published descriptors.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.value(), EntryState::Published(_)))
            .count()
    }

    /// Check if no descriptor has been published yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
