//! Compiler orchestration.
//!
//! The orchestrator drives one type from declaration to published
//! descriptor and coordinates with the registry so that each type is
//! compiled at most once. Resolution only reads declarations, never
//! compiled descriptors, so mutually referencing types compile
//! independently in any order.

use std::sync::Arc;

use relmap_model::{DeclarationSet, MappingDescriptor};
use tracing::{debug, instrument, warn};

use crate::builder::build_descriptor;
use crate::error::CompileError;
use crate::registry::{BeginOutcome, DescriptorRegistry};

/// Mapping compiler over a validated declaration set.
#[derive(Debug)]
pub struct Compiler {
    declarations: DeclarationSet,
    registry: Arc<DescriptorRegistry>,
}

/// Outcome of a whole-set compilation pass.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Type codes published during this pass or earlier, sorted.
    pub published: Vec<String>,
    /// Types that failed, with the error that stopped each one.
    pub failed: Vec<(String, CompileError)>,
}

impl CompileReport {
    /// Treat any failure as fatal for the whole pass. The first failure
    /// in pass order wins.
    pub fn into_result(self) -> Result<Vec<String>, CompileError> {
        if let Some((type_code, error)) = self.failed.into_iter().next() {
            warn!(%type_code, %error, "compilation pass failed");
            return Err(error);
        }
        Ok(self.published)
    }
}

impl Compiler {
    /// Create a compiler over a declaration set, validating it up front.
    ///
    /// Validation rejects dangling super type references and hierarchy
    /// cycles before any per-type work starts.
    pub fn new(declarations: DeclarationSet) -> Result<Self, CompileError> {
        declarations.validate()?;
        Ok(Self {
            declarations,
            registry: Arc::new(DescriptorRegistry::new()),
        })
    }

    /// Create a compiler that publishes into an existing registry.
    pub fn with_registry(
        declarations: DeclarationSet,
        registry: Arc<DescriptorRegistry>,
    ) -> Result<Self, CompileError> {
        declarations.validate()?;
        Ok(Self {
            declarations,
            registry,
        })
    }

    /// The registry this compiler publishes into.
    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    /// The declaration set this compiler reads from.
    pub fn declarations(&self) -> &DeclarationSet {
        &self.declarations
    }

    /// Compile one type and publish its descriptor.
    ///
    /// Repeated calls for the same type return the cached descriptor.
    /// A failed type stays failed; retrying returns the recorded error.
    #[instrument(skip(self))]
    pub fn compile(&self, type_code: &str) -> Result<Arc<MappingDescriptor>, CompileError> {
        match self.registry.begin(type_code) {
            BeginOutcome::AlreadyPublished(descriptor) => {
                debug!(type_code, "descriptor already published");
                return Ok(descriptor);
            }
            BeginOutcome::AlreadyFailed(reason) => {
                return Err(CompileError::CompilationFailed {
                    type_code: type_code.to_string(),
                    reason,
                });
            }
            BeginOutcome::InProgress => {
                // Another worker holds the claim. Building is pure over
                // the declaration set, so we build redundantly and let
                // the registry adopt whichever result lands first.
                warn!(type_code, "type already being compiled; building redundantly");
            }
            BeginOutcome::Started => {}
        }

        match build_descriptor(&self.declarations, type_code) {
            Ok(built) => {
                for conflict in &built.warnings {
                    warn!(type_code, %conflict, "unique flag conflict");
                }
                Ok(self.registry.publish(type_code, built.descriptor))
            }
            Err(error) => {
                self.registry.mark_failed(type_code, error.to_string());
                Err(error)
            }
        }
    }

    /// Compile every persistable type in the set, in sorted order.
    ///
    /// Failures are collected per type; one bad declaration does not
    /// stop the rest of the pass.
    pub fn compile_all(&self) -> CompileReport {
        let mut report = CompileReport::default();
        for type_code in self.declarations.persistable_codes() {
            match self.compile(type_code) {
                Ok(_) => report.published.push(type_code.to_string()),
                Err(error) => report.failed.push((type_code.to_string(), error)),
            }
        }
        report
    }
}
