//! Certificate service - on-demand eligibility checks

use std::sync::Arc;

use crate::certificate::{check_eligibility, CertificateEligibility};
use crate::error::EngineError;
use crate::graph::ResourceGraph;

/// Certificate service
///
/// Thin wrapper over [`check_eligibility`]; reads the completion log
/// directly through the graph rather than through a built navigation,
/// since the leaf set it needs is the required subset only.
pub struct CertificateService {
    graph: Arc<dyn ResourceGraph>,
}

impl CertificateService {
    /// Create a new certificate service
    pub fn new(graph: Arc<dyn ResourceGraph>) -> Self {
        Self { graph }
    }

    /// Evaluate certificate eligibility for a root resource and user
    pub fn check_eligibility(
        &self,
        root_id: &str,
        user_id: &str,
    ) -> Result<CertificateEligibility, EngineError> {
        check_eligibility(self.graph.as_ref(), root_id, user_id)
    }
}
