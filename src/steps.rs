use crate::error::{ReportError, Result};
use crate::schema::{Step, StepId, StepStatus};
use serde::{Deserialize, Serialize};

/// Ordered catalog of the report steps and their current status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRegistry {
    pub fn new() -> Self {
        Self {
            steps: StepId::ALL.into_iter().map(Step::pending).collect(),
        }
    }

    pub fn list_steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn status(&self, id: StepId) -> Option<StepStatus> {
        self.get(id).map(|s| s.status)
    }

    /// Overwrite one step's status, leaving the others untouched.
    pub fn set_status(&mut self, id: StepId, status: StepStatus) -> Result<()> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ReportError::UnknownStep(id.to_string()))?;
        step.status = status;
        Ok(())
    }

    pub fn running(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Running)
            .map(|s| s.id)
    }

    pub fn count_with(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}
