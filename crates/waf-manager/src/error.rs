//! Lifecycle manager error types.

use std::fmt;

use thiserror::Error;
use waf_store::StoreError;

/// One store call of a deploy or delete sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateExtraBundle,
    CreateMainBundle,
    CreateProxy,
    DeleteExtraBundle,
    DeleteMainBundle,
    DeleteProxy,
}

impl Step {
    /// Prefix put in front of the store error when this step fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::CreateExtraBundle | Self::CreateMainBundle => "configmap creation failed",
            Self::CreateProxy => "proxy resource creation failed",
            Self::DeleteExtraBundle | Self::DeleteMainBundle => "configmap deletion failed",
            Self::DeleteProxy => "proxy resource deletion failed",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateExtraBundle => "create-extra-bundle",
            Self::CreateMainBundle => "create-main-bundle",
            Self::CreateProxy => "create-proxy",
            Self::DeleteExtraBundle => "delete-extra-bundle",
            Self::DeleteMainBundle => "delete-main-bundle",
            Self::DeleteProxy => "delete-proxy",
        };
        f.write_str(name)
    }
}

/// The step that aborted a deploy/delete and the store error it hit.
#[derive(Debug, Error)]
#[error("{}: {source}", .step.failure_message())]
pub struct ManagerError {
    step: Step,
    #[source]
    source: StoreError,
}

impl ManagerError {
    pub fn new(step: Step, source: StoreError) -> Self {
        Self { step, source }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn store_error(&self) -> &StoreError {
        &self.source
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
