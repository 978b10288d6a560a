//! Persisted session shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::MappingSet;
use crate::schema::MasterSchema;

/// Stage of a reconciliation session.
///
/// The numeric index is the `activeStep` stored in session files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    #[default]
    Idle,
    FilesSelected,
    MappingInProgress,
    Validated,
    Reconciled,
}

impl SessionStep {
    pub const ALL: [SessionStep; 5] = [
        Self::Idle,
        Self::FilesSelected,
        Self::MappingInProgress,
        Self::Validated,
        Self::Reconciled,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::FilesSelected => 1,
            Self::MappingInProgress => 2,
            Self::Validated => 3,
            Self::Reconciled => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::FilesSelected => "Files selected",
            Self::MappingInProgress => "Mapping in progress",
            Self::Validated => "Validated",
            Self::Reconciled => "Reconciled",
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialized session: `{ masterColumns, mappings, activeStep }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub master_columns: MasterSchema,
    #[serde(default)]
    pub mappings: MappingSet,
    #[serde(default)]
    pub active_step: usize,
}

impl SessionState {
    /// The stored step, falling back to [`SessionStep::Idle`] when out of range.
    pub fn step(&self) -> SessionStep {
        SessionStep::from_index(self.active_step).unwrap_or_default()
    }
}
