//! Catalog lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a container/catalog pair
///
/// `Uninitialized -> Registering -> Active -> ShutDown`. A failed
/// registration pass rolls `Registering` back to `Uninitialized`. `ShutDown`
/// is terminal: a new catalog must be built to register again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Nothing registered yet
    #[default]
    Uninitialized,
    /// The one-time registration pass is running
    Registering,
    /// Registration finished; services can be resolved
    Active,
    /// Caches cleared; terminal
    ShutDown,
}

impl LifecycleState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Registering)
                | (Self::Registering, Self::Active)
                | (Self::Registering, Self::Uninitialized)
                | (Self::Uninitialized, Self::ShutDown)
                | (Self::Registering, Self::ShutDown)
                | (Self::Active, Self::ShutDown)
        )
    }

    /// Compact integer encoding for atomic storage
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Registering => 1,
            Self::Active => 2,
            Self::ShutDown => 3,
        }
    }

    /// Inverse of [`LifecycleState::as_u8`]; unknown values map to `ShutDown`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Registering,
            2 => Self::Active,
            _ => Self::ShutDown,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Registering => "registering",
            Self::Active => "active",
            Self::ShutDown => "shut_down",
        };
        f.write_str(label)
    }
}
