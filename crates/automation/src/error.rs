// ---------------------------------------------------------------------------
// HostError: failures reported by host calls made from the controllers
// ---------------------------------------------------------------------------

use std::fmt;

use bevy::prelude::Entity;

use crate::host::RegionId;

/// Errors a host call can report back to an automation controller.
///
/// None of these ever reach the player. Controllers log them and treat the
/// affected action as skipped for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// The tower entity no longer exists (demolished, or a stale id).
    TowerMissing(Entity),
    /// The region is not owned by the player (or no longer exists).
    RegionMissing(RegionId),
    /// The treasury cannot cover a charge.
    InsufficientGold { needed: i64, available: i64 },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::TowerMissing(tower) => write!(f, "tower {tower} no longer exists"),
            HostError::RegionMissing(region) => write!(f, "region {region} is not owned"),
            HostError::InsufficientGold { needed, available } => {
                write!(f, "insufficient gold: needed {needed}, have {available}")
            }
        }
    }
}

impl std::error::Error for HostError {}
