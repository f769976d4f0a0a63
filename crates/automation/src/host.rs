//! Host game state the automation observes and mutates.
//!
//! The economy, the invasion director and the building simulation all live in
//! the host game. This module only holds the slice of that state the two
//! controllers touch: the treasury, per-region tax rates, the hazard-pay
//! benefit and its warm-up, the chamber of war staffing, invasion status and
//! the defensive towers themselves.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use crate::error::HostError;

// =============================================================================
// Constants
// =============================================================================

/// Fixed simulation step of the host (10 Hz).
pub const HOST_TICK_MILLIS: u64 = 100;

/// Ticks the hazard-pay benefit spends warming up after activation.
pub const HAZARD_PAY_WARMUP_TICKS: u32 = 30;

// =============================================================================
// Regions and taxes
// =============================================================================

/// Identifier of a taxable landmass owned by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-region tax rates for every region the player owns.
///
/// Rates are fractions: `0.30` is a 30% tax rate.
#[derive(Resource, Debug, Clone, Default)]
pub struct TaxRates {
    rates: BTreeMap<RegionId, f32>,
}

impl TaxRates {
    /// Take ownership of a region with the given starting rate.
    pub fn claim(&mut self, region: RegionId, rate: f32) {
        self.rates.insert(region, rate);
    }

    /// Owned regions, in id order.
    pub fn owned(&self) -> Vec<RegionId> {
        self.rates.keys().copied().collect()
    }

    pub fn get(&self, region: RegionId) -> Result<f32, HostError> {
        self.rates
            .get(&region)
            .copied()
            .ok_or(HostError::RegionMissing(region))
    }

    pub fn set(&mut self, region: RegionId, rate: f32) -> Result<(), HostError> {
        let slot = self
            .rates
            .get_mut(&region)
            .ok_or(HostError::RegionMissing(region))?;
        *slot = rate;
        Ok(())
    }

    /// Drop a region (lost to the invaders, or abandoned).
    pub fn release(&mut self, region: RegionId) -> Option<f32> {
        self.rates.remove(&region)
    }
}

// =============================================================================
// Treasury and chamber of war
// =============================================================================

/// The player's gold.
#[derive(Resource, Debug, Clone, Default)]
pub struct Treasury {
    pub gold: i64,
}

impl Treasury {
    pub fn spend(&mut self, amount: i64) -> Result<(), HostError> {
        if self.gold < amount {
            return Err(HostError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }
}

/// The building that pays hazard pay. Only its staffing matters here.
#[derive(Resource, Debug, Clone, Default)]
pub struct ChamberOfWar {
    /// Fraction of worker slots filled (0.0-1.0).
    pub staffing: f32,
}

// =============================================================================
// Hazard pay
// =============================================================================

/// The hazard-pay wage boost.
///
/// Activating it starts a warm-up; the benefit counts as active for the whole
/// warm-up but only takes full effect once `warmup_ticks` reaches zero.
#[derive(Resource, Debug, Clone, Default)]
pub struct HazardPay {
    pub active: bool,
    pub warmup_ticks: u32,
}

impl HazardPay {
    pub fn activate(&mut self, warmup: bool) {
        self.active = true;
        self.warmup_ticks = if warmup { HAZARD_PAY_WARMUP_TICKS } else { 0 };
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.warmup_ticks = 0;
    }

    pub fn is_warming_up(&self) -> bool {
        self.warmup_ticks > 0
    }
}

/// Visual state of the hazard-pay toggle in the chamber of war panel.
#[derive(Resource, Debug, Clone, Default)]
pub struct HazardPayToggle {
    pub is_on: bool,
}

// =============================================================================
// Invasions
// =============================================================================

/// Invasion status as reported by the host's dragon and raider directors.
#[derive(Resource, Debug, Clone, Default)]
pub struct Invasion {
    /// Dragons currently alive over the realm.
    pub dragons: u32,
    /// Whether a raider siege is under way.
    pub raid_in_progress: bool,
}

impl Invasion {
    pub fn in_progress(&self) -> bool {
        self.dragons > 0 || self.raid_in_progress
    }
}

// =============================================================================
// Towers
// =============================================================================

/// Defensive building categories whose open/closed state gates targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TowerKind {
    Archer,
    Ballista,
    SiegeCauldron,
    Cannon,
}

impl TowerKind {
    /// All controlled kinds, in the order the host lists them.
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Archer,
        TowerKind::Ballista,
        TowerKind::SiegeCauldron,
        TowerKind::Cannon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TowerKind::Archer => "Archer Tower",
            TowerKind::Ballista => "Ballista",
            TowerKind::SiegeCauldron => "Siege Cauldron",
            TowerKind::Cannon => "Cannon",
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Tower {
    pub kind: TowerKind,
    pub open: bool,
}

impl Tower {
    pub fn new(kind: TowerKind, open: bool) -> Self {
        Self { kind, open }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Sent by the host whenever a game is loaded or a new one is started.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct NewGameEvent;

/// Player-facing feedback produced by the automation.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AutomationFeedback {
    /// Hazard pay was bought automatically (merchant sound cue).
    HazardPayPurchased { cost: i64 },
    /// A tower was opened or closed ("Open"/"Closed" text popup).
    TowerToggled { tower: Entity, open: bool },
}

// =============================================================================
// Systems
// =============================================================================

/// Counts the hazard-pay warm-up down by one tick.
pub fn advance_hazard_pay_warmup(mut hazard_pay: ResMut<HazardPay>) {
    if hazard_pay.warmup_ticks > 0 {
        hazard_pay.warmup_ticks -= 1;
        if hazard_pay.warmup_ticks == 0 {
            debug!("Hazard pay warm-up finished");
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_duration(
            std::time::Duration::from_millis(HOST_TICK_MILLIS),
        ))
        .init_resource::<TaxRates>()
        .init_resource::<Treasury>()
        .init_resource::<ChamberOfWar>()
        .init_resource::<HazardPay>()
        .init_resource::<HazardPayToggle>()
        .init_resource::<Invasion>()
        .add_event::<NewGameEvent>()
        .add_event::<AutomationFeedback>()
        .add_systems(
            FixedUpdate,
            advance_hazard_pay_warmup.in_set(crate::AutomationSet::Host),
        );
    }
}
