//! Tower automation.
//!
//! Opens every closed defensive tower when an invasion starts and closes the
//! same towers again once it is over. Towers the player had already opened are
//! left alone in both directions.

use bevy::prelude::*;

use crate::error::HostError;

// =============================================================================
// Host interface
// =============================================================================

/// Everything the tower controller reads from and does to the host.
pub trait TowerContext {
    fn invasion_active(&self) -> bool;
    fn feature_enabled(&self) -> bool;
    /// Every archer tower, ballista, siege cauldron and cannon with its open
    /// state, in a stable order.
    fn controlled_towers(&self) -> Vec<(Entity, bool)>;
    fn is_tower_open(&self, tower: Entity) -> Result<bool, HostError>;
    fn set_tower_open(&mut self, tower: Entity, open: bool) -> Result<(), HostError>;
    fn show_feedback(&mut self, tower: Entity, open: bool);
}

/// Open or close a single tower. A tower already in the requested state is
/// left untouched and produces no feedback. Returns whether anything changed.
pub fn open_close_tower(
    ctx: &mut impl TowerContext,
    tower: Entity,
    open: bool,
) -> Result<bool, HostError> {
    if ctx.is_tower_open(tower)? == open {
        return Ok(false);
    }
    ctx.set_tower_open(tower, open)?;
    ctx.show_feedback(tower, open);
    Ok(true)
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TowerPhase {
    #[default]
    Idle,
    /// Invasion under way; `opened_towers` holds what automation opened.
    Engaged,
}

impl TowerPhase {
    pub fn label(self) -> &'static str {
        match self {
            TowerPhase::Idle => "Idle",
            TowerPhase::Engaged => "Engaged",
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct TowerController {
    phase: TowerPhase,
    /// Towers opened by automation, in discovery order.
    opened_towers: Vec<Entity>,
}

impl TowerController {
    pub fn phase(&self) -> TowerPhase {
        self.phase
    }

    pub fn opened_towers(&self) -> &[Entity] {
        &self.opened_towers
    }

    pub fn reset(&mut self) {
        self.phase = TowerPhase::Idle;
        self.opened_towers.clear();
    }

    pub fn tick(&mut self, ctx: &mut impl TowerContext) {
        if !ctx.feature_enabled() {
            self.reset();
            return;
        }

        match self.phase {
            TowerPhase::Idle if ctx.invasion_active() => {
                self.open_towers(ctx);
                info!(
                    "Tower automation: invasion started, opened {} tower(s)",
                    self.opened_towers.len()
                );
                self.phase = TowerPhase::Engaged;
            }
            TowerPhase::Engaged if !ctx.invasion_active() => {
                self.close_towers(ctx);
                info!("Tower automation: invasion over, towers closed");
                self.phase = TowerPhase::Idle;
            }
            _ => {}
        }
    }

    /// Open every controlled tower. Manual override: not recorded, never
    /// reversed by automation.
    pub fn open_all(&self, ctx: &mut impl TowerContext) {
        set_all(ctx, true);
    }

    /// Close every controlled tower. Manual override, see [`Self::open_all`].
    pub fn close_all(&self, ctx: &mut impl TowerContext) {
        set_all(ctx, false);
    }

    fn open_towers(&mut self, ctx: &mut impl TowerContext) {
        for (tower, open) in ctx.controlled_towers() {
            if open {
                continue;
            }
            match open_close_tower(ctx, tower, true) {
                Ok(true) => self.opened_towers.push(tower),
                Ok(false) => {}
                Err(e) => warn!("Tower automation: could not open tower: {e}"),
            }
        }
    }

    fn close_towers(&mut self, ctx: &mut impl TowerContext) {
        for tower in std::mem::take(&mut self.opened_towers) {
            if let Err(e) = open_close_tower(ctx, tower, false) {
                warn!("Tower automation: could not close tower: {e}");
            }
        }
    }
}

fn set_all(ctx: &mut impl TowerContext, open: bool) {
    let mut changed = 0;
    for (tower, _) in ctx.controlled_towers() {
        match open_close_tower(ctx, tower, open) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(e) => warn!("Tower override: could not update tower: {e}"),
        }
    }
    info!(
        "Tower override: {} {changed} tower(s)",
        if open { "opened" } else { "closed" }
    );
}

// =============================================================================
// Unit Tests
// =============================================================================
