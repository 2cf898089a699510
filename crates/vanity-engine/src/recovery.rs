//! Shared validation and recovery policy for attachment registries.
//!
//! Failures fall into four families, all recovered locally and never
//! surfaced to players:
//!
//! - transient entity failure (entity removed/invalidated mid-tick):
//!   detach, recreate on a scheduled delay;
//! - structural desync (passenger or leash binding lost or wrong): repair
//!   in place, falling back to detach + scheduled recreate;
//! - config resolution failure (unknown id, malformed visuals): attach is
//!   a no-op;
//! - displacement desync (teleport or large jump): always detach, recreate
//!   only if the equipment source-of-truth still reports the cosmetic at
//!   the scheduled task's execution tick.

use vanity_world::Location;

/// Squared displacement beyond which incremental correction is unsafe
/// (10 blocks).
pub const DISPLACEMENT_THRESHOLD_SQ: f32 = 100.0;

/// What a per-tick validation pass decided for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Everything checks out; apply the steady-state visual update.
    Keep,
    /// The attachment must not exist (entity gone, player offline, or
    /// equipment no longer reports it). Tear down, do not recreate.
    Detach,
    /// The attachment is stale after a discontinuity. Tear down and
    /// schedule a recreate from the then-current equipment.
    DetachAndRecreate,
}

/// Inputs to the ordered validation chain.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentCheck {
    pub entity_valid: bool,
    pub player_online: bool,
    pub equipment_matches: bool,
    pub displaced: bool,
}

/// Evaluate the checks in order.
///
/// An offline player or absent equipment means the attachment must not
/// exist at all. A dead entity while the equipment still reports the
/// cosmetic is a transient failure: tear down and recreate on a delay, as
/// with displacement. Structural-binding repair is registry-specific and
/// runs after a `Keep` verdict.
pub fn evaluate(check: AttachmentCheck) -> RecoveryAction {
    if !check.player_online {
        return RecoveryAction::Detach;
    }
    if !check.equipment_matches {
        return RecoveryAction::Detach;
    }
    if !check.entity_valid {
        return RecoveryAction::DetachAndRecreate;
    }
    if check.displaced {
        return RecoveryAction::DetachAndRecreate;
    }
    RecoveryAction::Keep
}

/// Teleport/large-jump detection against the last observed baseline.
/// A world change is always a desync.
pub fn displacement_desync(last: &Location, current: &Location) -> bool {
    last.world != current.world || current.distance_squared(last) > DISPLACEMENT_THRESHOLD_SQ
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanity_world::WorldId;

    fn ok_check() -> AttachmentCheck {
        AttachmentCheck {
            entity_valid: true,
            player_online: true,
            equipment_matches: true,
            displaced: false,
        }
    }

    #[test]
    fn all_good_keeps() {
        assert_eq!(evaluate(ok_check()), RecoveryAction::Keep);
    }

    #[test]
    fn dead_entity_with_live_equipment_recreates() {
        let check = AttachmentCheck {
            entity_valid: false,
            ..ok_check()
        };
        assert_eq!(evaluate(check), RecoveryAction::DetachAndRecreate);
    }

    #[test]
    fn offline_player_detaches_without_recreate() {
        let check = AttachmentCheck {
            player_online: false,
            entity_valid: false,
            equipment_matches: false,
            ..ok_check()
        };
        assert_eq!(evaluate(check), RecoveryAction::Detach);
    }

    #[test]
    fn missing_equipment_detaches_without_recreate() {
        let check = AttachmentCheck {
            equipment_matches: false,
            displaced: true,
            ..ok_check()
        };
        // Equipment truth wins over displacement: no recreate when the
        // cosmetic is gone.
        assert_eq!(evaluate(check), RecoveryAction::Detach);
    }

    #[test]
    fn displacement_recreates() {
        let check = AttachmentCheck {
            displaced: true,
            ..ok_check()
        };
        assert_eq!(evaluate(check), RecoveryAction::DetachAndRecreate);
    }

    #[test]
    fn ten_block_threshold() {
        let base = Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0);
        let near = Location::new(WorldId::OVERWORLD, 0.0, 64.0, 9.9);
        let far = Location::new(WorldId::OVERWORLD, 0.0, 64.0, 10.1);
        assert!(!displacement_desync(&base, &near));
        assert!(displacement_desync(&base, &far));
    }

    #[test]
    fn world_change_is_desync() {
        let base = Location::new(WorldId(0), 0.0, 64.0, 0.0);
        let other = Location::new(WorldId(1), 0.0, 64.0, 0.0);
        assert!(displacement_desync(&base, &other));
    }
}
