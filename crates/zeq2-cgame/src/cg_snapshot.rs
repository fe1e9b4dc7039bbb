// cg_snapshot.rs -- things that happen on snapshot transition,
// not necessarily every single rendered frame
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::collections::VecDeque;

use zeq2_common::bg_misc::bg_player_state_to_entity_state;
use zeq2_common::bg_public::*;

use crate::cg_local::*;

/// Far enough in the past that the next fade tail always starts over.
const TRAIL_HISTORY_DISCARDED: i32 = i32::MIN / 2;

/// CG_ResetEntity
fn cg_reset_entity(cent: &mut CEntity, snap_server_time: i32) {
    cent.trail_time = snap_server_time;
    cent.last_trail_time = TRAIL_HISTORY_DISCARDED;

    cent.lerp_origin = cent.current_state.origin;
    cent.lerp_angles = cent.current_state.angles;
}

/// CG_TransitionEntity -- cent->nextState is moved to cent->currentState and
/// events are fired. Returns true when the entity was reset.
fn cg_transition_entity(cent: &mut CEntity, snap_server_time: i32) -> bool {
    cent.current_state = cent.next_state.clone();
    cent.current_valid = true;

    // reset if the entity wasn't in the last frame or was teleported
    let reset = !cent.interpolate;
    if reset {
        cg_reset_entity(cent, snap_server_time);
    }

    // clear the next state.  if will be set by the next CG_SetNextSnap
    cent.interpolate = false;
    reset
}

/// CG_SetInitialSnapshot -- this will only happen on the very first snapshot,
/// or on tourney restarts. All other times will use CG_TransitionSnapshot
/// instead.
pub fn cg_set_initial_snapshot(cg: &mut CgState, snap: Snapshot) {
    tracing::debug!(server_time = snap.server_time, entities = snap.entities.len(), "initial snapshot");

    let view_num = snap.ps.client_num;
    let ps_state = bg_player_state_to_entity_state(&snap.ps, false);
    if let Some(cent) = cg.entity_mut(view_num) {
        cent.current_state = ps_state;
    }
    cg.predicted_player_state = snap.ps.clone();

    for state in &snap.entities {
        let Some(cent) = cg.entity_mut(state.number) else {
            tracing::warn!(number = state.number, "snapshot entity number out of range");
            continue;
        };

        cent.current_state = state.clone();
        cent.interpolate = false;
        cent.current_valid = true;
        cent.snap_shot_time = snap.server_time;

        cg_reset_entity(cent, snap.server_time);
        cg.beam_tables.reset(state.number);
    }

    cg.snap = Some(snap);
    cg.next_snap = None;
}

/// CG_SetNextSnap -- a new snapshot has just been read in by the client
/// system.
pub fn cg_set_next_snap(cg: &mut CgState, snap: Snapshot) {
    let Some(cur) = cg.snap.as_ref() else {
        // nothing to interpolate from yet
        cg_set_initial_snapshot(cg, snap);
        return;
    };

    // if the next frame is a teleport for the playerstate, we
    // can't interpolate during demos
    let mut teleport = (snap.ps.e_flags ^ cur.ps.e_flags).contains(EntityFlags::TELEPORT_BIT);

    // if changing follow mode, don't interpolate
    if snap.ps.client_num != cur.ps.client_num {
        teleport = true;
    }

    // if changing server restarts, don't interpolate
    if (snap.snap_flags ^ cur.snap_flags) & SNAPFLAG_SERVERCOUNT != 0 {
        teleport = true;
    }
    cg.next_frame_teleport = teleport;

    let ps_state = bg_player_state_to_entity_state(&snap.ps, false);
    if let Some(cent) = cg.entity_mut(snap.ps.client_num) {
        cent.next_state = ps_state;
        cent.interpolate = !teleport;
    }

    let view_num = snap.ps.client_num;
    for es in &snap.entities {
        let Some(cent) = cg.entity_mut(es.number) else {
            tracing::warn!(number = es.number, "snapshot entity number out of range");
            continue;
        };

        cent.next_state = es.clone();

        // if this frame is a teleport, or the entity wasn't in the
        // previous frame, don't interpolate
        let toggled = (cent.current_state.e_flags ^ es.e_flags).contains(EntityFlags::TELEPORT_BIT);
        cent.interpolate = cent.current_valid && !toggled && !(teleport && es.number == view_num);
    }

    cg.next_snap = Some(snap);
}

/// CG_TransitionSnapshot -- the transition point from snap to nextSnap
/// has passed.
pub fn cg_transition_snapshot(cg: &mut CgState) {
    let Some(next) = cg.next_snap.take() else {
        tracing::error!("transition snapshot without a next snapshot");
        return;
    };

    // clear the currentValid flag for all entities in the existing snapshot
    if let Some(old) = cg.snap.take() {
        for es in &old.entities {
            if let Some(cent) = cg.entity_mut(es.number) {
                cent.current_valid = false;
            }
        }
    }

    cg.this_frame_teleport = cg.next_frame_teleport;
    cg.next_frame_teleport = false;

    let ps_state = bg_player_state_to_entity_state(&next.ps, false);
    if let Some(cent) = cg.entity_mut(next.ps.client_num) {
        cent.current_state = ps_state;
        cent.interpolate = false;
    }
    cg.predicted_player_state = next.ps.clone();

    for es in &next.entities {
        let Some(cent) = cg.entity_mut(es.number) else {
            continue;
        };
        let reset = cg_transition_entity(cent, next.server_time);

        // remember time of snapshot this entity was last updated in
        cent.snap_shot_time = next.server_time;

        // bend points recorded before a teleport or a reuse are stale
        if reset {
            cg.beam_tables.reset(es.number);
        }
    }

    cg.snap = Some(next);
}

/// CG_ProcessSnapshots -- consume queued snapshots until `cg.time` is
/// bracketed by the current and next ones, or the queue runs dry.
pub fn cg_process_snapshots(cg: &mut CgState, pending: &mut VecDeque<Snapshot>) {
    if cg.snap.is_none() {
        match pending.pop_front() {
            Some(snap) => cg_set_initial_snapshot(cg, snap),
            None => return,
        }
    }

    loop {
        let snap_time = cg.snap.as_ref().map_or(0, |s| s.server_time);

        if cg.next_snap.is_none() {
            let Some(snap) = pending.pop_front() else {
                break;
            };
            if snap.server_time < snap_time {
                tracing::warn!(server_time = snap.server_time, snap_time, "server time went backwards, dropping snapshot");
                continue;
            }
            cg_set_next_snap(cg, snap);
        }

        let next_time = cg.next_snap.as_ref().map_or(i32::MAX, |s| s.server_time);

        // if our time is < nextFrame's, we have a nice interpolating state
        if cg.time >= snap_time && cg.time < next_time {
            break;
        }
        if cg.time < snap_time {
            break;
        }

        // we have passed the transition from nextFrame to frame
        cg_transition_snapshot(cg);
    }

    // never render a time before the current snapshot
    if let Some(snap) = cg.snap.as_ref() {
        if cg.time < snap.server_time {
            cg.time = snap.server_time;
        }
    }
}
