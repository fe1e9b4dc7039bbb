// bg_misc.rs -- both games misc functions, all completely stateless
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::f32::consts::PI;

use crate::bg_public::*;
use crate::q_shared::*;

// ============================================================
// Trajectory evaluation
// ============================================================

/// Seconds since the trajectory started, never negative.
fn elapsed_seconds(tr: &Trajectory, at_time: i32) -> f32 {
    at_time.saturating_sub(tr.tr_time).max(0) as f32 * 0.001
}

/// Seconds since the trajectory started, held at the stop time.
fn elapsed_seconds_until_stop(tr: &Trajectory, at_time: i32) -> f32 {
    let stop_time = tr.tr_time.saturating_add(tr.tr_duration);
    elapsed_seconds(tr, at_time.min(stop_time))
}

fn accel_direction(tr: &Trajectory) -> Vec3 {
    vector_normalize2(&tr.tr_delta).0
}

/// BG_EvaluateTrajectory -- position (or angles) of `tr` at `at_time`.
///
/// Pure in (tr, at_time). Times before `tr_time` evaluate to the start
/// state. The stop kinds freeze at `tr_time + tr_duration`, inclusive.
pub fn bg_evaluate_trajectory(tr: &Trajectory, at_time: i32) -> Vec3 {
    match tr.tr_type {
        TrType::Stationary | TrType::Interpolate => tr.tr_base,
        TrType::Linear => {
            let delta_time = elapsed_seconds(tr, at_time);
            vector_ma(&tr.tr_base, delta_time, &tr.tr_delta)
        }
        TrType::LinearStop => {
            let delta_time = elapsed_seconds_until_stop(tr, at_time);
            vector_ma(&tr.tr_base, delta_time, &tr.tr_delta)
        }
        TrType::NonLinearStop => {
            let delta_time = elapsed_seconds_until_stop(tr, at_time);
            let result = vector_ma(&tr.tr_base, delta_time, &tr.tr_delta);
            vector_ma(
                &result,
                0.5 * tr.tr_accel * delta_time * delta_time,
                &accel_direction(tr),
            )
        }
        TrType::Sine => {
            if tr.tr_duration <= 0 {
                return tr.tr_base;
            }
            let delta_time = at_time.saturating_sub(tr.tr_time).max(0) as f32 / tr.tr_duration as f32;
            let phase = (delta_time * PI * 2.0).sin();
            vector_ma(&tr.tr_base, phase, &tr.tr_delta)
        }
        TrType::Gravity => {
            let delta_time = elapsed_seconds(tr, at_time);
            let mut result = vector_ma(&tr.tr_base, delta_time, &tr.tr_delta);
            result[2] -= 0.5 * DEFAULT_GRAVITY * delta_time * delta_time; // FIXME: local gravity...
            result
        }
        TrType::Accel => {
            let delta_time = elapsed_seconds(tr, at_time);
            let result = vector_ma(&tr.tr_base, delta_time, &tr.tr_delta);
            vector_ma(
                &result,
                0.5 * tr.tr_accel * delta_time * delta_time,
                &accel_direction(tr),
            )
        }
    }
}

/// BG_EvaluateTrajectoryDelta -- instantaneous rate of change of `tr`
/// at `at_time`. For velocity based sound positioning.
pub fn bg_evaluate_trajectory_delta(tr: &Trajectory, at_time: i32) -> Vec3 {
    match tr.tr_type {
        TrType::Stationary | TrType::Interpolate => VEC3_ORIGIN,
        TrType::Linear => tr.tr_delta,
        TrType::LinearStop => {
            if at_time > tr.tr_time.saturating_add(tr.tr_duration) {
                return VEC3_ORIGIN;
            }
            tr.tr_delta
        }
        TrType::NonLinearStop => {
            if at_time > tr.tr_time.saturating_add(tr.tr_duration) {
                return VEC3_ORIGIN;
            }
            let delta_time = elapsed_seconds(tr, at_time);
            vector_ma(&tr.tr_delta, tr.tr_accel * delta_time, &accel_direction(tr))
        }
        TrType::Sine => {
            if tr.tr_duration <= 0 {
                return VEC3_ORIGIN;
            }
            let delta_time = at_time.saturating_sub(tr.tr_time).max(0) as f32 / tr.tr_duration as f32;
            let phase = (delta_time * PI * 2.0).cos() * 0.5;
            vector_scale(&tr.tr_delta, phase)
        }
        TrType::Gravity => {
            let delta_time = elapsed_seconds(tr, at_time);
            let mut result = tr.tr_delta;
            result[2] -= DEFAULT_GRAVITY * delta_time; // FIXME: local gravity...
            result
        }
        TrType::Accel => {
            let delta_time = elapsed_seconds(tr, at_time);
            vector_ma(&tr.tr_delta, tr.tr_accel * delta_time, &accel_direction(tr))
        }
    }
}

fn snap_vector(v: &Vec3) -> Vec3 {
    [v[0].trunc(), v[1].trunc(), v[2].trunc()]
}

/// BG_PlayerStateToEntityState -- this is done after each set of usercmd_t
/// on the server, and after local prediction on the client.
pub fn bg_player_state_to_entity_state(ps: &PlayerState, snap: bool) -> EntityState {
    let mut s = EntityState::default();

    s.e_type = if ps.pm_type == PmType::Intermission || ps.pm_type == PmType::Spectator {
        EntityType::Invisible as i32
    } else if ps.stats[STAT_HEALTH] <= GIB_HEALTH {
        EntityType::Invisible as i32
    } else {
        EntityType::Player as i32
    };

    s.number = ps.client_num;

    s.pos.tr_type = TrType::Interpolate;
    s.pos.tr_base = if snap { snap_vector(&ps.origin) } else { ps.origin };
    // set the tr_delta for flag direction
    s.pos.tr_delta = ps.velocity;

    s.apos.tr_type = TrType::Interpolate;
    s.apos.tr_base = if snap { snap_vector(&ps.viewangles) } else { ps.viewangles };

    s.angles2[YAW] = ps.movement_dir as f32;
    s.legs_anim = ps.legs_anim;
    s.torso_anim = ps.torso_anim;
    s.client_num = ps.client_num; // ET_PLAYER looks here instead of at number
                                  // so corpses can also reference the proper config
    s.e_flags = ps.e_flags;
    if ps.stats[STAT_HEALTH] <= 0 {
        s.e_flags |= EntityFlags::DEAD;
    } else {
        s.e_flags &= !EntityFlags::DEAD;
    }

    s.weapon = ps.weapon;
    s.ground_entity_num = ps.ground_entity_num;

    s.powerups = 0;
    for (i, &p) in ps.powerups.iter().enumerate() {
        if p != 0 {
            s.powerups |= 1 << i;
        }
    }

    s.loop_sound = ps.loop_sound;
    s.generic1 = ps.generic1;

    s
}
