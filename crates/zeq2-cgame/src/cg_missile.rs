// cg_missile.rs -- energy attacks in flight: bodies, beams and their trails
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::bg_misc::{bg_evaluate_trajectory, bg_evaluate_trajectory_delta};
use zeq2_common::bg_public::*;
use zeq2_common::q_shared::*;

use crate::cg_beamtables::cg_beam_table_update;
use crate::cg_local::*;
use crate::cg_localents::{LeType, LocalEntities};
use crate::cg_trails::{cg_reset_trail, cg_update_trail_head};
use crate::cg_view::{cg_draw_line, v_add_entity, v_add_light};
use crate::cg_weapongfx::UserWeaponGraphics;
use crate::tr_types::*;

/// Beam width used when a weapon does not set one.
const DEFAULT_BEAM_RADIUS: f32 = 10.0;

/// How long a spiral coil segment stays on screen.
pub const SPIRAL_SEGMENT_LIFE: i32 = 1000;
const SPIRAL_HEAD_LIFE: i32 = 500;

/// Extra slack before a fade tail counts as not drawn last frame.
const FADE_TAIL_RESET_SLACK: i32 = 200;

/// Scale of a missile charged to `charge_lvl` percent.
pub fn cg_missile_charge_scale(gfx: &UserWeaponGraphics, charge_lvl: i32) -> f32 {
    if !gfx.charge_growth {
        return 1.0;
    }

    // below the start, we use the lowest form
    if gfx.charge_start_pct >= charge_lvl {
        return gfx.charge_startsize;
    }

    // above the end, we use the highest form
    if gfx.charge_end_pct <= charge_lvl {
        return gfx.charge_endsize;
    }

    // inbetween, we work out the value
    let pct_range = (gfx.charge_end_pct - gfx.charge_start_pct) as f32;
    let pct_val = (charge_lvl - gfx.charge_start_pct) as f32;
    let size_range = gfx.charge_endsize - gfx.charge_startsize;

    gfx.charge_startsize + pct_val / pct_range * size_range
}

fn beam_radius(gfx: &UserWeaponGraphics) -> f32 {
    if gfx.missile_trail_radius != 0.0 {
        gfx.missile_trail_radius
    } else {
        DEFAULT_BEAM_RADIUS
    }
}

/// Where the owner's charge tag is this frame, if it can be resolved.
fn cg_beam_root(cent: &CEntity, gfx: &UserWeaponGraphics, env: &PresentEnv, out: &FrameSinks) -> Option<Vec3> {
    let owner = env.entity(cent.current_state.client_num)?;
    out.imports
        .player_tag_orientation(owner, gfx.charge_tag0())
        .map(|o| o.origin)
}

/// CG_TrailFunc_StraightBeam
fn cg_trail_func_straight_beam(cent: &CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let es = &cent.current_state;
    let gfx = env.cgs.weapon_graphics.find(es.client_num, es.weapon);

    if gfx.missile_trail_shader == 0 {
        return;
    }

    let Some(root) = cg_beam_root(cent, gfx, env, out) else {
        return;
    };

    cg_draw_line(out.view, &root, &cent.lerp_origin, beam_radius(gfx), gfx.missile_trail_shader, 1.0);
}

/// CG_TrailFunc_BendyBeam
fn cg_trail_func_bendy_beam(cent: &CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let es = &cent.current_state;
    let gfx = env.cgs.weapon_graphics.find(es.client_num, es.weapon);

    if gfx.missile_trail_shader == 0 {
        return;
    }

    let root = cg_beam_root(cent, gfx, env, out);
    cg_beam_table_update(
        out.beam_tables,
        es.number,
        &cent.lerp_origin,
        root,
        beam_radius(gfx),
        gfx.missile_trail_shader,
        env.fc.time,
    );
}

/// Point on the coil wound around a beam head's path at `time`.
fn cg_trail_func_spiral_beam_helper(es: &EntityState, gfx: &UserWeaponGraphics, time: i32) -> Vec3 {
    let origin = bg_evaluate_trajectory(&es.pos, time);

    let mut axis: Axis = [[0.0; 3]; 3];
    let (dir, len) = vector_normalize2(&es.pos.tr_delta);
    axis[0] = dir;
    if len == 0.0 {
        axis[0][2] = 1.0;
    }
    rotate_around_direction(&mut axis, time as f32 * 2.0);

    // upscale the offset of the coil to the main beam
    axis[2] = vector_scale(&axis[2], gfx.missile_trail_spiral_offset);

    vector_add(&origin, &axis[2])
}

fn cg_spawn_spiral_segment(les: &mut LocalEntities, start: i32, end: i32, shader: QHandle, from: &Vec3, to: &Vec3) {
    let le = les.alloc();
    le.le_type = LeType::FadeRgb;
    le.start_time = start;
    le.end_time = end;
    le.life_rate = 1.0 / (end - start) as f32;
    le.color = [1.0; 4];

    le.ref_entity = RefEntity {
        re_type: RefType::RailCore,
        custom_shader: shader,
        origin: *from,
        oldorigin: *to,
        axis: AXIS_DEFAULT,
        shader_rgba: [255; 4],
        ..Default::default()
    };
}

/// CG_TrailFunc_SpiralBeam -- the central beam plus a coil of short lived
/// segments covering the time since the last frame.
fn cg_trail_func_spiral_beam(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    // Draw the central beam
    cg_trail_func_straight_beam(cent, env, out);

    let time = env.fc.time;
    let gfx = env
        .cgs
        .weapon_graphics
        .find(cent.current_state.client_num, cent.current_state.weapon);

    if gfx.missile_trail_spiral_shader == 0 {
        return;
    }

    let mut start_time = cent.trail_time;
    cent.trail_time = time;

    let es = &cent.current_state;
    if es.pos.tr_type == TrType::Stationary {
        return;
    }

    // stale history would only produce already expired segments
    if start_time <= 0 || start_time > time {
        start_time = time;
    }
    start_time = start_time.max(time - SPIRAL_SEGMENT_LIFE);

    let step = ((env.fc.config.tail_detail / 4.0) as i32).max(1);
    let shader = gfx.missile_trail_spiral_shader;

    let mut last_pos = cg_trail_func_spiral_beam_helper(es, gfx, start_time);
    let mut t = start_time + step;
    while t <= time {
        let pos = cg_trail_func_spiral_beam_helper(es, gfx, t);
        cg_spawn_spiral_segment(out.local_entities, t, t + SPIRAL_SEGMENT_LIFE, shader, &last_pos, &pos);
        last_pos = pos;
        t += step;
    }

    // close the gap to the head
    let pos = cg_trail_func_spiral_beam_helper(es, gfx, time);
    cg_spawn_spiral_segment(out.local_entities, time, time + SPIRAL_HEAD_LIFE, shader, &last_pos, &pos);
}

/// CG_TrailFunc_FadeTail
fn cg_trail_func_fade_tail(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let fc = env.fc;
    let es = &cent.current_state;
    let gfx = env.cgs.weapon_graphics.find(es.client_num, es.weapon);

    if gfx.missile_trail_shader == 0 || gfx.missile_trail_radius == 0.0 {
        return;
    }

    // If we didn't draw the tail last frame this is a new instantiation
    // of the entity and we will have to reset the tail positions.
    if cent.last_trail_time < fc.time - fc.snapshot_interval - FADE_TAIL_RESET_SLACK {
        let velocity = bg_evaluate_trajectory_delta(&es.pos, fc.time);
        cg_reset_trail(
            out.trails,
            es.number,
            &cent.lerp_origin,
            vector_length(&velocity),
            gfx.missile_trail_radius,
            gfx.missile_trail_shader,
            None,
            fc.time,
        );
    }

    cg_update_trail_head(out.trails, es.number, &cent.lerp_origin, fc.time);
    cent.last_trail_time = fc.time;
}

/// CG_Torch -- torches carry only weapon graphics for now
pub fn cg_torch(cent: &CEntity, env: &PresentEnv) {
    let es = &cent.current_state;
    let gfx = env.cgs.weapon_graphics.find(es.client_num, es.weapon);
    tracing::trace!(number = es.number, model = gfx.missile_model, "torch");
}

/// CG_Missile
pub fn cg_missile(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let fc = env.fc;
    let number = cent.current_state.number;
    let client_num = cent.current_state.client_num;
    let e_type = cent.current_state.e_type;
    let guided = cent.current_state.e_flags.contains(EntityFlags::GUIDED);
    let gfx = env.cgs.weapon_graphics.find(client_num, cent.current_state.weapon);

    let missile_scale = cg_missile_charge_scale(gfx, cent.current_state.powerups) * gfx.missile_size;

    // calculate the axis
    cent.lerp_angles = cent.current_state.angles;

    // the camera follows our own guided attacks
    if client_num == fc.client_num && guided {
        out.guide.target = cent.lerp_origin;
        out.guide.view = true;
    }

    // add trails
    if gfx.missile_trail_shader != 0 && gfx.missile_trail_radius != 0.0 {
        if e_type == EntityType::Missile as i32 {
            cg_trail_func_fade_tail(cent, env, out);
        } else if e_type == EntityType::BeamHead as i32 {
            if guided {
                cg_trail_func_bendy_beam(cent, env, out);
            } else if gfx.missile_trail_spiral_shader != 0
                && gfx.missile_trail_spiral_radius != 0.0
                && gfx.missile_trail_spiral_offset != 0.0
            {
                cg_trail_func_spiral_beam(cent, env, out);
            } else {
                cg_trail_func_straight_beam(cent, env, out);
            }
        }
    }

    // add dynamic light
    if gfx.missile_dlight_radius != 0.0 {
        let c = gfx.missile_dlight_color;
        v_add_light(out.view, &cent.lerp_origin, 100.0 * gfx.missile_dlight_radius, c[0], c[1], c[2]);
    }

    // add missile sound
    if gfx.missile_sound != 0 {
        let velocity = bg_evaluate_trajectory_delta(&cent.current_state.pos, fc.time);
        out.imports
            .s_add_looping_sound(number, &cent.lerp_origin, &velocity, gfx.missile_sound);
    }

    // create the render entity
    let s1 = &cent.current_state;
    let mut ent = RefEntity {
        origin: cent.lerp_origin,
        oldorigin: cent.lerp_origin,
        ..Default::default()
    };

    if gfx.missile_model == 0 || gfx.missile_skin == 0 {
        // flat sprite
        if gfx.missile_shader != 0 {
            ent.re_type = RefType::Sprite;
            ent.radius = 4.0 * missile_scale;
            ent.rotation = 0.0;
            ent.custom_shader = gfx.missile_shader;
            ent.axis = AXIS_DEFAULT;
            v_add_entity(out.view, &ent);
        }
    } else {
        ent.re_type = RefType::Model;
        ent.h_model = gfx.missile_model;
        ent.custom_skin = gfx.missile_skin;
        ent.renderfx = RenderFx::NOSHADOW;

        let (dir, len) = vector_normalize2(&s1.pos.tr_delta);
        ent.axis[0] = dir;
        let moving = s1.pos.tr_type != TrType::Stationary;

        // only a roll spin can ride the direction of travel, any other
        // spin goes through a quaternion
        if gfx.missile_spin[0] == 0.0 && gfx.missile_spin[1] == 0.0 {
            // convert direction of travel into axis
            if len == 0.0 {
                ent.axis[0][2] = 1.0;
            }

            // spin as it moves
            if moving {
                rotate_around_direction(&mut ent.axis, gfx.missile_spin[2] * fc.time as f32 / 4.0);
            } else {
                rotate_around_direction(&mut ent.axis, gfx.missile_spin[2] * s1.time as f32);
            }
        } else {
            if len == 0.0 {
                ent.axis[0][0] = 1.0;
            }

            let spin_time = if moving { fc.time as f32 / 4.0 } else { s1.time as f32 };
            let spin_rotate = vector_piecewise_multiply(&[spin_time; 3], &gfx.missile_spin);
            let temp_angles = vectoangles(&ent.axis[0]);

            let q = quat_mul(&angles_to_quat(&temp_angles), &angles_to_quat(&spin_rotate));
            ent.axis = quat_to_axis(&q);
        }

        // scale the missile
        axis_scale(&mut ent.axis, missile_scale);
        ent.non_normalized_axes = true;

        v_add_entity(out.view, &ent);
    }

    let first_seen = !out.frame_hist.was_in_pvs(number);

    // skimmers kick up debris the moment they appear
    if e_type == EntityType::Skimmer as i32 && first_seen {
        out.imports
            .psys_spawn_cached_system("TrailDebris", &cent.lerp_origin, None, number);
    }

    if first_seen && !gfx.missile_particle_system.is_empty() {
        let axis = angles_to_axis(&cent.lerp_angles);
        out.imports.psys_spawn_cached_system(
            &gfx.missile_particle_system,
            &cent.lerp_origin,
            Some(&axis),
            number,
        );
    }
}
