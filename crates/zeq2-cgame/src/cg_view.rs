// cg_view.rs -- setup all the parameters (position, angle, etc) for a 3D rendering
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::collections::VecDeque;

use zeq2_common::q_shared::*;

use crate::cg_beamtables::cg_add_beam_tables;
use crate::cg_ents::{cg_add_packet_entities, cg_build_frame_context};
use crate::cg_local::*;
use crate::cg_localents::cg_add_local_entities;
use crate::cg_snapshot::cg_process_snapshots;
use crate::cg_syscalls::CgameImports;
use crate::cg_trails::cg_add_trails;
use crate::tr_types::*;

/// The scene being built for this frame.
pub struct ViewState {
    pub r_entities: Vec<RefEntity>,
    pub r_dlights: Vec<DLight>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            r_entities: Vec::with_capacity(MAX_REFENTITIES),
            r_dlights: Vec::with_capacity(MAX_DLIGHTS),
        }
    }
}

// ============================================================
// Scene list
// ============================================================

pub fn v_clear_scene(view: &mut ViewState) {
    view.r_entities.clear();
    view.r_dlights.clear();
}

/// trap_R_AddRefEntityToScene
pub fn v_add_entity(view: &mut ViewState, ent: &RefEntity) {
    if view.r_entities.len() >= MAX_REFENTITIES {
        tracing::trace!("scene entity list full");
        return;
    }
    view.r_entities.push(ent.clone());
}

/// trap_R_AddLightToScene
pub fn v_add_light(view: &mut ViewState, org: &Vec3, intensity: f32, r: f32, g: f32, b: f32) {
    if view.r_dlights.len() >= MAX_DLIGHTS {
        return;
    }
    view.r_dlights.push(DLight {
        origin: *org,
        intensity,
        color: [r, g, b],
    });
}

/// Flat ribbon from `start` to `end`, `width` wide.
pub fn cg_draw_line(view: &mut ViewState, start: &Vec3, end: &Vec3, width: f32, shader: QHandle, rgb_modulate: f32) {
    let c = (255.0 * rgb_modulate).clamp(0.0, 255.0) as u8;
    let re = RefEntity {
        re_type: RefType::Line,
        radius: width / 2.0,
        custom_shader: shader,
        origin: *start,
        oldorigin: *end,
        axis: AXIS_DEFAULT,
        shader_rgba: [c, c, c, c],
        ..Default::default()
    };
    v_add_entity(view, &re);
}

// ============================================================
// Frame entry points
// ============================================================

/// Build the entity part of the scene for the current `cg.time`: the
/// snapshot entities, the local effects pool, the fading tails and the
/// bendy beams. Nothing is presented until a snapshot has arrived.
pub fn cg_add_frame_entities(
    cg: &mut CgState,
    cgs: &CgStatic,
    config: &CgConfig,
    imports: &mut dyn CgameImports,
) -> Result<(), CgError> {
    v_clear_scene(&mut cg.view);

    let fc = match cg_build_frame_context(cg, cgs, config) {
        Some(fc) => fc,
        None => {
            if config.developer {
                tracing::debug!(time = cg.time, "no snapshot, nothing to present");
            }
            return Ok(());
        }
    };
    cg.frame_interpolation = fc.frame_interpolation;

    cg.frame_hist.rotate();
    cg.guide.view = false;

    if let Err(e) = cg_add_packet_entities(cg, cgs, &fc, imports) {
        tracing::error!(error = %e, time = fc.time, "aborting frame");
        v_clear_scene(&mut cg.view);
        return Err(e);
    }

    cg_add_local_entities(&mut cg.local_entities, &mut cg.view, fc.time);
    cg_add_trails(&mut cg.trails, &mut cg.view, fc.time, config.tail_detail);
    cg_add_beam_tables(&mut cg.beam_tables, &mut cg.view, fc.time);

    Ok(())
}

/// Generates and draws a game scene for `server_time`.
pub fn cg_draw_active_frame(
    cg: &mut CgState,
    cgs: &CgStatic,
    config: &CgConfig,
    server_time: i32,
    pending: &mut VecDeque<Snapshot>,
    imports: &mut dyn CgameImports,
) -> Result<(), CgError> {
    cg.old_time = cg.time;
    cg.time = server_time;
    cg.frametime = (cg.time - cg.old_time).max(0);
    cg.client_frame += 1;

    // set up cg.snap and possibly cg.next_snap
    cg_process_snapshots(cg, pending);

    cg_add_frame_entities(cg, cgs, config, imports)
}
