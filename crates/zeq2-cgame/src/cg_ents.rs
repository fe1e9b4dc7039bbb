// cg_ents.rs -- present snapshot entities, happens every single frame
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::anorms::byte_to_dir;
use zeq2_common::bg_misc::*;
use zeq2_common::bg_public::*;
use zeq2_common::q_shared::*;

use crate::cg_local::*;
use crate::cg_missile::{cg_missile, cg_torch};
use crate::cg_syscalls::{CgameImports, SoundChannel};
use crate::cg_view::{v_add_entity, v_add_light, ViewState};
use crate::tr_types::*;

// =========================================================================
// Tags
// =========================================================================

fn cg_lerp_parent_tag(
    parent: &RefEntity,
    parent_model: QHandle,
    tag_name: &str,
    imports: &dyn CgameImports,
) -> Option<Orientation> {
    imports.r_lerp_tag(parent_model, parent.oldframe, parent.frame, 1.0 - parent.backlerp, tag_name)
}

fn cg_tag_world_origin(parent: &RefEntity, lerped: &Orientation) -> Vec3 {
    let mut origin = parent.origin;
    for i in 0..3 {
        origin = vector_ma(&origin, lerped.origin[i], &parent.axis[i]);
    }
    origin
}

/// CG_GetTagPosition -- world position of a tag on `parent`.
pub fn cg_get_tag_position(parent: &RefEntity, tag_name: &str, imports: &dyn CgameImports) -> Option<Vec3> {
    let lerped = cg_lerp_parent_tag(parent, parent.h_model, tag_name, imports)?;
    Some(cg_tag_world_origin(parent, &lerped))
}

/// CG_GetTagOrientation -- world forward direction of a tag on `parent`.
pub fn cg_get_tag_orientation(parent: &RefEntity, tag_name: &str, imports: &dyn CgameImports) -> Option<Vec3> {
    let lerped = cg_lerp_parent_tag(parent, parent.h_model, tag_name, imports)?;
    Some(matrix_multiply(&lerped.axis, &parent.axis)[0])
}

/// CG_PositionEntityOnTag -- modifies the entities position and axis by the
/// given tag location. Returns false, leaving `entity` alone, when the
/// parent model has no such tag.
pub fn cg_position_entity_on_tag(
    entity: &mut RefEntity,
    parent: &RefEntity,
    parent_model: QHandle,
    tag_name: &str,
    imports: &dyn CgameImports,
) -> bool {
    let Some(lerped) = cg_lerp_parent_tag(parent, parent_model, tag_name, imports) else {
        return false;
    };

    // FIXME: allow origin offsets along tag?
    entity.origin = cg_tag_world_origin(parent, &lerped);
    entity.axis = matrix_multiply(&lerped.axis, &parent.axis);
    entity.backlerp = parent.backlerp;
    true
}

/// CG_PositionRotatedEntityOnTag -- like `cg_position_entity_on_tag`, but
/// the entity keeps its own rotation on top of the tag.
pub fn cg_position_rotated_entity_on_tag(
    entity: &mut RefEntity,
    parent: &RefEntity,
    parent_model: QHandle,
    tag_name: &str,
    imports: &dyn CgameImports,
) -> bool {
    let Some(lerped) = cg_lerp_parent_tag(parent, parent_model, tag_name, imports) else {
        return false;
    };

    entity.origin = cg_tag_world_origin(parent, &lerped);
    let temp_axis = matrix_multiply(&entity.axis, &lerped.axis);
    entity.axis = matrix_multiply(&temp_axis, &parent.axis);
    true
}

// =========================================================================
// FUNCTIONS CALLED EACH FRAME
// =========================================================================

/// CG_SetEntitySoundPosition -- also called by event processing code
pub fn cg_set_entity_sound_position(cent: &CEntity, cgs: &CgStatic, imports: &mut dyn CgameImports) {
    let s = &cent.current_state;
    if s.solid == SOLID_BMODEL {
        let mid = usize::try_from(s.model_index)
            .ok()
            .and_then(|i| cgs.inline_model_midpoints.get(i))
            .copied()
            .unwrap_or(VEC3_ORIGIN);
        imports.s_update_entity_position(s.number, &vector_add(&cent.lerp_origin, &mid));
    } else {
        imports.s_update_entity_position(s.number, &cent.lerp_origin);
    }
}

/// Unpack constantLight: r + (g<<8) + (b<<16) + (intensity<<24).
/// Colors come back normalized, intensity scaled by 4.
pub fn cg_unpack_constant_light(cl: i32) -> (f32, Vec3) {
    let r = cl & 255;
    let g = (cl >> 8) & 255;
    let b = (cl >> 16) & 255;
    let i = ((cl >> 24) & 255) * 4;
    (i as f32, [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}

/// CG_EntityEffects -- add continuous entity effects, like local entity
/// emission and lighting
fn cg_entity_effects(cent: &CEntity, cgs: &CgStatic, out: &mut FrameSinks) {
    let s = &cent.current_state;

    // update sound origins
    cg_set_entity_sound_position(cent, cgs, &mut *out.imports);

    // add loop sound
    if s.loop_sound != 0 {
        let sfx = cgs.game_sound(s.loop_sound);
        if sfx != 0 {
            if s.e_type != EntityType::Speaker as i32 {
                out.imports.s_add_looping_sound(s.number, &cent.lerp_origin, &VEC3_ORIGIN, sfx);
            } else {
                out.imports.s_add_real_looping_sound(s.number, &cent.lerp_origin, &VEC3_ORIGIN, sfx);
            }
        }
    }

    // constant light glow
    if s.constant_light != 0 {
        let (intensity, color) = cg_unpack_constant_light(s.constant_light);
        v_add_light(out.view, &cent.lerp_origin, intensity, color[0], color[1], color[2]);
    }
}

/// CG_General
fn cg_general(cent: &CEntity, env: &PresentEnv, out: &mut FrameSinks) -> Result<(), CgError> {
    let s1 = &cent.current_state;

    // if set to invisible, skip
    if s1.model_index == 0 {
        return Ok(());
    }

    let h_model = env.cgs.game_model(s1.number, s1.model_index)?;
    if h_model == 0 {
        return Ok(());
    }

    let mut ent = RefEntity {
        // set frame
        frame: s1.frame,
        oldframe: s1.frame,
        backlerp: 0.0,
        origin: cent.lerp_origin,
        oldorigin: cent.lerp_origin,
        h_model,
        // convert angles to axis
        axis: angles_to_axis(&cent.lerp_angles),
        ..Default::default()
    };

    // player model
    if s1.number == env.fc.view_client_num {
        ent.renderfx |= RenderFx::THIRD_PERSON; // only draw from mirrors
    }

    v_add_entity(out.view, &ent);
    Ok(())
}

/// CG_Speaker -- speaker entities can automatically play sounds
fn cg_speaker(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let s = &cent.current_state;
    if s.client_num == 0 {
        return; // not auto triggering
    }

    let time = env.fc.time;
    if time < cent.misc_time {
        return;
    }

    out.imports
        .s_start_sound(None, s.number, SoundChannel::Item, env.cgs.game_sound(s.event_parm));

    // frame is the wait in tenths, client_num the random spread in tenths
    let next = time.saturating_add(s.frame.saturating_mul(100)) as f32 + s.client_num as f32 * 100.0 * crandom();
    cent.misc_time = next as i32;
}

/// Vertical item bob for entity `number` at `time`. Always within [0, 8],
/// period 2 * PI / (0.005 + number * 0.00001) msec.
pub fn cg_item_bob_offset(number: i32, time: f64) -> f32 {
    let scale = 0.005 + number as f64 * 0.00001;
    (4.0 + ((time + 1000.0) * scale).cos() * 4.0) as f32
}

/// CG_Item
fn cg_item(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) -> Result<(), CgError> {
    let fc = env.fc;
    let cgs = env.cgs;
    let es = &cent.current_state;
    let number = es.number;

    let index = match usize::try_from(es.model_index) {
        Ok(i) if i < cgs.item_list.len() => i,
        _ => {
            return Err(CgError::BadItemIndex {
                number,
                index: es.model_index,
            })
        }
    };

    // if set to invisible, skip
    if index == 0 || es.e_flags.contains(EntityFlags::NODRAW) {
        return Ok(());
    }

    let item = &cgs.item_list[index];
    let no_info = ItemInfo::default();
    let info = cgs.items.get(index).unwrap_or(&no_info);

    if fc.config.simple_items && item.gi_type != ItemType::Team {
        let ent = RefEntity {
            re_type: RefType::Sprite,
            origin: cent.lerp_origin,
            radius: 14.0,
            custom_shader: info.icon,
            shader_rgba: [255, 255, 255, 255],
            ..Default::default()
        };
        v_add_entity(out.view, &ent);
        return Ok(());
    }

    // items bob up and down continuously
    cent.lerp_origin[2] += cg_item_bob_offset(number, fc.time as f64);

    let mut ent = RefEntity::default();

    // autorotate at one of two speeds
    if item.gi_type == ItemType::Health {
        cent.lerp_angles = fc.auto_angles_fast;
        ent.axis = fc.auto_axis_fast;
    } else {
        cent.lerp_angles = fc.auto_angles;
        ent.axis = fc.auto_axis;
    }

    // the weapons have their origin where they attatch to player
    // models, so we need to offset them or they will rotate
    // eccentricly
    if item.gi_type == ItemType::Weapon {
        if let Some(wi) = usize::try_from(item.gi_tag).ok().and_then(|t| cgs.weapons.get(t)) {
            let mid = wi.weapon_midpoint;
            for i in 0..3 {
                cent.lerp_origin[i] -=
                    mid[0] * ent.axis[0][i] + mid[1] * ent.axis[1][i] + mid[2] * ent.axis[2][i];
            }
        }

        cent.lerp_origin[2] += 8.0; // an extra height boost
    }

    ent.h_model = info.models[0];
    ent.origin = cent.lerp_origin;
    ent.oldorigin = cent.lerp_origin;
    ent.non_normalized_axes = false;

    // if just respawned, slowly scale up
    let msec = fc.time - cent.misc_time;
    let frac = if (0..ITEM_SCALEUP_TIME).contains(&msec) {
        let frac = msec as f32 / ITEM_SCALEUP_TIME as f32;
        axis_scale(&mut ent.axis, frac);
        ent.non_normalized_axes = true;
        frac
    } else {
        1.0
    };

    // items without glow textures need to keep a minimum light value
    // so they are always visible
    if item.gi_type == ItemType::Weapon || item.gi_type == ItemType::Armor {
        ent.renderfx |= RenderFx::MINLIGHT;
    }

    // increase the size of the weapons when they are presented as items
    if item.gi_type == ItemType::Weapon {
        axis_scale(&mut ent.axis, 1.5);
        ent.non_normalized_axes = true;
    }

    if ent.h_model != 0 {
        v_add_entity(out.view, &ent);
    }

    // accompanying rings / spheres for powerups
    if !fc.config.simple_items
        && (item.gi_type == ItemType::Health || item.gi_type == ItemType::Powerup)
        && info.models[1] != 0
    {
        let mut spin_angles = VEC3_ORIGIN;
        ent.h_model = info.models[1];

        if item.gi_type == ItemType::Powerup {
            ent.origin[2] += 12.0;
            spin_angles[YAW] = (fc.time & 1023) as f32 * 360.0 / -1024.0;
        }
        ent.axis = angles_to_axis(&spin_angles);

        // scale up if respawning
        if frac != 1.0 {
            axis_scale(&mut ent.axis, frac);
            ent.non_normalized_axes = true;
        }
        v_add_entity(out.view, &ent);
    }

    Ok(())
}

/// CG_GrappleTrail -- the cable from the owner's hand to the hook
fn cg_grapple_trail(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let fc = env.fc;
    let origin = bg_evaluate_trajectory(&cent.current_state.pos, fc.time);
    cent.trail_time = fc.time;

    let Some(owner) = env.entity(cent.current_state.other_entity_num) else {
        return;
    };

    //FIXME adjust for muzzle position
    let mut start = owner.lerp_origin;
    start[2] += 26.0;
    let mut up = VEC3_ORIGIN;
    angle_vectors(&owner.lerp_angles, None, None, Some(&mut up));
    start = vector_ma(&start, -6.0, &up);

    if distance(&start, &origin) < 64.0 {
        return; // Don't draw if close
    }

    let beam = RefEntity {
        re_type: RefType::Lightning,
        custom_shader: env.cgs.media.lightning_shader,
        origin: start,
        oldorigin: origin,
        axis: AXIS_DEFAULT,
        shader_rgba: [255, 255, 255, 255],
        ..Default::default()
    };
    v_add_entity(out.view, &beam);
}

/// CG_Grapple -- this is called when the grapple is sitting up against the wall
fn cg_grapple(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let cgs = env.cgs;
    let weapon = usize::try_from(cent.current_state.weapon)
        .ok()
        .filter(|&w| w < cgs.weapons.len())
        .unwrap_or(0);

    // calculate the axis
    cent.lerp_angles = cent.current_state.angles;

    // Will draw cable if needed
    cg_grapple_trail(cent, env, out);

    let Some(wi) = cgs.weapons.get(weapon) else {
        return;
    };
    if wi.missile_model == 0 {
        return;
    }

    let mut ent = RefEntity {
        origin: cent.lerp_origin,
        oldorigin: cent.lerp_origin,
        // flicker between two skins
        skin_num: env.fc.client_frame & 1,
        h_model: wi.missile_model,
        renderfx: wi.missile_renderfx | RenderFx::NOSHADOW,
        ..Default::default()
    };

    // convert direction of travel into axis
    let (dir, len) = vector_normalize2(&cent.current_state.pos.tr_delta);
    ent.axis[0] = dir;
    if len == 0.0 {
        ent.axis[0][2] = 1.0;
    }
    rotate_around_direction(&mut ent.axis, 0.0);

    v_add_entity(out.view, &ent);
}

/// CG_Mover
fn cg_mover(cent: &CEntity, env: &PresentEnv, out: &mut FrameSinks) -> Result<(), CgError> {
    let s1 = &cent.current_state;

    let mut ent = RefEntity {
        origin: cent.lerp_origin,
        oldorigin: cent.lerp_origin,
        axis: angles_to_axis(&cent.lerp_angles),
        renderfx: RenderFx::NOSHADOW,
        // flicker between two skins (FIXME?)
        skin_num: (env.fc.time >> 6) & 1,
        ..Default::default()
    };

    // get the model, either as a bmodel or a modelindex
    ent.h_model = if s1.solid == SOLID_BMODEL {
        env.cgs.inline_model(s1.number, s1.model_index)?
    } else {
        env.cgs.game_model(s1.number, s1.model_index)?
    };

    if ent.h_model != 0 {
        v_add_entity(out.view, &ent);
    }

    // add the secondary model
    if s1.model_index2 != 0 {
        ent.skin_num = 0;
        ent.h_model = env.cgs.game_model(s1.number, s1.model_index2)?;
        if ent.h_model != 0 {
            v_add_entity(out.view, &ent);
        }
    }

    Ok(())
}

/// CG_Beam -- also called as an event
pub fn cg_beam(cent: &CEntity, view: &mut ViewState) {
    let s1 = &cent.current_state;

    let ent = RefEntity {
        re_type: RefType::Beam,
        origin: s1.pos.tr_base,
        oldorigin: s1.origin2,
        axis: AXIS_DEFAULT,
        renderfx: RenderFx::NOSHADOW,
        ..Default::default()
    };

    v_add_entity(view, &ent);
}

/// Portal surface basis from an encoded direction: axis[0] is the
/// direction, the other two are perpendicular to it and to each other.
pub fn cg_portal_axis(event_parm: i32) -> Option<Axis> {
    let forward = byte_to_dir(event_parm);
    if forward == VEC3_ORIGIN {
        return None;
    }

    // negating this tends to get the directions like they want
    // we really should have a camera roll value
    let left = vector_negate(&perpendicular_vector(&forward));
    let up = cross_product(&forward, &left);
    Some([forward, left, up])
}

/// CG_Portal
fn cg_portal(cent: &CEntity, view: &mut ViewState) {
    let s1 = &cent.current_state;

    let Some(axis) = cg_portal_axis(s1.event_parm) else {
        tracing::debug!(number = s1.number, event_parm = s1.event_parm, "portal with bad direction");
        return;
    };

    let ent = RefEntity {
        re_type: RefType::PortalSurface,
        origin: cent.lerp_origin,
        oldorigin: s1.origin2,
        axis,
        oldframe: s1.powerups,
        frame: s1.frame,                                      // rotation speed
        skin_num: (s1.client_num as f32 / 256.0 * 360.0) as i32, // roll offset
        ..Default::default()
    };

    v_add_entity(view, &ent);
}

// =========================================================================
// Interpolation
// =========================================================================

/// CG_AdjustPositionForMover -- also called by client movement prediction code
pub fn cg_adjust_position_for_mover(
    input: &Vec3,
    mover_num: i32,
    from_time: i32,
    to_time: i32,
    entities: &[CEntity],
) -> Vec3 {
    if mover_num <= 0 || mover_num >= ENTITYNUM_MAX_NORMAL {
        return *input;
    }

    let Some(cent) = entities.get(mover_num as usize) else {
        return *input;
    };
    if cent.current_state.e_type != EntityType::Mover as i32 {
        return *input;
    }

    let old_origin = bg_evaluate_trajectory(&cent.current_state.pos, from_time);
    let origin = bg_evaluate_trajectory(&cent.current_state.pos, to_time);

    // FIXME: origin change when on a rotating object
    vector_add(input, &vector_subtract(&origin, &old_origin))
}

/// CG_InterpolateEntityPosition
fn cg_interpolate_entity_position(cent: &mut CEntity, fc: &FrameContext, next_server_time: i32) {
    let f = fc.frame_interpolation;

    // this will linearize a sine or parabolic curve, but it is important
    // to not extrapolate player positions if more recent data is available
    let current = bg_evaluate_trajectory(&cent.current_state.pos, fc.snap_server_time);
    let next = bg_evaluate_trajectory(&cent.next_state.pos, next_server_time);
    cent.lerp_origin = vector_lerp(&current, &next, f);

    let current = bg_evaluate_trajectory(&cent.current_state.apos, fc.snap_server_time);
    let next = bg_evaluate_trajectory(&cent.next_state.apos, next_server_time);
    for i in 0..3 {
        cent.lerp_angles[i] = lerp_angle(current[i], next[i], f);
    }
}

/// CG_CalcEntityLerpPositions
pub fn cg_calc_entity_lerp_positions(cent: &mut CEntity, fc: &FrameContext, entities: &[CEntity], predicted: bool) {
    let number = cent.current_state.number;
    let is_client = (0..MAX_CLIENTS as i32).contains(&number);

    // if this player does not want to see extrapolated players
    if !fc.config.smooth_clients && is_client {
        // make sure the clients use TR_INTERPOLATE
        cent.current_state.pos.tr_type = TrType::Interpolate;
        cent.next_state.pos.tr_type = TrType::Interpolate;
    }

    // without a next snapshot nothing can blend, evaluate directly instead
    if let Some(next_time) = fc.next_snap_server_time {
        let tr_type = cent.current_state.pos.tr_type;
        if cent.interpolate && tr_type == TrType::Interpolate {
            cg_interpolate_entity_position(cent, fc, next_time);
            return;
        }

        // first see if we can interpolate between two snaps for
        // linear extrapolated clients
        if cent.interpolate && tr_type == TrType::LinearStop && is_client {
            cg_interpolate_entity_position(cent, fc, next_time);
            return;
        }
    }

    // just use the current frame and evaluate as best we can
    cent.lerp_origin = bg_evaluate_trajectory(&cent.current_state.pos, fc.time);
    cent.lerp_angles = bg_evaluate_trajectory(&cent.current_state.apos, fc.time);

    // adjust for riding a mover if it wasn't rolled into the predicted
    // player state
    if !predicted {
        cent.lerp_origin = cg_adjust_position_for_mover(
            &cent.lerp_origin,
            cent.current_state.ground_entity_num,
            fc.snap_server_time,
            fc.time,
            entities,
        );
    }
}

// =========================================================================
// Team markers
// =========================================================================

fn team_base_model(cent: &CEntity) -> RefEntity {
    RefEntity {
        re_type: RefType::Model,
        lighting_origin: cent.lerp_origin,
        origin: cent.lerp_origin,
        axis: angles_to_axis(&cent.current_state.angles),
        ..Default::default()
    }
}

fn cg_obelisk(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let media = &env.cgs.media;
    let time = env.fc.time;

    // show the obelisk
    let mut model = team_base_model(cent);
    model.h_model = media.overload_base_model;
    v_add_entity(out.view, &model);

    // modelindex2 is the health value of the obelisk
    let health = cent.current_state.model_index2.clamp(0, 255) as u8;

    // if hit
    if cent.current_state.frame == 1 {
        // show hit model
        model.shader_rgba = [0xff, health, health, 0xff];
        model.h_model = media.overload_energy_model;
        v_add_entity(out.view, &model);
    }

    // if respawning
    if cent.current_state.frame == 2 {
        if cent.misc_time == 0 {
            cent.misc_time = time;
        }
        let t = time - cent.misc_time;
        let h = (env.fc.config.obelisk_respawn_delay - 5) * 1000;

        let c = if t > h {
            if h > 0 {
                ((t - h) as f32 / h as f32).min(1.0)
            } else {
                1.0
            }
        } else {
            0.0
        };

        // show the lights
        model.axis = angles_to_axis(&cent.current_state.angles);
        let level = (c * 255.0) as u8;
        model.shader_rgba = [level; 4];
        model.h_model = media.overload_lights_model;
        v_add_entity(out.view, &model);

        // show the target
        if t > h {
            if cent.muzzle_flash_time == 0 {
                out.imports.s_start_sound(
                    Some(&cent.lerp_origin),
                    ENTITYNUM_NONE,
                    SoundChannel::Body,
                    media.obelisk_respawn_sound,
                );
                cent.muzzle_flash_time = 1;
            }

            let mut angles = cent.current_state.angles;
            angles[YAW] += 16.0 * (1.0 - c).acos() * RAD_TO_DEG;
            model.axis = angles_to_axis(&angles);
            axis_scale(&mut model.axis, c);

            model.shader_rgba = [0xff; 4];
            model.origin[2] += 56.0;
            model.h_model = media.overload_target_model;
            v_add_entity(out.view, &model);
        }
    } else {
        cent.misc_time = 0;
        cent.muzzle_flash_time = 0;

        model.shader_rgba = [0xff, health, health, 0xff];
        // show the lights
        model.h_model = media.overload_lights_model;
        v_add_entity(out.view, &model);
        // show the target
        model.origin[2] += 56.0;
        model.h_model = media.overload_target_model;
        v_add_entity(out.view, &model);
    }
}

/// CG_TeamBase
fn cg_team_base(cent: &mut CEntity, env: &PresentEnv, out: &mut FrameSinks) {
    let media = &env.cgs.media;

    match env.fc.gametype {
        Gametype::Ctf | Gametype::OneFlagCtf => {
            // show the flag base
            let mut model = team_base_model(cent);
            model.h_model = match cent.current_state.model_index {
                TEAM_RED => media.red_flag_base_model,
                TEAM_BLUE => media.blue_flag_base_model,
                _ => media.neutral_flag_base_model,
            };
            v_add_entity(out.view, &model);
        }
        Gametype::Obelisk => cg_obelisk(cent, env, out),
        Gametype::Harvester => {
            // show harvester model
            let mut model = team_base_model(cent);
            match cent.current_state.model_index {
                TEAM_RED => {
                    model.h_model = media.harvester_model;
                    model.custom_skin = media.harvester_red_skin;
                }
                TEAM_BLUE => {
                    model.h_model = media.harvester_model;
                    model.custom_skin = media.harvester_blue_skin;
                }
                _ => {
                    model.h_model = media.harvester_neutral_model;
                    model.custom_skin = 0;
                }
            }
            v_add_entity(out.view, &model);
        }
        _ => {}
    }
}

// =========================================================================
// Dispatch
// =========================================================================

/// CG_AddCEntity -- lerp, automatic effects and the type presenter for one
/// entity. `predicted` marks the locally predicted player entity, which
/// already has mover riding folded in.
pub fn cg_add_centity(
    cent: &mut CEntity,
    predicted: bool,
    env: &PresentEnv,
    out: &mut FrameSinks,
) -> Result<(), CgError> {
    // event-only entities will have been dealt with already
    if cent.current_state.e_type >= ET_EVENTS {
        return Ok(());
    }

    let Some(e_type) = EntityType::from_i32(cent.current_state.e_type) else {
        return Err(CgError::BadEntityType {
            number: cent.current_state.number,
            e_type: cent.current_state.e_type,
        });
    };

    // calculate the current origin
    cg_calc_entity_lerp_positions(cent, env.fc, env.entities, predicted);

    // add automatic effects
    cg_entity_effects(cent, env.cgs, out);

    match e_type {
        EntityType::Invisible | EntityType::PushTrigger | EntityType::TeleportTrigger => {}
        EntityType::General => cg_general(cent, env, out)?,
        EntityType::Player => out.imports.cg_player(cent, env.fc, &mut *out.view),
        EntityType::Item => cg_item(cent, env, out)?,
        EntityType::Missile | EntityType::BeamHead | EntityType::Skimmer => cg_missile(cent, env, out),
        EntityType::Mover => cg_mover(cent, env, out)?,
        EntityType::Beam => cg_beam(cent, out.view),
        EntityType::Portal => cg_portal(cent, out.view),
        EntityType::Speaker => cg_speaker(cent, env, out),
        EntityType::Grapple => cg_grapple(cent, env, out),
        EntityType::Team => cg_team_base(cent, env, out),
        EntityType::Torch => cg_torch(cent, env),
    }

    out.frame_hist.set_pvs(cent.current_state.number);
    Ok(())
}

/// Everything about this frame that every presenter shares. `None` until
/// the first snapshot has arrived.
pub fn cg_build_frame_context(cg: &CgState, cgs: &CgStatic, config: &CgConfig) -> Option<FrameContext> {
    let snap = cg.snap.as_ref()?;
    let next_time = cg.next_snap.as_ref().map(|n| n.server_time);

    // set cg.frameInterpolation
    let (frame_interpolation, snapshot_interval) = match next_time {
        Some(nt) => {
            let delta = nt - snap.server_time;
            if delta == 0 {
                (0.0, cg.frametime)
            } else {
                ((cg.time - snap.server_time) as f32 / delta as f32, delta)
            }
        }
        // actually, it should never be used, because
        // no entities should be marked as interpolating
        None => (0.0, cg.frametime),
    };

    // the auto-rotating items will all have the same axis
    let auto_angles = [0.0, (cg.time & 2047) as f32 * 360.0 / 2048.0, 0.0];
    let auto_angles_fast = [0.0, (cg.time & 1023) as f32 * 360.0 / 1024.0, 0.0];

    Some(FrameContext {
        time: cg.time,
        frametime: cg.frametime,
        client_frame: cg.client_frame,
        snap_server_time: snap.server_time,
        next_snap_server_time: next_time,
        frame_interpolation,
        snapshot_interval,
        auto_angles,
        auto_axis: angles_to_axis(&auto_angles),
        auto_angles_fast,
        auto_axis_fast: angles_to_axis(&auto_angles_fast),
        view_client_num: snap.ps.client_num,
        client_num: cg.client_num,
        gametype: cgs.gametype,
        config: *config,
    })
}

fn entity_slot(cg: &CgState, number: i32) -> Option<usize> {
    usize::try_from(number).ok().filter(|&i| i < cg.entities.len())
}

/// CG_AddPacketEntities
pub fn cg_add_packet_entities(
    cg: &mut CgState,
    cgs: &CgStatic,
    fc: &FrameContext,
    imports: &mut dyn CgameImports,
) -> Result<(), CgError> {
    // generate and add the entity from the playerstate
    let mut predicted = std::mem::take(&mut cg.predicted_player_entity);
    predicted.current_state = bg_player_state_to_entity_state(&cg.predicted_player_state, false);
    let result = {
        let (env, mut out) = cg_split_frame(cg, cgs, fc, &mut *imports);
        cg_add_centity(&mut predicted, true, &env, &mut out)
    };
    cg.predicted_player_entity = predicted;
    result?;

    // lerp the non-predicted value for lightning gun origins
    if let Some(idx) = entity_slot(cg, fc.view_client_num) {
        let mut cent = std::mem::take(&mut cg.entities[idx]);
        cg_calc_entity_lerp_positions(&mut cent, fc, &cg.entities, false);
        cg.entities[idx] = cent;
    }

    // add each entity sent over by the server
    let numbers: Vec<i32> = cg
        .snap
        .as_ref()
        .map(|s| s.entities.iter().map(|e| e.number).collect())
        .unwrap_or_default();

    for number in numbers {
        let Some(idx) = entity_slot(cg, number) else {
            continue;
        };

        let mut cent = std::mem::take(&mut cg.entities[idx]);
        let result = {
            let (env, mut out) = cg_split_frame(cg, cgs, fc, &mut *imports);
            cg_add_centity(&mut cent, false, &env, &mut out)
        };
        cg.entities[idx] = cent;
        result?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cg_syscalls::test_imports::{Call, RecordingImports};

    fn assert_vec_near(a: &Vec3, b: &Vec3, eps: f32) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < eps, "{:?} != {:?}", a, b);
        }
    }

    fn fc_at(time: i32) -> FrameContext {
        FrameContext {
            time,
            frametime: 16,
            client_frame: 1,
            snap_server_time: time,
            next_snap_server_time: None,
            frame_interpolation: 0.0,
            snapshot_interval: 50,
            auto_angles: VEC3_ORIGIN,
            auto_axis: AXIS_DEFAULT,
            auto_angles_fast: VEC3_ORIGIN,
            auto_axis_fast: AXIS_DEFAULT,
            view_client_num: 0,
            client_num: 0,
            gametype: Gametype::Ffa,
            config: CgConfig::default(),
        }
    }

    fn cent_of(number: i32, e_type: EntityType, origin: Vec3) -> CEntity {
        let mut cent = CEntity::default();
        cent.current_state = EntityState {
            number,
            e_type: e_type as i32,
            pos: Trajectory {
                tr_type: TrType::Stationary,
                tr_base: origin,
                ..Default::default()
            },
            ..Default::default()
        };
        cent.next_state = cent.current_state.clone();
        cent
    }

    fn present(
        cg: &mut CgState,
        cgs: &CgStatic,
        fc: &FrameContext,
        imports: &mut RecordingImports,
        cent: &mut CEntity,
    ) -> Result<(), CgError> {
        let (env, mut out) = cg_split_frame(cg, cgs, fc, imports);
        cg_add_centity(cent, false, &env, &mut out)
    }

    // -------------------------------------------------------
    // tags
    // -------------------------------------------------------

    fn tag_pose() -> Orientation {
        Orientation {
            origin: [3.0, -2.0, 7.0],
            axis: angles_to_axis(&[10.0, 30.0, 5.0]),
        }
    }

    #[test]
    fn test_tag_on_identity_parent_is_local_pose() {
        let mut imports = RecordingImports::default();
        imports.tags.push((9, "tag_weapon".into(), tag_pose()));

        let parent = RefEntity {
            h_model: 9,
            axis: AXIS_DEFAULT,
            ..Default::default()
        };
        let mut child = RefEntity::default();
        assert!(cg_position_entity_on_tag(&mut child, &parent, 9, "tag_weapon", &imports));
        assert_eq!(child.origin, tag_pose().origin);
        for i in 0..3 {
            assert_vec_near(&child.axis[i], &tag_pose().axis[i], 1e-6);
        }
    }

    #[test]
    fn test_tag_composes_with_parent_pose() {
        let mut imports = RecordingImports::default();
        imports.tags.push((
            9,
            "tag_head".into(),
            Orientation {
                origin: [10.0, 0.0, 0.0],
                axis: AXIS_DEFAULT,
            },
        ));

        // parent yawed 90 degrees: its forward is world +Y
        let parent = RefEntity {
            h_model: 9,
            origin: [100.0, 0.0, 0.0],
            axis: angles_to_axis(&[0.0, 90.0, 0.0]),
            backlerp: 0.25,
            ..Default::default()
        };
        let mut child = RefEntity::default();
        assert!(cg_position_entity_on_tag(&mut child, &parent, 9, "tag_head", &imports));
        assert_vec_near(&child.origin, &[100.0, 10.0, 0.0], 1e-4);
        assert_vec_near(&child.axis[0], &[0.0, 1.0, 0.0], 1e-5);
        assert_eq!(child.backlerp, 0.25);

        assert_vec_near(&cg_get_tag_position(&parent, "tag_head", &imports).unwrap(), &[100.0, 10.0, 0.0], 1e-4);
        assert_vec_near(&cg_get_tag_orientation(&parent, "tag_head", &imports).unwrap(), &[0.0, 1.0, 0.0], 1e-5);
    }

    #[test]
    fn test_missing_tag_leaves_entity_alone() {
        let imports = RecordingImports::default();
        let parent = RefEntity {
            axis: AXIS_DEFAULT,
            ..Default::default()
        };
        let mut child = RefEntity {
            origin: [1.0, 1.0, 1.0],
            ..Default::default()
        };
        assert!(!cg_position_entity_on_tag(&mut child, &parent, 9, "tag_nope", &imports));
        assert!(!cg_position_rotated_entity_on_tag(&mut child, &parent, 9, "tag_nope", &imports));
        assert_eq!(child.origin, [1.0, 1.0, 1.0]);
        assert!(cg_get_tag_position(&parent, "tag_nope", &imports).is_none());
    }

    #[test]
    fn test_rotated_tag_keeps_child_spin() {
        let mut imports = RecordingImports::default();
        imports.tags.push((
            9,
            "tag_orb".into(),
            Orientation {
                origin: VEC3_ORIGIN,
                axis: AXIS_DEFAULT,
            },
        ));
        let parent = RefEntity {
            axis: AXIS_DEFAULT,
            ..Default::default()
        };
        let spin = angles_to_axis(&[0.0, 45.0, 0.0]);
        let mut child = RefEntity {
            axis: spin,
            ..Default::default()
        };
        assert!(cg_position_rotated_entity_on_tag(&mut child, &parent, 9, "tag_orb", &imports));
        for i in 0..3 {
            assert_vec_near(&child.axis[i], &spin[i], 1e-6);
        }
    }

    // -------------------------------------------------------
    // interpolation
    // -------------------------------------------------------

    fn missile_pair(tr_type: TrType) -> CEntity {
        let mut cent = cent_of(7, EntityType::Missile, VEC3_ORIGIN);
        cent.current_state.pos = Trajectory {
            tr_type,
            tr_time: 1000,
            tr_base: [0.0, 0.0, 0.0],
            tr_delta: [100.0, 0.0, 0.0],
            ..Default::default()
        };
        cent.next_state.pos = Trajectory {
            tr_type,
            tr_time: 1100,
            tr_base: [10.0, 0.0, 0.0],
            tr_delta: [100.0, 0.0, 0.0],
            ..Default::default()
        };
        cent.interpolate = true;
        cent
    }

    fn bracketed_fc(time: i32, fraction: f32) -> FrameContext {
        let mut fc = fc_at(time);
        fc.snap_server_time = 1000;
        fc.next_snap_server_time = Some(1100);
        fc.frame_interpolation = fraction;
        fc
    }

    #[test]
    fn test_missile_halfway_between_snapshots() {
        for tr_type in [TrType::Linear, TrType::Interpolate] {
            let mut cent = missile_pair(tr_type);
            cg_calc_entity_lerp_positions(&mut cent, &bracketed_fc(1050, 0.5), &[], false);
            assert_vec_near(&cent.lerp_origin, &[5.0, 0.0, 0.0], 1e-4);
        }
    }

    #[test]
    fn test_fraction_endpoints_match_snapshots() {
        let mut cent = missile_pair(TrType::Interpolate);
        cg_calc_entity_lerp_positions(&mut cent, &bracketed_fc(1000, 0.0), &[], false);
        assert_eq!(cent.lerp_origin, bg_evaluate_trajectory(&cent.current_state.pos, 1000));

        cg_calc_entity_lerp_positions(&mut cent, &bracketed_fc(1100, 1.0), &[], false);
        assert_eq!(cent.lerp_origin, bg_evaluate_trajectory(&cent.next_state.pos, 1100));
    }

    #[test]
    fn test_angles_blend_the_short_way() {
        let mut cent = missile_pair(TrType::Interpolate);
        cent.current_state.apos.tr_base = [0.0, 350.0, 0.0];
        cent.next_state.apos.tr_base = [0.0, 10.0, 0.0];
        cg_calc_entity_lerp_positions(&mut cent, &bracketed_fc(1050, 0.5), &[], false);
        assert!((cent.lerp_angles[YAW] - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_next_snapshot_falls_back_to_direct_evaluation() {
        let mut cent = missile_pair(TrType::Linear);
        cent.current_state.number = 200;
        let mut fc = fc_at(1050);
        fc.snap_server_time = 1000;
        cg_calc_entity_lerp_positions(&mut cent, &fc, &[], false);
        assert_vec_near(&cent.lerp_origin, &[5.0, 0.0, 0.0], 1e-4);
    }

    #[test]
    fn test_clients_forced_to_interpolate_unless_smoothing() {
        let mut cent = missile_pair(TrType::Linear);
        cent.current_state.number = 3;
        let fc = bracketed_fc(1050, 0.5);
        cg_calc_entity_lerp_positions(&mut cent, &fc, &[], false);
        assert_eq!(cent.current_state.pos.tr_type, TrType::Interpolate);

        let mut cent = missile_pair(TrType::Linear);
        cent.current_state.number = 3;
        let mut fc = bracketed_fc(1050, 0.5);
        fc.config.smooth_clients = true;
        cg_calc_entity_lerp_positions(&mut cent, &fc, &[], false);
        assert_eq!(cent.current_state.pos.tr_type, TrType::Linear);
    }

    #[test]
    fn test_linear_stop_client_interpolates_when_smoothing() {
        let mut cent = missile_pair(TrType::LinearStop);
        cent.current_state.number = 3;
        cent.current_state.pos.tr_duration = 10;
        let mut fc = bracketed_fc(1050, 0.5);
        fc.config.smooth_clients = true;
        cg_calc_entity_lerp_positions(&mut cent, &fc, &[], false);
        // current frozen at 1000 -> base, next at 1100 -> (10,0,0)
        assert_vec_near(&cent.lerp_origin, &[5.0, 0.0, 0.0], 1e-4);
    }

    fn mover_table() -> Vec<CEntity> {
        let mut table = vec![CEntity::default(); 8];
        let mut mover = cent_of(5, EntityType::Mover, VEC3_ORIGIN);
        mover.current_state.pos = Trajectory {
            tr_type: TrType::Linear,
            tr_time: 0,
            tr_delta: [0.0, 0.0, 100.0],
            ..Default::default()
        };
        table[5] = mover;
        table[6] = cent_of(6, EntityType::General, VEC3_ORIGIN);
        table
    }

    #[test]
    fn test_rider_follows_mover() {
        let table = mover_table();
        let out = cg_adjust_position_for_mover(&[1.0, 1.0, 1.0], 5, 1000, 1100, &table);
        assert_vec_near(&out, &[1.0, 1.0, 11.0], 1e-4);

        // not a mover, or out of range
        assert_eq!(cg_adjust_position_for_mover(&[1.0; 3], 6, 1000, 1100, &table), [1.0; 3]);
        assert_eq!(cg_adjust_position_for_mover(&[1.0; 3], 0, 1000, 1100, &table), [1.0; 3]);
        assert_eq!(cg_adjust_position_for_mover(&[1.0; 3], ENTITYNUM_WORLD, 1000, 1100, &table), [1.0; 3]);
    }

    #[test]
    fn test_direct_evaluation_rides_mover_except_predicted() {
        let table = mover_table();
        let mut fc = fc_at(1100);
        fc.snap_server_time = 1000;

        let mut cent = cent_of(200, EntityType::General, [0.0; 3]);
        cent.current_state.ground_entity_num = 5;
        cg_calc_entity_lerp_positions(&mut cent, &fc, &table, false);
        assert_vec_near(&cent.lerp_origin, &[0.0, 0.0, 10.0], 1e-4);

        cg_calc_entity_lerp_positions(&mut cent, &fc, &table, true);
        assert_eq!(cent.lerp_origin, [0.0; 3]);
    }

    // -------------------------------------------------------
    // dispatch
    // -------------------------------------------------------

    #[test]
    fn test_events_only_entity_does_nothing() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(40, EntityType::General, [1.0, 2.0, 3.0]);
        cent.current_state.e_type = ET_EVENTS + 3;
        cent.current_state.loop_sound = 1;
        cent.current_state.constant_light = 0x7f_ff_ff_ff;

        assert!(present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).is_ok());
        assert!(cg.view.r_entities.is_empty());
        assert!(cg.view.r_dlights.is_empty());
        assert!(imports.calls.is_empty());
        assert!(!cg.frame_hist.is_in_pvs(40));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(41, EntityType::General, VEC3_ORIGIN);
        cent.current_state.e_type = -2;
        assert_eq!(
            present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent),
            Err(CgError::BadEntityType { number: 41, e_type: -2 })
        );
    }

    #[test]
    fn test_player_is_handed_to_player_presenter() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(2, EntityType::Player, VEC3_ORIGIN);
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| *c == Call::Player(2)), 1);
        assert!(cg.frame_hist.is_in_pvs(2));
    }

    #[test]
    fn test_triggers_and_invisible_emit_nothing() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        let mut imports = RecordingImports::default();
        for t in [EntityType::Invisible, EntityType::PushTrigger, EntityType::TeleportTrigger, EntityType::Torch] {
            let mut cent = cent_of(100, t, VEC3_ORIGIN);
            present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        }
        assert!(cg.view.r_entities.is_empty());
        // only the sound position refresh happens
        assert!(imports.calls.iter().all(|c| matches!(c, Call::UpdateEntityPosition(..))));
    }

    // -------------------------------------------------------
    // automatic effects
    // -------------------------------------------------------

    #[test]
    fn test_constant_light_unpacks() {
        let (i, c) = cg_unpack_constant_light(255 | (128 << 8) | (0 << 16) | (50 << 24));
        assert_eq!(i, 200.0);
        assert_vec_near(&c, &[1.0, 128.0 / 255.0, 0.0], 1e-6);
    }

    #[test]
    fn test_effects_sound_and_light() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_sounds: vec![0, 0, 0, 33],
            inline_model_midpoints: vec![VEC3_ORIGIN, [0.0, 0.0, 16.0]],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();

        let mut cent = cent_of(50, EntityType::Invisible, [8.0, 0.0, 0.0]);
        cent.current_state.loop_sound = 3;
        cent.current_state.constant_light = 10 << 24;
        cent.current_state.solid = SOLID_BMODEL;
        cent.current_state.model_index = 1;
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();

        assert_eq!(imports.calls[0], Call::UpdateEntityPosition(50, [8.0, 0.0, 16.0]));
        assert_eq!(imports.calls[1], Call::AddLoopingSound(50, [8.0, 0.0, 0.0], VEC3_ORIGIN, 33));
        assert_eq!(cg.view.r_dlights.len(), 1);
        assert_eq!(cg.view.r_dlights[0].intensity, 40.0);
    }

    #[test]
    fn test_speaker_loops_are_real_loops() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_sounds: vec![0, 21],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(51, EntityType::Speaker, VEC3_ORIGIN);
        cent.current_state.loop_sound = 1;
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| matches!(c, Call::AddRealLoopingSound(51, _, 21))), 1);
    }

    // -------------------------------------------------------
    // presenters
    // -------------------------------------------------------

    #[test]
    fn test_general_model_and_third_person() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_models: vec![0, 77],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut fc = fc_at(1000);
        fc.view_client_num = 4;

        let mut cent = cent_of(4, EntityType::General, [1.0, 2.0, 3.0]);
        cent.current_state.model_index = 1;
        cent.current_state.frame = 6;
        present(&mut cg, &cgs, &fc, &mut imports, &mut cent).unwrap();

        let re = &cg.view.r_entities[0];
        assert_eq!(re.h_model, 77);
        assert_eq!(re.frame, 6);
        assert_eq!(re.oldframe, 6);
        assert_eq!(re.origin, [1.0, 2.0, 3.0]);
        assert!(re.renderfx.contains(RenderFx::THIRD_PERSON));
    }

    #[test]
    fn test_general_zero_model_is_skipped_bad_model_is_fatal() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_models: vec![0, 77],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();

        let mut cent = cent_of(60, EntityType::General, VEC3_ORIGIN);
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert!(cg.view.r_entities.is_empty());

        cent.current_state.model_index = 9;
        assert_eq!(
            present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent),
            Err(CgError::BadModelIndex { number: 60, index: 9 })
        );
    }

    #[test]
    fn test_speaker_without_client_num_never_triggers() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(70, EntityType::Speaker, VEC3_ORIGIN);
        cent.current_state.frame = 1;
        for t in (0..100_000).step_by(5000) {
            present(&mut cg, &cgs, &fc_at(t), &mut imports, &mut cent).unwrap();
        }
        assert_eq!(imports.count(|c| matches!(c, Call::StartSound(..))), 0);
    }

    #[test]
    fn test_speaker_retriggers_after_cooldown() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_sounds: vec![0, 0, 14],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(71, EntityType::Speaker, VEC3_ORIGIN);
        cent.current_state.client_num = 1; // +-100 msec of jitter
        cent.current_state.frame = 10; // one second wait
        cent.current_state.event_parm = 2;

        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.calls.last(), Some(&Call::StartSound(None, 71, SoundChannel::Item, 14)));
        assert!((1900..=2100).contains(&cent.misc_time));

        present(&mut cg, &cgs, &fc_at(1500), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| matches!(c, Call::StartSound(..))), 1);

        present(&mut cg, &cgs, &fc_at(2200), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| matches!(c, Call::StartSound(..))), 2);
    }

    #[test]
    fn test_speaker_huge_wait_saturates() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_sounds: vec![0, 0, 14],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(72, EntityType::Speaker, VEC3_ORIGIN);
        cent.current_state.client_num = 1;
        cent.current_state.frame = i32::MAX;
        cent.current_state.event_parm = 2;

        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert!(cent.misc_time > 2_000_000_000);

        present(&mut cg, &cgs, &fc_at(2_000_000_000), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| matches!(c, Call::StartSound(..))), 1);
    }

    #[test]
    fn test_item_bob_is_bounded_and_periodic() {
        for number in [0, 17, 511] {
            let scale = 0.005 + number as f64 * 0.00001;
            let period = 2.0 * std::f64::consts::PI / scale;
            for t in (0..200_000).step_by(997) {
                let t = t as f64;
                let b = cg_item_bob_offset(number, t);
                assert!((0.0..=8.0).contains(&b), "bob {} out of range", b);
                assert!((b - cg_item_bob_offset(number, t + period)).abs() < 1e-3);
            }
        }
    }

    fn item_cgs() -> CgStatic {
        let item = |gi_type, gi_tag| GItem {
            classname: String::new(),
            gi_type,
            gi_tag,
        };
        CgStatic {
            item_list: vec![
                item(ItemType::Bad, 0),
                item(ItemType::Weapon, 1),
                item(ItemType::Powerup, 0),
                item(ItemType::Team, 0),
            ],
            items: vec![
                ItemInfo::default(),
                ItemInfo { registered: true, models: [11, 0, 0, 0], icon: 91 },
                ItemInfo { registered: true, models: [12, 13, 0, 0], icon: 92 },
                ItemInfo { registered: true, models: [14, 0, 0, 0], icon: 93 },
            ],
            weapons: vec![
                WeaponInfo::default(),
                WeaponInfo {
                    weapon_midpoint: [2.0, 0.0, 0.0],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_item_weapon_is_offset_scaled_and_lit() {
        let mut cg = CgState::new(0);
        let cgs = item_cgs();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(300, EntityType::Item, [0.0, 0.0, 0.0]);
        cent.current_state.model_index = 1;

        let fc = fc_at(5000);
        present(&mut cg, &cgs, &fc, &mut imports, &mut cent).unwrap();
        assert_eq!(cg.view.r_entities.len(), 1);
        let re = &cg.view.r_entities[0];
        let bob = cg_item_bob_offset(300, 5000.0);
        assert_vec_near(&re.origin, &[-2.0, 0.0, bob + 8.0], 1e-4);
        assert!(re.renderfx.contains(RenderFx::MINLIGHT));
        assert!(re.non_normalized_axes);
        assert_vec_near(&re.axis[0], &[1.5, 0.0, 0.0], 1e-5);
    }

    #[test]
    fn test_item_respawn_scales_up() {
        let mut cg = CgState::new(0);
        let cgs = item_cgs();
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(301, EntityType::Item, VEC3_ORIGIN);
        cent.current_state.model_index = 2;
        cent.misc_time = 4750;

        present(&mut cg, &cgs, &fc_at(5000), &mut imports, &mut cent).unwrap();
        // base model plus the companion ring
        assert_eq!(cg.view.r_entities.len(), 2);
        assert_vec_near(&cg.view.r_entities[0].axis[0], &[0.25, 0.0, 0.0], 1e-5);
        let ring = &cg.view.r_entities[1];
        assert_eq!(ring.h_model, 13);
        assert!((ring.origin[2] - cg.view.r_entities[0].origin[2] - 12.0).abs() < 1e-4);
        assert!((vector_length(&ring.axis[0]) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_simple_items_draw_sprites_except_team() {
        let mut cg = CgState::new(0);
        let cgs = item_cgs();
        let mut imports = RecordingImports::default();
        let mut fc = fc_at(5000);
        fc.config.simple_items = true;

        let mut cent = cent_of(302, EntityType::Item, [5.0, 5.0, 5.0]);
        cent.current_state.model_index = 2;
        present(&mut cg, &cgs, &fc, &mut imports, &mut cent).unwrap();
        assert_eq!(cg.view.r_entities.len(), 1);
        assert_eq!(cg.view.r_entities[0].re_type, RefType::Sprite);
        assert_eq!(cg.view.r_entities[0].radius, 14.0);
        assert_eq!(cg.view.r_entities[0].custom_shader, 92);
        assert_eq!(cg.view.r_entities[0].origin, [5.0, 5.0, 5.0]);

        let mut team = cent_of(303, EntityType::Item, VEC3_ORIGIN);
        team.current_state.model_index = 3;
        present(&mut cg, &cgs, &fc, &mut imports, &mut team).unwrap();
        assert_eq!(cg.view.r_entities[1].re_type, RefType::Model);
        assert_eq!(cg.view.r_entities[1].h_model, 14);
    }

    #[test]
    fn test_item_nodraw_skips_and_bad_index_is_fatal() {
        let mut cg = CgState::new(0);
        let cgs = item_cgs();
        let mut imports = RecordingImports::default();

        let mut cent = cent_of(304, EntityType::Item, VEC3_ORIGIN);
        cent.current_state.model_index = 1;
        cent.current_state.e_flags = EntityFlags::NODRAW;
        present(&mut cg, &cgs, &fc_at(5000), &mut imports, &mut cent).unwrap();
        assert!(cg.view.r_entities.is_empty());

        cent.current_state.model_index = 4;
        assert_eq!(
            present(&mut cg, &cgs, &fc_at(5000), &mut imports, &mut cent),
            Err(CgError::BadItemIndex { number: 304, index: 4 })
        );
    }

    #[test]
    fn test_mover_skin_flickers_and_adds_secondary() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_models: vec![0, 0, 55],
            inline_draw_model: vec![0, 44],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(400, EntityType::Mover, VEC3_ORIGIN);
        cent.current_state.solid = SOLID_BMODEL;
        cent.current_state.model_index = 1;
        cent.current_state.model_index2 = 2;

        present(&mut cg, &cgs, &fc_at(64), &mut imports, &mut cent).unwrap();
        assert_eq!(cg.view.r_entities.len(), 2);
        assert_eq!(cg.view.r_entities[0].h_model, 44);
        assert_eq!(cg.view.r_entities[0].skin_num, 1);
        assert!(cg.view.r_entities[0].renderfx.contains(RenderFx::NOSHADOW));
        assert_eq!(cg.view.r_entities[1].h_model, 55);
        assert_eq!(cg.view.r_entities[1].skin_num, 0);
    }

    #[test]
    fn test_beam_is_two_points() {
        let mut view = ViewState::new();
        let mut cent = cent_of(401, EntityType::Beam, [1.0, 2.0, 3.0]);
        cent.current_state.origin2 = [4.0, 5.0, 6.0];
        cg_beam(&cent, &mut view);
        let re = &view.r_entities[0];
        assert_eq!(re.re_type, RefType::Beam);
        assert_eq!(re.origin, [1.0, 2.0, 3.0]);
        assert_eq!(re.oldorigin, [4.0, 5.0, 6.0]);
        assert_eq!(re.axis, AXIS_DEFAULT);
    }

    #[test]
    fn test_portal_up_direction_gives_orthonormal_basis() {
        // byte 5 is straight up
        let axis = cg_portal_axis(5).unwrap();
        assert_vec_near(&axis[0], &[0.0, 0.0, 1.0], 1e-6);
        for i in 0..3 {
            assert!((vector_length(&axis[i]) - 1.0).abs() < 1e-5);
            for j in (i + 1)..3 {
                assert!(dot_product(&axis[i], &axis[j]).abs() < 1e-5);
            }
        }

        let mut view = ViewState::new();
        let mut cent = cent_of(402, EntityType::Portal, VEC3_ORIGIN);
        cent.current_state.event_parm = 5;
        cent.current_state.client_num = 128;
        cent.current_state.frame = 3;
        cent.current_state.powerups = 2;
        cg_portal(&cent, &mut view);
        let re = &view.r_entities[0];
        assert_eq!(re.re_type, RefType::PortalSurface);
        assert_eq!(re.skin_num, 180);
        assert_eq!(re.frame, 3);
        assert_eq!(re.oldframe, 2);
    }

    #[test]
    fn test_portal_bad_direction_is_skipped() {
        assert!(cg_portal_axis(-1).is_none());
        assert!(cg_portal_axis(5000).is_none());
    }

    #[test]
    fn test_grapple_cable_skipped_when_close() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            weapons: vec![WeaponInfo {
                missile_model: 66,
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();

        // owner at the origin, looking level
        cg.entities[1] = cent_of(1, EntityType::Player, VEC3_ORIGIN);

        let mut near = cent_of(500, EntityType::Grapple, [0.0, 0.0, 60.0]);
        near.current_state.other_entity_num = 1;
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut near).unwrap();
        assert!(cg.view.r_entities.iter().all(|re| re.re_type != RefType::Lightning));

        let mut far = cent_of(501, EntityType::Grapple, [200.0, 0.0, 0.0]);
        far.current_state.other_entity_num = 1;
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut far).unwrap();
        let cable = cg
            .view
            .r_entities
            .iter()
            .find(|re| re.re_type == RefType::Lightning)
            .expect("cable");
        assert_vec_near(&cable.origin, &[0.0, 0.0, 20.0], 1e-4);
        assert_eq!(cable.oldorigin, [200.0, 0.0, 0.0]);
        assert_eq!(far.trail_time, 1000);

        let hook = cg.view.r_entities.iter().filter(|re| re.h_model == 66).count();
        assert_eq!(hook, 2);
    }

    #[test]
    fn test_ctf_team_base_by_team() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            media: CgMedia {
                red_flag_base_model: 1,
                blue_flag_base_model: 2,
                neutral_flag_base_model: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut fc = fc_at(1000);
        fc.gametype = Gametype::Ctf;

        for (team, want) in [(TEAM_RED, 1), (TEAM_BLUE, 2), (TEAM_FREE, 3)] {
            let mut cent = cent_of(600, EntityType::Team, VEC3_ORIGIN);
            cent.current_state.model_index = team;
            present(&mut cg, &cgs, &fc, &mut imports, &mut cent).unwrap();
            assert_eq!(cg.view.r_entities.last().map(|re| re.h_model), Some(want));
        }

        // nothing outside team modes
        let before = cg.view.r_entities.len();
        let mut cent = cent_of(601, EntityType::Team, VEC3_ORIGIN);
        present(&mut cg, &cgs, &fc_at(1000), &mut imports, &mut cent).unwrap();
        assert_eq!(cg.view.r_entities.len(), before);
    }

    #[test]
    fn test_obelisk_respawn_sequence() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            media: CgMedia {
                overload_base_model: 1,
                overload_lights_model: 3,
                overload_target_model: 4,
                obelisk_respawn_sound: 99,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut imports = RecordingImports::default();
        let mut cent = cent_of(602, EntityType::Team, VEC3_ORIGIN);
        cent.current_state.frame = 2;

        let frame = |t: i32| {
            let mut fc = fc_at(t);
            fc.gametype = Gametype::Obelisk;
            fc
        };

        // respawn starts: lights dark, no target yet (delay 10 -> h = 5000)
        present(&mut cg, &cgs, &frame(10_000), &mut imports, &mut cent).unwrap();
        assert_eq!(cent.misc_time, 10_000);
        assert_eq!(cg.view.r_entities.len(), 2);
        assert_eq!(cg.view.r_entities[1].shader_rgba, [0; 4]);

        // half way through the glow: target appears with one sound
        cg.view.r_entities.clear();
        present(&mut cg, &cgs, &frame(17_500), &mut imports, &mut cent).unwrap();
        assert_eq!(cg.view.r_entities.len(), 3);
        assert_eq!(cg.view.r_entities[2].h_model, 4);
        assert_eq!(cg.view.r_entities[2].origin[2], 56.0);
        present(&mut cg, &cgs, &frame(18_000), &mut imports, &mut cent).unwrap();
        assert_eq!(imports.count(|c| matches!(c, Call::StartSound(_, _, SoundChannel::Body, 99))), 1);

        // back to normal resets the sequence
        cent.current_state.frame = 0;
        present(&mut cg, &cgs, &frame(20_000), &mut imports, &mut cent).unwrap();
        assert_eq!(cent.misc_time, 0);
        assert_eq!(cent.muzzle_flash_time, 0);
    }

    // -------------------------------------------------------
    // frame driver
    // -------------------------------------------------------

    fn snapshot(server_time: i32, entities: Vec<EntityState>) -> Snapshot {
        Snapshot {
            server_time,
            entities,
            ..Default::default()
        }
    }

    #[test]
    fn test_frame_context_fraction() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic::default();
        cg.snap = Some(snapshot(1000, vec![]));
        cg.next_snap = Some(snapshot(1100, vec![]));
        cg.time = 1025;
        cg.frametime = 16;

        let fc = cg_build_frame_context(&cg, &cgs, &CgConfig::default()).unwrap();
        assert!((fc.frame_interpolation - 0.25).abs() < 1e-6);
        assert_eq!(fc.snapshot_interval, 100);

        cg.next_snap = Some(snapshot(1000, vec![]));
        let fc = cg_build_frame_context(&cg, &cgs, &CgConfig::default()).unwrap();
        assert_eq!(fc.frame_interpolation, 0.0);

        cg.next_snap = None;
        let fc = cg_build_frame_context(&cg, &cgs, &CgConfig::default()).unwrap();
        assert_eq!(fc.frame_interpolation, 0.0);
        assert_eq!(fc.snapshot_interval, 16);

        cg.snap = None;
        assert!(cg_build_frame_context(&cg, &cgs, &CgConfig::default()).is_none());
    }

    #[test]
    fn test_auto_rotation_angles() {
        let mut cg = CgState::new(0);
        cg.snap = Some(snapshot(0, vec![]));
        cg.time = 1024 + 512;
        let fc = cg_build_frame_context(&cg, &CgStatic::default(), &CgConfig::default()).unwrap();
        assert!((fc.auto_angles[YAW] - 270.0).abs() < 1e-4);
        assert!((fc.auto_angles_fast[YAW] - 180.0).abs() < 1e-4);
        assert_vec_near(&fc.auto_axis_fast[0], &[-1.0, 0.0, 0.0], 1e-5);
    }

    #[test]
    fn test_packet_entities_present_in_snapshot_order() {
        let mut cg = CgState::new(0);
        let cgs = CgStatic {
            game_models: vec![0, 10, 20],
            ..Default::default()
        };
        let mut imports = RecordingImports::default();

        let mut a = cent_of(30, EntityType::General, VEC3_ORIGIN).current_state;
        a.model_index = 2;
        let mut b = cent_of(12, EntityType::General, VEC3_ORIGIN).current_state;
        b.model_index = 1;
        cg.entities[30].current_state = a.clone();
        cg.entities[12].current_state = b.clone();
        cg.snap = Some(snapshot(1000, vec![a, b]));
        cg.time = 1000;
        cg.predicted_player_state.stats[STAT_HEALTH] = 100;

        let fc = cg_build_frame_context(&cg, &cgs, &CgConfig::default()).unwrap();
        cg_add_packet_entities(&mut cg, &cgs, &fc, &mut imports).unwrap();

        let models: Vec<QHandle> = cg.view.r_entities.iter().map(|re| re.h_model).collect();
        assert_eq!(models, vec![20, 10]);
        // predicted player went to the player presenter first
        assert_eq!(imports.calls.iter().find(|c| matches!(c, Call::Player(_))), Some(&Call::Player(0)));
        assert!(cg.frame_hist.is_in_pvs(30));
        assert!(cg.frame_hist.is_in_pvs(12));
    }
}
