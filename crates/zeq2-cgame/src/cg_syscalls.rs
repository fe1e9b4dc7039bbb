// cg_syscalls.rs -- everything the client game asks of the engine
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::q_shared::*;

use crate::cg_local::{CEntity, FrameContext};
use crate::cg_view::ViewState;

/// soundChannel_t
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SoundChannel {
    Auto = 0,
    Local,  // menu sounds, etc
    Weapon,
    Voice,
    Item,
    Body,
    LocalSound, // chat messages, etc
    Announcer,  // announcer voices, etc
}

/// Collaborators outside the presentation pipeline: the model/tag
/// provider, the sound system, the particle system and the player
/// presenter. Scene submissions go through `ViewState` instead.
pub trait CgameImports {
    /// trap_R_LerpTag -- local pose of `tag_name` blended between two
    /// frames of `model`. `None` when the model has no such tag.
    fn r_lerp_tag(
        &self,
        model: QHandle,
        start_frame: i32,
        end_frame: i32,
        frac: f32,
        tag_name: &str,
    ) -> Option<Orientation>;

    fn s_update_entity_position(&mut self, entity_num: i32, origin: &Vec3);
    fn s_add_looping_sound(&mut self, entity_num: i32, origin: &Vec3, velocity: &Vec3, sfx: QHandle);
    fn s_add_real_looping_sound(&mut self, entity_num: i32, origin: &Vec3, velocity: &Vec3, sfx: QHandle);
    fn s_start_sound(&mut self, origin: Option<&Vec3>, entity_num: i32, channel: SoundChannel, sfx: QHandle);

    /// Spawn a particle system anchored to `anchor_entity`.
    fn psys_spawn_cached_system(&mut self, name: &str, origin: &Vec3, axis: Option<&Axis>, anchor_entity: i32);

    /// Full player presentation (skeleton, weapon, auras). `cent` already
    /// carries its lerped pose for this frame.
    fn cg_player(&mut self, cent: &mut CEntity, fc: &FrameContext, view: &mut ViewState);

    /// World pose of a tag on the player model owned by `owner`.
    fn player_tag_orientation(&self, owner: &CEntity, tag_name: &str) -> Option<Orientation>;
}
