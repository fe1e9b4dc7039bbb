// cg_local.rs -- client game state shared by every presentation module
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use rayon::prelude::*;
use thiserror::Error;

use zeq2_common::bg_public::*;
use zeq2_common::q_shared::*;

use crate::cg_beamtables::BeamTables;
use crate::cg_framehist::FrameHistory;
use crate::cg_localents::LocalEntities;
use crate::cg_syscalls::CgameImports;
use crate::cg_trails::TrailSystem;
use crate::cg_view::ViewState;
use crate::cg_weapongfx::WeaponGraphicsTable;
use crate::tr_types::RenderFx;

pub const ITEM_SCALEUP_TIME: i32 = 1000;

pub const MAX_ITEM_MODELS: usize = 4;

// snapshot flags
pub const SNAPFLAG_RATE_DELAYED: i32 = 1;
pub const SNAPFLAG_NOT_ACTIVE: i32 = 2; // snapshot used during connection and for zombies
pub const SNAPFLAG_SERVERCOUNT: i32 = 4; // toggled every map_restart so transitions can be detected

// ============================================================
// Errors
// ============================================================

/// Conditions that abort presentation of the current frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CgError {
    #[error("Bad entity type: {e_type} on entity {number}")]
    BadEntityType { number: i32, e_type: i32 },
    #[error("Bad item index {index} on entity {number}")]
    BadItemIndex { number: i32, index: i32 },
    #[error("Bad model index {index} on entity {number}")]
    BadModelIndex { number: i32, index: i32 },
}

// ============================================================
// Snapshots and tracked entities
// ============================================================

/// snapshot_t -- everything the server says is visible at one tick.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub snap_flags: i32,
    pub server_time: i32, // server time the message is valid for (in msec)
    pub ps: PlayerState,  // complete information about the current player at this time
    pub entities: Vec<EntityState>, // all of the entities that need to be presented
}

/// centity_t -- have a direct corespondence with gentity_t in the game, but
/// only the entityState_t is directly communicated to the cgame
#[derive(Debug, Clone, Default)]
pub struct CEntity {
    pub current_state: EntityState, // from cg.frame
    pub next_state: EntityState,    // from cg.nextFrame, if available
    pub interpolate: bool,          // true if next is valid to interpolate to
    pub current_valid: bool,        // true if cg.frame holds this entity

    pub misc_time: i32, // speaker cooldown, item respawn, obelisk respawn start

    pub snap_shot_time: i32, // last time this entity was found in a snapshot

    pub trail_time: i32,      // so missile trails can handle dropped initial packets
    pub last_trail_time: i32, // last frame a fade tail was extended

    pub muzzle_flash_time: i32, // obelisk respawn sound latch

    // exact interpolated position of entity on this frame
    pub lerp_origin: Vec3,
    pub lerp_angles: Vec3,
}

/// Fresh MAX_GENTITIES table of tracked entity slots.
pub fn cg_alloc_entity_table() -> Vec<CEntity> {
    (0..MAX_GENTITIES)
        .into_par_iter()
        .map(|_| CEntity::default())
        .collect()
}

// ============================================================
// Per-frame configuration and context
// ============================================================

/// Console variables sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgConfig {
    pub smooth_clients: bool,
    pub simple_items: bool,
    pub tail_detail: f32,
    pub obelisk_respawn_delay: i32,
    pub developer: bool,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            smooth_clients: false,
            simple_items: false,
            tail_detail: 40.0,
            obelisk_respawn_delay: 10,
            developer: false,
        }
    }
}

/// Immutable view of the frame being presented. Built once by the frame
/// driver and handed to every presenter.
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub time: i32,         // this is the time value that the client is rendering at
    pub frametime: i32,    // msec since the last frame
    pub client_frame: i32, // incremented each frame

    pub snap_server_time: i32,
    pub next_snap_server_time: Option<i32>,
    pub frame_interpolation: f32, // (float)( cg.time - cg.frame->serverTime ) / (cg.nextFrame->serverTime - cg.frame->serverTime)
    pub snapshot_interval: i32,

    // auto rotating items
    pub auto_angles: Vec3,
    pub auto_axis: Axis,
    pub auto_angles_fast: Vec3,
    pub auto_axis_fast: Axis,

    pub view_client_num: i32, // snap.ps.client_num, may be a followed player
    pub client_num: i32,      // the local client

    pub gametype: Gametype,
    pub config: CgConfig,
}

// ============================================================
// Static client game data
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct CgMedia {
    pub red_flag_base_model: QHandle,
    pub blue_flag_base_model: QHandle,
    pub neutral_flag_base_model: QHandle,

    pub overload_base_model: QHandle,
    pub overload_target_model: QHandle,
    pub overload_lights_model: QHandle,
    pub overload_energy_model: QHandle,

    pub harvester_model: QHandle,
    pub harvester_red_skin: QHandle,
    pub harvester_blue_skin: QHandle,
    pub harvester_neutral_model: QHandle,

    pub lightning_shader: QHandle,

    pub obelisk_respawn_sound: QHandle,
}

/// Registered graphics for one entry of the item list.
#[derive(Debug, Clone, Default)]
pub struct ItemInfo {
    pub registered: bool,
    pub models: [QHandle; MAX_ITEM_MODELS],
    pub icon: QHandle,
}

/// Registered graphics for one weapon, used by items and the grapple.
#[derive(Debug, Clone, Default)]
pub struct WeaponInfo {
    pub registered: bool,
    pub weapon_midpoint: Vec3, // so it will rotate centered instead of by tag
    pub missile_model: QHandle,
    pub missile_sound: QHandle,
    pub missile_renderfx: RenderFx,
}

/// cgs_t -- state that only changes on level load or config string updates.
#[derive(Debug, Clone, Default)]
pub struct CgStatic {
    pub gametype: Gametype,

    pub game_models: Vec<QHandle>,
    pub game_sounds: Vec<QHandle>,

    pub inline_draw_model: Vec<QHandle>,
    pub inline_model_midpoints: Vec<Vec3>,

    pub item_list: Vec<GItem>,
    pub items: Vec<ItemInfo>,
    pub weapons: Vec<WeaponInfo>,

    pub media: CgMedia,
    pub weapon_graphics: WeaponGraphicsTable,
}

impl CgStatic {
    pub fn game_model(&self, number: i32, index: i32) -> Result<QHandle, CgError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.game_models.get(i).copied())
            .ok_or(CgError::BadModelIndex { number, index })
    }

    pub fn inline_model(&self, number: i32, index: i32) -> Result<QHandle, CgError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.inline_draw_model.get(i).copied())
            .ok_or(CgError::BadModelIndex { number, index })
    }

    /// Sound handles are advisory; a bad index just means silence.
    pub fn game_sound(&self, index: i32) -> QHandle {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.game_sounds.get(i).copied())
            .unwrap_or(0)
    }
}

// ============================================================
// Client game state
// ============================================================

/// Where the local client's guided missile is, for the camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuideState {
    pub target: Vec3,
    pub view: bool,
}

/// cg_t -- state that lives for the whole connection.
pub struct CgState {
    pub client_frame: i32, // incremented each frame
    pub client_num: i32,

    pub time: i32, // this is the time value that the client is rendering at
    pub old_time: i32,
    pub frametime: i32,

    pub snap: Option<Snapshot>,      // cg.snap->serverTime <= cg.time
    pub next_snap: Option<Snapshot>, // cg.nextSnap->serverTime > cg.time, or None
    pub this_frame_teleport: bool,
    pub next_frame_teleport: bool,

    pub frame_interpolation: f32,

    // prediction state
    pub predicted_player_state: PlayerState,
    pub predicted_player_entity: CEntity,

    pub entities: Vec<CEntity>, // cg_entities

    pub guide: GuideState,

    pub view: ViewState,
    pub local_entities: LocalEntities,
    pub trails: TrailSystem,
    pub beam_tables: BeamTables,
    pub frame_hist: FrameHistory,
}

impl CgState {
    pub fn new(client_num: i32) -> Self {
        Self {
            client_frame: 0,
            client_num,
            time: 0,
            old_time: 0,
            frametime: 0,
            snap: None,
            next_snap: None,
            this_frame_teleport: false,
            next_frame_teleport: false,
            frame_interpolation: 0.0,
            predicted_player_state: PlayerState::default(),
            predicted_player_entity: CEntity::default(),
            entities: cg_alloc_entity_table(),
            guide: GuideState::default(),
            view: ViewState::new(),
            local_entities: LocalEntities::new(),
            trails: TrailSystem::new(),
            beam_tables: BeamTables::new(),
            frame_hist: FrameHistory::default(),
        }
    }

    /// Slot for an entity number, if it is in range.
    pub fn entity_mut(&mut self, number: i32) -> Option<&mut CEntity> {
        usize::try_from(number).ok().and_then(move |i| self.entities.get_mut(i))
    }
}

// ============================================================
// Presenter plumbing
// ============================================================

/// The read-only world a presenter sees: frame context, level data and
/// every other tracked entity.
pub struct PresentEnv<'a> {
    pub fc: &'a FrameContext,
    pub cgs: &'a CgStatic,
    pub entities: &'a [CEntity],
}

impl PresentEnv<'_> {
    pub fn entity(&self, number: i32) -> Option<&CEntity> {
        usize::try_from(number).ok().and_then(|i| self.entities.get(i))
    }
}

/// Everything a presenter may write to during the frame.
pub struct FrameSinks<'a> {
    pub view: &'a mut ViewState,
    pub local_entities: &'a mut LocalEntities,
    pub trails: &'a mut TrailSystem,
    pub beam_tables: &'a mut BeamTables,
    pub frame_hist: &'a mut FrameHistory,
    pub guide: &'a mut GuideState,
    pub imports: &'a mut dyn CgameImports,
}

/// Borrow the entity table read-only alongside the mutable effect pools.
pub fn cg_split_frame<'a>(
    cg: &'a mut CgState,
    cgs: &'a CgStatic,
    fc: &'a FrameContext,
    imports: &'a mut dyn CgameImports,
) -> (PresentEnv<'a>, FrameSinks<'a>) {
    let CgState {
        entities,
        view,
        local_entities,
        trails,
        beam_tables,
        frame_hist,
        guide,
        ..
    } = cg;
    (
        PresentEnv {
            fc,
            cgs,
            entities: entities.as_slice(),
        },
        FrameSinks {
            view,
            local_entities,
            trails,
            beam_tables,
            frame_hist,
            guide,
            imports,
        },
    )
}
