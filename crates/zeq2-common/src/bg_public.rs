// bg_public.rs -- definitions shared by both the server game and client game modules
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use crate::q_shared::*;

// ============================================================
// Trajectories
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum TrType {
    #[default]
    Stationary = 0,
    Interpolate, // non-parametric, but interpolate between snapshots
    Linear,
    LinearStop,
    NonLinearStop, // accelerates along the delta until the stop time
    Sine,          // value = base + sin( time / duration ) * delta
    Gravity,
    Accel, // value = base + delta * t + 0.5 * accel * t^2 along delta
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trajectory {
    pub tr_type: TrType,
    pub tr_time: i32,
    pub tr_duration: i32, // if non 0, tr_time + tr_duration = stop time
    pub tr_base: Vec3,
    pub tr_delta: Vec3, // velocity, etc
    pub tr_accel: f32,
}

// ============================================================
// Entity types
// ============================================================

/// entityType_t. Stored raw (`i32`) in `EntityState::e_type` so that
/// corrupted values survive to dispatch and can be rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EntityType {
    General = 0,
    Player,
    Item,
    Missile,
    Mover,
    Beam,
    Portal,
    Speaker,
    PushTrigger,
    TeleportTrigger,
    Invisible,
    Grapple, // grapple hooked on wall
    Team,
    BeamHead,
    Skimmer,
    Torch,
}

/// Any of the EV_* events can be added freestanding by setting e_type
/// to ET_EVENTS + eventNum.
pub const ET_EVENTS: i32 = 16;

impl EntityType {
    pub fn from_i32(v: i32) -> Option<Self> {
        Some(match v {
            0 => Self::General,
            1 => Self::Player,
            2 => Self::Item,
            3 => Self::Missile,
            4 => Self::Mover,
            5 => Self::Beam,
            6 => Self::Portal,
            7 => Self::Speaker,
            8 => Self::PushTrigger,
            9 => Self::TeleportTrigger,
            10 => Self::Invisible,
            11 => Self::Grapple,
            12 => Self::Team,
            13 => Self::BeamHead,
            14 => Self::Skimmer,
            15 => Self::Torch,
            _ => return None,
        })
    }
}

bitflags::bitflags! {
    /// entityState_t->eFlags
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntityFlags: i32 {
        const DEAD          = 0x00000001; // don't draw a foe marker over players with EF_DEAD
        const TELEPORT_BIT  = 0x00000004; // toggled every time the origin abruptly changes
        const AWARD_EXCELLENT = 0x00000008;
        const BOUNCE        = 0x00000010; // for missiles
        const BOUNCE_HALF   = 0x00000020; // for missiles
        const NODRAW        = 0x00000080; // may have an event, but no model (unspawned items)
        const FIRING        = 0x00000100; // for lightning gun
        const MOVER_STOP    = 0x00000400; // will push otherwise
        const CONNECTION    = 0x00002000; // draw a connection trouble sprite
        const GUIDED        = 0x00100000; // missile steered by its owner
    }
}

pub const SOLID_BMODEL: i32 = 0xffffff;

/// entityState_t -- the information conveyed from the server
/// in an update message about entities that the client will
/// need to render in some way.
///
/// Several fields are reused per type: `client_num` is the owner of
/// missiles and the auto-trigger interval of speakers, `powerups`
/// carries a missile's charge level, `model_index2` the obelisk health.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityState {
    pub number: i32, // entity index
    pub e_type: i32, // entityType_t
    pub e_flags: EntityFlags,

    pub pos: Trajectory,  // for calculating position
    pub apos: Trajectory, // for calculating angles

    pub time: i32,
    pub time2: i32,

    pub origin: Vec3,
    pub origin2: Vec3,

    pub angles: Vec3,
    pub angles2: Vec3,

    pub other_entity_num: i32, // shotgun sources, etc
    pub other_entity_num2: i32,

    pub ground_entity_num: i32, // -1 = in air

    pub constant_light: i32, // r + (g<<8) + (b<<16) + (intensity<<24)
    pub loop_sound: i32,     // constantly loop this sound

    pub model_index: i32,
    pub model_index2: i32,
    pub client_num: i32, // 0 to (MAX_CLIENTS - 1), for players and corpses
    pub frame: i32,

    pub solid: i32, // for client side prediction, trap_linkentity sets this properly

    pub event: i32, // impulse events -- muzzle flashes, footsteps, etc
    pub event_parm: i32,

    // for players
    pub powerups: i32, // bit flags
    pub weapon: i32,   // determines weapon and flash model, etc
    pub legs_anim: i32,
    pub torso_anim: i32,

    pub generic1: i32,
}

// ============================================================
// Player state
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PmType {
    #[default]
    Normal = 0, // can accelerate and turn
    NoClip,      // noclip movement
    Spectator,   // still run into walls
    Dead,        // no acceleration or turning, but free falling
    Freeze,      // stuck in place with no control
    Intermission, // no movement or status bar
    SpIntermission,
}

pub const MAX_STATS: usize = 16;
pub const MAX_POWERUPS: usize = 16;

pub const STAT_HEALTH: usize = 0;

pub const GIB_HEALTH: i32 = -40;

/// playerState_t -- the subset the client game needs to rebuild the
/// predicted player entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub command_time: i32,
    pub pm_type: PmType,
    pub client_num: i32,

    pub origin: Vec3,
    pub velocity: Vec3,
    pub viewangles: Vec3,
    pub movement_dir: i32,

    pub ground_entity_num: i32,
    pub e_flags: EntityFlags,

    pub weapon: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub loop_sound: i32,
    pub generic1: i32,

    pub stats: [i32; MAX_STATS],
    pub powerups: [i32; MAX_POWERUPS], // level.time that the powerup runs out
}

// ============================================================
// Items
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ItemType {
    #[default]
    Bad = 0,
    Weapon, // EFX: rotate + upscale + minlight
    Ammo,   // EFX: rotate
    Armor,  // EFX: rotate + minlight
    Health, // EFX: static external sphere + rotating internal
    Powerup, // instant on, timer based
    // EFX: rotate + external ring that rotates
    Holdable, // single use, holdable item
    // EFX: rotate + bob
    PersistantPowerup,
    Team,
}

/// gitem_t -- one entry of the item list.
#[derive(Debug, Clone, Default)]
pub struct GItem {
    pub classname: String, // spawning name
    pub gi_type: ItemType,
    pub gi_tag: i32,
}

// ============================================================
// Game types and teams
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Gametype {
    #[default]
    Ffa = 0, // free for all
    Tournament, // one on one tournament
    Single,     // single player ffa
    Team,       // team deathmatch
    Ctf,        // capture the flag
    OneFlagCtf,
    Obelisk,
    Harvester,
}

pub const TEAM_FREE: i32 = 0;
pub const TEAM_RED: i32 = 1;
pub const TEAM_BLUE: i32 = 2;
pub const TEAM_SPECTATOR: i32 = 3;
