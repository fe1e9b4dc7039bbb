// tr_types.rs -- scene submission types handed to the renderer
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::q_shared::*;

pub const MAX_REFENTITIES: usize = 1023; // can't be increased without changing drawsurf bit packing
pub const MAX_DLIGHTS: usize = 32; // can't be increased, because bit flags are used on surfaces

bitflags::bitflags! {
    /// refEntity_t->renderfx
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RenderFx: i32 {
        const MINLIGHT        = 0x0001; // allways have some light (viewmodel, some items)
        const THIRD_PERSON    = 0x0002; // don't draw through eyes, only mirrors (player bodies, chat sprites)
        const FIRST_PERSON    = 0x0004; // only draw through eyes (view weapon, damage blood blob)
        const DEPTHHACK       = 0x0008; // for view weapon Z crunching
        const NOSHADOW        = 0x0040; // don't add stencil shadows
        const LIGHTING_ORIGIN = 0x0080; // use refEntity->lightingOrigin instead of refEntity->origin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefType {
    #[default]
    Model,
    Poly,
    Sprite,
    Beam,
    RailCore,
    RailRings,
    Lightning,
    PortalSurface, // doesn't draw anything, just info for portals
    Line,          // flat ribbon between origin and oldorigin, radius is half width
}

/// refEntity_t
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefEntity {
    pub re_type: RefType,
    pub renderfx: RenderFx,

    pub h_model: QHandle, // opaque type outside refresh

    // most recent data
    pub lighting_origin: Vec3, // so multi-part models can be lit identically (RF_LIGHTING_ORIGIN)

    pub axis: Axis,               // rotation vectors
    pub non_normalized_axes: bool, // axis are not normalized, i.e. they have scale
    pub origin: Vec3,             // also used as MODEL_BEAM's "from"
    pub frame: i32,               // also used as MODEL_BEAM's diameter

    // previous data for frame interpolation
    pub oldorigin: Vec3, // also used as MODEL_BEAM's "to"
    pub oldframe: i32,
    pub backlerp: f32, // 0.0 = current, 1.0 = old

    // texturing
    pub skin_num: i32,       // inline skin index
    pub custom_skin: QHandle, // NULL for default skin
    pub custom_shader: QHandle, // use one image for the entire thing

    // misc
    pub shader_rgba: [u8; 4], // colors used by rgbgen entity shaders

    // extra sprite information
    pub radius: f32,
    pub rotation: f32,
}

/// A dynamic light added to the scene for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DLight {
    pub origin: Vec3,
    pub intensity: f32,
    pub color: Vec3,
}
