// cg_weapongfx.rs -- per client, per weapon missile graphics
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::q_shared::*;

/// Weapon slots per client, primary and alternate fire.
pub const MAX_USER_WEAPONS: usize = 16;

/// cg_userWeapon_t -- how one client's weapon draws its projectiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserWeaponGraphics {
    // missile body
    pub missile_model: QHandle,
    pub missile_skin: QHandle,
    pub missile_shader: QHandle,
    pub missile_size: f32,
    pub missile_spin: Vec3, // degrees per 4 msec, per angle

    // growth with charge level
    pub charge_growth: bool,
    pub charge_start_pct: i32,
    pub charge_end_pct: i32,
    pub charge_startsize: f32,
    pub charge_endsize: f32,
    pub charge_tag: Vec<String>, // tags on the owner the charge and beam roots hang from

    // trails
    pub missile_trail_shader: QHandle,
    pub missile_trail_radius: f32,
    pub missile_trail_spiral_shader: QHandle,
    pub missile_trail_spiral_radius: f32,
    pub missile_trail_spiral_offset: f32,

    // light and sound
    pub missile_dlight_radius: f32,
    pub missile_dlight_color: Vec3,
    pub missile_sound: QHandle,

    pub missile_particle_system: String,
}

impl UserWeaponGraphics {
    /// First charge tag, or "" when none is configured.
    pub fn charge_tag0(&self) -> &str {
        self.charge_tag.first().map_or("", String::as_str)
    }
}

/// Every client's weapon graphics. Lookups never fail: unknown slots
/// resolve to an empty description that draws nothing.
#[derive(Debug, Clone)]
pub struct WeaponGraphicsTable {
    table: Vec<UserWeaponGraphics>,
    empty: UserWeaponGraphics,
}

impl Default for WeaponGraphicsTable {
    fn default() -> Self {
        Self {
            table: vec![UserWeaponGraphics::default(); MAX_CLIENTS * MAX_USER_WEAPONS],
            empty: UserWeaponGraphics::default(),
        }
    }
}

fn table_index(client_num: i32, weapon: i32) -> Option<usize> {
    let c = usize::try_from(client_num).ok().filter(|&c| c < MAX_CLIENTS)?;
    let w = usize::try_from(weapon).ok().filter(|&w| w < MAX_USER_WEAPONS)?;
    Some(c * MAX_USER_WEAPONS + w)
}

impl WeaponGraphicsTable {
    pub fn set(&mut self, client_num: i32, weapon: i32, gfx: UserWeaponGraphics) {
        match table_index(client_num, weapon) {
            Some(i) => self.table[i] = gfx,
            None => tracing::warn!(client_num, weapon, "weapon graphics slot out of range"),
        }
    }

    /// CG_FindUserWeaponGraphics
    pub fn find(&self, client_num: i32, weapon: i32) -> &UserWeaponGraphics {
        table_index(client_num, weapon)
            .and_then(|i| self.table.get(i))
            .unwrap_or(&self.empty)
    }
}
