// cg_main.rs -- initialization and per-frame console variable sampling
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::collections::VecDeque;

use zeq2_common::cvar::CvarContext;
use zeq2_common::q_shared::*;

use crate::cg_local::*;
use crate::cg_syscalls::CgameImports;
use crate::cg_view::cg_draw_active_frame;

/// Handles of the cgame's console variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CgCvars {
    pub smooth_clients: Option<usize>,
    pub simple_items: Option<usize>,
    pub tail_detail: Option<usize>,
    pub obelisk_respawn_delay: Option<usize>,
    pub developer: Option<usize>,
}

struct CvarTableEntry {
    name: &'static str,
    default: &'static str,
    flags: i32,
}

const CVAR_TABLE: &[CvarTableEntry] = &[
    CvarTableEntry { name: "cg_smoothClients", default: "0", flags: CVAR_USERINFO | CVAR_ARCHIVE },
    CvarTableEntry { name: "cg_simpleItems", default: "0", flags: CVAR_ARCHIVE },
    CvarTableEntry { name: "cg_tailDetail", default: "40", flags: CVAR_ARCHIVE },
    CvarTableEntry { name: "cg_obeliskRespawnDelay", default: "10", flags: CVAR_SERVERINFO },
    CvarTableEntry { name: "developer", default: "0", flags: CVAR_CHEAT },
];

/// CG_RegisterCvars
pub fn cg_register_cvars(cvars: &mut CvarContext) -> CgCvars {
    let handles: Vec<Option<usize>> = CVAR_TABLE
        .iter()
        .map(|e| {
            let h = cvars.get(e.name, e.default, e.flags);
            if h.is_none() {
                tracing::warn!(name = e.name, "could not register cvar");
            }
            h
        })
        .collect();

    CgCvars {
        smooth_clients: handles[0],
        simple_items: handles[1],
        tail_detail: handles[2],
        obelisk_respawn_delay: handles[3],
        developer: handles[4],
    }
}

/// CG_UpdateCvars -- sample the registered variables into this frame's
/// configuration. Unregistered handles keep their defaults.
pub fn cg_update_cvars(cvars: &CvarContext, handles: &CgCvars) -> CgConfig {
    let defaults = CgConfig::default();
    let int = |h: Option<usize>, d: i32| h.map_or(d, |h| cvars.integer_by_handle(h));
    let val = |h: Option<usize>, d: f32| h.map_or(d, |h| cvars.value_by_handle(h));

    CgConfig {
        smooth_clients: int(handles.smooth_clients, 0) != 0,
        simple_items: int(handles.simple_items, 0) != 0,
        tail_detail: val(handles.tail_detail, defaults.tail_detail),
        obelisk_respawn_delay: int(handles.obelisk_respawn_delay, defaults.obelisk_respawn_delay),
        developer: int(handles.developer, 0) != 0,
    }
}

/// The client game for one connection: tracked state, level data and the
/// snapshots the client system has handed over but not yet consumed.
pub struct CgGame {
    pub cg: CgState,
    pub cgs: CgStatic,
    pub cvars: CgCvars,
    pending: VecDeque<Snapshot>,
}

impl CgGame {
    /// CG_Init
    pub fn new(client_num: i32, cgs: CgStatic, cvar_ctx: &mut CvarContext) -> Self {
        tracing::debug!(client_num, gametype = ?cgs.gametype, "cgame init");
        Self {
            cg: CgState::new(client_num),
            cgs,
            cvars: cg_register_cvars(cvar_ctx),
            pending: VecDeque::new(),
        }
    }

    /// Queue a snapshot received from the server.
    pub fn push_snapshot(&mut self, snap: Snapshot) {
        self.pending.push_back(snap);
    }

    pub fn pending_snapshots(&self) -> usize {
        self.pending.len()
    }

    /// Present the frame for `server_time`. The scene is left in `self.cg.view`.
    pub fn draw_active_frame(
        &mut self,
        server_time: i32,
        cvar_ctx: &CvarContext,
        imports: &mut dyn CgameImports,
    ) -> Result<(), CgError> {
        let config = cg_update_cvars(cvar_ctx, &self.cvars);
        cg_draw_active_frame(
            &mut self.cg,
            &self.cgs,
            &config,
            server_time,
            &mut self.pending,
            imports,
        )
    }
}
