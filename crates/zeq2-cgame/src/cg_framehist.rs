// cg_framehist.rs -- which entities were presented last frame and this frame
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use zeq2_common::q_shared::MAX_GENTITIES;

const WORDS: usize = MAX_GENTITIES / 32;

/// Two bit sets over the entity numbers. `rotate` once per frame, before
/// any entity is marked.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    prev: [u32; WORDS],
    cur: [u32; WORDS],
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self {
            prev: [0; WORDS],
            cur: [0; WORDS],
        }
    }
}

fn slot(num: i32) -> Option<(usize, u32)> {
    let n = usize::try_from(num).ok().filter(|&n| n < MAX_GENTITIES)?;
    Some((n >> 5, 1 << (n & 31)))
}

impl FrameHistory {
    pub fn rotate(&mut self) {
        self.prev = self.cur;
        self.cur = [0; WORDS];
    }

    /// CG_FrameHist_SetPVS
    pub fn set_pvs(&mut self, num: i32) {
        if let Some((w, bit)) = slot(num) {
            self.cur[w] |= bit;
        }
    }

    /// CG_FrameHist_WasInPVS -- presented during the previous frame.
    pub fn was_in_pvs(&self, num: i32) -> bool {
        slot(num).is_some_and(|(w, bit)| self.prev[w] & bit != 0)
    }

    pub fn is_in_pvs(&self, num: i32) -> bool {
        slot(num).is_some_and(|(w, bit)| self.cur[w] & bit != 0)
    }
}
