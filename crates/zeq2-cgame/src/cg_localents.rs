// cg_localents.rs -- every frame, generate renderer commands for locally
// processed entities, like smoke puffs, gibs, shells, etc.
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use crate::cg_view::{v_add_entity, ViewState};
use crate::tr_types::RefEntity;

pub const MAX_LOCAL_ENTITIES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeType {
    #[default]
    FadeRgb,
}

#[derive(Debug, Clone, Default)]
pub struct LocalEntity {
    pub active: bool,
    pub le_type: LeType,

    pub start_time: i32,
    pub end_time: i32,
    pub life_rate: f32, // 1.0 / (end_time - start_time)

    pub color: [f32; 4],

    pub ref_entity: RefEntity,

    alloc_seq: u64,
}

/// Fixed pool of short lived effects. A full pool recycles its oldest entry.
pub struct LocalEntities {
    pool: Vec<LocalEntity>,
    next_seq: u64,
}

impl Default for LocalEntities {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalEntities {
    pub fn new() -> Self {
        Self {
            pool: vec![LocalEntity::default(); MAX_LOCAL_ENTITIES],
            next_seq: 0,
        }
    }

    /// CG_InitLocalEntities -- this is called at startup and for tournement restarts
    pub fn clear(&mut self) {
        for le in self.pool.iter_mut() {
            *le = LocalEntity::default();
        }
        self.next_seq = 0;
    }

    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|le| le.active).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &LocalEntity> {
        self.pool.iter().filter(|le| le.active)
    }

    /// CG_AllocLocalEntity -- will allways succeed, even if it requires
    /// freeing an old active entity
    pub fn alloc(&mut self) -> &mut LocalEntity {
        let index = match self.pool.iter().position(|le| !le.active) {
            Some(i) => i,
            None => {
                // no free entities, so free the one at the end of the chain
                // remove the oldest active entity
                tracing::trace!("local entity pool full, recycling oldest");
                self.pool
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, le)| le.alloc_seq)
                    .map_or(0, |(i, _)| i)
            }
        };

        let seq = self.next_seq;
        self.next_seq += 1;

        let le = &mut self.pool[index];
        *le = LocalEntity {
            active: true,
            alloc_seq: seq,
            ..Default::default()
        };
        le
    }
}

fn cg_add_fade_rgb(le: &LocalEntity, view: &mut ViewState, time: i32) {
    let mut re = le.ref_entity.clone();

    let c = ((le.end_time - time) as f32 * le.life_rate).clamp(0.0, 1.0) * 255.0;

    for i in 0..4 {
        re.shader_rgba[i] = (le.color[i] * c) as u8;
    }

    v_add_entity(view, &re);
}

/// CG_AddLocalEntities -- expire everything whose end time has passed,
/// then submit the survivors.
pub fn cg_add_local_entities(les: &mut LocalEntities, view: &mut ViewState, time: i32) {
    for le in les.pool.iter_mut().filter(|le| le.active) {
        if time >= le.end_time {
            le.active = false;
            continue;
        }

        match le.le_type {
            LeType::FadeRgb => cg_add_fade_rgb(le, view, time),
        }
    }
}
