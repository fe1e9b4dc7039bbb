// cg_beamtables.rs -- bendy beams that follow the path their head travelled
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::collections::VecDeque;

use zeq2_common::q_shared::*;

use crate::cg_view::{cg_draw_line, ViewState};

pub const MAX_BEAM_SAMPLES: usize = 32;

/// Minimum head travel before a new bend point is recorded.
pub const BEAM_SAMPLE_SPACING: f32 = 32.0;

pub const BEAM_EXPIRE_MSEC: i32 = 1000;

#[derive(Debug, Clone, Default)]
pub struct BeamTable {
    pub active: bool,
    pub anchor: Vec3,              // charge tag on the owner
    pub samples: VecDeque<Vec3>,   // bend points, oldest first
    pub head: Vec3,
    pub radius: f32,
    pub shader: QHandle,
    pub last_update: i32,
}

/// One beam table slot per entity number.
pub struct BeamTables {
    tables: Vec<BeamTable>,
}

impl Default for BeamTables {
    fn default() -> Self {
        Self::new()
    }
}

impl BeamTables {
    pub fn new() -> Self {
        Self {
            tables: vec![BeamTable::default(); MAX_GENTITIES],
        }
    }

    pub fn get(&self, entity_num: i32) -> Option<&BeamTable> {
        usize::try_from(entity_num)
            .ok()
            .and_then(|i| self.tables.get(i))
            .filter(|t| t.active)
    }

    pub fn active_count(&self) -> usize {
        self.tables.iter().filter(|t| t.active).count()
    }

    /// Drop the bend points of `entity_num`; the next update starts over.
    pub fn reset(&mut self, entity_num: i32) {
        if let Some(t) = usize::try_from(entity_num).ok().and_then(|i| self.tables.get_mut(i)) {
            *t = BeamTable::default();
        }
    }
}

/// CG_BeamTableUpdate -- record the head of a guided beam this frame.
/// `anchor` is the owner's charge tag, when it could be resolved.
pub fn cg_beam_table_update(
    tables: &mut BeamTables,
    entity_num: i32,
    head: &Vec3,
    anchor: Option<Vec3>,
    radius: f32,
    shader: QHandle,
    time: i32,
) {
    let Some(table) = usize::try_from(entity_num)
        .ok()
        .and_then(|i| tables.tables.get_mut(i))
    else {
        return;
    };

    if !table.active {
        table.active = true;
        table.samples.clear();
        table.anchor = anchor.unwrap_or(*head);
        table.samples.push_back(*head);
    } else if let Some(a) = anchor {
        table.anchor = a;
    }

    table.head = *head;
    table.radius = radius;
    table.shader = shader;
    table.last_update = time;

    let far_enough = table
        .samples
        .back()
        .map_or(true, |last| distance(last, head) >= BEAM_SAMPLE_SPACING);
    if far_enough {
        if table.samples.len() >= MAX_BEAM_SAMPLES {
            table.samples.pop_front();
        }
        table.samples.push_back(*head);
    }
}

/// Expire untouched tables and draw the rest from anchor, through every
/// bend point, to the head.
pub fn cg_add_beam_tables(tables: &mut BeamTables, view: &mut ViewState, time: i32) {
    for table in tables.tables.iter_mut().filter(|t| t.active) {
        if time - table.last_update > BEAM_EXPIRE_MSEC {
            *table = BeamTable::default();
            continue;
        }

        let mut last = table.anchor;
        for p in table.samples.iter().chain(std::iter::once(&table.head)) {
            if *p != last {
                cg_draw_line(view, &last, p, table.radius, table.shader, 1.0);
            }
            last = *p;
        }
    }
}
