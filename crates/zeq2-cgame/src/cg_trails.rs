// cg_trails.rs -- fading ribbon tails that follow fast projectiles
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::collections::VecDeque;

use zeq2_common::q_shared::*;

use crate::cg_view::{cg_draw_line, ViewState};

pub const MAX_TRAIL_POINTS: usize = 64;

/// A trail that has not been extended for this long is dropped.
pub const TRAIL_EXPIRE_MSEC: i32 = 1000;

/// Approximate world length of a tail, used to derive point life from speed.
const TRAIL_LENGTH: f32 = 256.0;
const TRAIL_MIN_LIFE: i32 = 100;
const TRAIL_MAX_LIFE: i32 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub origin: Vec3,
    pub time: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Trail {
    pub active: bool,
    pub points: VecDeque<TrailPoint>, // oldest first, head last
    pub width: f32,
    pub shader: QHandle,
    pub color: [f32; 4],
    pub point_life: i32,
    pub last_update: i32,
}

/// One trail slot per entity number.
pub struct TrailSystem {
    trails: Vec<Trail>,
}

impl Default for TrailSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailSystem {
    pub fn new() -> Self {
        Self {
            trails: vec![Trail::default(); MAX_GENTITIES],
        }
    }

    pub fn get(&self, entity_num: i32) -> Option<&Trail> {
        usize::try_from(entity_num)
            .ok()
            .and_then(|i| self.trails.get(i))
            .filter(|t| t.active)
    }

    fn slot_mut(&mut self, entity_num: i32) -> Option<&mut Trail> {
        usize::try_from(entity_num).ok().and_then(|i| self.trails.get_mut(i))
    }

    pub fn active_count(&self) -> usize {
        self.trails.iter().filter(|t| t.active).count()
    }
}

fn point_life_for_speed(base_speed: f32) -> i32 {
    if base_speed <= 0.0 {
        return TRAIL_MAX_LIFE;
    }
    ((TRAIL_LENGTH / base_speed * 1000.0) as i32).clamp(TRAIL_MIN_LIFE, TRAIL_MAX_LIFE)
}

/// CG_ResetTrail -- start the tail over at `origin`, discarding all history.
pub fn cg_reset_trail(
    trails: &mut TrailSystem,
    entity_num: i32,
    origin: &Vec3,
    base_speed: f32,
    width: f32,
    shader: QHandle,
    color: Option<[f32; 4]>,
    time: i32,
) {
    let Some(trail) = trails.slot_mut(entity_num) else {
        return;
    };

    tracing::trace!(entity_num, "trail reset");

    trail.active = true;
    trail.points.clear();
    trail.points.push_back(TrailPoint { origin: *origin, time });
    trail.width = width;
    trail.shader = shader;
    trail.color = color.unwrap_or([1.0; 4]);
    trail.point_life = point_life_for_speed(base_speed);
    trail.last_update = time;
}

/// CG_UpdateTrailHead -- extend an active tail to `origin`.
pub fn cg_update_trail_head(trails: &mut TrailSystem, entity_num: i32, origin: &Vec3, time: i32) {
    let Some(trail) = trails.slot_mut(entity_num) else {
        return;
    };
    if !trail.active {
        return;
    }

    trail.last_update = time;

    if let Some(head) = trail.points.back_mut() {
        if head.time == time {
            head.origin = *origin;
            return;
        }
    }

    if trail.points.len() >= MAX_TRAIL_POINTS {
        trail.points.pop_front();
    }
    trail.points.push_back(TrailPoint { origin: *origin, time });
}

/// CG_AddTrails -- expire stale tails and submit the live ones as tapering,
/// fading line segments. `tail_detail` caps how many points a tail keeps.
pub fn cg_add_trails(trails: &mut TrailSystem, view: &mut ViewState, time: i32, tail_detail: f32) {
    let budget = (tail_detail as usize).clamp(2, MAX_TRAIL_POINTS);

    for trail in trails.trails.iter_mut().filter(|t| t.active) {
        if time - trail.last_update > TRAIL_EXPIRE_MSEC {
            trail.active = false;
            trail.points.clear();
            continue;
        }

        // age out old points, always keeping the head
        while trail.points.len() > 1 {
            let oldest = trail.points[0];
            if time - oldest.time > trail.point_life || trail.points.len() > budget {
                trail.points.pop_front();
            } else {
                break;
            }
        }

        let life = trail.point_life.max(1) as f32;
        for (a, b) in trail.points.iter().zip(trail.points.iter().skip(1)) {
            let age = (time - a.time) as f32;
            let frac = (1.0 - age / life).clamp(0.0, 1.0);
            if frac <= 0.0 {
                continue;
            }
            cg_draw_line(view, &a.origin, &b.origin, trail.width * frac, trail.shader, trail.color[3] * frac);
        }
    }
}
