// q_shared.rs -- foundational types and functions shared by all modules
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use std::f32::consts::PI;

// ============================================================
// Basic types
// ============================================================

pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];

/// Three row vectors: forward, left, up.
pub type Axis = [Vec3; 3];

/// Quaternion stored as (x, y, z, w).
pub type Quat = [f32; 4];

/// Opaque renderer / sound / shader handle. 0 means "none".
pub type QHandle = i32;

pub const VEC3_ORIGIN: Vec3 = [0.0, 0.0, 0.0];

pub const AXIS_DEFAULT: Axis = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

// Angle indexes
pub const PITCH: usize = 0; // up / down
pub const YAW: usize = 1; // left / right
pub const ROLL: usize = 2; // fall over

pub const DEG_TO_RAD: f32 = PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / PI;

// ============================================================
// Limits
// ============================================================

pub const MAX_CLIENTS: usize = 64; // absolute limit

pub const GENTITYNUM_BITS: u32 = 10; // don't need to send any more
pub const MAX_GENTITIES: usize = 1 << GENTITYNUM_BITS;

// entitynums are communicated with GENTITY_BITS, so any reserved
// values that are going to be communicated over the net need to
// also be in this range
pub const ENTITYNUM_NONE: i32 = MAX_GENTITIES as i32 - 1;
pub const ENTITYNUM_WORLD: i32 = MAX_GENTITIES as i32 - 2;
pub const ENTITYNUM_MAX_NORMAL: i32 = MAX_GENTITIES as i32 - 2;

pub const DEFAULT_GRAVITY: f32 = 800.0;

// ============================================================
// CVARS (console variables)
// ============================================================

pub const CVAR_ARCHIVE: i32 = 1; // set to cause it to be saved to vars.rc
pub const CVAR_USERINFO: i32 = 2; // added to userinfo when changed
pub const CVAR_SERVERINFO: i32 = 4; // added to serverinfo when changed
pub const CVAR_ROM: i32 = 64; // display only, cannot be set by user at all
pub const CVAR_CHEAT: i32 = 512; // can not be changed if cheats are disabled

/// orientation_t -- an origin plus a three-vector basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub origin: Vec3,
    pub axis: Axis,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            origin: VEC3_ORIGIN,
            axis: AXIS_DEFAULT,
        }
    }
}

// ============================================================
// MATHLIB -- Vector operations
// ============================================================

#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn vector_add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn vector_negate(v: &Vec3) -> Vec3 {
    [-v[0], -v[1], -v[2]]
}

/// veca + scale * vecb
pub fn vector_ma(veca: &Vec3, scale: f32, vecb: &Vec3) -> Vec3 {
    [
        veca[0] + scale * vecb[0],
        veca[1] + scale * vecb[1],
        veca[2] + scale * vecb[2],
    ]
}

pub fn vector_scale(v: &Vec3, scale: f32) -> Vec3 {
    [v[0] * scale, v[1] * scale, v[2] * scale]
}

pub fn vector_piecewise_multiply(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2]]
}

/// a + frac * (b - a), per component.
pub fn vector_lerp(a: &Vec3, b: &Vec3, frac: f32) -> Vec3 {
    [
        a[0] + frac * (b[0] - a[0]),
        a[1] + frac * (b[1] - a[1]),
        a[2] + frac * (b[2] - a[2]),
    ]
}

pub fn vector_length(v: &Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn distance(p1: &Vec3, p2: &Vec3) -> f32 {
    vector_length(&vector_subtract(p2, p1))
}

/// Normalize in place, returns original length.
pub fn vector_normalize(v: &mut Vec3) -> f32 {
    let length = vector_length(v);
    if length != 0.0 {
        let ilength = 1.0 / length;
        v[0] *= ilength;
        v[1] *= ilength;
        v[2] *= ilength;
    }
    length
}

/// Normalized copy of `v` plus the original length. A zero vector stays zero.
pub fn vector_normalize2(v: &Vec3) -> (Vec3, f32) {
    let mut out = *v;
    let length = vector_normalize(&mut out);
    if length == 0.0 {
        out = VEC3_ORIGIN;
    }
    (out, length)
}

pub fn cross_product(v1: &Vec3, v2: &Vec3) -> Vec3 {
    [
        v1[1] * v2[2] - v1[2] * v2[1],
        v1[2] * v2[0] - v1[0] * v2[2],
        v1[0] * v2[1] - v1[1] * v2[0],
    ]
}

// ============================================================
// Matrix operations
// ============================================================

pub fn axis_clear(axis: &mut Axis) {
    *axis = AXIS_DEFAULT;
}

pub fn axis_scale(axis: &mut Axis, scale: f32) {
    for row in axis.iter_mut() {
        *row = vector_scale(row, scale);
    }
}

/// out = in1 * in2, row-major 3x3.
pub fn matrix_multiply(in1: &Axis, in2: &Axis) -> Axis {
    let mut out = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = in1[i][0] * in2[0][j] + in1[i][1] * in2[1][j] + in1[i][2] * in2[2][j];
        }
    }
    out
}

// ============================================================
// Angle functions
// ============================================================

pub fn angle_vectors(
    angles: &Vec3,
    forward: Option<&mut Vec3>,
    right: Option<&mut Vec3>,
    up: Option<&mut Vec3>,
) {
    let angle_yaw = angles[YAW] * DEG_TO_RAD;
    let sy = angle_yaw.sin();
    let cy = angle_yaw.cos();

    let angle_pitch = angles[PITCH] * DEG_TO_RAD;
    let sp = angle_pitch.sin();
    let cp = angle_pitch.cos();

    let angle_roll = angles[ROLL] * DEG_TO_RAD;
    let sr = angle_roll.sin();
    let cr = angle_roll.cos();

    if let Some(fwd) = forward {
        fwd[0] = cp * cy;
        fwd[1] = cp * sy;
        fwd[2] = -sp;
    }
    if let Some(r) = right {
        r[0] = -sr * sp * cy + -cr * -sy;
        r[1] = -sr * sp * sy + -cr * cy;
        r[2] = -sr * cp;
    }
    if let Some(u) = up {
        u[0] = cr * sp * cy + -sr * -sy;
        u[1] = cr * sp * sy + -sr * cy;
        u[2] = cr * cp;
    }
}

/// Angles to a forward / left / up basis.
pub fn angles_to_axis(angles: &Vec3) -> Axis {
    let mut axis = [[0.0f32; 3]; 3];
    let mut right = [0.0f32; 3];
    {
        let [fwd, _, up] = &mut axis;
        angle_vectors(angles, Some(fwd), Some(&mut right), Some(up));
    }
    // angle vectors returns "right" instead of "y axis"
    axis[1] = vector_negate(&right);
    axis
}

/// Direction vector to Euler angles, without truncation.
pub fn vectoangles(value1: &Vec3) -> Vec3 {
    let yaw;
    let pitch;

    if value1[1] == 0.0 && value1[0] == 0.0 {
        yaw = 0.0;
        pitch = if value1[2] > 0.0 { 90.0 } else { 270.0 };
    } else {
        let mut y = if value1[0] != 0.0 {
            value1[1].atan2(value1[0]) * RAD_TO_DEG
        } else if value1[1] > 0.0 {
            90.0
        } else {
            270.0
        };
        if y < 0.0 {
            y += 360.0;
        }
        yaw = y;

        let forward = (value1[0] * value1[0] + value1[1] * value1[1]).sqrt();
        let mut p = value1[2].atan2(forward) * RAD_TO_DEG;
        if p < 0.0 {
            p += 360.0;
        }
        pitch = p;
    }

    [-pitch, yaw, 0.0]
}

/// Shortest-path blend from `from` toward `to`.
pub fn lerp_angle(from: f32, to_in: f32, frac: f32) -> f32 {
    let mut to = to_in;
    if to - from > 180.0 {
        to -= 360.0;
    }
    if to - from < -180.0 {
        to += 360.0;
    }
    from + frac * (to - from)
}

pub fn project_point_on_plane(p: &Vec3, normal: &Vec3) -> Vec3 {
    let inv_denom = 1.0 / dot_product(normal, normal);
    let d = dot_product(normal, p) * inv_denom;
    let n = vector_scale(normal, inv_denom);
    vector_ma(p, -d, &n)
}

/// Find a unit vector perpendicular to `src` (assumed normalized).
pub fn perpendicular_vector(src: &Vec3) -> Vec3 {
    let mut min_elem: f32 = 1.0;
    let mut pos = 0;
    for (i, v) in src.iter().enumerate() {
        if v.abs() < min_elem {
            pos = i;
            min_elem = v.abs();
        }
    }
    let mut tempvec = [0.0f32; 3];
    tempvec[pos] = 1.0;

    let mut dst = project_point_on_plane(&tempvec, src);
    vector_normalize(&mut dst);
    dst
}

pub fn rotate_point_around_vector(dir: &Vec3, point: &Vec3, degrees: f32) -> Vec3 {
    let vf = *dir;
    let vr = perpendicular_vector(dir);
    let vup = cross_product(&vr, &vf);

    let m: Axis = [
        [vr[0], vup[0], vf[0]],
        [vr[1], vup[1], vf[1]],
        [vr[2], vup[2], vf[2]],
    ];
    let im: Axis = [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ];

    let rad = degrees * DEG_TO_RAD;
    let zrot: Axis = [
        [rad.cos(), rad.sin(), 0.0],
        [-rad.sin(), rad.cos(), 0.0],
        [0.0, 0.0, 1.0],
    ];

    let rot = matrix_multiply(&matrix_multiply(&m, &zrot), &im);

    let mut dst = [0.0f32; 3];
    for i in 0..3 {
        dst[i] = rot[i][0] * point[0] + rot[i][1] * point[1] + rot[i][2] * point[2];
    }
    dst
}

/// Rebuild axis[1] and axis[2] around a fixed axis[0], spun by `yaw` degrees.
pub fn rotate_around_direction(axis: &mut Axis, yaw: f32) {
    // create an arbitrary axis[1]
    axis[1] = perpendicular_vector(&axis[0]);

    // rotate it around axis[0] by yaw
    if yaw != 0.0 {
        let temp = axis[1];
        axis[1] = rotate_point_around_vector(&axis[0], &temp, yaw);
    }

    // cross to get axis[2]
    axis[2] = cross_product(&axis[0], &axis[1]);
}

// ============================================================
// Random
// ============================================================

/// Uniform in [0, 1].
pub fn random() -> f32 {
    (rand::random::<u32>() & 0x7fff) as f32 / 0x7fff as f32
}

/// Uniform in [-1, 1].
pub fn crandom() -> f32 {
    2.0 * (random() - 0.5)
}

// ============================================================
// Quaternions
// ============================================================

/// Euler angles to a quaternion matching `angles_to_axis`:
/// yaw about Z, then pitch about Y, then roll about X.
pub fn angles_to_quat(angles: &Vec3) -> Quat {
    let half_yaw = angles[YAW] * DEG_TO_RAD * 0.5;
    let half_pitch = angles[PITCH] * DEG_TO_RAD * 0.5;
    let half_roll = angles[ROLL] * DEG_TO_RAD * 0.5;

    let (sy, cy) = half_yaw.sin_cos();
    let (sp, cp) = half_pitch.sin_cos();
    let (sr, cr) = half_roll.sin_cos();

    [
        cy * cp * sr - sy * sp * cr,
        cy * sp * cr + sy * cp * sr,
        sy * cp * cr - cy * sp * sr,
        cy * cp * cr + sy * sp * sr,
    ]
}

/// Hamilton product q1 * q2 (apply q2 first, then q1).
pub fn quat_mul(q1: &Quat, q2: &Quat) -> Quat {
    let [x1, y1, z1, w1] = *q1;
    let [x2, y2, z2, w2] = *q2;
    [
        w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
        w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
        w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
        w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
    ]
}

/// Unit quaternion to a forward / left / up basis.
pub fn quat_to_axis(q: &Quat) -> Axis {
    let [x, y, z, w] = *q;
    [
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
        ],
        [
            2.0 * (x * y - w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + w * x),
        ],
        [
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ]
}
