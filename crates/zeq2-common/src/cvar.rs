// cvar.rs -- dynamic variable tracking
//
// Copyright (C) 1999-2000 Id Software, Inc.
// Licensed under the GNU General Public License v2 or later.

use crate::q_shared::{CVAR_CHEAT, CVAR_ROM, CVAR_SERVERINFO, CVAR_USERINFO};

use std::collections::HashMap;

/// A console variable.
#[derive(Clone, Debug)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub reset_string: String, // cvar_restart will reset to this value
    pub flags: i32,
    pub modified: bool,
    pub modification_count: i32, // incremented each time the cvar is changed
    pub value: f32,
    pub integer: i32,
}

fn parse_value(s: &str) -> f32 {
    s.trim().parse::<f32>().unwrap_or(0.0)
}

/// The full cvar system context.
///
/// Modules register their variables once and sample them by handle;
/// handles are indices into `cvar_vars` and never move.
pub struct CvarContext {
    pub cvar_vars: Vec<Cvar>,
    /// O(1) cvar lookup by name -> index in cvar_vars
    cvar_index: HashMap<String, usize>,
    pub cheats_allowed: bool,
}

impl CvarContext {
    pub fn new() -> Self {
        Self {
            cvar_vars: Vec::new(),
            cvar_index: HashMap::new(),
            cheats_allowed: false,
        }
    }

    /// Validate that a string doesn't contain characters invalid in info strings.
    pub fn info_validate(s: &str) -> bool {
        !s.contains('\\') && !s.contains('"') && !s.contains(';')
    }

    pub fn find_var_index(&self, name: &str) -> Option<usize> {
        self.cvar_index.get(name).copied()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.cvar_index.get(name).map(|&idx| &self.cvar_vars[idx])
    }

    /// Get the floating-point value of a cvar. Returns 0 if not found.
    pub fn variable_value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |var| var.value)
    }

    /// Get the integer value of a cvar. Returns 0 if not found.
    pub fn variable_integer(&self, name: &str) -> i32 {
        self.find_var(name).map_or(0, |var| var.integer)
    }

    /// Get the string value of a cvar. Returns "" if not found.
    pub fn variable_string(&self, name: &str) -> &str {
        match self.find_var(name) {
            Some(var) => &var.string,
            None => "",
        }
    }

    /// Get or create a cvar. If it already exists, the value is not changed
    /// but flags are OR'd in.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> Option<usize> {
        if flags & (CVAR_USERINFO | CVAR_SERVERINFO) != 0 && !Self::info_validate(name) {
            tracing::warn!(name, "invalid info cvar name");
            return None;
        }

        if let Some(&idx) = self.cvar_index.get(name) {
            self.cvar_vars[idx].flags |= flags;
            return Some(idx);
        }

        if flags & (CVAR_USERINFO | CVAR_SERVERINFO) != 0 && !Self::info_validate(value) {
            tracing::warn!(name, value, "invalid info cvar value");
            return None;
        }

        let float_val = parse_value(value);
        let idx = self.cvar_vars.len();
        self.cvar_vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            reset_string: value.to_string(),
            flags,
            modified: true,
            modification_count: 1,
            value: float_val,
            integer: float_val as i32,
        });
        self.cvar_index.insert(name.to_string(), idx);
        tracing::trace!(name, value, "cvar registered");

        Some(idx)
    }

    fn set2(&mut self, name: &str, value: &str, force: bool) -> Option<usize> {
        let idx = match self.find_var_index(name) {
            Some(idx) => idx,
            None => return self.get(name, value, 0),
        };

        let var = &mut self.cvar_vars[idx];

        if var.flags & (CVAR_USERINFO | CVAR_SERVERINFO) != 0 && !Self::info_validate(value) {
            tracing::warn!(name, value, "invalid info cvar value");
            return Some(idx);
        }

        if !force {
            if var.flags & CVAR_ROM != 0 {
                tracing::warn!(name, "cvar is read only");
                return Some(idx);
            }
            if var.flags & CVAR_CHEAT != 0 && !self.cheats_allowed {
                tracing::warn!(name, "cvar is cheat protected");
                return Some(idx);
            }
        }

        if value == var.string {
            return Some(idx); // not changed
        }

        var.modified = true;
        var.modification_count += 1;
        var.string = value.to_string();
        var.value = parse_value(value);
        var.integer = var.value as i32;
        tracing::debug!(name, value, "cvar changed");

        Some(idx)
    }

    /// Set a cvar value (respects ROM and CHEAT flags).
    pub fn set(&mut self, name: &str, value: &str) -> Option<usize> {
        self.set2(name, value, false)
    }

    /// Force-set a cvar value (ignores ROM and CHEAT).
    pub fn force_set(&mut self, name: &str, value: &str) -> Option<usize> {
        self.set2(name, value, true)
    }

    /// Set a cvar from a float value.
    pub fn set_value(&mut self, name: &str, value: f32) {
        let val_str = if value == (value as i32) as f32 {
            format!("{}", value as i32)
        } else {
            format!("{}", value)
        };
        self.set(name, &val_str);
    }

    /// Put a cvar back to the value it was registered with.
    pub fn reset(&mut self, name: &str) {
        if let Some(reset) = self.find_var(name).map(|v| v.reset_string.clone()) {
            self.set2(name, &reset, false);
        }
    }

    pub fn value_by_handle(&self, handle: usize) -> f32 {
        self.cvar_vars.get(handle).map_or(0.0, |v| v.value)
    }

    pub fn integer_by_handle(&self, handle: usize) -> i32 {
        self.cvar_vars.get(handle).map_or(0, |v| v.integer)
    }

    pub fn modification_count_by_handle(&self, handle: usize) -> i32 {
        self.cvar_vars.get(handle).map_or(0, |v| v.modification_count)
    }

    /// Returns whether the cvar changed since the last call, clearing the flag.
    pub fn take_modified(&mut self, handle: usize) -> bool {
        match self.cvar_vars.get_mut(handle) {
            Some(v) => std::mem::replace(&mut v.modified, false),
            None => false,
        }
    }
}

impl Default for CvarContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// Tests
// ============================================================
