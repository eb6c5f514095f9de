//! Optimistic editing of the user-adjustable part of the configuration.
//!
//! [`ConfigEditor`] owns the pending copy of `celsius`, `set_temperature` and
//! `mode_set`. It does no I/O and keeps no clock: each edit hands back a
//! [`Ticket`] telling the driver to (re)start its quiet-window timer, and the
//! driver calls [`ConfigEditor::fire`] with that ticket once the window has
//! passed. Only the most recent ticket can fire, so restarting the window is
//! just a matter of issuing a new one.

use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigPatch, ConfigSnapshot},
    units::{quantize, Scale},
};

/// The fields a user edits from the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditableConfig {
    pub celsius: bool,
    /// Degrees Celsius
    pub set_temperature: f64,
    pub mode_set: String,
}

impl EditableConfig {
    pub fn scale(&self) -> Scale {
        Scale::from_celsius_flag(self.celsius)
    }
}

impl From<&ConfigSnapshot> for EditableConfig {
    fn from(config: &ConfigSnapshot) -> Self {
        EditableConfig {
            celsius: config.celsius,
            set_temperature: config.set_temperature,
            mode_set: config.mode_set.clone(),
        }
    }
}

impl From<EditableConfig> for ConfigPatch {
    fn from(config: EditableConfig) -> Self {
        ConfigPatch {
            celsius: Some(config.celsius),
            set_temperature: Some(config.set_temperature),
            mode_set: Some(config.mode_set),
            modes_available: None,
        }
    }
}

/// Identifies one arming of the quiet-window timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A consolidated write-back the driver has to send.
#[derive(Clone, Debug, PartialEq)]
pub struct Write {
    pub config: EditableConfig,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Debounce {
    #[default]
    Idle,
    Scheduled {
        server_state: EditableConfig,
        ticket: Ticket,
    },
}

#[derive(Clone, Debug, Default)]
pub struct ConfigEditor {
    baseline: Option<EditableConfig>,
    pending: Option<EditableConfig>,
    modes: Vec<String>,
    debounce: Debounce,
    next_ticket: u64,
}

impl ConfigEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the pending edits to a snapshot that just arrived from the
    /// server. A scheduled write is dropped: its baseline is stale.
    pub fn seed(&mut self, snapshot: &ConfigSnapshot) {
        let fields = EditableConfig::from(snapshot);
        self.baseline = Some(fields.clone());
        self.pending = Some(fields);
        self.modes = snapshot.modes.clone();
        self.debounce = Debounce::Idle;
    }

    pub fn pending(&self) -> Option<&EditableConfig> {
        self.pending.as_ref()
    }

    pub fn baseline(&self) -> Option<&EditableConfig> {
        self.baseline.as_ref()
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_ticket().is_some()
    }

    pub fn scheduled_ticket(&self) -> Option<Ticket> {
        match &self.debounce {
            Debounce::Idle => None,
            Debounce::Scheduled { ticket, .. } => Some(*ticket),
        }
    }

    /// Flips the display scale and snaps the setpoint onto the new scale's grid.
    pub fn toggle_unit(&mut self) -> Option<Ticket> {
        let pending = self.pending.as_mut()?;
        let scale = pending.scale().toggled();
        pending.celsius = scale.is_celsius();
        if let Some(temp) = quantize(pending.set_temperature, scale, 0.0) {
            pending.set_temperature = temp;
        }
        self.edited()
    }

    /// Moves the setpoint one grid step: 0.5° in Celsius, 1° in Fahrenheit.
    pub fn change_setpoint(&mut self, increment: bool) -> Option<Ticket> {
        let pending = self.pending.as_mut()?;
        let steps = if increment { 1.0 } else { -1.0 };
        if let Some(temp) = quantize(pending.set_temperature, pending.scale(), steps) {
            pending.set_temperature = temp;
        }
        self.edited()
    }

    pub fn increment_setpoint(&mut self) -> Option<Ticket> {
        self.change_setpoint(true)
    }

    pub fn decrement_setpoint(&mut self) -> Option<Ticket> {
        self.change_setpoint(false)
    }

    /// Advances to the next server-declared mode, wrapping at the end.
    pub fn cycle_mode(&mut self) -> Option<Ticket> {
        let pending = self.pending.as_mut()?;
        let next = match self.modes.iter().position(|mode| *mode == pending.mode_set) {
            Some(index) => self.modes[(index + 1) % self.modes.len()].clone(),
            None => self.modes.first()?.clone(),
        };
        pending.mode_set = next;
        self.edited()
    }

    /// Called by the driver when the quiet window of `ticket` has elapsed.
    pub fn fire(&mut self, ticket: Ticket) -> Option<Write> {
        if self.scheduled_ticket() != Some(ticket) {
            return None;
        }
        self.take_write()
    }

    /// Settles a scheduled write right away, for teardown.
    pub fn flush(&mut self) -> Option<Write> {
        self.take_write()
    }

    fn edited(&mut self) -> Option<Ticket> {
        if self.pending == self.baseline {
            return None;
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        if let Debounce::Scheduled {
            ticket: current, ..
        } = &mut self.debounce
        {
            *current = ticket;
        } else {
            self.debounce = Debounce::Scheduled {
                server_state: self.baseline.clone()?,
                ticket,
            };
        }
        Some(ticket)
    }

    fn take_write(&mut self) -> Option<Write> {
        let Debounce::Scheduled { server_state, .. } =
            std::mem::replace(&mut self.debounce, Debounce::Idle)
        else {
            return None;
        };

        let pending = self.pending.as_ref()?;
        (*pending != server_state).then(|| Write {
            config: pending.clone(),
        })
    }
}
