//! The seat: every managed output and which one has focus
//!
//! Tags live only inside each output's [`LayerManager`]; the seat routes
//! requests to the right output and moves clients between outputs.

use log::{debug, info, warn};

use crate::client::{Client, ClientId, ViewHandle};
use crate::config::MonitorGroup;
use crate::context::Context;
use crate::layer_manager::{LayerManager, OutputRequest};
use crate::monitor;
use crate::screen::{Output, Screen};

#[derive(Debug)]
pub struct Seat {
    ctx: Context,
    outputs: Vec<LayerManager>,
    focused: usize,
}

impl Seat {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            outputs: Vec::new(),
            focused: 0,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn outputs(&self) -> &[LayerManager] {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&LayerManager> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    pub fn output_mut(&mut self, name: &str) -> Option<&mut LayerManager> {
        self.outputs.iter_mut().find(|o| o.name() == name)
    }

    pub fn output_at(&self, index: usize) -> Option<&LayerManager> {
        self.outputs.get(index)
    }

    pub fn output_at_mut(&mut self, index: usize) -> Option<&mut LayerManager> {
        self.outputs.get_mut(index)
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused_output(&self) -> Option<&LayerManager> {
        self.outputs.get(self.focused)
    }

    pub fn focused_output_mut(&mut self) -> Option<&mut LayerManager> {
        self.outputs.get_mut(self.focused)
    }

    /// Index of the output managing `id`
    pub fn output_of(&self, id: ClientId) -> Option<usize> {
        self.outputs.iter().position(|o| o.contains_client(id))
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.outputs.iter().find_map(|o| o.client(id))
    }

    /// Start managing an output. A known name only refreshes its mode.
    pub fn add_output(&mut self, output: &dyn Output) -> usize {
        let name = output.name();
        if let Some(index) = self.outputs.iter().position(|o| o.name() == name) {
            debug!("Output {} already managed, updating mode", name);
            self.outputs[index].update_output(output);
            return index;
        }
        self.outputs
            .push(LayerManager::from_output(output, self.ctx.clone()));
        info!("Added output {} ({} total)", name, self.outputs.len());
        self.outputs.len() - 1
    }

    /// Stop managing an output.
    ///
    /// Its clients move to the current tag of the focused remaining output.
    /// With no output left they are dropped; their views stay with the
    /// windowing layer.
    pub fn remove_output(&mut self, name: &str) -> bool {
        let Some(index) = self.outputs.iter().position(|o| o.name() == name) else {
            warn!("remove_output: unknown output {}", name);
            return false;
        };
        let mut removed = self.outputs.remove(index);
        if index < self.focused || self.focused >= self.outputs.len() {
            self.focused = self.focused.saturating_sub(1);
        }

        let orphans = removed.drain_clients();
        match self.outputs.get_mut(self.focused) {
            Some(target) => {
                for client in orphans {
                    target.adopt_client(client);
                }
            }
            None if !orphans.is_empty() => {
                warn!(
                    "Dropping {} client(s) of {}: no output left",
                    orphans.len(),
                    name
                );
            }
            None => {}
        }
        info!("Removed output {}", name);
        true
    }

    pub fn focus_output(&mut self, index: usize) -> bool {
        if index >= self.outputs.len() {
            warn!("Output index {} out of range", index);
            return false;
        }
        self.focused = index;
        true
    }

    /// Manage a new view on the focused output
    pub fn map_view(&mut self, view: &ViewHandle) -> Option<ClientId> {
        match self.outputs.get_mut(self.focused) {
            Some(output) => Some(output.map_client(view)),
            None => {
                warn!("No output to map view on");
                None
            }
        }
    }

    pub fn unmap_client(&mut self, id: ClientId) -> Option<Client> {
        let index = self.output_of(id)?;
        self.outputs[index].unmap_client(id)
    }

    /// Move a client onto the current tag of another output
    pub fn move_client_to_output(&mut self, id: ClientId, target: usize) -> bool {
        if target >= self.outputs.len() {
            warn!("Output index {} out of range", target);
            return false;
        }
        let Some(source) = self.output_of(id) else {
            return false;
        };
        if source == target {
            return false;
        }
        let Some(client) = self.outputs[source].unmap_client(id) else {
            return false;
        };
        self.outputs[target].adopt_client(client);
        true
    }

    /// Apply every entry of `group` that matches a connected output
    pub fn apply_monitor_group(&mut self, group: &MonitorGroup) -> Vec<OutputRequest> {
        let assignments: Vec<_> = {
            let screens: Vec<&Screen> = self.outputs.iter().map(LayerManager::screen).collect();
            monitor::match_group(group, &screens)
                .into_iter()
                .map(|(monitor, screen)| (monitor.clone(), screen.name().to_string()))
                .collect()
        };

        let mut requests = Vec::with_capacity(assignments.len());
        for (monitor, output) in assignments {
            if let Some(manager) = self.output_mut(&output) {
                requests.push(manager.apply_monitor_config(&monitor));
            }
        }
        info!(
            "Applied monitor group '{}' to {} output(s)",
            group.name,
            requests.len()
        );
        requests
    }

    /// Select the configured group matching the connected outputs and apply it
    pub fn apply_configured_monitors(&mut self) -> Vec<OutputRequest> {
        let config = self.ctx.config.clone();
        let selected = {
            let screens: Vec<&Screen> = self.outputs.iter().map(LayerManager::screen).collect();
            monitor::select_group(&config.monitor_groups, &screens)
        };
        match selected {
            Some(group) => self.apply_monitor_group(group),
            None => {
                debug!("No monitor group matches the connected outputs");
                Vec::new()
            }
        }
    }
}
