//! Tags: named workspaces holding an ordered set of clients
//!
//! A tag never owns its clients. It stores [`ClientId`]s in membership order
//! (which is also focus-cycling and default stacking order) and borrows the
//! output's [`ClientRegistry`] whenever it has to touch a view.
//!
//! Invariant: `focused_client()` is `None` or a current member.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::{ClientId, ClientRegistry};
use crate::context::Context;
use crate::events::{Event, EventBus, TagRef};
use crate::layout::LayoutParams;

/// Exclusive lower bound for master ratios
pub const MIN_MASTER_RATIO: f64 = 0.05;

/// Exclusive upper bound for master ratios
pub const MAX_MASTER_RATIO: f64 = 0.95;

static NEXT_TAG_ID: AtomicU64 = AtomicU64::new(1);

/// Layout applied to a tag's tiled clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// Master column on the left, stack on the right
    #[default]
    MasterStack,
    /// Every client full-size, stacked
    Monocle,
    /// Nothing is tiled
    Floating,
    /// Near-square grid
    Grid,
}

impl LayoutKind {
    /// Next layout in cycling order
    pub fn next(self) -> Self {
        match self {
            LayoutKind::MasterStack => LayoutKind::Monocle,
            LayoutKind::Monocle => LayoutKind::Grid,
            LayoutKind::Grid => LayoutKind::Floating,
            LayoutKind::Floating => LayoutKind::MasterStack,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutKind::MasterStack => "master-stack",
            LayoutKind::Monocle => "monocle",
            LayoutKind::Floating => "floating",
            LayoutKind::Grid => "grid",
        };
        f.write_str(name)
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master-stack" | "masterstack" | "tile" => Ok(LayoutKind::MasterStack),
            "monocle" => Ok(LayoutKind::Monocle),
            "floating" => Ok(LayoutKind::Floating),
            "grid" => Ok(LayoutKind::Grid),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

/// Stable tag identifier. Tag names are not required to be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(u64);

impl TagId {
    fn next() -> Self {
        Self(NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A workspace
pub struct Tag {
    id: TagId,
    name: String,
    visible: bool,
    clients: Vec<ClientId>,
    focused: Option<ClientId>,
    layout: LayoutKind,
    master_count: usize,
    master_ratio: f64,
    events: Arc<EventBus>,
}

impl Tag {
    /// New hidden tag using the configured layout defaults
    pub fn new(name: impl Into<String>, ctx: &Context) -> Self {
        let defaults = &ctx.config.layout;
        Self {
            id: TagId::next(),
            name: name.into(),
            visible: false,
            clients: Vec::new(),
            focused: None,
            layout: defaults.default_layout,
            master_count: defaults.master_count,
            master_ratio: defaults.master_ratio,
            events: ctx.events.clone(),
        }
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag_ref(&self) -> TagRef {
        TagRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn focused_client(&self) -> Option<ClientId> {
        self.focused
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn master_count(&self) -> usize {
        self.master_count
    }

    pub fn master_ratio(&self) -> f64 {
        self.master_ratio
    }

    pub fn params(&self) -> LayoutParams {
        LayoutParams {
            master_count: self.master_count,
            master_ratio: self.master_ratio,
        }
    }

    /// Append `id`; enables its view when this tag is shown
    pub fn add_client(&mut self, id: ClientId, clients: &mut ClientRegistry) {
        if self.contains(id) {
            debug!("Client {} already on tag '{}'", id, self.name);
            return;
        }
        self.clients.push(id);
        if self.visible {
            if let Some(client) = clients.get_mut(id) {
                client.set_visible(true);
            }
        }
        debug!("Added client {} to tag '{}'", id, self.name);
        self.events.publish(Event::ClientAdded {
            client: id,
            tag: self.tag_ref(),
        });
    }

    /// Returns false if `id` was not a member
    pub fn remove_client(&mut self, id: ClientId) -> bool {
        let Some(pos) = self.clients.iter().position(|&c| c == id) else {
            return false;
        };
        self.clients.remove(pos);
        if self.focused == Some(id) {
            self.focused = self.clients.first().copied();
        }
        debug!("Removed client {} from tag '{}'", id, self.name);
        self.events.publish(Event::ClientRemoved {
            client: id,
            tag: self.tag_ref(),
        });
        true
    }

    /// Show or hide every member. Setting the current value does nothing.
    pub fn set_visible(&mut self, visible: bool, clients: &mut ClientRegistry) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        for client in clients.targets_mut(&self.clients) {
            client.set_visible(visible);
        }
        debug!("Tag '{}' visible: {}", self.name, visible);
        self.events.publish(Event::TagVisibilityChanged {
            tag: self.tag_ref(),
            visible,
        });
    }

    /// Focus a mapped member, unfocusing the previous one
    pub fn focus_client(&mut self, id: ClientId, clients: &mut ClientRegistry) -> bool {
        if !self.contains(id) {
            warn!("Client {} is not on tag '{}'", id, self.name);
            return false;
        }
        if !clients.get(id).is_some_and(|c| c.is_mapped()) {
            debug!("Refusing to focus unmapped client {}", id);
            return false;
        }

        if let Some(previous) = self.focused.filter(|&p| p != id) {
            if let Some(client) = clients.get_mut(previous) {
                client.set_focused(false);
            }
        }
        if let Some(client) = clients.get_mut(id) {
            client.focus();
        }
        self.focused = Some(id);
        self.events.publish(Event::ClientFocused {
            client: id,
            tag: self.tag_ref(),
        });
        true
    }

    /// Focus the next mapped member after the focused one, wrapping
    pub fn focus_next(&mut self, clients: &mut ClientRegistry) -> Option<ClientId> {
        self.cycle_focus(clients, true)
    }

    /// Focus the previous mapped member, wrapping
    pub fn focus_prev(&mut self, clients: &mut ClientRegistry) -> Option<ClientId> {
        self.cycle_focus(clients, false)
    }

    fn cycle_focus(&mut self, clients: &mut ClientRegistry, forward: bool) -> Option<ClientId> {
        let candidates: Vec<ClientId> = self
            .clients
            .iter()
            .copied()
            .filter(|&id| clients.get(id).is_some_and(|c| c.is_mapped()))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let target = match self.focused.and_then(|f| candidates.iter().position(|&c| c == f)) {
            Some(pos) if forward => candidates[(pos + 1) % candidates.len()],
            Some(pos) => candidates[(pos + candidates.len() - 1) % candidates.len()],
            None => candidates[0],
        };
        self.focus_client(target, clients).then_some(target)
    }

    /// Move `id` to the master slot (front of the list)
    pub fn swap_with_master(&mut self, id: ClientId) -> bool {
        let Some(pos) = self.clients.iter().position(|&c| c == id) else {
            return false;
        };
        if pos != 0 {
            self.clients.swap(0, pos);
        }
        true
    }

    pub fn set_layout(&mut self, layout: LayoutKind) {
        let changed = self.layout != layout;
        self.layout = layout;
        if changed {
            debug!("Tag '{}' layout set to {}", self.name, layout);
            self.events.publish(Event::LayoutChanged {
                tag: self.tag_ref(),
                layout,
            });
        }
    }

    /// Rejects negative counts
    pub fn set_master_count(&mut self, count: i32) -> bool {
        if count < 0 {
            warn!("Rejected master count {} for tag '{}'", count, self.name);
            return false;
        }
        self.master_count = count as usize;
        true
    }

    /// Accepts only ratios strictly inside (0.05, 0.95); nothing is clamped
    pub fn set_master_ratio(&mut self, ratio: f64) -> bool {
        if !(ratio > MIN_MASTER_RATIO && ratio < MAX_MASTER_RATIO) {
            warn!("Rejected master ratio {:.3} for tag '{}'", ratio, self.name);
            return false;
        }
        self.master_ratio = ratio;
        true
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("clients", &self.clients)
            .field("focused", &self.focused)
            .field("layout", &self.layout)
            .field("master_count", &self.master_count)
            .field("master_ratio", &self.master_ratio)
            .finish()
    }
}


#[cfg(test)]
mod property_tests;
