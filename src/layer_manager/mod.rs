//! Per-output window management
//!
//! A [`LayerManager`] owns everything that belongs to one output: the tag
//! list and current index, the client arena, the layered scene and the
//! reserved-space record. All geometry it produces is output-local.
//!
//! Operations that can be rejected return `bool` (accepted) and log the
//! reason. Nothing here panics on bad indices or unknown clients.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::{Client, ClientId, ClientRegistry, Rectangle, ViewHandle};
use crate::config::{BarConfig, BarPosition, MonitorConfig, Position, TagConfig, Transform};
use crate::context::Context;
use crate::events::Event;
use crate::layout::TilingLayout;
use crate::screen::{Output, Screen};
use crate::tag::{LayoutKind, Tag};

mod scene;

pub use scene::{SceneLayer, SceneStack};

/// Step applied by the master-ratio shortcuts
pub const MASTER_RATIO_STEP: f64 = 0.05;

/// Pixel margins reserved along each edge of an output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservedSpace {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl ReservedSpace {
    pub const fn new(top: i32, bottom: i32, left: i32, right: i32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Sum of the exclusive zones of `bars`
    pub fn from_bars<'a>(bars: impl IntoIterator<Item = &'a BarConfig>) -> Self {
        bars.into_iter()
            .filter(|bar| bar.exclusive)
            .fold(Self::default(), |mut acc, bar| {
                match bar.position {
                    BarPosition::Top => acc.top += bar.thickness,
                    BarPosition::Bottom => acc.bottom += bar.thickness,
                    BarPosition::Left => acc.left += bar.thickness,
                    BarPosition::Right => acc.right += bar.thickness,
                }
                acc
            })
    }
}

/// What the windowing layer should apply to an output after a monitor
/// entry matched it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRequest {
    pub output: String,
    pub wallpaper: Option<String>,
    pub position: Option<Position>,
    pub scale: Option<f64>,
    pub transform: Option<Transform>,
}

/// Window management for a single output
pub struct LayerManager {
    screen: Screen,
    ctx: Context,
    tags: Vec<Tag>,
    current: usize,
    clients: ClientRegistry,
    scene: SceneStack,
    reserved: ReservedSpace,
}

impl LayerManager {
    /// Create a manager for `screen` with the configured default tags
    pub fn new(screen: Screen, ctx: Context) -> Self {
        let mut manager = Self {
            screen,
            ctx,
            tags: Vec::new(),
            current: 0,
            clients: ClientRegistry::new(),
            scene: SceneStack::new(),
            reserved: ReservedSpace::default(),
        };
        let defaults = manager.ctx.config.tags.clone();
        manager.initialize_tags(&defaults);
        info!(
            "Output {} managed with {} tag(s)",
            manager.screen.name(),
            manager.tags.len()
        );
        manager
    }

    pub fn from_output(output: &dyn Output, ctx: Context) -> Self {
        Self::new(Screen::from_output(output), ctx)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn name(&self) -> &str {
        self.screen.name()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_tag(&self) -> Option<&Tag> {
        self.tags.get(self.current)
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn contains_client(&self, id: ClientId) -> bool {
        self.clients.contains(id)
    }

    /// Focused client of the current tag
    pub fn focused_client(&self) -> Option<ClientId> {
        self.current_tag().and_then(Tag::focused_client)
    }

    pub fn scene(&self) -> &SceneStack {
        &self.scene
    }

    /// Client ids bottom to top
    pub fn render_order(&self) -> Vec<ClientId> {
        self.scene.render_order()
    }

    pub fn reserved_space(&self) -> ReservedSpace {
        self.reserved
    }

    /// Index of the tag holding `id`
    pub fn tag_index_of(&self, id: ClientId) -> Option<usize> {
        self.tags.iter().position(|t| t.contains(id))
    }

    // === Geometry ===

    /// Subtract the reserved margins from an area.
    ///
    /// The result may be degenerate (zero or negative size) when the
    /// margins exceed the area; callers must tolerate that.
    pub fn calculate_usable_area(&self, x: i32, y: i32, width: i32, height: i32) -> Rectangle {
        let r = &self.reserved;
        Rectangle::new(
            x + r.left,
            y + r.top,
            width - (r.left + r.right),
            height - (r.top + r.bottom),
        )
    }

    /// Output-local usable area
    pub fn usable_area(&self) -> Rectangle {
        let (width, height) = self.screen.size();
        self.calculate_usable_area(0, 0, width, height)
    }

    /// Replace the reserved margins and retile. Equal values do nothing.
    pub fn set_reserved_space(&mut self, reserved: ReservedSpace) {
        if self.reserved == reserved {
            return;
        }
        self.reserved = reserved;
        let area = self.usable_area();
        if area.is_degenerate() {
            warn!(
                "Reserved space {:?} leaves no usable area on {}",
                reserved,
                self.screen.name()
            );
        }
        debug!("Reserved space on {} set to {:?}", self.screen.name(), reserved);
        self.ctx.events.publish(Event::ReservedSpaceChanged {
            output: self.screen.name().to_string(),
            reserved,
        });
        self.auto_tile();
    }

    /// Output mode changed
    pub fn set_output_size(&mut self, width: i32, height: i32) {
        if self.screen.size() == (width, height) {
            return;
        }
        self.screen.set_size(width, height);
        self.auto_tile();
    }

    /// Re-read position, size and scale from the output and retile
    pub fn update_output(&mut self, output: &dyn Output) {
        self.screen.update_mode(output);
        self.auto_tile();
    }

    // === Tags ===

    /// Replace the tag list.
    ///
    /// An empty list installs a single tag named "1". The first tag is shown
    /// and becomes current; clients of the old tags move onto it.
    pub fn initialize_tags(&mut self, configs: &[TagConfig]) {
        let orphans: Vec<ClientId> = self
            .tags
            .iter()
            .flat_map(|t| t.clients().iter().copied())
            .collect();

        let mut tags: Vec<Tag> = if configs.is_empty() {
            vec![Tag::new("1", &self.ctx)]
        } else {
            configs
                .iter()
                .map(|c| Tag::new(c.display_name(), &self.ctx))
                .collect()
        };

        tags[0].set_visible(true, &mut self.clients);
        for id in orphans {
            tags[0].add_client(id, &mut self.clients);
        }

        self.tags = tags;
        self.current = 0;
        self.screen.set_current_tag(Some(self.tags[0].id()));
        debug!(
            "Initialized {} tag(s) on {}",
            self.tags.len(),
            self.screen.name()
        );
        self.auto_tile();
    }

    /// Show the tag at `index`, hiding the current one
    pub fn switch_to_tag(&mut self, index: usize) -> bool {
        if index >= self.tags.len() {
            warn!(
                "Tag index {} out of range on {} ({} tags)",
                index,
                self.screen.name(),
                self.tags.len()
            );
            return false;
        }
        if index == self.current {
            return false;
        }

        let old = self.tags.get(self.current).map(Tag::tag_ref);
        if let Some(tag) = self.tags.get_mut(self.current) {
            tag.set_visible(false, &mut self.clients);
        }
        self.tags[index].set_visible(true, &mut self.clients);
        self.current = index;
        self.screen.set_current_tag(Some(self.tags[index].id()));

        debug!("Switched {} to tag '{}'", self.screen.name(), self.tags[index].name());
        self.ctx.events.publish(Event::TagSwitched {
            old_tag: old,
            new_tag: self.tags[index].tag_ref(),
            output: Some(self.screen.name().to_string()),
        });
        self.auto_tile();
        true
    }

    pub fn switch_to_next_tag(&mut self) -> bool {
        match self.tags.len() {
            0 => false,
            n => self.switch_to_tag((self.current + 1) % n),
        }
    }

    pub fn switch_to_prev_tag(&mut self) -> bool {
        match self.tags.len() {
            0 => false,
            n => self.switch_to_tag((self.current + n - 1) % n),
        }
    }

    // === Tiling ===

    /// Arrange `ids` with the layout of the tag at `tag_index`.
    ///
    /// Rectangles are computed inside the usable area at the origin and then
    /// shifted by the area's offset.
    pub fn tile_views(&mut self, ids: &[ClientId], tag_index: usize) {
        if ids.is_empty() {
            return;
        }
        let Some(tag) = self.tags.get(tag_index) else {
            debug!("tile_views: no tag at index {}", tag_index);
            return;
        };

        let area = self.usable_area();
        let gap = self.ctx.gap();
        let layout = tag.layout();
        let params = tag.params();

        let mut targets = self.clients.targets_mut(ids);
        let n = targets.len();
        let rects = match layout {
            LayoutKind::MasterStack => {
                TilingLayout::compute_master_stack(n, params, area.width, area.height, gap)
            }
            LayoutKind::Monocle => TilingLayout::compute_monocle(n, area.width, area.height),
            LayoutKind::Grid => TilingLayout::compute_grid(n, area.width, area.height, gap),
            LayoutKind::Floating => return,
        };

        // One write per view, already shifted onto the usable area
        for (client, rect) in targets.iter_mut().zip(rects) {
            client.set_geometry(rect.translated(area.x, area.y));
        }
    }

    /// Tile the mapped, non-floating, non-fullscreen clients of the current tag
    pub fn auto_tile(&mut self) {
        let Some(tag) = self.tags.get(self.current) else {
            return;
        };
        let ids: Vec<ClientId> = tag
            .clients()
            .iter()
            .copied()
            .filter(|&id| self.clients.get(id).is_some_and(Client::is_tileable))
            .collect();
        self.tile_views(&ids, self.current);
    }

    pub fn set_layout(&mut self, layout: LayoutKind) {
        if let Some(tag) = self.tags.get_mut(self.current) {
            tag.set_layout(layout);
            self.auto_tile();
        }
    }

    /// Advance the current tag to the next layout
    pub fn cycle_layout(&mut self) -> Option<LayoutKind> {
        let next = self.current_tag()?.layout().next();
        self.set_layout(next);
        Some(next)
    }

    pub fn increase_master_count(&mut self) -> bool {
        self.adjust_master_count(1)
    }

    /// Never goes below one master
    pub fn decrease_master_count(&mut self) -> bool {
        self.adjust_master_count(-1)
    }

    fn adjust_master_count(&mut self, delta: i32) -> bool {
        let Some(tag) = self.tags.get_mut(self.current) else {
            return false;
        };
        let target = i32::try_from(tag.master_count())
            .unwrap_or(i32::MAX)
            .saturating_add(delta);
        if target < 1 {
            debug!("Master count already at minimum on tag '{}'", tag.name());
            return false;
        }
        if !tag.set_master_count(target) {
            return false;
        }
        self.auto_tile();
        true
    }

    pub fn increase_master_ratio(&mut self) -> bool {
        self.adjust_master_ratio(MASTER_RATIO_STEP)
    }

    pub fn decrease_master_ratio(&mut self) -> bool {
        self.adjust_master_ratio(-MASTER_RATIO_STEP)
    }

    fn adjust_master_ratio(&mut self, delta: f64) -> bool {
        let Some(tag) = self.tags.get_mut(self.current) else {
            return false;
        };
        // Snap to the step grid so repeated steps cannot drift past a bound
        let stepped = ((tag.master_ratio() + delta) * 100.0).round() / 100.0;
        if !tag.set_master_ratio(stepped) {
            return false;
        }
        self.auto_tile();
        true
    }

    // === Clients ===

    /// Start managing a newly mapped view on the current tag
    pub fn map_client(&mut self, view: &ViewHandle) -> ClientId {
        self.adopt_client(Client::new(view))
    }

    /// Insert an existing client into the current tag, focus it and retile
    pub fn adopt_client(&mut self, mut client: Client) -> ClientId {
        client.set_focused(false);
        let layer = if client.is_fullscreen() {
            SceneLayer::Top
        } else {
            SceneLayer::WorkingArea
        };
        let id = self.clients.insert(client);
        self.scene.insert(id, layer);
        if let Some(tag) = self.tags.get_mut(self.current) {
            tag.add_client(id, &mut self.clients);
        }
        debug!("Mapped client {} on {}", id, self.screen.name());
        self.focus_client(id);
        self.auto_tile();
        id
    }

    /// Stop managing `id`. Returns the detached client.
    pub fn unmap_client(&mut self, id: ClientId) -> Option<Client> {
        if !self.clients.contains(id) {
            debug!("unmap_client: unknown client {}", id);
            return None;
        }
        let was_focused = self.focused_client() == Some(id);
        if let Some(index) = self.tag_index_of(id) {
            self.tags[index].remove_client(id);
        }
        self.scene.remove(id);
        let client = self.clients.remove(id);

        if was_focused {
            if let Some(next) = self.focused_client() {
                self.focus_client(next);
            }
        }
        self.auto_tile();
        client
    }

    /// Detach every client, leaving the tags empty
    pub fn drain_clients(&mut self) -> Vec<Client> {
        let mut drained = Vec::with_capacity(self.clients.len());
        for index in 0..self.tags.len() {
            let members = self.tags[index].clients().to_vec();
            for id in members {
                self.tags[index].remove_client(id);
                self.scene.remove(id);
                if let Some(client) = self.clients.remove(id) {
                    drained.push(client);
                }
            }
        }
        drained
    }

    /// Focus a client of the current tag and raise it in the scene
    pub fn focus_client(&mut self, id: ClientId) -> bool {
        let Some(tag) = self.tags.get_mut(self.current) else {
            return false;
        };
        if !tag.focus_client(id, &mut self.clients) {
            return false;
        }
        self.scene.raise(id);
        true
    }

    pub fn focus_next(&mut self) -> Option<ClientId> {
        let id = self.tags.get_mut(self.current)?.focus_next(&mut self.clients)?;
        self.scene.raise(id);
        Some(id)
    }

    pub fn focus_prev(&mut self) -> Option<ClientId> {
        let id = self.tags.get_mut(self.current)?.focus_prev(&mut self.clients)?;
        self.scene.raise(id);
        Some(id)
    }

    /// Ask the focused client to close
    pub fn close_focused(&mut self) -> bool {
        let Some(id) = self.focused_client() else {
            return false;
        };
        match self.clients.get_mut(id) {
            Some(client) => {
                client.close();
                true
            }
            None => false,
        }
    }

    pub fn set_client_floating(&mut self, id: ClientId, floating: bool) -> bool {
        let Some(client) = self.clients.get_mut(id) else {
            return false;
        };
        client.set_floating(floating);
        self.auto_tile();
        true
    }

    pub fn toggle_floating(&mut self) -> bool {
        let Some(id) = self.focused_client() else {
            return false;
        };
        let floating = self.clients.get(id).is_some_and(Client::is_floating);
        self.set_client_floating(id, !floating)
    }

    /// Fullscreen clients live in the top scene layer
    pub fn set_client_fullscreen(&mut self, id: ClientId, fullscreen: bool) -> bool {
        let Some(client) = self.clients.get_mut(id) else {
            return false;
        };
        client.set_fullscreen(fullscreen);
        if fullscreen {
            let (width, height) = self.screen.size();
            client.set_geometry(Rectangle::new(0, 0, width, height));
        }
        let layer = if fullscreen {
            SceneLayer::Top
        } else {
            SceneLayer::WorkingArea
        };
        self.scene.move_to_layer(id, layer);
        self.auto_tile();
        true
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        let Some(id) = self.focused_client() else {
            return false;
        };
        let fullscreen = self.clients.get(id).is_some_and(Client::is_fullscreen);
        self.set_client_fullscreen(id, !fullscreen)
    }

    /// Move `id` to the tag at `target`.
    ///
    /// The client is shown only when `target` is the current tag.
    pub fn move_client_to_tag(&mut self, id: ClientId, target: usize) -> bool {
        if target >= self.tags.len() {
            warn!("Target tag {} out of range on {}", target, self.screen.name());
            return false;
        }
        let Some(source) = self.tag_index_of(id) else {
            debug!("move_client_to_tag: client {} has no tag", id);
            return false;
        };
        if source == target {
            return false;
        }

        let was_focused = source == self.current && self.focused_client() == Some(id);
        self.tags[source].remove_client(id);
        self.tags[target].add_client(id, &mut self.clients);
        if let Some(client) = self.clients.get_mut(id) {
            client.set_visible(target == self.current);
            if target != self.current {
                client.set_focused(false);
            }
        }
        debug!(
            "Moved client {} to tag '{}'",
            id,
            self.tags[target].name()
        );
        if was_focused {
            if let Some(next) = self.focused_client() {
                self.focus_client(next);
            }
        }
        self.auto_tile();
        true
    }

    pub fn move_focused_to_tag(&mut self, target: usize) -> bool {
        match self.focused_client() {
            Some(id) => self.move_client_to_tag(id, target),
            None => false,
        }
    }

    /// Put the focused client in the master slot
    pub fn zoom_focused(&mut self) -> bool {
        let Some(id) = self.focused_client() else {
            return false;
        };
        let Some(tag) = self.tags.get_mut(self.current) else {
            return false;
        };
        if !tag.swap_with_master(id) {
            return false;
        }
        self.auto_tile();
        true
    }

    // === Monitor configuration ===

    /// Apply one matched monitor entry.
    ///
    /// Installs the entry's tags (when it lists any), reserves the space of
    /// its exclusive bars and returns what the windowing layer should do with
    /// the output itself.
    pub fn apply_monitor_config(&mut self, monitor: &MonitorConfig) -> OutputRequest {
        if !monitor.tags.is_empty() {
            self.initialize_tags(&monitor.tags);
        }
        self.set_reserved_space(ReservedSpace::from_bars(&monitor.bars));
        info!(
            "Applied monitor entry '{}' to {}",
            monitor.name,
            self.screen.name()
        );
        OutputRequest {
            output: self.screen.name().to_string(),
            wallpaper: monitor.wallpaper.clone(),
            position: monitor.position,
            scale: monitor.scale,
            transform: monitor.transform,
        }
    }
}

impl fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerManager")
            .field("screen", &self.screen)
            .field("tags", &self.tags)
            .field("current", &self.current)
            .field("clients", &self.clients.len())
            .field("reserved", &self.reserved)
            .finish()
    }
}
