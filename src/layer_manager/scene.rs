//! Layered scene ordering for one output
//!
//! This module provides [`SceneStack`], the z-order of every client on an
//! output. The stack is split into four fixed layers, rendered bottom to
//! top:
//!
//! 1. [`SceneLayer::Background`] (wallpaper surfaces)
//! 2. [`SceneLayer::WorkingArea`] (regular clients)
//! 3. [`SceneLayer::Top`] (bars and fullscreen clients)
//! 4. [`SceneLayer::NightLight`] (colour overlays)
//!
//! The layer order is fixed when the stack is created and cannot change.
//! Within a layer, clients are ordered bottom to top by insertion, and
//! raising a client moves it to the top of its own layer only.

use serde::{Deserialize, Serialize};

use crate::client::ClientId;

/// One of the four scene layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneLayer {
    Background = 0,
    WorkingArea = 1,
    Top = 2,
    NightLight = 3,
}

impl SceneLayer {
    /// Every layer, bottom to top
    pub const ALL: [SceneLayer; 4] = [
        SceneLayer::Background,
        SceneLayer::WorkingArea,
        SceneLayer::Top,
        SceneLayer::NightLight,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Z-order of the clients on one output.
///
/// # Examples
///
/// ```
/// use strata::client::Client;
/// use strata::layer_manager::{SceneLayer, SceneStack};
///
/// let (a, b) = (Client::detached().id(), Client::detached().id());
/// let mut scene = SceneStack::new();
/// scene.insert(a, SceneLayer::Top);
/// scene.insert(b, SceneLayer::WorkingArea);
///
/// assert_eq!(scene.render_order(), vec![b, a]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SceneStack {
    /// One bottom-to-top list per layer, indexed by `SceneLayer as usize`
    layers: [Vec<ClientId>; 4],
}

impl SceneStack {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client to the top of `layer`.
    ///
    /// # Returns
    ///
    /// `true` if the client was added, `false` if it is already in the scene
    /// (in any layer).
    pub fn insert(&mut self, id: ClientId, layer: SceneLayer) -> bool {
        if self.layer_of(id).is_some() {
            return false;
        }
        self.layers[layer.index()].push(id);
        true
    }

    /// Removes a client from whichever layer holds it.
    ///
    /// # Returns
    ///
    /// The layer the client was in, or `None` if it was not in the scene.
    pub fn remove(&mut self, id: ClientId) -> Option<SceneLayer> {
        let layer = self.layer_of(id)?;
        self.layers[layer.index()].retain(|&c| c != id);
        Some(layer)
    }

    /// Returns the layer holding `id`, if any.
    pub fn layer_of(&self, id: ClientId) -> Option<SceneLayer> {
        SceneLayer::ALL
            .into_iter()
            .find(|layer| self.layers[layer.index()].contains(&id))
    }

    /// Moves a client to the top of another layer.
    ///
    /// Moving a client to the layer it is already in leaves its position
    /// untouched.
    ///
    /// # Returns
    ///
    /// `false` if the client is not in the scene.
    pub fn move_to_layer(&mut self, id: ClientId, layer: SceneLayer) -> bool {
        match self.layer_of(id) {
            Some(current) if current == layer => true,
            Some(_) => {
                self.remove(id);
                self.layers[layer.index()].push(id);
                true
            }
            None => false,
        }
    }

    /// Moves a client to the top of its own layer.
    ///
    /// # Returns
    ///
    /// `false` if the client is not in the scene.
    pub fn raise(&mut self, id: ClientId) -> bool {
        let Some(layer) = self.layer_of(id) else {
            return false;
        };
        let members = &mut self.layers[layer.index()];
        members.retain(|&c| c != id);
        members.push(id);
        true
    }

    /// Clients in one layer, bottom to top.
    pub fn in_layer(&self, layer: SceneLayer) -> &[ClientId] {
        &self.layers[layer.index()]
    }

    /// Topmost client of a layer.
    pub fn top_of(&self, layer: SceneLayer) -> Option<ClientId> {
        self.layers[layer.index()].last().copied()
    }

    /// Every client, bottom to top across all layers.
    pub fn render_order(&self) -> Vec<ClientId> {
        self.layers.iter().flatten().copied().collect()
    }

    /// Total number of clients in the scene.
    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no layer holds a client.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }
}
