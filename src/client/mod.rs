//! Client wrapper around external window surfaces
//!
//! A [`Client`] is the window-management view of one surface handed to us by
//! the windowing layer. The surface itself lives behind the [`View`] contract
//! and is owned by that external layer: a client only keeps a [`Weak`]
//! handle, so once the layer drops its [`ViewHandle`] every operation on the
//! client quietly degrades to a no-op returning defaults.
//!
//! Clients are stored in a flat [`ClientRegistry`] owned by the per-output
//! layer manager. Tags refer to them by [`ClientId`] only.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::layout::LayoutTarget;

/// Placeholder title for views that do not report one
pub const UNTITLED: &str = "<untitled>";

/// Placeholder app-id for views that do not report one
pub const UNKNOWN_APP: &str = "<unknown>";

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Contract implemented by the external windowing layer for one surface.
pub trait View {
    fn set_position(&mut self, x: i32, y: i32);
    fn set_size(&mut self, width: i32, height: i32);
    fn set_enabled(&mut self, enabled: bool);
    fn set_fullscreen(&mut self, fullscreen: bool);
    fn close(&mut self);
    fn raise(&mut self);

    /// Whether the surface has committed a buffer and may be shown
    fn is_mapped(&self) -> bool;

    fn geometry(&self) -> Rectangle;

    fn title(&self) -> Option<String> {
        None
    }

    fn app_id(&self) -> Option<String> {
        None
    }
}

/// Owning handle held by the windowing layer
pub type ViewHandle = Rc<RefCell<dyn View>>;

/// Rectangle for window positioning and sizing.
///
/// Width and height are signed: usable-area arithmetic may legitimately
/// produce degenerate (zero or negative) extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_loc_and_size((x, y): (i32, i32), (width, height): (i32, i32)) -> Self {
        Self::new(x, y, width, height)
    }

    /// Same size, shifted by `(dx, dy)`
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// True when either extent is zero or negative
    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Stable identifier of a client, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Window-management state for one view
pub struct Client {
    id: ClientId,
    view: Option<Weak<RefCell<dyn View>>>,
    title: String,
    app_id: String,
    floating: bool,
    fullscreen: bool,
    focused: bool,
    visible: bool,
}

impl Client {
    /// Wrap a view. The client never owns it.
    pub fn new(view: &ViewHandle) -> Self {
        let mut client = Self::bare(Some(Rc::downgrade(view)));
        client.refresh_metadata();
        client
    }

    /// A client wrapping no view; every operation is a no-op
    pub fn detached() -> Self {
        Self::bare(None)
    }

    fn bare(view: Option<Weak<RefCell<dyn View>>>) -> Self {
        Self {
            id: ClientId::next(),
            view,
            title: UNTITLED.to_string(),
            app_id: UNKNOWN_APP.to_string(),
            floating: false,
            fullscreen: false,
            focused: false,
            visible: true,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Upgrade the weak handle, if the view is still alive
    fn view(&self) -> Option<ViewHandle> {
        self.view.as_ref().and_then(Weak::upgrade)
    }

    fn with_view<R: Default>(&self, f: impl FnOnce(&mut dyn View) -> R) -> R {
        match self.view() {
            Some(view) => match view.try_borrow_mut() {
                Ok(mut view) => f(&mut *view),
                Err(_) => {
                    debug!("View of client {} already borrowed, skipping", self.id);
                    R::default()
                }
            },
            None => R::default(),
        }
    }

    pub fn has_view(&self) -> bool {
        self.view().is_some()
    }

    /// Re-read title and app-id from the view
    pub fn refresh_metadata(&mut self) {
        let (title, app_id) = match self.view() {
            Some(view) => match view.try_borrow() {
                Ok(view) => (view.title(), view.app_id()),
                Err(_) => (None, None),
            },
            None => (None, None),
        };
        self.title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        self.app_id = app_id
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_APP.to_string());
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn is_mapped(&self) -> bool {
        match self.view() {
            Some(view) => view.try_borrow().map(|v| v.is_mapped()).unwrap_or(false),
            None => false,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether an auto-tile pass should arrange this client
    pub fn is_tileable(&self) -> bool {
        self.is_mapped() && !self.floating && !self.fullscreen
    }

    /// Flag only. The caller decides when to retile.
    pub fn set_floating(&mut self, floating: bool) {
        if self.view.is_none() {
            return;
        }
        self.floating = floating;
    }

    /// Flag plus a fullscreen request to the view. Does not retile.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.view.is_none() {
            return;
        }
        self.fullscreen = fullscreen;
        self.with_view(|v| v.set_fullscreen(fullscreen));
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        if self.view.is_none() {
            return;
        }
        self.focused = focused;
    }

    /// Toggle the view's enable bit
    pub fn set_visible(&mut self, visible: bool) {
        if self.view.is_none() {
            return;
        }
        self.visible = visible;
        self.with_view(|v| v.set_enabled(visible));
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.with_view(|v| v.set_position(x, y));
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.with_view(|v| v.set_size(width, height));
    }

    pub fn set_geometry(&mut self, rect: Rectangle) {
        self.with_view(|v| {
            v.set_position(rect.x, rect.y);
            v.set_size(rect.width, rect.height);
        });
    }

    pub fn geometry(&self) -> Rectangle {
        match self.view() {
            Some(view) => view.try_borrow().map(|v| v.geometry()).unwrap_or_default(),
            None => Rectangle::default(),
        }
    }

    pub fn x(&self) -> i32 {
        self.geometry().x
    }

    pub fn y(&self) -> i32 {
        self.geometry().y
    }

    pub fn width(&self) -> i32 {
        self.geometry().width
    }

    pub fn height(&self) -> i32 {
        self.geometry().height
    }

    pub fn close(&mut self) {
        self.with_view(|v| v.close());
    }

    pub fn raise(&mut self) {
        self.with_view(|v| v.raise());
    }

    /// Mark focused and raise the view
    pub fn focus(&mut self) {
        self.set_focused(true);
        self.raise();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("app_id", &self.app_id)
            .field("floating", &self.floating)
            .field("fullscreen", &self.fullscreen)
            .field("focused", &self.focused)
            .field("visible", &self.visible)
            .field("has_view", &self.has_view())
            .finish()
    }
}

impl LayoutTarget for Client {
    fn apply_geometry(&mut self, rect: Rectangle) {
        self.set_geometry(rect);
    }

    fn current_geometry(&self) -> Rectangle {
        self.geometry()
    }
}

/// Flat collection of every client on one output
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, client: Client) -> ClientId {
        let id = client.id();
        self.clients.insert(id, client);
        id
    }

    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.values_mut()
    }

    /// Mutable references to `ids`, in the given order. Unknown ids are skipped.
    pub fn targets_mut(&mut self, ids: &[ClientId]) -> Vec<&mut Client> {
        let mut by_id: HashMap<ClientId, &mut Client> =
            self.clients.iter_mut().map(|(id, c)| (*id, c)).collect();
        ids.iter().filter_map(|id| by_id.remove(id)).collect()
    }
}

#[cfg(test)]
pub(crate) mod testing;
