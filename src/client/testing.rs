//! Recording view used by unit tests across the crate

use super::{Rectangle, View, ViewHandle};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct TestView {
    pub geometry: Rectangle,
    pub position_writes: Vec<(i32, i32)>,
    pub enabled: bool,
    pub mapped: bool,
    pub fullscreen_requests: Vec<bool>,
    pub close_requests: usize,
    pub raises: usize,
    pub title: Option<String>,
    pub app_id: Option<String>,
}

impl TestView {
    pub fn mapped() -> Self {
        Self {
            enabled: true,
            mapped: true,
            ..Self::default()
        }
    }

    pub fn named(title: &str, app_id: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            app_id: Some(app_id.to_string()),
            ..Self::mapped()
        }
    }
}

impl View for TestView {
    fn set_position(&mut self, x: i32, y: i32) {
        self.position_writes.push((x, y));
        self.geometry.x = x;
        self.geometry.y = y;
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.geometry.width = width;
        self.geometry.height = height;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen_requests.push(fullscreen);
    }

    fn close(&mut self) {
        self.close_requests += 1;
    }

    fn raise(&mut self) {
        self.raises += 1;
    }

    fn is_mapped(&self) -> bool {
        self.mapped
    }

    fn geometry(&self) -> Rectangle {
        self.geometry
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }
}

/// Build a shared mapped view; keep the returned `Rc` alive for the test's duration
pub fn mapped_view() -> (Rc<RefCell<TestView>>, ViewHandle) {
    let view = Rc::new(RefCell::new(TestView::mapped()));
    let handle: ViewHandle = view.clone();
    (view, handle)
}

pub fn unmapped_view() -> (Rc<RefCell<TestView>>, ViewHandle) {
    let view = Rc::new(RefCell::new(TestView::default()));
    let handle: ViewHandle = view.clone();
    (view, handle)
}
