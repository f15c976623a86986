//! Integration tests for Strata
//!
//! These tests drive the public API end to end: configuration loading,
//! outputs and monitor groups, client lifecycle across tags and outputs, and
//! event delivery in both bus modes.

use anyhow::Result;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use strata::events::{BroadcastKind, BroadcastRecord, Broadcaster};
use strata::{
    Context, Event, EventBus, EventKind, LayoutKind, OutputInfo, Rectangle, ReservedSpace, Seat,
    StrataConfig, View, ViewHandle,
};

const CONFIG: &str = r#"
[general]
gap = 10

[layout]
master_ratio = 0.6

[[tags]]
name = "1"

[[tags]]
name = "2"

[[monitor_groups]]
name = "desk"

[[monitor_groups.monitors]]
name = "eDP-1"

[[monitor_groups.monitors.bars]]
position = "top"
thickness = 30

[[monitor_groups.monitors]]
name = "m:Dell Inc./DELL U2720Q"
wallpaper = "/usr/share/backgrounds/desk.png"
tags = [{ name = "web" }, { name = "code" }, { name = "chat" }]
"#;

#[derive(Debug, Default)]
struct FakeView {
    geometry: Rectangle,
    enabled: bool,
    mapped: bool,
    closed: bool,
}

impl View for FakeView {
    fn set_position(&mut self, x: i32, y: i32) {
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
    fn set_fullscreen(&mut self, _fullscreen: bool) {}
    fn close(&mut self) {
        self.closed = true;
    }
    fn raise(&mut self) {}
    fn is_mapped(&self) -> bool {
        self.mapped
    }
    fn geometry(&self) -> Rectangle {
        self.geometry
    }
    fn title(&self) -> Option<String> {
        Some("fake".to_string())
    }
}

fn fake_view() -> (Rc<RefCell<FakeView>>, ViewHandle) {
    let view = Rc::new(RefCell::new(FakeView {
        enabled: true,
        mapped: true,
        ..FakeView::default()
    }));
    let handle: ViewHandle = view.clone();
    (view, handle)
}

fn laptop() -> OutputInfo {
    OutputInfo {
        description: "BOE 0x0BCA".to_string(),
        make: "BOE".to_string(),
        model: "0x0BCA".to_string(),
        ..OutputInfo::new("eDP-1", 1000, 800)
    }
}

fn dell() -> OutputInfo {
    OutputInfo {
        description: "Dell Inc. DELL U2720Q".to_string(),
        make: "Dell Inc.".to_string(),
        model: "DELL U2720Q".to_string(),
        x: 1000,
        ..OutputInfo::new("DP-1", 2560, 1440)
    }
}

fn desk_seat() -> Result<Seat> {
    let dir = tempdir()?;
    let path = dir.path().join("strata.toml");
    fs::write(&path, CONFIG)?;
    let config = StrataConfig::load(&path)?;

    let mut seat = Seat::new(Context::new(config));
    seat.add_output(&laptop());
    seat.add_output(&dell());
    Ok(seat)
}

#[derive(Default)]
struct RecordingBroadcaster {
    records: Mutex<Vec<BroadcastRecord>>,
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, record: BroadcastRecord) {
        self.records.lock().push(record);
    }
}

/// Config file to tiled windows, through monitor-group selection
#[test]
fn test_configured_desk_setup() -> Result<()> {
    let mut seat = desk_seat()?;
    let requests = seat.apply_configured_monitors();

    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].wallpaper.as_deref(),
        Some("/usr/share/backgrounds/desk.png")
    );

    let laptop = seat.output("eDP-1").expect("laptop output");
    assert_eq!(laptop.reserved_space(), ReservedSpace::new(30, 0, 0, 0));
    let names: Vec<&str> = laptop.tags().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["1", "2"]);

    let dell = seat.output("DP-1").expect("dell output");
    assert_eq!(dell.tags().len(), 3);
    assert_eq!(dell.tags()[0].name(), "web");

    let views: Vec<_> = (0..3).map(|_| fake_view()).collect();
    for (_, handle) in &views {
        seat.map_view(handle);
    }

    // Shifted down by the 30px bar: the area is 1000x770 at y=30
    let geometry: Vec<Rectangle> = views.iter().map(|(v, _)| v.borrow().geometry).collect();
    assert_eq!(geometry[0], Rectangle::new(10, 40, 578, 750));
    assert_eq!(geometry[1], Rectangle::new(598, 40, 392, 370));
    assert_eq!(geometry[2], Rectangle::new(598, 420, 392, 370));
    Ok(())
}

/// Tags hide and show their clients; moves follow the current tag
#[test]
fn test_tag_workflow() -> Result<()> {
    let mut seat = desk_seat()?;
    let (first, first_handle) = fake_view();
    let (second, second_handle) = fake_view();
    let a = seat.map_view(&first_handle).expect("mapped");
    let _b = seat.map_view(&second_handle).expect("mapped");

    let output = seat.focused_output_mut().expect("focused output");
    assert!(output.move_client_to_tag(a, 1));
    assert!(!first.borrow().enabled);
    assert_eq!(second.borrow().geometry, Rectangle::new(10, 10, 980, 780));

    assert!(output.switch_to_tag(1));
    assert!(first.borrow().enabled);
    assert!(!second.borrow().enabled);
    assert_eq!(first.borrow().geometry, Rectangle::new(10, 10, 980, 780));

    assert!(!output.switch_to_tag(1));
    assert!(!output.switch_to_tag(9));
    assert_eq!(output.current_index(), 1);
    Ok(())
}

/// A view released by the windowing layer leaves an inert client behind
#[test]
fn test_released_view_is_skipped() -> Result<()> {
    let mut seat = desk_seat()?;
    let (kept, kept_handle) = fake_view();
    let id = {
        let (_gone, gone_handle) = fake_view();
        seat.map_view(&gone_handle).expect("mapped")
    };
    seat.map_view(&kept_handle);

    let output = seat.focused_output_mut().expect("focused output");
    output.auto_tile();
    assert_eq!(kept.borrow().geometry, Rectangle::new(10, 10, 980, 780));
    assert!(output.client(id).is_some_and(|c| !c.has_view()));

    assert!(seat.unmap_client(id).is_some());
    Ok(())
}

/// Layout cycling and closing through the output API
#[test]
fn test_layout_and_close() -> Result<()> {
    let mut seat = desk_seat()?;
    let views: Vec<_> = (0..4).map(|_| fake_view()).collect();
    for (_, handle) in &views {
        seat.map_view(handle);
    }

    let output = seat.focused_output_mut().expect("focused output");
    output.set_layout(LayoutKind::Grid);
    let cells: Vec<Rectangle> = views.iter().map(|(v, _)| v.borrow().geometry).collect();
    assert_eq!(cells[0], Rectangle::new(10, 10, 485, 385));
    assert_eq!(cells[3], Rectangle::new(505, 405, 485, 385));

    assert!(output.close_focused());
    assert!(views[3].0.borrow().closed);
    Ok(())
}

/// Broadcast mode forwards translated records instead of dispatching
#[test]
fn test_broadcast_mode_end_to_end() -> Result<()> {
    let bus = Arc::new(EventBus::new());
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let local = Arc::new(Mutex::new(0usize));
    {
        let local = local.clone();
        bus.subscribe(EventKind::ClientAdded, move |_| *local.lock() += 1);
    }
    bus.attach_broadcaster(broadcaster.clone());

    let mut seat = Seat::new(Context::with_events(StrataConfig::default(), bus.clone()));
    seat.add_output(&laptop());
    let (_view, handle) = fake_view();
    seat.map_view(&handle);
    seat.focused_output_mut()
        .expect("focused output")
        .set_layout(LayoutKind::Monocle);

    assert_eq!(*local.lock(), 0);
    let kinds: Vec<BroadcastKind> = broadcaster.records.lock().iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&BroadcastKind::ClientAdded));
    assert!(kinds.contains(&BroadcastKind::LayoutChanged));
    assert!(kinds.contains(&BroadcastKind::Unknown));

    bus.detach_broadcaster();
    assert!(!bus.is_broadcasting());
    Ok(())
}

/// Events published from several threads all reach the subscriber
#[test]
fn test_cross_thread_publishing() {
    let bus = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        bus.subscribe(EventKind::ReservedSpaceChanged, move |event| {
            if let Event::ReservedSpaceChanged { output, .. } = event {
                seen.lock().push(output.clone());
            }
        });
    }

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let bus = bus.clone();
            thread::spawn(move || {
                for j in 0..25 {
                    bus.publish(Event::ReservedSpaceChanged {
                        output: format!("out-{}-{}", i, j),
                        reserved: ReservedSpace::new(j, 0, 0, 0),
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("publisher thread");
    }

    assert_eq!(bus.pending(), 0);
    assert_eq!(seen.lock().len(), 100);
}
