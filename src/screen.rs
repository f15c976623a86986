//! Screens: window-management view of a physical output

use serde::{Deserialize, Serialize};

use crate::client::Rectangle;
use crate::tag::TagId;

/// Contract for an external display handle
pub trait Output {
    fn name(&self) -> String;
    fn description(&self) -> String;
    fn make(&self) -> String;
    fn model(&self) -> String;
    fn serial(&self) -> String;
    fn position(&self) -> (i32, i32);
    fn size(&self) -> (i32, i32);
    fn scale(&self) -> f64;
}

/// Plain output description, for embedders without a live handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "OutputInfo::default_scale")]
    pub scale: f64,
}

impl OutputInfo {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            make: String::new(),
            model: String::new(),
            serial: String::new(),
            x: 0,
            y: 0,
            width,
            height,
            scale: 1.0,
        }
    }

    fn default_scale() -> f64 {
        1.0
    }
}

impl Output for OutputInfo {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn description(&self) -> String {
        self.description.clone()
    }
    fn make(&self) -> String {
        self.make.clone()
    }
    fn model(&self) -> String {
        self.model.clone()
    }
    fn serial(&self) -> String {
        self.serial.clone()
    }
    fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
    fn scale(&self) -> f64 {
        self.scale
    }
}

/// One output as seen by window management.
///
/// Identity strings are read once at construction. The current tag is a
/// non-owning handle; the layer manager owning the tag keeps it in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    name: String,
    description: String,
    make: String,
    model: String,
    serial: String,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    scale: f64,
    current_tag: Option<TagId>,
}

impl Screen {
    pub fn from_output(output: &dyn Output) -> Self {
        let (x, y) = output.position();
        let (width, height) = output.size();
        Self {
            name: output.name(),
            description: output.description(),
            make: output.make(),
            model: output.model(),
            serial: output.serial(),
            x,
            y,
            width,
            height,
            scale: output.scale(),
            current_tag: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// `"<make>/<model>"`, used by `m:` monitor identifiers
    pub fn make_model(&self) -> String {
        format!("{}/{}", self.make, self.model)
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Logical geometry in the global coordinate space
    pub fn geometry(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    pub fn current_tag(&self) -> Option<TagId> {
        self.current_tag
    }

    pub fn set_current_tag(&mut self, tag: Option<TagId>) {
        self.current_tag = tag;
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }

    /// Refresh position, size and scale after a mode change
    pub fn update_mode(&mut self, output: &dyn Output) {
        let (x, y) = output.position();
        let (width, height) = output.size();
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self.scale = output.scale();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dell() -> OutputInfo {
        OutputInfo {
            description: "Dell Inc. DELL U2720Q 7XYZ (DP-1)".to_string(),
            make: "Dell Inc.".to_string(),
            model: "DELL U2720Q".to_string(),
            serial: "7XYZ".to_string(),
            x: 1920,
            scale: 1.5,
            ..OutputInfo::new("DP-1", 2560, 1440)
        }
    }

    #[test]
    fn test_screen_reads_output_once() {
        let mut info = dell();
        let screen = Screen::from_output(&info);

        info.name = "renamed".to_string();
        assert_eq!(screen.name(), "DP-1");
        assert_eq!(screen.serial(), "7XYZ");
        assert_eq!(screen.position(), (1920, 0));
        assert_eq!(screen.size(), (2560, 1440));
        assert_eq!(screen.scale(), 1.5);
        assert_eq!(screen.make_model(), "Dell Inc./DELL U2720Q");
        assert_eq!(screen.geometry(), Rectangle::new(1920, 0, 2560, 1440));
        assert_eq!(screen.current_tag(), None);
    }

    #[test]
    fn test_update_mode_keeps_identity() {
        let mut info = dell();
        let mut screen = Screen::from_output(&info);

        info.width = 3840;
        info.height = 2160;
        info.scale = 2.0;
        info.description = "changed".to_string();
        screen.update_mode(&info);

        assert_eq!(screen.size(), (3840, 2160));
        assert_eq!(screen.scale(), 2.0);
        assert_eq!(screen.description(), "Dell Inc. DELL U2720Q 7XYZ (DP-1)");
    }

    #[test]
    fn test_current_tag_handle() {
        let mut screen = Screen::from_output(&OutputInfo::new("HDMI-A-1", 1920, 1080));
        screen.set_current_tag(Some(TagId::from_raw(3)));
        assert_eq!(screen.current_tag(), Some(TagId::from_raw(3)));
        screen.set_current_tag(None);
        assert_eq!(screen.current_tag(), None);
    }
}
