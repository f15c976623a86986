//! Matching configured monitor entries against connected screens
//!
//! An identifier selects a screen by exact name (`"DP-1"`), by a substring of
//! its description (`"d:DELL U2720Q"`) or by a substring of
//! `"<make>/<model>"` (`"m:Dell Inc./DELL"`).

use log::{debug, warn};

use crate::config::{MonitorConfig, MonitorGroup};
use crate::screen::Screen;

const DESCRIPTION_PREFIX: &str = "d:";
const MAKE_MODEL_PREFIX: &str = "m:";

/// Whether `identifier` selects `screen`
pub fn matches(identifier: &str, screen: &Screen) -> bool {
    if let Some(needle) = identifier.strip_prefix(DESCRIPTION_PREFIX) {
        !needle.is_empty() && screen.description().contains(needle)
    } else if let Some(needle) = identifier.strip_prefix(MAKE_MODEL_PREFIX) {
        !needle.is_empty() && screen.make_model().contains(needle)
    } else {
        identifier == screen.name()
    }
}

/// Pair every entry of `group` with the first screen it selects.
///
/// Entries that match nothing are logged and skipped. A screen is claimed by
/// at most one entry.
pub fn match_group<'g, 's>(
    group: &'g MonitorGroup,
    screens: &[&'s Screen],
) -> Vec<(&'g MonitorConfig, &'s Screen)> {
    let mut claimed = vec![false; screens.len()];
    let mut pairs = Vec::new();

    for monitor in &group.monitors {
        let found = screens
            .iter()
            .enumerate()
            .find(|(i, screen)| !claimed[*i] && matches(&monitor.name, screen));
        match found {
            Some((i, screen)) => {
                claimed[i] = true;
                debug!("Monitor '{}' matched output {}", monitor.name, screen.name());
                pairs.push((monitor, *screen));
            }
            None => warn!(
                "Monitor '{}' in group '{}' matches no connected output",
                monitor.name, group.name
            ),
        }
    }
    pairs
}

fn matched_count(group: &MonitorGroup, screens: &[&Screen]) -> usize {
    group
        .monitors
        .iter()
        .filter(|m| screens.iter().any(|s| matches(&m.name, s)))
        .count()
}

/// Pick the group describing the connected setup.
///
/// The first group whose every entry matches wins; failing that, the first
/// group with at least one match.
pub fn select_group<'g>(groups: &'g [MonitorGroup], screens: &[&Screen]) -> Option<&'g MonitorGroup> {
    let complete = groups.iter().find(|g| {
        !g.monitors.is_empty() && matched_count(g, screens) == g.monitors.len()
    });
    complete.or_else(|| groups.iter().find(|g| matched_count(g, screens) > 0))
}
