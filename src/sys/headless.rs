//! In-memory collaborators. The simulator and the tests drive the dock
//! through these; every handle is cheap to clone and shares its state.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::geometry::{Point, Rect, Size};
use super::screen::{Display, MonitorGeometry, MonitorId};
use crate::common::collections::HashMap;
use crate::model::{
    ActivationAction, AppRef, IconEntry, IconId, IconKind, IconSource, IconVisual, WindowActions,
    WindowId, WindowInfo, new_visual,
};

#[derive(Debug, Clone, Default)]
pub struct HeadlessDisplay {
    monitors: Rc<RefCell<Vec<MonitorGeometry>>>,
}

impl HeadlessDisplay {
    pub fn new(monitors: Vec<MonitorGeometry>) -> Self {
        HeadlessDisplay {
            monitors: Rc::new(RefCell::new(monitors)),
        }
    }

    /// A single primary monitor at the origin.
    pub fn single(width: f64, height: f64, scale_factor: f64) -> Self {
        Self::new(vec![MonitorGeometry {
            id: MonitorId::new(1),
            frame: Rect::from_xywh(0.0, 0.0, width, height),
            scale_factor,
            is_primary: true,
            panel_height: 0.0,
        }])
    }

    pub fn set_monitors(&self, monitors: Vec<MonitorGeometry>) {
        *self.monitors.borrow_mut() = monitors;
    }
}

impl Display for HeadlessDisplay {
    fn monitors(&self) -> Vec<MonitorGeometry> { self.monitors.borrow().clone() }
}

/// Icon description used to seed a [`HeadlessIcons`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSpec {
    pub id: IconId,
    #[serde(default = "app_kind")]
    pub kind: IconKind,
    #[serde(default)]
    pub app: Option<AppRef>,
    #[serde(default)]
    pub favorite: bool,
}

fn app_kind() -> IconKind { IconKind::App }

struct HeadlessIcon {
    spec: IconSpec,
    visual: Rc<RefCell<IconVisual>>,
}

/// Icons laid out in a row from the origin at a fixed pitch. Only the
/// primary axis of the bounds matters to the dock.
#[derive(Clone, Default)]
pub struct HeadlessIcons {
    icons: Rc<RefCell<Vec<HeadlessIcon>>>,
}

pub const HEADLESS_ICON_PITCH: f64 = 80.0;
pub const HEADLESS_ICON_SIZE: f64 = 64.0;

impl HeadlessIcons {
    pub fn new(specs: impl IntoIterator<Item = IconSpec>) -> Self {
        let this = HeadlessIcons::default();
        for spec in specs {
            this.push(spec);
        }
        this
    }

    /// `count` favourite app icons with no open windows.
    pub fn apps(count: usize) -> Self {
        Self::new((0..count as u64).map(|i| IconSpec {
            id: IconId(i),
            kind: IconKind::App,
            app: Some(AppRef {
                id: format!("app-{i}"),
                window_count: 0,
                running: false,
                can_open_new_window: true,
            }),
            favorite: true,
        }))
    }

    pub fn push(&self, spec: IconSpec) {
        self.icons.borrow_mut().push(HeadlessIcon { spec, visual: new_visual() });
    }

    /// Destroys the icon's visual, as if the host widget went away.
    pub fn remove(&self, id: IconId) -> bool {
        let mut icons = self.icons.borrow_mut();
        let before = icons.len();
        icons.retain(|icon| icon.spec.id != id);
        icons.len() != before
    }

    pub fn visual(&self, id: IconId) -> Option<IconVisual> {
        self.icons
            .borrow()
            .iter()
            .find(|icon| icon.spec.id == id)
            .map(|icon| icon.visual.borrow().clone())
    }

    pub fn len(&self) -> usize { self.icons.borrow().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl IconSource for HeadlessIcons {
    fn icons(&mut self) -> Vec<IconEntry> {
        self.icons
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, icon)| {
                let origin = Point::new(HEADLESS_ICON_PITCH * i as f64, 0.0);
                IconEntry {
                    id: icon.spec.id,
                    kind: icon.spec.kind,
                    bounds: Rect::new(origin, Size::new(HEADLESS_ICON_SIZE, HEADLESS_ICON_SIZE)),
                    app: icon.spec.app.clone(),
                    favorite: icon.spec.favorite,
                    visual: Rc::downgrade(&icon.visual),
                }
            })
            .collect()
    }
}

/// Window state per application, recording every action performed.
#[derive(Debug, Clone, Default)]
pub struct RecordingWindows {
    windows: Rc<RefCell<HashMap<String, Vec<WindowInfo>>>>,
    performed: Rc<RefCell<Vec<ActivationAction>>>,
}

impl RecordingWindows {
    pub fn new() -> Self { Self::default() }

    pub fn set_windows(&self, app_id: &str, windows: Vec<WindowInfo>) {
        self.windows.borrow_mut().insert(app_id.to_owned(), windows);
    }

    pub fn performed(&self) -> Vec<ActivationAction> { self.performed.borrow().clone() }

    fn update(&self, ids: &[WindowId], f: impl Fn(&mut WindowInfo)) {
        for windows in self.windows.borrow_mut().values_mut() {
            for window in windows.iter_mut().filter(|w| ids.contains(&w.id)) {
                f(window);
            }
        }
    }
}

impl WindowActions for RecordingWindows {
    fn windows(&self, app_id: &str) -> Vec<WindowInfo> {
        self.windows.borrow().get(app_id).cloned().unwrap_or_default()
    }

    fn perform(&mut self, action: &ActivationAction) {
        trace!(?action, "perform");
        match action {
            ActivationAction::MinimizeAll(ids) => self.update(ids, |w| {
                w.hidden = true;
                w.focused = false;
            }),
            ActivationAction::ToggleMaximize(id) => {
                self.update(std::slice::from_ref(id), |w| w.maximized = !w.maximized)
            }
            ActivationAction::Restore(ids) => self.update(ids, |w| w.hidden = false),
        }
        self.performed.borrow_mut().push(action.clone());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn icons_share_visuals_with_their_source() {
        let mut source = HeadlessIcons::apps(3);
        let entries = source.icons();
        assert_eq!(entries.len(), 3);
        entries[1].with_visual(|v| v.scale = 1.4);
        assert_eq!(source.visual(IconId(1)).map(|v| v.scale), Some(1.4));

        assert!(source.remove(IconId(1)));
        assert!(!entries[1].is_alive());
        assert!(entries[0].is_alive());
    }

    #[test]
    fn recorded_actions_update_window_state() {
        let mut windows = RecordingWindows::new();
        let window = WindowInfo {
            id: WindowId(7),
            focused: true,
            hidden: false,
            maximized: false,
        };
        windows.set_windows("editor", vec![window]);

        windows.perform(&ActivationAction::MinimizeAll(vec![WindowId(7)]));
        assert!(windows.windows("editor")[0].hidden);
        windows.perform(&ActivationAction::Restore(vec![WindowId(7)]));
        assert!(!windows.windows("editor")[0].hidden);
        assert_eq!(windows.performed().len(), 2);
        assert!(windows.windows("missing").is_empty());
    }

    #[test]
    fn display_updates_are_visible_through_clones() {
        let display = HeadlessDisplay::single(1920.0, 1080.0, 1.0);
        let handle = display.clone();
        handle.set_monitors(vec![]);
        assert!(display.primary().is_none());
    }
}
