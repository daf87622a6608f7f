use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::app::AppRef;
use crate::sys::geometry::{Rect, Size};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    App,
    Separator,
    /// The show-applications affordance at the end of the dock.
    ShowApps,
}

/// Rendered representation of an icon. Owned by the icon source; the dock
/// only writes transient transforms and visibility through a weak handle.
#[derive(Debug, Clone, PartialEq)]
pub struct IconVisual {
    pub scale: f64,
    pub translation_y: f64,
    pub visible: bool,
    /// Explicit size override. `None` lets the source size the icon.
    pub size: Option<Size>,
}

impl Default for IconVisual {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation_y: 0.0,
            visible: true,
            size: None,
        }
    }
}

pub type VisualHandle = Weak<RefCell<IconVisual>>;

/// One icon as reported by the icon source for a single layout pass.
#[derive(Debug, Clone)]
pub struct IconEntry {
    pub id: IconId,
    pub kind: IconKind,
    pub bounds: Rect,
    pub app: Option<AppRef>,
    pub favorite: bool,
    pub visual: VisualHandle,
}

impl IconEntry {
    pub fn is_separator(&self) -> bool { self.kind == IconKind::Separator }

    /// Runs `f` against the rendered visual. Returns `None` when the external
    /// widget has been destroyed since the entry was collected.
    pub fn with_visual<T>(&self, f: impl FnOnce(&mut IconVisual) -> T) -> Option<T> {
        let visual = self.visual.upgrade()?;
        let mut visual = visual.try_borrow_mut().ok()?;
        Some(f(&mut visual))
    }

    pub fn is_alive(&self) -> bool { self.visual.strong_count() > 0 }

    pub fn is_visible(&self) -> bool { self.with_visual(|v| v.visible).unwrap_or(false) }
}

/// Supplies the current icons on request. Locating the icons inside the host
/// launcher and hooking their activation is the source's job.
pub trait IconSource {
    fn icons(&mut self) -> Vec<IconEntry>;
}

/// Convenience for sources that own their visuals directly.
pub fn new_visual() -> Rc<RefCell<IconVisual>> { Rc::new(RefCell::new(IconVisual::default())) }

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(visual: &Rc<RefCell<IconVisual>>) -> IconEntry {
        IconEntry {
            id: IconId(1),
            kind: IconKind::App,
            bounds: Rect::from_xywh(0.0, 0.0, 64.0, 64.0),
            app: None,
            favorite: false,
            visual: Rc::downgrade(visual),
        }
    }

    #[test]
    fn writes_go_through_to_the_visual() {
        let visual = new_visual();
        let icon = entry(&visual);
        assert_eq!(icon.with_visual(|v| v.scale = 1.5), Some(()));
        assert_eq!(visual.borrow().scale, 1.5);
    }

    #[test]
    fn destroyed_visual_reads_as_absent() {
        let visual = new_visual();
        let icon = entry(&visual);
        drop(visual);
        assert!(!icon.is_alive());
        assert!(!icon.is_visible());
        assert_eq!(icon.with_visual(|v| v.scale), None);
    }
}
