//! Scripted input for the dock. A script is a RON list of events, each
//! delivered some time after the previous one, optionally with the monitors,
//! icons and windows to stage them against.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSecondsWithFrac, serde_as};
use tracing::{debug, trace};

use super::dock::{self, Dock, DockSnapshot, Event};
use crate::common::collections::HashMap;
use crate::common::config::DockConfig;
use crate::model::{ActivationAction, WindowInfo};
use crate::sys::headless::{HeadlessDisplay, HeadlessIcons, IconSpec, RecordingWindows};
use crate::sys::screen::MonitorGeometry;

/// Frame period used between steps in virtual time.
pub const SIMULATED_FRAME_MS: f64 = 16.0;
/// Upper bound on how long a replay keeps ticking after its last step.
pub const SETTLE_LIMIT_MS: f64 = 10_000.0;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Delay since the previous step.
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    #[serde(rename = "after_ms", default)]
    pub after: Duration,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub monitors: Vec<MonitorGeometry>,
    #[serde(default)]
    pub icons: Vec<IconSpec>,
    /// Open windows per application id.
    #[serde(default)]
    pub windows: HashMap<String, Vec<WindowInfo>>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(text: &str) -> anyhow::Result<Script> {
        let script: Script = ron::from_str(text)?;
        if script.steps.iter().any(|s| matches!(s.event, Event::Tick(dt) if dt < 0.0)) {
            bail!("ticks must not go backwards");
        }
        Ok(script)
    }

    pub fn read(path: &Path) -> anyhow::Result<Script> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn duration(&self) -> Duration { self.steps.iter().map(|s| s.after).sum() }
}

/// Headless collaborators staged from a script. Handles stay shared with
/// the dock built from them.
#[derive(Clone)]
pub struct Stage {
    pub display: HeadlessDisplay,
    pub icons: HeadlessIcons,
    pub windows: RecordingWindows,
}

impl Stage {
    /// `icon_count` replaces the script's icons with that many plain apps.
    pub fn new(script: &Script, icon_count: Option<usize>) -> Self {
        let display = if script.monitors.is_empty() {
            HeadlessDisplay::single(1920.0, 1080.0, 1.0)
        } else {
            HeadlessDisplay::new(script.monitors.clone())
        };
        let icons = match icon_count {
            Some(count) => HeadlessIcons::apps(count),
            None if script.icons.is_empty() => HeadlessIcons::apps(8),
            None => HeadlessIcons::new(script.icons.iter().cloned()),
        };
        let windows = RecordingWindows::new();
        for (app, app_windows) in &script.windows {
            windows.set_windows(app, app_windows.clone());
        }
        Stage { display, icons, windows }
    }

    pub fn dock(&self, config: DockConfig) -> Dock {
        Dock::new(
            config,
            Box::new(self.display.clone()),
            Box::new(self.icons.clone()),
            Box::new(self.windows.clone()),
        )
    }

    pub fn performed(&self) -> Vec<ActivationAction> { self.windows.performed() }
}

/// A change in what the dock shows, at a point in virtual time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub time_ms: f64,
    #[serde(flatten)]
    pub snapshot: DockSnapshot,
}

struct Recorder {
    now_ms: f64,
    last: Option<DockSnapshot>,
    records: Vec<Record>,
}

impl Recorder {
    fn observe(&mut self, dock: &Dock) {
        let Some(snapshot) = dock.snapshot() else { return };
        if self.last != Some(snapshot) {
            trace!(time_ms = self.now_ms, ?snapshot, "dock changed");
            self.last = Some(snapshot);
            self.records.push(Record { time_ms: self.now_ms, snapshot });
        }
    }

    fn advance(&mut self, dock: &mut Dock, ms: f64, frame_ms: f64) {
        let mut remaining = ms;
        while remaining > 0.0 {
            let dt = remaining.min(frame_ms);
            dock.handle_event(Event::Tick(dt));
            self.now_ms += dt;
            remaining -= dt;
            self.observe(dock);
        }
    }
}

/// Replays `script` in virtual time, ticking every `frame_ms` between steps
/// and until the dock goes idle afterwards. Returns every visible change.
pub fn replay_simulated(dock: &mut Dock, script: &Script, frame_ms: f64) -> Vec<Record> {
    let frame_ms = if frame_ms > 0.0 { frame_ms } else { SIMULATED_FRAME_MS };
    let mut recorder = Recorder { now_ms: 0.0, last: None, records: Vec::new() };
    recorder.observe(dock);

    for step in &script.steps {
        recorder.advance(dock, step.after.as_secs_f64() * 1000.0, frame_ms);
        dock.handle_event(step.event.clone());
        recorder.observe(dock);
    }

    let mut settled = 0.0;
    while !dock.scheduler().is_idle() && settled < SETTLE_LIMIT_MS {
        recorder.advance(dock, frame_ms, frame_ms);
        settled += frame_ms;
    }
    debug!(records = recorder.records.len(), time_ms = recorder.now_ms, "replay finished");
    recorder.records
}

/// Sends the script's events to a running dock in real time.
pub async fn replay_realtime(script: &Script, dock_tx: &dock::Sender) {
    for step in &script.steps {
        tokio::time::sleep(step.after).await;
        if dock_tx.try_send(step.event.clone()).is_err() {
            debug!("dock closed, stopping replay");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor::autohide::AutoHideState;
    use crate::actor::dock::Modifiers;
    use crate::model::{IconId, WindowId};
    use crate::sys::geometry::Point;

    const SCRIPT: &str = r#"
        (
            windows: {
                "app-1": [(id: 11, focused: true, hidden: false, maximized: false)],
            },
            steps: [
                (after_ms: 600.0, event: pointer_left),
                (after_ms: 20.0, event: pointer_entered((x: 960.0, y: 1079.0))),
                (after_ms: 300.0, event: icon_activated(icon: 1, modifiers: "BUTTON1")),
            ],
        )
    "#;

    #[test]
    fn script_parses_with_defaults() {
        let script = Script::parse(SCRIPT).unwrap();
        assert!(script.monitors.is_empty());
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.duration(), Duration::from_millis(920));
        assert_eq!(script.steps[1].event, Event::PointerEntered(Point::new(960.0, 1079.0)));
    }

    #[test]
    fn handwritten_modifiers_parse_as_flag_strings() {
        let event: Event =
            ron::from_str(r#"icon_activated(icon: 2, modifiers: "SHIFT | BUTTON1")"#).unwrap();
        let expected = Event::IconActivated {
            icon: IconId(2),
            modifiers: Modifiers::SHIFT | Modifiers::BUTTON1,
        };
        assert_eq!(event, expected);
        // What we write is what scripts are written in.
        assert_eq!(ron::to_string(&Modifiers::SHIFT).unwrap(), r#""SHIFT""#);
    }

    #[test]
    fn bundled_demo_script_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/hide_and_activate.ron");
        let script = Script::read(&path).unwrap();
        assert_eq!(script.icons.len(), 4);
        assert!(script.steps.iter().any(|step| matches!(
            step.event,
            Event::IconActivated { modifiers, .. } if modifiers == Modifiers::SHIFT
        )));

        let stage = Stage::new(&script, None);
        let mut dock = stage.dock(DockConfig::default());
        replay_simulated(&mut dock, &script, SIMULATED_FRAME_MS);
        assert_eq!(stage.performed(), vec![ActivationAction::MinimizeAll(vec![WindowId(100)])]);
    }

    #[test]
    fn backwards_ticks_are_rejected() {
        assert!(Script::parse("(steps: [(event: tick(-5.0))])").is_err());
        assert!(Script::parse("(steps: [], bogus: 1)").is_err());
    }

    #[test]
    fn simulated_replay_hides_reveals_and_activates() {
        let script = Script::parse(SCRIPT).unwrap();
        let stage = Stage::new(&script, None);
        let mut dock = stage.dock(DockConfig::default());
        let records = replay_simulated(&mut dock, &script, SIMULATED_FRAME_MS);

        let states: Vec<AutoHideState> = records.iter().map(|r| r.snapshot.state).collect();
        let mut transitions = states.clone();
        transitions.dedup();
        assert_eq!(
            transitions[..4].to_vec(),
            vec![
                AutoHideState::Shown,
                AutoHideState::Hiding,
                AutoHideState::Hidden,
                AutoHideState::Showing,
            ]
        );
        assert!(records.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));
        assert_eq!(stage.performed(), vec![ActivationAction::MinimizeAll(vec![WindowId(11)])]);
        assert!(stage.icons.visual(IconId(1)).is_some());
    }

    #[test]
    fn icon_count_override_replaces_script_icons() {
        let script = Script::parse(SCRIPT).unwrap();
        let stage = Stage::new(&script, Some(3));
        assert_eq!(stage.icons.len(), 3);
    }
}
