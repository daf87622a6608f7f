use std::fmt::Debug;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace};

new_key_type! {
    pub struct TimerId;
}

/// One time slice of a sequence. `effect` is plain data; the owner turns it
/// into a value from the elapsed time reported in each [`FrameSample`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<E> {
    pub duration_ms: f64,
    pub effect: E,
}

impl<E> Frame<E> {
    pub fn new(duration_ms: f64, effect: E) -> Self {
        Frame {
            duration_ms: duration_ms.max(0.0),
            effect,
        }
    }

    /// A zero-length frame, sampled exactly once. Appended to a sequence to
    /// force a deterministic end value.
    pub fn snap(effect: E) -> Self { Frame { duration_ms: 0.0, effect } }
}

/// The per-tick invocation of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample<K, E> {
    pub key: K,
    pub effect: E,
    /// Time since the frame began, clamped to its duration.
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    /// Position of the frame within its sequence.
    pub index: usize,
}

impl<K, E> FrameSample<K, E> {
    /// Normalized progress through the frame. Zero-length frames report 1.
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }
}

/// Everything that happened during one tick, in the order it happened.
#[derive(Debug)]
pub struct Tick<K, E, D> {
    pub fired: Vec<D>,
    pub samples: Vec<FrameSample<K, E>>,
    /// Keys whose sequences ran their last frame this tick.
    pub finished: Vec<K>,
}

impl<K, E, D> Default for Tick<K, E, D> {
    fn default() -> Self {
        Tick {
            fired: Vec::new(),
            samples: Vec::new(),
            finished: Vec::new(),
        }
    }
}

impl<K, E, D> Tick<K, E, D> {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty() && self.samples.is_empty() && self.finished.is_empty()
    }
}

#[derive(Debug)]
struct Sequence<E> {
    frames: Vec<Frame<E>>,
    index: usize,
    elapsed: f64,
}

#[derive(Debug)]
struct Timer<D> {
    deadline_ms: f64,
    order: u64,
    payload: D,
}

/// Keyed, cancellable frame sequences plus one-shot deferred calls.
///
/// Single-threaded and cooperative: nothing advances except through
/// [`Scheduler::tick`]. At most one sequence is active per key; starting a
/// new one replaces the old without running any of its remaining frames.
#[derive(Debug)]
pub struct Scheduler<K, E, D> {
    sequences: Vec<(K, Sequence<E>)>,
    timers: SlotMap<TimerId, Timer<D>>,
    now_ms: f64,
    timer_order: u64,
}

impl<K, E, D> Default for Scheduler<K, E, D> {
    fn default() -> Self {
        Scheduler {
            sequences: Vec::new(),
            timers: SlotMap::with_key(),
            now_ms: 0.0,
            timer_order: 0,
        }
    }
}

impl<K, E, D> Scheduler<K, E, D>
where
    K: Copy + Eq + Debug,
    E: Clone,
{
    pub fn new() -> Self { Self::default() }

    /// Milliseconds of simulated time since the scheduler was created.
    pub fn now_ms(&self) -> f64 { self.now_ms }

    /// Starts `frames` under `key`, cancelling whatever ran there before.
    pub fn run_animation(&mut self, key: K, frames: Vec<Frame<E>>) {
        let replaced = self.remove(key);
        if frames.is_empty() {
            debug!(?key, replaced, "empty sequence, nothing scheduled");
            return;
        }
        trace!(?key, replaced, frames = frames.len(), "run_animation");
        self.sequences.push((key, Sequence { frames, index: 0, elapsed: 0.0 }));
    }

    /// Stops the sequence under `key` wherever it is. The last value written
    /// by it stays in place. Returns whether anything was running.
    pub fn cancel(&mut self, key: K) -> bool {
        let cancelled = self.remove(key);
        if cancelled {
            trace!(?key, "cancelled sequence");
        }
        cancelled
    }

    pub fn is_active(&self, key: K) -> bool { self.sequences.iter().any(|(k, _)| *k == key) }

    pub fn active_count(&self) -> usize { self.sequences.len() }

    /// Index of the frame currently running under `key`.
    pub fn current_frame(&self, key: K) -> Option<usize> {
        self.sequences.iter().find(|(k, _)| *k == key).map(|(_, s)| s.index)
    }

    /// Schedules `payload` to be handed back by the first tick at or after
    /// `delay_ms` from now.
    pub fn run_once(&mut self, delay_ms: f64, payload: D) -> TimerId {
        self.timer_order += 1;
        self.timers.insert(Timer {
            deadline_ms: self.now_ms + delay_ms.max(0.0),
            order: self.timer_order,
            payload,
        })
    }

    /// Cancelling an already-fired or unknown timer is a no-op.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool { self.timers.remove(id).is_some() }

    pub fn timer_pending(&self, id: TimerId) -> bool { self.timers.contains_key(id) }

    pub fn is_idle(&self) -> bool { self.sequences.is_empty() && self.timers.is_empty() }

    /// Advances simulated time by `dt_ms`: fires due timers, then invokes the
    /// current frame of every active sequence once.
    ///
    /// A frame that reaches its duration hands over to the next frame on the
    /// following tick with elapsed time reset; overshoot is dropped.
    pub fn tick(&mut self, dt_ms: f64) -> Tick<K, E, D> {
        let dt_ms = dt_ms.max(0.0);
        self.now_ms += dt_ms;
        let mut tick = Tick::default();

        let mut due: Vec<(f64, u64, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline_ms <= self.now_ms)
            .map(|(id, t)| (t.deadline_ms, t.order, id))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, _, id) in due {
            if let Some(timer) = self.timers.remove(id) {
                tick.fired.push(timer.payload);
            }
        }

        for (key, sequence) in &mut self.sequences {
            let frame = &sequence.frames[sequence.index];
            sequence.elapsed += dt_ms;
            tick.samples.push(FrameSample {
                key: *key,
                effect: frame.effect.clone(),
                elapsed_ms: sequence.elapsed.min(frame.duration_ms),
                duration_ms: frame.duration_ms,
                index: sequence.index,
            });
            if sequence.elapsed >= frame.duration_ms {
                sequence.index += 1;
                sequence.elapsed = 0.0;
                if sequence.index >= sequence.frames.len() {
                    tick.finished.push(*key);
                }
            }
        }
        self.sequences.retain(|(_, s)| s.index < s.frames.len());

        tick
    }

    fn remove(&mut self, key: K) -> bool {
        let before = self.sequences.len();
        self.sequences.retain(|(k, _)| *k != key);
        self.sequences.len() != before
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    type TestScheduler = Scheduler<u8, &'static str, &'static str>;

    fn effects(tick: &Tick<u8, &'static str, &'static str>) -> Vec<&'static str> {
        tick.samples.iter().map(|s| s.effect).collect()
    }

    #[test]
    fn frames_advance_after_their_duration() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(30.0, "a"), Frame::new(10.0, "b")]);

        let elapsed: Vec<(&str, f64)> = (0..5)
            .flat_map(|_| scheduler.tick(10.0).samples)
            .map(|s| (s.effect, s.elapsed_ms))
            .collect();
        assert_eq!(elapsed, vec![("a", 10.0), ("a", 20.0), ("a", 30.0), ("b", 10.0)]);
        assert!(!scheduler.is_active(1));
    }

    #[test]
    fn overshoot_is_clamped_and_not_carried() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(25.0, "a"), Frame::new(25.0, "b")]);

        let samples: Vec<_> = (0..6).flat_map(|_| scheduler.tick(16.0).samples).collect();
        let elapsed: Vec<f64> = samples.iter().map(|s| s.elapsed_ms).collect();
        assert_eq!(elapsed, vec![16.0, 25.0, 16.0, 25.0]);
        assert_eq!(samples[1].progress(), 1.0);
    }

    #[test]
    fn second_run_replaces_first_under_same_key() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(100.0, "first"), Frame::snap("first-end")]);
        scheduler.tick(10.0);
        scheduler.run_animation(1, vec![Frame::new(20.0, "second")]);

        assert_eq!(scheduler.active_count(), 1);
        let mut seen = Vec::new();
        for _ in 0..20 {
            seen.extend(effects(&scheduler.tick(10.0)));
        }
        assert_eq!(seen, vec!["second", "second"]);
    }

    #[test]
    fn different_keys_run_side_by_side() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(10.0, "one")]);
        scheduler.run_animation(2, vec![Frame::new(20.0, "two")]);

        let tick = scheduler.tick(10.0);
        assert_eq!(effects(&tick), vec!["one", "two"]);
        assert_eq!(tick.finished, vec![1]);
        assert_eq!(scheduler.active_count(), 1);
    }

    #[test]
    fn cancel_skips_remaining_frames() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(50.0, "a"), Frame::snap("end")]);
        scheduler.tick(10.0);

        assert!(scheduler.cancel(1));
        assert!(!scheduler.cancel(1));
        let tick = scheduler.tick(100.0);
        assert!(tick.is_empty());
    }

    #[test]
    fn snap_frame_is_sampled_once() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(3, vec![Frame::snap("snap")]);

        let tick = scheduler.tick(16.0);
        assert_eq!(tick.samples.len(), 1);
        assert_eq!(tick.samples[0].elapsed_ms, 0.0);
        assert_eq!(tick.samples[0].progress(), 1.0);
        assert_eq!(tick.finished, vec![3]);
        assert!(scheduler.tick(16.0).is_empty());
    }

    #[test]
    fn empty_sequence_cancels_without_registering() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_animation(1, vec![Frame::new(50.0, "a")]);
        scheduler.run_animation(1, vec![]);
        assert!(!scheduler.is_active(1));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut scheduler = TestScheduler::new();
        scheduler.run_once(50.0, "late");
        scheduler.run_once(20.0, "early");
        scheduler.run_once(20.0, "early-second");

        assert!(scheduler.tick(10.0).fired.is_empty());
        assert_eq!(scheduler.tick(40.0).fired, vec!["early", "early-second", "late"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut scheduler = TestScheduler::new();
        let id = scheduler.run_once(20.0, "cancelled");
        let kept = scheduler.run_once(20.0, "kept");
        assert!(scheduler.cancel_timer(id));
        assert!(!scheduler.cancel_timer(id));
        assert!(scheduler.timer_pending(kept));

        assert_eq!(scheduler.tick(20.0).fired, vec!["kept"]);
        assert!(!scheduler.cancel_timer(kept));
    }
}
