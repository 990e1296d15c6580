//! Scroll-triggered reveal of page sections.
//!
//! A registered target waits until the visibility observer reports it in
//! view, then gets its animation marker after `base_delay`. Each direct
//! child is scheduled on its own, `stagger_delay` apart, so children
//! cascade in without holding up the parent. Reveal happens once: the
//! target is unobserved as soon as it is seen, and only its phase is kept
//! from then on.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub threshold: f32,
    pub root_margin: String,
    pub base_delay: Duration,
    pub stagger_delay: Duration,
    pub marker: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".into(),
            base_delay: Duration::ZERO,
            stagger_delay: Duration::from_millis(100),
            marker: "animate-in".into(),
        }
    }
}

impl RevealOptions {
    pub fn child_delay(&self, index: usize) -> Duration {
        let steps = u32::try_from(index).unwrap_or(u32::MAX);
        self.base_delay + self.stagger_delay.saturating_mul(steps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTarget {
    pub element: ElementId,
    pub children: Vec<ElementId>,
}

impl RevealTarget {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementId>) -> Self {
        self.children = children.into_iter().collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Unrevealed,
    Revealing,
    Revealed,
    Detached,
}

pub trait VisibilityObserver: Send + Sync {
    fn observe(&self, element: ElementId, threshold: f32, root_margin: &str);
    fn unobserve(&self, element: ElementId);
}

pub trait RevealSurface: Send + Sync {
    fn apply_marker(&self, element: ElementId, marker: &str);
}

pub trait RevealTimer: Send + Sync {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>);
}

pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

/// What a target needs until it is revealed. Dropped on reveal.
struct PendingReveal {
    target: RevealTarget,
    options: RevealOptions,
}

fn lock_phase(phase: &Mutex<RevealPhase>) -> MutexGuard<'_, RevealPhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ScrollRevealController {
    observer: Arc<dyn VisibilityObserver>,
    surface: Arc<dyn RevealSurface>,
    timer: Arc<dyn RevealTimer>,
    reduced_motion: bool,
    next_handle: u64,
    pending: HashMap<SubscriptionHandle, PendingReveal>,
    phases: HashMap<SubscriptionHandle, Arc<Mutex<RevealPhase>>>,
}

impl ScrollRevealController {
    pub fn new(
        observer: Arc<dyn VisibilityObserver>,
        surface: Arc<dyn RevealSurface>,
        timer: Arc<dyn RevealTimer>,
        motion: &dyn MotionPreference,
    ) -> Self {
        Self {
            observer,
            surface,
            timer,
            reduced_motion: motion.prefers_reduced_motion(),
            next_handle: 0,
            pending: HashMap::new(),
            phases: HashMap::new(),
        }
    }

    /// Start watching `target`. Returns `None` under reduced motion, in
    /// which case the element keeps its default styling for good.
    pub fn register(
        &mut self,
        target: RevealTarget,
        options: RevealOptions,
    ) -> Option<SubscriptionHandle> {
        if self.reduced_motion {
            debug!(element = target.element.0, "reveal: reduced motion, not observing");
            return None;
        }

        self.next_handle += 1;
        let handle = SubscriptionHandle(self.next_handle);
        self.observer
            .observe(target.element, options.threshold, &options.root_margin);
        self.pending.insert(handle, PendingReveal { target, options });
        self.phases
            .insert(handle, Arc::new(Mutex::new(RevealPhase::Unrevealed)));
        Some(handle)
    }

    pub fn phase(&self, handle: SubscriptionHandle) -> RevealPhase {
        self.phases
            .get(&handle)
            .map(|phase| *lock_phase(phase))
            .unwrap_or(RevealPhase::Detached)
    }

    /// Number of targets still waiting to come into view.
    pub fn observed_count(&self) -> usize {
        self.pending.len()
    }

    /// Feed an observer report for the target behind `handle`.
    pub fn handle_intersection(&mut self, handle: SubscriptionHandle, is_intersecting: bool) {
        if !is_intersecting {
            return;
        }
        let Some(phase) = self.phases.get(&handle).map(Arc::clone) else {
            return;
        };
        let Some(PendingReveal { target, options }) = self.pending.remove(&handle) else {
            return;
        };

        *lock_phase(&phase) = RevealPhase::Revealing;
        self.observer.unobserve(target.element);

        self.schedule_marker(options.base_delay, target.element, &options.marker, &phase, true);
        for (index, child) in target.children.iter().enumerate() {
            self.schedule_marker(
                options.child_delay(index),
                *child,
                &options.marker,
                &phase,
                false,
            );
        }
    }

    fn schedule_marker(
        &self,
        delay: Duration,
        element: ElementId,
        marker: &str,
        phase: &Arc<Mutex<RevealPhase>>,
        completes_reveal: bool,
    ) {
        let surface = Arc::clone(&self.surface);
        let phase = Arc::clone(phase);
        let marker = marker.to_string();
        self.timer.schedule(
            delay,
            Box::new(move || {
                let mut phase = lock_phase(&phase);
                if *phase == RevealPhase::Detached {
                    return;
                }
                surface.apply_marker(element, &marker);
                if completes_reveal {
                    *phase = RevealPhase::Revealed;
                }
            }),
        );
    }

    /// Stop watching a target. Pending markers for it are dropped. Safe to
    /// call any number of times.
    pub fn unregister(&mut self, handle: SubscriptionHandle) {
        if let Some(pending) = self.pending.remove(&handle) {
            self.observer.unobserve(pending.target.element);
        }
        if let Some(phase) = self.phases.remove(&handle) {
            *lock_phase(&phase) = RevealPhase::Detached;
        }
    }

    /// Tear down every registration, as when the page unmounts.
    pub fn disconnect(&mut self) {
        let handles: Vec<SubscriptionHandle> = self.phases.keys().copied().collect();
        for handle in handles {
            self.unregister(handle);
        }
    }
}

#[cfg(test)]
#[path = "tests/reveal_tests.rs"]
mod tests;
