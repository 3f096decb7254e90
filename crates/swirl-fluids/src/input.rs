use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::splat::{random_color, Splat};

/// Most pointers tracked at once. A new pointer beyond this evicts the oldest.
pub const MAX_POINTERS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event in normalized coordinates, `y` pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub id: i64,
    pub position: Vec2,
    /// Color for a `Down` event. `None` picks a random one.
    pub color: Option<Vec3>,
}

impl PointerEvent {
    pub fn down(id: i64, position: Vec2) -> Self {
        Self {
            kind: PointerKind::Down,
            id,
            position,
            color: None,
        }
    }

    pub fn moved(id: i64, position: Vec2) -> Self {
        Self {
            kind: PointerKind::Move,
            id,
            position,
            color: None,
        }
    }

    pub fn up(id: i64) -> Self {
        Self {
            kind: PointerKind::Up,
            id,
            position: Vec2::ZERO,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    /// Inject this many splats at random positions.
    RandomSplats(usize),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

/// FIFO of pending input that drops its oldest event once full.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
    capacity: usize,
    /// Events dropped since creation.
    dropped: u64,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Appends `event`, returning the event evicted to make room, if any.
    pub fn push(&mut self, event: InputEvent) -> Option<InputEvent> {
        if self.capacity == 0 {
            self.dropped += 1;
            return Some(event);
        }

        let evicted = if self.events.len() >= self.capacity {
            self.dropped += 1;
            self.events.pop_front()
        } else {
            None
        };

        self.events.push_back(event);
        evicted
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Changes the capacity, dropping the oldest events that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.events.len() > capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.capacity = capacity;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    pub id: i64,
    /// Current position, in normalized coordinates.
    pub position: Vec2,
    pub prev_position: Vec2,
    /// Aspect-corrected movement since the previous position.
    pub delta: Vec2,
    pub down: bool,
    /// Moved since the last splat was emitted.
    pub moved: bool,
    pub color: Vec3,
    /// The color was chosen by the caller and survives recoloring.
    pub custom_color: bool,
}

/// Scales a normalized movement so equal on-screen distances give equal deltas along both axes.
/// `aspect` is the viewport width over its height.
#[inline]
pub fn correct_delta(mut delta: Vec2, aspect: f32) -> Vec2 {
    if aspect < 1.0 {
        delta.x *= aspect;
    }
    if aspect > 1.0 {
        delta.y /= aspect;
    }
    delta
}

/// Per-pointer state driven by [`PointerEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pointers: Vec<Pointer>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle<R: Rng>(&mut self, event: &PointerEvent, aspect: f32, rng: &mut R) {
        match event.kind {
            PointerKind::Down => {
                let color = event.color.unwrap_or_else(|| random_color(rng));
                let pointer = Pointer {
                    id: event.id,
                    position: event.position,
                    prev_position: event.position,
                    delta: Vec2::ZERO,
                    down: true,
                    moved: false,
                    color,
                    custom_color: event.color.is_some(),
                };

                match self.pointers.iter_mut().find(|p| p.id == event.id) {
                    Some(existing) => *existing = pointer,
                    None => {
                        if self.pointers.len() >= MAX_POINTERS {
                            let evicted = self.pointers.remove(0);
                            log::warn!("too many pointers, forgetting pointer {}", evicted.id);
                        }
                        self.pointers.push(pointer);
                    }
                }
            }
            PointerKind::Move => {
                let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == event.id && p.down)
                else {
                    return;
                };

                pointer.prev_position = pointer.position;
                pointer.position = event.position;
                pointer.delta = correct_delta(pointer.position - pointer.prev_position, aspect);
                pointer.moved = pointer.delta != Vec2::ZERO;
            }
            PointerKind::Up => {
                if let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == event.id) {
                    pointer.down = false;
                }
            }
        }
    }

    /// Emits one splat per moved pointer, clears the moved flags and forgets released pointers.
    pub fn take_splats(&mut self, force: f32) -> Vec<Splat> {
        let splats = self
            .pointers
            .iter_mut()
            .filter(|p| p.moved)
            .map(|p| {
                p.moved = false;
                Splat::new(p.position, p.delta * force, p.color)
            })
            .collect();

        let before = self.pointers.len();
        self.pointers.retain(|p| p.down);
        if self.pointers.len() < before {
            log::debug!("pruned {} released pointers", before - self.pointers.len());
        }

        splats
    }

    /// Gives every pointer without a caller-chosen color a new random one.
    pub fn recolor<R: Rng>(&mut self, rng: &mut R) {
        for pointer in self.pointers.iter_mut().filter(|p| !p.custom_color) {
            pointer.color = random_color(rng);
        }
    }

    pub fn get(&self, id: i64) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn queue_drops_oldest() {
        let mut queue = EventQueue::new(3);
        for n in 0..5 {
            queue.push(InputEvent::RandomSplats(n));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 2);
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![
                InputEvent::RandomSplats(2),
                InputEvent::RandomSplats(3),
                InputEvent::RandomSplats(4),
            ],
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn shrinking_capacity_keeps_newest() {
        let mut queue = EventQueue::new(8);
        for n in 0..6 {
            queue.push(InputEvent::RandomSplats(n));
        }

        queue.set_capacity(2);

        assert_eq!(queue.drain().next(), Some(InputEvent::RandomSplats(4)));
    }

    #[test]
    fn corrects_delta_for_aspect() {
        let delta = Vec2::new(0.1, 0.1);
        assert_eq!(correct_delta(delta, 2.0), Vec2::new(0.1, 0.05));
        assert_eq!(correct_delta(delta, 0.5), Vec2::new(0.05, 0.1));
        assert_eq!(correct_delta(delta, 1.0), delta);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut pointers = PointerTracker::new();
        pointers.handle(&PointerEvent::moved(3, Vec2::splat(0.5)), 1.0, &mut rng());

        assert!(pointers.is_empty());
        assert!(pointers.take_splats(1.0).is_empty());
    }

    #[test]
    fn drag_emits_one_splat_per_drain() {
        let mut rng = rng();
        let mut pointers = PointerTracker::new();
        let red = Vec3::new(1.0, 0.0, 0.0);

        pointers.handle(&PointerEvent::down(0, Vec2::new(0.2, 0.5)).with_color(red), 1.0, &mut rng);
        pointers.handle(&PointerEvent::moved(0, Vec2::new(0.25, 0.5)), 1.0, &mut rng);

        let splats = pointers.take_splats(100.0);
        assert_eq!(splats.len(), 1);
        assert_eq!(splats[0].position, Vec2::new(0.25, 0.5));
        assert!((splats[0].velocity - Vec2::new(5.0, 0.0)).length() < 1e-4);
        assert_eq!(splats[0].color, red);

        assert!(pointers.take_splats(100.0).is_empty());
        assert_eq!(pointers.len(), 1);
    }

    #[test]
    fn released_pointers_splat_once_then_vanish() {
        let mut rng = rng();
        let mut pointers = PointerTracker::new();

        pointers.handle(&PointerEvent::down(7, Vec2::ZERO), 1.0, &mut rng);
        pointers.handle(&PointerEvent::moved(7, Vec2::splat(0.1)), 1.0, &mut rng);
        pointers.handle(&PointerEvent::up(7), 1.0, &mut rng);

        assert_eq!(pointers.take_splats(1.0).len(), 1);
        assert!(pointers.get(7).is_none());
    }

    #[test]
    fn down_reuses_existing_pointer() {
        let mut rng = rng();
        let mut pointers = PointerTracker::new();

        pointers.handle(&PointerEvent::down(1, Vec2::ZERO), 1.0, &mut rng);
        pointers.handle(&PointerEvent::down(1, Vec2::ONE), 1.0, &mut rng);

        assert_eq!(pointers.len(), 1);
        assert_eq!(pointers.get(1).map(|p| p.prev_position), Some(Vec2::ONE));
    }

    #[test]
    fn recolor_keeps_custom_colors() {
        let mut rng = rng();
        let mut pointers = PointerTracker::new();
        let custom = Vec3::new(0.3, 0.2, 0.1);

        pointers.handle(&PointerEvent::down(0, Vec2::ZERO).with_color(custom), 1.0, &mut rng);
        pointers.handle(&PointerEvent::down(1, Vec2::ZERO), 1.0, &mut rng);
        let before = pointers.get(1).map(|p| p.color);

        for _ in 0..4 {
            pointers.recolor(&mut rng);
        }

        assert_eq!(pointers.get(0).map(|p| p.color), Some(custom));
        assert_ne!(pointers.get(1).map(|p| p.color), before);
    }

    #[test]
    fn pointer_count_is_bounded() {
        let mut rng = rng();
        let mut pointers = PointerTracker::new();
        for id in 0..(MAX_POINTERS as i64 + 10) {
            pointers.handle(&PointerEvent::down(id, Vec2::ZERO), 1.0, &mut rng);
        }

        assert_eq!(pointers.len(), MAX_POINTERS);
        assert!(pointers.get(0).is_none());
    }
}
