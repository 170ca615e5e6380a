// Interaction state machine
//
// One `InteractionState` per connection plus a single `InteractionLock` for the
// shared tooltip. The controller never touches the surface: it consumes
// `InteractionEvent`s addressed by connection index and returns the
// `Effect`s the engine must apply, in order.

use crate::geo::SurfacePoint;
use crate::routes::ConnectionKey;
use crate::tooltip::FollowMode;

/// Per-connection interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovered,
    Focused,
    /// Holds the global pin lock
    Pinned,
}

/// Owner of the single pin lock, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionLock {
    owner: Option<(usize, ConnectionKey)>,
}

impl InteractionLock {
    pub fn owner(&self) -> Option<usize> {
        self.owner.as_ref().map(|(idx, _)| *idx)
    }

    pub fn owner_key(&self) -> Option<&ConnectionKey> {
        self.owner.as_ref().map(|(_, key)| key)
    }

    pub fn is_held(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_held_by(&self, idx: usize) -> bool {
        self.owner() == Some(idx)
    }

    fn acquire(&mut self, idx: usize, key: ConnectionKey) {
        self.owner = Some((idx, key));
    }

    fn release(&mut self) -> Option<usize> {
        self.owner.take().map(|(idx, _)| idx)
    }
}

/// Input to the controller, addressed by connection index
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    PointerEnter { index: usize, at: SurfacePoint },
    PointerMove { index: usize, at: SurfacePoint },
    PointerLeave { index: usize },
    FocusIn { index: usize },
    FocusOut { index: usize },
    /// Click or tap (`at` set) or Enter key (`at` unset)
    Activate { index: usize, at: Option<SurfacePoint> },
    /// Escape key on a connection's hit region
    Escape { index: usize },
    /// The outside-pointer listener fired
    OutsidePointer,
}

/// Where the tooltip should be anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TooltipAnchor {
    Pointer(SurfacePoint),
    Midpoint,
}

/// Visual consequences of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Apply (`true`) or restore (`false`) the hover style
    Highlight { index: usize, on: bool },
    ShowTooltip { index: usize, anchor: TooltipAnchor, pinned: bool },
    MoveTooltip { at: SurfacePoint },
    HideTooltip,
    AttachOutsideListener,
    DetachOutsideListener,
}

/// Hover/focus/pin state machine for every connection
#[derive(Debug, Clone)]
pub struct InteractionController {
    states: Vec<InteractionState>,
    keys: Vec<ConnectionKey>,
    lock: InteractionLock,
    /// Connection currently showing the shared tooltip
    active: Option<usize>,
    follow: FollowMode,
    sticky: bool,
}

impl InteractionController {
    pub fn new(follow: FollowMode, sticky: bool) -> Self {
        Self {
            states: Vec::new(),
            keys: Vec::new(),
            lock: InteractionLock::default(),
            active: None,
            follow,
            sticky,
        }
    }

    pub fn state(&self, idx: usize) -> InteractionState {
        self.states.get(idx).copied().unwrap_or_default()
    }

    pub fn lock(&self) -> &InteractionLock {
        &self.lock
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn set_follow_mode(&mut self, follow: FollowMode) {
        self.follow = follow;
    }

    pub fn set_sticky(&mut self, sticky: bool) {
        self.sticky = sticky;
    }

    /// Re-derive state for a freshly rebuilt connection table
    ///
    /// Every state restarts at Idle; callers re-send focus for a connection
    /// they still track. The pin lock survives if its owner's identity is
    /// still present; it is then re-announced against the new geometry
    /// (highlight, midpoint tooltip, fresh outside listener). Callers must
    /// have detached any previous outside listener already.
    pub fn rebuild(&mut self, keys: Vec<ConnectionKey>) -> Vec<Effect> {
        let previous = self.lock.owner_key().cloned();
        self.lock = InteractionLock::default();
        self.active = None;
        self.states = vec![InteractionState::Idle; keys.len()];
        self.keys = keys;

        let Some(key) = previous else {
            return Vec::new();
        };
        let Some(idx) = self.keys.iter().position(|k| *k == key) else {
            tracing::debug!(key = %key, "Pinned connection removed, releasing lock");
            return Vec::new();
        };

        self.states[idx] = InteractionState::Pinned;
        self.lock.acquire(idx, key);
        self.active = Some(idx);
        vec![
            Effect::Highlight { index: idx, on: true },
            Effect::ShowTooltip {
                index: idx,
                anchor: TooltipAnchor::Midpoint,
                pinned: true,
            },
            Effect::AttachOutsideListener,
        ]
    }

    /// Drop every state and the lock, detaching the listener if one was live
    pub fn reset(&mut self) -> Vec<Effect> {
        let held = self.lock.is_held();
        self.lock = InteractionLock::default();
        self.active = None;
        self.states.clear();
        self.keys.clear();
        if held {
            vec![Effect::DetachOutsideListener]
        } else {
            Vec::new()
        }
    }

    /// Apply one event and return the resulting effects
    pub fn handle(&mut self, event: InteractionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            InteractionEvent::PointerEnter { index, at } => {
                if !self.valid(index) || self.lock.is_held() {
                    return effects;
                }
                if self.states[index] == InteractionState::Focused {
                    return effects;
                }
                self.take_tooltip(index, InteractionState::Hovered, &mut effects);
                let anchor = match self.follow {
                    FollowMode::Cursor => TooltipAnchor::Pointer(at),
                    FollowMode::Midpoint => TooltipAnchor::Midpoint,
                };
                effects.push(Effect::ShowTooltip {
                    index,
                    anchor,
                    pinned: false,
                });
            }
            InteractionEvent::PointerMove { index, at } => {
                if !self.valid(index) || self.lock.is_held() {
                    return effects;
                }
                if self.states[index] == InteractionState::Hovered
                    && self.follow == FollowMode::Cursor
                {
                    effects.push(Effect::MoveTooltip { at });
                }
            }
            InteractionEvent::PointerLeave { index } => {
                if !self.valid(index) || self.lock.is_held() {
                    return effects;
                }
                if self.states[index] == InteractionState::Hovered {
                    self.go_idle(index, &mut effects);
                }
            }
            InteractionEvent::FocusIn { index } => {
                if !self.valid(index) || self.lock.is_held() {
                    return effects;
                }
                self.take_tooltip(index, InteractionState::Focused, &mut effects);
                effects.push(Effect::ShowTooltip {
                    index,
                    anchor: TooltipAnchor::Midpoint,
                    pinned: false,
                });
            }
            InteractionEvent::FocusOut { index } => {
                if !self.valid(index) || self.lock.is_held() {
                    return effects;
                }
                if self.states[index] == InteractionState::Focused {
                    self.go_idle(index, &mut effects);
                }
            }
            InteractionEvent::Activate { index, at } => {
                if !self.valid(index) {
                    return effects;
                }
                let anchor = match at {
                    Some(p) => TooltipAnchor::Pointer(p),
                    None => TooltipAnchor::Midpoint,
                };

                if !self.sticky {
                    // Without sticky tooltips an activation only shows the tooltip
                    if self.lock.is_held() {
                        return effects;
                    }
                    let state = match at {
                        Some(_) => InteractionState::Hovered,
                        None => InteractionState::Focused,
                    };
                    self.take_tooltip(index, state, &mut effects);
                    effects.push(Effect::ShowTooltip {
                        index,
                        anchor,
                        pinned: false,
                    });
                    return effects;
                }

                if self.lock.is_held_by(index) {
                    self.release(&mut effects);
                    return effects;
                }
                if self.lock.is_held() {
                    self.release(&mut effects);
                }

                self.take_tooltip(index, InteractionState::Pinned, &mut effects);
                self.lock.acquire(index, self.keys[index].clone());
                effects.push(Effect::ShowTooltip {
                    index,
                    anchor,
                    pinned: true,
                });
                effects.push(Effect::AttachOutsideListener);
            }
            InteractionEvent::Escape { index } => {
                if self.lock.is_held_by(index) {
                    self.release(&mut effects);
                }
            }
            InteractionEvent::OutsidePointer => {
                if self.lock.is_held() {
                    self.release(&mut effects);
                }
            }
        }

        effects
    }

    fn valid(&self, idx: usize) -> bool {
        idx < self.states.len()
    }

    /// Make `idx` the tooltip owner in `state`, demoting the previous owner
    fn take_tooltip(&mut self, idx: usize, state: InteractionState, effects: &mut Vec<Effect>) {
        if let Some(prev) = self.active {
            if prev != idx {
                self.states[prev] = InteractionState::Idle;
                effects.push(Effect::Highlight {
                    index: prev,
                    on: false,
                });
            }
        }
        let was_idle = self.states[idx] == InteractionState::Idle;
        self.states[idx] = state;
        self.active = Some(idx);
        if was_idle {
            effects.push(Effect::Highlight {
                index: idx,
                on: true,
            });
        }
    }

    fn go_idle(&mut self, idx: usize, effects: &mut Vec<Effect>) {
        self.states[idx] = InteractionState::Idle;
        effects.push(Effect::Highlight {
            index: idx,
            on: false,
        });
        if self.active == Some(idx) {
            self.active = None;
            effects.push(Effect::HideTooltip);
        }
    }

    fn release(&mut self, effects: &mut Vec<Effect>) {
        if let Some(idx) = self.lock.release() {
            self.go_idle(idx, effects);
            effects.push(Effect::DetachOutsideListener);
        }
    }
}
