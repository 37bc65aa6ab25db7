//! State Machine Runtime
//!
//! Flat, typed state machines for interaction states.
//! Supports:
//! - Enumerated states and events (any `Copy + Eq + Hash` type)
//! - Guards evaluated against a caller-supplied context
//! - Transition history (bounded, for debugging)
//!
//! Transitions are matched in declaration order; the first transition whose
//! guard passes wins.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use thiserror::Error;

new_key_type! {
    /// Unique identifier for a state machine instance
    pub struct FsmId;
}

/// Maximum number of transitions kept in a machine's history.
pub const HISTORY_LIMIT: usize = 64;

/// A guard function that determines if a transition should occur
pub type Guard<C> = Box<dyn Fn(&C) -> bool + Send>;

/// Errors raised by [`FsmRuntime`] lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError {
    /// The id refers to a machine that was removed (or never created here).
    #[error("state machine {0:?} does not exist")]
    UnknownMachine(FsmId),
}

/// A transition in the state machine
pub struct Transition<S, E, C> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
    pub guard: Option<Guard<C>>,
}

impl<S, E, C> Transition<S, E, C> {
    /// Create a simple transition without guard
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn(&C) -> bool + Send + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    fn allows(&self, ctx: &C) -> bool {
        match &self.guard {
            Some(guard) => guard(ctx),
            None => true,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E, C> {
    initial_state: S,
    transitions: Vec<Transition<S, E, C>>,
}

impl<S, E, C> StateMachineBuilder<S, E, C>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
        }
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition<S, E, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add a guarded transition (from, event, to) taken only when `guard` passes
    pub fn on_if<F: Fn(&C) -> bool + Send + 'static>(
        mut self,
        from: S,
        event: E,
        to: S,
        guard: F,
    ) -> Self {
        self.transitions
            .push(Transition::new(from, event, to).with_guard(guard));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E, C> {
        StateMachine::new(self.initial_state, self.transitions)
    }
}

/// A state machine instance
pub struct StateMachine<S, E, C> {
    current_state: S,
    transitions: Vec<Transition<S, E, C>>,
    /// Candidate transitions per (state, event), in declaration order.
    index: FxHashMap<(S, E), SmallVec<[usize; 2]>>,
    history: Vec<(S, E, S)>,
}

impl<S, E, C> StateMachine<S, E, C>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E, C>>) -> Self {
        let mut index: FxHashMap<(S, E), SmallVec<[usize; 2]>> = FxHashMap::default();
        for (i, t) in transitions.iter().enumerate() {
            index.entry((t.from_state, t.event)).or_default().push(i);
        }
        Self {
            current_state: initial_state,
            transitions,
            index,
            history: Vec::new(),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E, C> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history, oldest first
    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    fn matching(&self, event: E, ctx: &C) -> Option<usize> {
        self.index
            .get(&(self.current_state, event))?
            .iter()
            .copied()
            .find(|&i| self.transitions[i].allows(ctx))
    }

    /// Send an event to the state machine, potentially triggering a transition.
    ///
    /// Returns the state after handling the event (unchanged if nothing matched).
    pub fn send(&mut self, event: E, ctx: &C) -> S {
        let current = self.current_state;
        let Some(idx) = self.matching(event, ctx) else {
            return current;
        };

        let to_state = self.transitions[idx].to_state;
        self.current_state = to_state;
        tracing::trace!(from = ?current, ?event, to = ?to_state, "fsm transition");

        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push((current, event, to_state));

        to_state
    }

    /// Jump to `state` without matching a transition. History is not touched.
    pub fn reset_to(&mut self, state: S) {
        self.current_state = state;
    }
}

/// Runtime that manages a family of state machine instances
pub struct FsmRuntime<S, E, C> {
    machines: SlotMap<FsmId, StateMachine<S, E, C>>,
}

impl<S, E, C> FsmRuntime<S, E, C>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            machines: SlotMap::with_key(),
        }
    }

    /// Register a state machine
    pub fn create(&mut self, machine: StateMachine<S, E, C>) -> FsmId {
        self.machines.insert(machine)
    }

    /// Get a mutable reference to a state machine
    pub fn get_mut(&mut self, id: FsmId) -> Option<&mut StateMachine<S, E, C>> {
        self.machines.get_mut(id)
    }

    /// Send an event to a state machine
    pub fn send(&mut self, id: FsmId, event: E, ctx: &C) -> Result<S, FsmError> {
        self.machines
            .get_mut(id)
            .map(|fsm| fsm.send(event, ctx))
            .ok_or(FsmError::UnknownMachine(id))
    }

    /// Get current state of a state machine
    pub fn current_state(&self, id: FsmId) -> Option<S> {
        self.machines.get(id).map(|fsm| fsm.current_state())
    }

    /// Remove a state machine
    pub fn remove(&mut self, id: FsmId) -> Option<StateMachine<S, E, C>> {
        self.machines.remove(id)
    }

    /// Remove every state machine
    pub fn clear(&mut self) {
        self.machines.clear();
    }
}

impl<S, E, C> Default for FsmRuntime<S, E, C>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum State {
        Idle,
        Hovered,
        Pressed,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Ev {
        PointerEnter,
        PointerLeave,
        PointerDown,
        PointerUp,
    }

    fn button() -> StateMachine<State, Ev, ()> {
        StateMachine::new(
            State::Idle,
            vec![
                Transition::new(State::Idle, Ev::PointerEnter, State::Hovered),
                Transition::new(State::Hovered, Ev::PointerLeave, State::Idle),
                Transition::new(State::Hovered, Ev::PointerDown, State::Pressed),
                Transition::new(State::Pressed, Ev::PointerUp, State::Hovered),
            ],
        )
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = button();
        assert_eq!(fsm.current_state(), State::Idle);

        fsm.send(Ev::PointerEnter, &());
        assert_eq!(fsm.current_state(), State::Hovered);

        fsm.send(Ev::PointerDown, &());
        assert_eq!(fsm.current_state(), State::Pressed);

        fsm.send(Ev::PointerUp, &());
        assert_eq!(fsm.current_state(), State::Hovered);

        fsm.send(Ev::PointerLeave, &());
        assert!(fsm.is_in(State::Idle));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = button();
        // PointerDown is not valid in Idle
        assert_eq!(fsm.send(Ev::PointerDown, &()), State::Idle);
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_guard_reads_context() {
        let mut fsm = StateMachine::<State, Ev, bool>::builder(State::Idle)
            .on_if(State::Idle, Ev::PointerEnter, State::Hovered, |enabled| {
                *enabled
            })
            .build();

        assert_eq!(fsm.send(Ev::PointerEnter, &false), State::Idle);
        assert_eq!(fsm.send(Ev::PointerEnter, &true), State::Hovered);
    }

    #[test]
    fn test_first_passing_guard_wins() {
        let mut fsm = StateMachine::<State, Ev, bool>::builder(State::Pressed)
            .on_if(State::Pressed, Ev::PointerUp, State::Hovered, |inside| *inside)
            .on(State::Pressed, Ev::PointerUp, State::Idle)
            .build();
        assert_eq!(fsm.send(Ev::PointerUp, &false), State::Idle);

        fsm.reset_to(State::Pressed);
        assert_eq!(fsm.send(Ev::PointerUp, &true), State::Hovered);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut fsm = button();
        fsm.send(Ev::PointerEnter, &());
        fsm.send(Ev::PointerDown, &());
        assert_eq!(
            fsm.history(),
            &[
                (State::Idle, Ev::PointerEnter, State::Hovered),
                (State::Hovered, Ev::PointerDown, State::Pressed),
            ]
        );

        for _ in 0..HISTORY_LIMIT {
            fsm.send(Ev::PointerUp, &());
            fsm.send(Ev::PointerDown, &());
        }
        assert_eq!(fsm.history().len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_fsm_runtime() {
        let mut runtime = FsmRuntime::new();
        let a = runtime.create(button());
        let b = runtime.create(button());

        assert_eq!(runtime.send(a, Ev::PointerEnter, &()), Ok(State::Hovered));
        assert_eq!(runtime.current_state(a), Some(State::Hovered));
        assert_eq!(runtime.current_state(b), Some(State::Idle));

        assert!(runtime.remove(a).is_some());
        assert_eq!(runtime.current_state(a), None);
        assert_eq!(runtime.current_state(b), Some(State::Idle));
        assert_eq!(
            runtime.send(a, Ev::PointerLeave, &()),
            Err(FsmError::UnknownMachine(a))
        );

        runtime.clear();
        assert_eq!(runtime.current_state(b), None);
    }
}
