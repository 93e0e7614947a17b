//! Function-pointer finite state machine engine for the pairing protocol.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌─────────────────┬───────────┬──────────┬──────────────────┐ │
//! │  │ PairingState     │ on_enter  │ on_exit  │ on_update        │ │
//! │  ├─────────────────┼───────────┼──────────┼──────────────────┤ │
//! │  │ Blank            │ fn(ctx)   │ —        │ fn(ctx)->Option  │ │
//! │  │ Pairing          │ fn(ctx)   │ —        │ fn(ctx)->Option  │ │
//! │  │ PairedNotSynced  │ fn(ctx)   │ —        │ fn(ctx)->Option  │ │
//! │  │ Syncing          │ fn(ctx)   │ —        │ fn(ctx)->Option  │ │
//! │  │ PairedSynced     │ fn(ctx)   │ —        │ fn(ctx)->Option  │ │
//! │  └─────────────────┴───────────┴──────────┴──────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine first runs the button pre-emption step (a factory
//! reset must win over any auto-transition), then calls `on_update` for the
//! current state. If a transition is due, `on_exit` runs for the old state
//! and `on_enter` for the new one. All handlers receive `&mut EngineContext`
//! which holds the device state, this tick's inputs, and the action queue.

pub mod context;
pub mod message;
pub mod retry;
pub mod state;
pub mod states;

use context::EngineContext;
use log::info;
use state::PairingState;
use states::Preempt;

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut EngineContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut EngineContext) -> Option<PairingState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single protocol state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: PairingState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The protocol state machine engine.
///
/// Owns the state table and the transition bookkeeping; the mutable
/// [`EngineContext`] is threaded through every handler call. The engine
/// keeps `ctx.device.pairing_state` in lock-step with its current index.
pub struct Engine {
    /// Fixed-size table indexed by `PairingState as usize`.
    table: [StateDescriptor; PairingState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Engine {
    /// Construct an engine starting in `initial` (the state loaded from
    /// persistence, or `Blank` on first boot).
    pub fn new(table: [StateDescriptor; PairingState::COUNT], initial: PairingState) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut EngineContext) {
        info!("engine starting in state: {}", self.table[self.current].name);
        ctx.device.pairing_state = self.current_state();
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the engine by one control tick.
    ///
    /// 1. Button pre-emption (factory reset / shutdown / long-press edges).
    /// 2. `on_update` for the current state (message + retry logic).
    /// 3. Execute any resulting transition.
    pub fn tick(&mut self, ctx: &mut EngineContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        match states::apply_button_intent(ctx, self.current_state()) {
            Preempt::Halted => {
                // Shutdown pending; any message this tick is dropped — the
                // partner's retry timer covers the loss.
                ctx.inbox = None;
                return;
            }
            Preempt::Force(next) => {
                self.transition(next, ctx);
                return;
            }
            Preempt::Proceed => {}
        }

        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    /// Force an immediate transition (used when resuming a persisted state
    /// and by tests).
    pub fn force_transition(&mut self, next: PairingState, ctx: &mut EngineContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> PairingState {
        PairingState::from_index(self.current)
    }

    /// How many ticks the engine has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: PairingState, ctx: &mut EngineContext) {
        let next_idx = next_id as usize;

        info!(
            "transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;
        ctx.device.pairing_state = next_id;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
