//! Shared mutable context threaded through every state handler.
//!
//! `EngineContext` is the single struct that state handlers read from and
//! write to. It holds the live `DeviceState`, this tick's button intent and
//! inbound message, the retry timer, configuration, timing, and the queue
//! of side effects the handlers request. Think of it as the "blackboard"
//! in a blackboard architecture: handlers never touch hardware, they only
//! record what should happen.

use log::warn;

use crate::config::SystemConfig;
use crate::drivers::button::ButtonIntent;

use super::message::{InboundMessage, MessageKind};
use super::retry::RetryTimer;
use super::state::{DeviceIdentity, DeviceState};

// ---------------------------------------------------------------------------
// Actions (written by state handlers; applied by the app service)
// ---------------------------------------------------------------------------

/// Why the engine is requesting power-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDownReason {
    /// Short press (or long press while synced): user shutdown.
    UserShutdown,
    /// Very long press: factory reset completed.
    FactoryReset,
    /// Pairing abandoned after timeout.
    PairingTimeout,
    /// Re-synchronization abandoned after timeout.
    SyncTimeout,
}

/// Side effects requested by state handlers, applied in order after the
/// engine tick. `Persist` serializes the *reduced* form of the live state;
/// `PowerDown` is terminal for this run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Send { dest: DeviceIdentity, kind: MessageKind },
    Persist,
    ShowStatus,
    ShowWarning(&'static str),
    ShowMessage(&'static str),
    RadioOff,
    PowerDown(PowerDownReason),
}

/// Upper bound on actions emitted in a single tick. The deepest real path
/// (factory reset) emits four.
pub const ACTION_QUEUE_CAP: usize = 8;

// ---------------------------------------------------------------------------
// EngineContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct EngineContext {
    // -- Protocol state --
    /// The live device aggregate. Mutated only by state handlers and the
    /// engine's transition bookkeeping.
    pub device: DeviceState,
    /// This device's own radio address.
    pub own_addr: DeviceIdentity,

    // -- Per-tick inputs --
    /// Button intent classified this tick. Consumed by the pre-emption step.
    pub intent: ButtonIntent,
    /// Inbound message taken from the mailbox this tick, if any.
    /// Consumed at most once.
    pub inbox: Option<InboundMessage>,

    // -- Timing --
    /// Monotonic now (ms since boot), sampled once per tick.
    pub now_ms: u32,
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Per-state resend/timeout counter.
    pub retry: RetryTimer,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Outputs --
    /// Side effects requested this tick, drained by the app service.
    pub actions: heapless::Vec<Action, ACTION_QUEUE_CAP>,
}

impl EngineContext {
    pub fn new(config: SystemConfig, own_addr: DeviceIdentity, device: DeviceState) -> Self {
        let retry = RetryTimer::new(config.resend_interval_ticks, config.pairing_timeout_ticks);
        Self {
            device,
            own_addr,
            intent: ButtonIntent::None,
            inbox: None,
            now_ms: 0,
            ticks_in_state: 0,
            total_ticks: 0,
            retry,
            config,
            actions: heapless::Vec::new(),
        }
    }

    /// Queue a side effect. The queue is sized for the deepest handler
    /// path; overflow indicates a handler bug and drops the action.
    pub fn push_action(&mut self, action: Action) {
        if self.actions.push(action).is_err() {
            debug_assert!(false, "action queue overflow");
            warn!("action queue full, dropping {:?}", action);
        }
    }

    /// Take this tick's inbound message, if any.
    pub fn take_message(&mut self) -> Option<InboundMessage> {
        self.inbox.take()
    }

    /// Take this tick's button intent, leaving `None` behind.
    pub fn take_intent(&mut self) -> ButtonIntent {
        core::mem::replace(&mut self.intent, ButtonIntent::None)
    }

    /// Log and surface a validation failure without changing state.
    pub fn reject_message(&mut self, msg: &InboundMessage, reason: &'static str) {
        warn!(
            "rejected {} from {:02X?}: {}",
            msg.kind.name(),
            msg.sender,
            reason
        );
        self.push_action(Action::ShowWarning(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::state::Role;

    #[test]
    fn action_queue_drops_on_overflow_without_panic() {
        let mut ctx = EngineContext::new(
            SystemConfig::default(),
            [1; 6],
            DeviceState::blank(Role::Leader),
        );
        for _ in 0..ACTION_QUEUE_CAP {
            ctx.push_action(Action::ShowStatus);
        }
        assert_eq!(ctx.actions.len(), ACTION_QUEUE_CAP);
        // Release builds drop silently; debug builds would assert, so this
        // test only runs the overflow path when debug assertions are off.
        #[cfg(not(debug_assertions))]
        {
            ctx.push_action(Action::ShowStatus);
            assert_eq!(ctx.actions.len(), ACTION_QUEUE_CAP);
        }
    }

    #[test]
    fn take_message_consumes_once() {
        let mut ctx = EngineContext::new(
            SystemConfig::default(),
            [1; 6],
            DeviceState::blank(Role::Leader),
        );
        ctx.inbox = Some(InboundMessage {
            kind: MessageKind::PairEcho,
            sender: [2; 6],
        });
        assert!(ctx.take_message().is_some());
        assert!(ctx.take_message().is_none());
    }

    #[test]
    fn take_intent_leaves_none() {
        let mut ctx = EngineContext::new(
            SystemConfig::default(),
            [1; 6],
            DeviceState::blank(Role::Leader),
        );
        ctx.intent = ButtonIntent::VeryLong;
        assert_eq!(ctx.take_intent(), ButtonIntent::VeryLong);
        assert_eq!(ctx.take_intent(), ButtonIntent::None);
    }
}
