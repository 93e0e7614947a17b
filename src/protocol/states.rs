//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap. Handlers are role-qualified: only the leader
//! initiates requests, the follower validates and echoes.
//!
//! ```text
//!  BLANK ──[auto / long press]──▶ PAIRING ──[echo exchanged]──▶ PAIRED+SYNCED
//!    ▲                               │
//!    └────────[pairing timeout, persist, power down]
//!
//!  PAIRED-NOT-SYNCED ──▶ SYNCING ──[echo exchanged]──▶ PAIRED+SYNCED
//!    ▲                      │
//!    └──[sync timeout, persist, power down]
//!
//!  Any state ──[very long press]──▶ factory reset ──▶ BLANK, power down
//!  Any state ──[short press]──▶ persist, power down
//! ```

use log::{debug, info, warn};

use crate::drivers::button::ButtonIntent;

use super::context::{Action, EngineContext, PowerDownReason};
use super::message::{InboundMessage, MessageKind};
use super::retry::RetryEvent;
use super::state::{PairingState, Role, BROADCAST_ADDR};
use super::StateDescriptor;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; PairingState::COUNT] {
    [
        // Index 0 — Blank
        StateDescriptor {
            id: PairingState::Blank,
            name: "Blank",
            on_enter: Some(blank_enter),
            on_exit: None,
            on_update: blank_update,
        },
        // Index 1 — Pairing
        StateDescriptor {
            id: PairingState::Pairing,
            name: "Pairing",
            on_enter: Some(pairing_enter),
            on_exit: None,
            on_update: pairing_update,
        },
        // Index 2 — PairedNotSynced
        StateDescriptor {
            id: PairingState::PairedNotSynced,
            name: "PairedNotSynced",
            on_enter: Some(paired_not_synced_enter),
            on_exit: None,
            on_update: paired_not_synced_update,
        },
        // Index 3 — Syncing
        StateDescriptor {
            id: PairingState::Syncing,
            name: "Syncing",
            on_enter: Some(syncing_enter),
            on_exit: None,
            on_update: syncing_update,
        },
        // Index 4 — PairedSynced
        StateDescriptor {
            id: PairingState::PairedSynced,
            name: "PairedSynced",
            on_enter: Some(paired_synced_enter),
            on_exit: None,
            on_update: paired_synced_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Button pre-emption (runs before per-state message/timer logic)
// ═══════════════════════════════════════════════════════════════════════════

/// Outcome of the button pre-emption step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preempt {
    /// No button transition; run the per-state update.
    Proceed,
    /// Shutdown requested; skip the per-state update, no state change.
    Halted,
    /// Jump straight to this state, skipping the per-state update.
    Force(PairingState),
}

/// Translate this tick's button intent into global transitions. Runs before
/// mailbox/timer handling so a factory reset pre-empts auto-transitions.
pub fn apply_button_intent(ctx: &mut EngineContext, current: PairingState) -> Preempt {
    match ctx.take_intent() {
        ButtonIntent::None => Preempt::Proceed,

        ButtonIntent::Short => {
            info!("short press: shutting down from {:?}", current);
            request_shutdown(ctx, PowerDownReason::UserShutdown);
            Preempt::Halted
        }

        ButtonIntent::VeryLong => {
            warn!("very long press: factory reset");
            ctx.device.partner.clear();
            ctx.device.is_synced = false;
            ctx.device.time_offset_ms = 0;
            ctx.push_action(Action::ShowMessage("Factory reset"));
            request_shutdown(ctx, PowerDownReason::FactoryReset);
            Preempt::Force(PairingState::Blank)
        }

        ButtonIntent::Long => match current {
            PairingState::PairedSynced => {
                info!("long press: shutting down while synced");
                request_shutdown(ctx, PowerDownReason::UserShutdown);
                Preempt::Halted
            }
            PairingState::Syncing => {
                info!("long press: abandoning sync, re-pairing from scratch");
                ctx.device.partner.clear();
                ctx.device.is_synced = false;
                Preempt::Force(PairingState::Pairing)
            }
            PairingState::Blank if !ctx.config.auto_start_pairing => {
                info!("long press: starting pairing");
                Preempt::Force(PairingState::Pairing)
            }
            other => {
                debug!("long press ignored in {:?}", other);
                Preempt::Proceed
            }
        },
    }
}

/// Persist (reduced), release the radio, and request deep sleep.
fn request_shutdown(ctx: &mut EngineContext, reason: PowerDownReason) {
    ctx.push_action(Action::Persist);
    ctx.push_action(Action::RadioOff);
    ctx.push_action(Action::PowerDown(reason));
}

// ═══════════════════════════════════════════════════════════════════════════
//  BLANK — no partner known
// ═══════════════════════════════════════════════════════════════════════════

fn blank_enter(ctx: &mut EngineContext) {
    info!("BLANK: no partner known");
    ctx.push_action(Action::ShowStatus);
}

fn blank_update(ctx: &mut EngineContext) -> Option<PairingState> {
    if ctx.config.auto_start_pairing {
        return Some(PairingState::Pairing);
    }
    // Waiting for a deliberate long press (handled by pre-emption).
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PAIRING — discovering a partner
// ═══════════════════════════════════════════════════════════════════════════

fn pairing_enter(ctx: &mut EngineContext) {
    ctx.retry.reset(
        ctx.config.resend_interval_ticks,
        ctx.config.pairing_timeout_ticks,
    );
    match ctx.device.role {
        Role::Leader => {
            info!("PAIRING: broadcasting for a partner");
            ctx.push_action(Action::Send {
                dest: BROADCAST_ADDR,
                kind: MessageKind::PairRequest,
            });
        }
        Role::Follower => info!("PAIRING: listening for a leader"),
    }
    ctx.push_action(Action::ShowStatus);
}

fn pairing_update(ctx: &mut EngineContext) -> Option<PairingState> {
    if let Some(msg) = ctx.take_message() {
        if let Some(next) = handle_pairing_message(ctx, &msg) {
            return Some(next);
        }
    }

    match ctx.retry.advance() {
        RetryEvent::Resend => {
            if ctx.device.role.is_leader() {
                debug!("PAIRING: resend broadcast (tick {})", ctx.retry.count());
                ctx.push_action(Action::Send {
                    dest: BROADCAST_ADDR,
                    kind: MessageKind::PairRequest,
                });
            }
            None
        }
        RetryEvent::Expired => {
            warn!("PAIRING: no partner found, giving up");
            ctx.push_action(Action::ShowMessage("Pairing failed"));
            request_shutdown(ctx, PowerDownReason::PairingTimeout);
            Some(PairingState::Blank)
        }
        RetryEvent::None => None,
    }
}

fn handle_pairing_message(
    ctx: &mut EngineContext,
    msg: &InboundMessage,
) -> Option<PairingState> {
    match (ctx.device.role, msg.kind) {
        // Leader accepts an echo from any responder — sender unconstrained
        // during discovery.
        (Role::Leader, MessageKind::PairEcho) => {
            info!("PAIRING: paired with {:02X?}", msg.sender);
            ctx.device.partner.set(msg.sender);
            mark_synced(ctx);
            ctx.push_action(Action::Persist);
            Some(PairingState::PairedSynced)
        }
        // Follower adopts the first leader it hears and echoes back.
        (Role::Follower, MessageKind::PairRequest) => {
            info!("PAIRING: adopted leader {:02X?}", msg.sender);
            ctx.device.partner.set(msg.sender);
            ctx.push_action(Action::Send {
                dest: msg.sender,
                kind: MessageKind::PairEcho,
            });
            mark_synced(ctx);
            ctx.push_action(Action::Persist);
            Some(PairingState::PairedSynced)
        }
        _ => {
            ctx.reject_message(msg, "unexpected message while pairing");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PAIRED-NOT-SYNCED — partner known, clock not shared this power cycle
// ═══════════════════════════════════════════════════════════════════════════

fn paired_not_synced_enter(ctx: &mut EngineContext) {
    debug_assert!(
        !ctx.device.partner.is_empty(),
        "PairedNotSynced entered without a partner"
    );
    info!("PAIRED: partner {:02X?}, sync pending", ctx.device.partner.get());
}

fn paired_not_synced_update(_ctx: &mut EngineContext) -> Option<PairingState> {
    // Re-establish the time reference immediately after every power cycle.
    Some(PairingState::Syncing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SYNCING — re-establishing the shared time reference
// ═══════════════════════════════════════════════════════════════════════════

fn syncing_enter(ctx: &mut EngineContext) {
    let Some(partner) = ctx.device.partner.get() else {
        // The engine never routes here without a partner; persisted records
        // with an empty partner are rejected at load.
        unreachable!("Syncing entered without a partner");
    };
    ctx.retry.reset(
        ctx.config.resend_interval_ticks,
        ctx.config.syncing_timeout_ticks,
    );
    match ctx.device.role {
        Role::Leader => {
            info!("SYNCING: requesting clock restart from {:02X?}", partner);
            ctx.push_action(Action::Send {
                dest: partner,
                kind: MessageKind::SyncRequest,
            });
        }
        Role::Follower => info!("SYNCING: waiting for {:02X?}", partner),
    }
    ctx.push_action(Action::ShowStatus);
}

fn syncing_update(ctx: &mut EngineContext) -> Option<PairingState> {
    if let Some(msg) = ctx.take_message() {
        if let Some(next) = handle_syncing_message(ctx, &msg) {
            return Some(next);
        }
    }

    match ctx.retry.advance() {
        RetryEvent::Resend => {
            if ctx.device.role.is_leader() {
                if let Some(partner) = ctx.device.partner.get() {
                    debug!("SYNCING: resend request (tick {})", ctx.retry.count());
                    ctx.push_action(Action::Send {
                        dest: partner,
                        kind: MessageKind::SyncRequest,
                    });
                }
            }
            None
        }
        RetryEvent::Expired => {
            warn!("SYNCING: partner silent, giving up until next wake");
            ctx.push_action(Action::ShowMessage("Sync failed"));
            request_shutdown(ctx, PowerDownReason::SyncTimeout);
            // Partner retained — next boot resumes into resync.
            Some(PairingState::PairedNotSynced)
        }
        RetryEvent::None => None,
    }
}

fn handle_syncing_message(
    ctx: &mut EngineContext,
    msg: &InboundMessage,
) -> Option<PairingState> {
    match (ctx.device.role, msg.kind) {
        (Role::Leader, MessageKind::SyncEcho) => {
            if !ctx.device.partner.matches(msg.sender) {
                ctx.reject_message(msg, "sync echo from a stranger");
                return None;
            }
            info!("SYNCING: echo received, clocks aligned");
            mark_synced(ctx);
            Some(PairingState::PairedSynced)
        }
        (Role::Follower, MessageKind::SyncRequest) => {
            if !ctx.device.partner.matches(msg.sender) {
                ctx.reject_message(msg, "sync request from a stranger");
                return None;
            }
            info!("SYNCING: request received, echoing");
            ctx.push_action(Action::Send {
                dest: msg.sender,
                kind: MessageKind::SyncEcho,
            });
            mark_synced(ctx);
            Some(PairingState::PairedSynced)
        }
        _ => {
            ctx.reject_message(msg, "unexpected message while syncing");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PAIRED+SYNCED — idle, alternation driven by the alert scheduler
// ═══════════════════════════════════════════════════════════════════════════

fn paired_synced_enter(ctx: &mut EngineContext) {
    debug_assert!(ctx.device.is_synced, "PairedSynced entered unsynced");
    info!(
        "SYNCED: alternating output active, phase zero at {} ms",
        ctx.device.time_offset_ms
    );
    ctx.push_action(Action::ShowStatus);
}

fn paired_synced_update(ctx: &mut EngineContext) -> Option<PairingState> {
    if let Some(msg) = ctx.take_message() {
        // Nothing is expected once synced; a reply to a stale request of
        // ours, or a stranger's broadcast, is surfaced and dropped.
        ctx.reject_message(&msg, "unexpected message while synced");
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared
// ═══════════════════════════════════════════════════════════════════════════

/// Record the shared time reference: phase zero is the instant the
/// pairing/sync handshake completed on this side.
fn mark_synced(ctx: &mut EngineContext) {
    ctx.device.is_synced = true;
    ctx.device.time_offset_ms = ctx.now_ms;
}
