//! Single-slot mailbox for the pending voice action, plus the listen-cycle
//! state machine. The mailbox clears on read so a redundant UI refresh can
//! never fire the same action twice.

use crate::voice::intent::VoiceAction;

/// Capacity-one, take-and-clear slot for the most recent parsed action.
#[derive(Debug, Default)]
pub struct ActionMailbox {
    pending: Option<VoiceAction>,
}

impl ActionMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post an action, replacing any action that was never consumed.
    pub fn post(&mut self, action: VoiceAction) {
        self.pending = Some(action);
    }

    /// Take the pending action, clearing the slot in the same step.
    pub fn take(&mut self) -> Option<VoiceAction> {
        self.pending.take()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Where one voice-command cycle currently stands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
    ActionPending,
    Consumed,
}

/// Drives one listen → parse → consume cycle and owns the mailbox.
#[derive(Debug, Default)]
pub struct VoiceControl {
    state: ListenState,
    mailbox: ActionMailbox,
}

impl VoiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    /// User started a capture.
    pub fn begin_listening(&mut self) {
        self.state = ListenState::Listening;
    }

    /// A transcription arrived (or failed). A parsed action moves the cycle
    /// to pending; no action, timeout, or error all return quietly to idle.
    pub fn on_transcription(&mut self, action: Option<VoiceAction>) {
        match action {
            Some(action) => {
                self.mailbox.post(action);
                self.state = ListenState::ActionPending;
            }
            None => self.state = ListenState::Idle,
        }
    }

    /// The UI reads and clears the pending action exactly once.
    pub fn consume(&mut self) -> Option<VoiceAction> {
        let action = self.mailbox.take();
        if action.is_some() {
            self.state = ListenState::Consumed;
        }
        action
    }

    /// Reset after the consumed action's effect has rendered.
    pub fn reset(&mut self) {
        self.state = ListenState::Idle;
    }
}
