//! Presence sink that records updates.

use parking_lot::Mutex;
use slirc_presence::presence::{IrcStatus, PresenceSink};

#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(String, IrcStatus)>>,
    local: Mutex<Vec<(IrcStatus, IrcStatus)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Nick updates so far, clearing the record.
    pub fn take(&self) -> Vec<(String, IrcStatus)> {
        std::mem::take(&mut *self.updates.lock())
    }

    /// Latest status reported for `nick`.
    pub fn last(&self, nick: &str) -> Option<IrcStatus> {
        self.updates
            .lock()
            .iter()
            .rev()
            .find(|(n, _)| n == nick)
            .map(|(_, s)| *s)
    }

    pub fn local(&self) -> Vec<(IrcStatus, IrcStatus)> {
        self.local.lock().clone()
    }
}

impl PresenceSink for RecordingSink {
    fn nick_presence(&self, nick: &str, status: IrcStatus) {
        self.updates.lock().push((nick.to_string(), status));
    }

    fn local_presence(&self, previous: IrcStatus, current: IrcStatus) {
        self.local.lock().push((previous, current));
    }
}
