//! Last-request-wins sequencing for overlapping fetches.
//!
//! Every fetch on a navigation channel takes a ticket. When responses come
//! back out of order, only the one holding the newest ticket is applied.
//! Nothing is cancelled on the wire; stale responses are simply dropped.

/// Proof of which request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Ticket issuer for one navigation channel (report list, detail, stats).
#[derive(Debug, Clone)]
pub struct RequestSequencer {
    channel: &'static str,
    issued: u64,
    current: Option<u64>,
}

impl RequestSequencer {
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            issued: 0,
            current: None,
        }
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        self.current = Some(self.issued);
        RequestTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.current == Some(ticket.0)
    }

    /// Whether a response carrying `ticket` should be applied.
    ///
    /// Accepting closes the ticket, so a duplicate delivery is rejected.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.current = None;
            true
        } else {
            tracing::debug!(
                channel = self.channel,
                ticket = ticket.0,
                latest = self.issued,
                "dropping stale response"
            );
            false
        }
    }

    /// Make every outstanding ticket stale, e.g. when the user navigates away.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
