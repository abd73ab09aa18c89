// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Suppression of expected asynchronous failures.
//!
//! Requests that reference a window may race against that window's
//! destruction. The service reports such failures long after the request was
//! issued, tagged only with the request's [`Sequence`]. The
//! [`SuppressionLedger`] remembers which sequences are allowed to fail so the
//! reactor can drop those failures silently.
//!
//! Failures are reported in the order requests were issued, so the ledger is a
//! FIFO: everything older than the sequence currently being observed can never
//! be matched again and is discarded.

use alloc::collections::VecDeque;

use crate::id::Sequence;
use crate::service::RenderService;

/// FIFO of request sequences whose failure is expected.
#[derive(Clone, Debug, Default)]
pub struct SuppressionLedger {
    pending: VecDeque<Sequence>,
    observed: Sequence,
}

impl SuppressionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sequence` as a request that may fail.
    ///
    /// Entries are kept strictly increasing; re-registering the newest entry
    /// or an older one is a no-op.
    pub fn expect(&mut self, sequence: Sequence) {
        if self.pending.back().is_some_and(|&last| last >= sequence) {
            return;
        }
        self.pending.push_back(sequence);
    }

    /// Records that the service has progressed to `sequence`, discarding every
    /// entry older than it.
    pub fn observe(&mut self, sequence: Sequence) {
        if sequence > self.observed {
            self.observed = sequence;
        }
        while self
            .pending
            .front()
            .is_some_and(|&oldest| oldest < self.observed)
        {
            self.pending.pop_front();
        }
    }

    /// Returns `true` if a failure of `sequence` should be dropped.
    ///
    /// A failure older than the progress already observed is stale and always
    /// dropped. Otherwise older entries are discarded and the failure matches
    /// iff the oldest remaining entry is `sequence`.
    pub fn should_suppress(&mut self, sequence: Sequence) -> bool {
        if sequence < self.observed {
            return true;
        }
        self.observe(sequence);
        self.pending.front() == Some(&sequence)
    }

    /// Number of outstanding entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is expected to fail.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// A service paired with the ledger that guards it.
///
/// Keeps the "issue, then register" pattern in one place.
#[derive(Debug)]
pub struct Requests<'a, S> {
    /// The service requests are issued to.
    pub service: &'a mut S,
    /// Ledger receiving racy sequences.
    pub ledger: &'a mut SuppressionLedger,
}

impl<'a, S: RenderService> Requests<'a, S> {
    /// Pairs `service` with `ledger`.
    pub fn new(service: &'a mut S, ledger: &'a mut SuppressionLedger) -> Self {
        Self { service, ledger }
    }

    /// Issues the single request made by `request` and registers it as one
    /// that may fail because its window is gone.
    pub fn racy<T>(
        &mut self,
        request: impl FnOnce(&mut S) -> Result<T, S::Error>,
    ) -> Result<T, S::Error> {
        let out = request(&mut *self.service)?;
        self.ledger.expect(self.service.last_sequence());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_failure_is_suppressed() {
        let mut ledger = SuppressionLedger::new();
        ledger.expect(Sequence(10));
        ledger.expect(Sequence(12));
        ledger.expect(Sequence(15));

        assert!(ledger.should_suppress(Sequence(12)), "12 was expected");
        assert_eq!(ledger.len(), 2, "10 is discarded as unreachable");
    }

    #[test]
    fn out_of_order_failure_is_stale() {
        let mut ledger = SuppressionLedger::new();
        ledger.expect(Sequence(10));
        ledger.expect(Sequence(12));
        ledger.expect(Sequence(15));

        assert!(ledger.should_suppress(Sequence(12)));
        assert!(ledger.should_suppress(Sequence(11)), "11 predates observed progress");
        assert!(!ledger.should_suppress(Sequence(20)), "20 was never expected");
        assert!(ledger.is_empty(), "12 and 15 are older than 20");
    }

    #[test]
    fn unexpected_failure_between_entries_is_reported() {
        let mut ledger = SuppressionLedger::new();
        ledger.expect(Sequence(10));
        ledger.expect(Sequence(15));

        assert!(!ledger.should_suppress(Sequence(13)));
        assert!(ledger.should_suppress(Sequence(15)));
    }

    #[test]
    fn observe_discards_only_older_entries() {
        let mut ledger = SuppressionLedger::new();
        ledger.expect(Sequence(5));
        ledger.expect(Sequence(6));
        ledger.observe(Sequence(6));
        assert_eq!(ledger.len(), 1, "an event at 6 cannot retire request 6");
        assert!(ledger.should_suppress(Sequence(6)));
    }

    #[test]
    fn expect_keeps_entries_strictly_increasing() {
        let mut ledger = SuppressionLedger::new();
        ledger.expect(Sequence(8));
        ledger.expect(Sequence(8));
        ledger.expect(Sequence(3));
        assert_eq!(ledger.len(), 1);
    }
}
