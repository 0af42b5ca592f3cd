//! Booking payment/lifecycle state machine.
//!
//! The durable transition is a single guarded UPDATE
//! (`db::queries::apply_booking_payment_outcome`); the pure form here is the
//! reference for that statement and keeps the table testable without a
//! database.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingState {
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
}

/// Applies a payment outcome to a booking state.
///
/// Forward-only: a paid booking never regresses, and a stale failure for a
/// booking that already settled is a no-op. `payment_status = Paid` implies
/// `status != Pending`.
pub fn apply_outcome(current: BookingState, outcome: PaymentOutcome) -> BookingState {
    match (current.payment_status, outcome) {
        (PaymentStatus::Paid, _) => current,
        (_, PaymentOutcome::Success) => BookingState {
            payment_status: PaymentStatus::Paid,
            status: match current.status {
                BookingStatus::Pending => BookingStatus::Confirmed,
                other => other,
            },
        },
        (PaymentStatus::Pending, PaymentOutcome::Failure) => BookingState {
            payment_status: PaymentStatus::Failed,
            status: current.status,
        },
        (PaymentStatus::Failed, PaymentOutcome::Failure) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRESH: BookingState = BookingState {
        payment_status: PaymentStatus::Pending,
        status: BookingStatus::Pending,
    };

    #[test]
    fn success_confirms_pending_booking() {
        let next = apply_outcome(FRESH, PaymentOutcome::Success);
        assert_eq!(next.payment_status, PaymentStatus::Paid);
        assert_eq!(next.status, BookingStatus::Confirmed);
    }

    #[test]
    fn failure_marks_payment_failed_but_keeps_booking_pending() {
        let next = apply_outcome(FRESH, PaymentOutcome::Failure);
        assert_eq!(next.payment_status, PaymentStatus::Failed);
        assert_eq!(next.status, BookingStatus::Pending);
    }

    #[test]
    fn duplicate_success_is_a_no_op() {
        let paid = apply_outcome(FRESH, PaymentOutcome::Success);
        assert_eq!(apply_outcome(paid, PaymentOutcome::Success), paid);
    }

    #[test]
    fn paid_booking_never_regresses_on_stale_failure() {
        let paid = apply_outcome(FRESH, PaymentOutcome::Success);
        assert_eq!(apply_outcome(paid, PaymentOutcome::Failure), paid);
    }

    #[test]
    fn retry_after_failure_can_still_succeed() {
        let failed = apply_outcome(FRESH, PaymentOutcome::Failure);
        let next = apply_outcome(failed, PaymentOutcome::Success);
        assert_eq!(next.payment_status, PaymentStatus::Paid);
        assert_eq!(next.status, BookingStatus::Confirmed);
    }

    #[test]
    fn success_does_not_revive_a_cancelled_booking() {
        let cancelled = BookingState {
            payment_status: PaymentStatus::Pending,
            status: BookingStatus::Cancelled,
        };
        let next = apply_outcome(cancelled, PaymentOutcome::Success);
        assert_eq!(next.payment_status, PaymentStatus::Paid);
        assert_eq!(next.status, BookingStatus::Cancelled);
    }

    #[test]
    fn paid_always_implies_not_pending() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let state = BookingState {
                payment_status: PaymentStatus::Pending,
                status,
            };
            let next = apply_outcome(state, PaymentOutcome::Success);
            if next.payment_status == PaymentStatus::Paid {
                assert_ne!(next.status, BookingStatus::Pending);
            }
        }
    }
}
