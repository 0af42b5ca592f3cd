pub mod booking;
pub mod event;
pub mod ledger;
pub mod plans;
