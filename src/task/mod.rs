//! Background machinery for the expiration scheduler: the one-shot,
//! cancellable timer that drives the rescan.

pub(crate) mod timer;
