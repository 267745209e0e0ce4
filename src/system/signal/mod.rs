//! Utilities to handle signals.
use std::borrow::Cow;

mod handler;
mod info;
mod set;
mod stream;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use set::SignalSet;
pub(crate) use stream::{register_handlers, SignalStream};

pub(crate) type SignalNumber = libc::c_int;

/// Display name of a signal, for diagnostics.
pub(crate) fn signal_fmt(signal: SignalNumber) -> Cow<'static, str> {
    signal_hook::low_level::signal_name(signal)
        .map(|name| name.into())
        .unwrap_or_else(|| format!("unknown signal #{signal}").into())
}
