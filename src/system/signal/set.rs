use std::{io, mem::MaybeUninit};

use crate::cutils::cerr;
use crate::system::make_zeroed_sigaction;

use super::{handler::SignalHandlerBehavior, SignalNumber};

pub(super) struct SignalAction {
    raw: libc::sigaction,
}

impl SignalAction {
    pub(super) fn new(behavior: SignalHandlerBehavior) -> io::Result<Self> {
        // Functions interrupted by this signal are restarted as long as the handler is alive.
        let mut sa_flags = libc::SA_RESTART;

        // A full `sa_mask` is only needed when streaming the signal information, so that
        // `send_siginfo` cannot be interrupted by another signal.
        let (sa_sigaction, sa_mask) = match behavior {
            SignalHandlerBehavior::Default => (libc::SIG_DFL, SignalSet::empty()?),
            SignalHandlerBehavior::Stream => {
                // A signal-catching function is passed in `sa_sigaction`.
                sa_flags |= libc::SA_SIGINFO;
                (
                    super::stream::send_siginfo as libc::sighandler_t,
                    SignalSet::full()?,
                )
            }
        };

        let mut raw = make_zeroed_sigaction();
        raw.sa_sigaction = sa_sigaction;
        raw.sa_mask = sa_mask.raw;
        raw.sa_flags = sa_flags;

        Ok(Self { raw })
    }

    pub(super) fn register(&self, signal: SignalNumber) -> io::Result<Self> {
        let mut original_action = MaybeUninit::<libc::sigaction>::zeroed();

        // SAFETY: `self.raw` is a fully initialized `sigaction` and the spare slot is a valid
        // out-pointer for the original action.
        cerr(unsafe { libc::sigaction(signal, &self.raw, original_action.as_mut_ptr()) })?;

        Ok(Self {
            // SAFETY: `sigaction` filled the out-pointer on success.
            raw: unsafe { original_action.assume_init() },
        })
    }
}

/// A signal set that can be used to mask signals.
pub(crate) struct SignalSet {
    raw: libc::sigset_t,
}

impl SignalSet {
    /// Create an empty set.
    pub(super) fn empty() -> io::Result<Self> {
        let mut raw = MaybeUninit::<libc::sigset_t>::zeroed();

        // SAFETY: `raw` is a valid out-pointer for `sigemptyset`.
        cerr(unsafe { libc::sigemptyset(raw.as_mut_ptr()) })?;

        Ok(Self {
            // SAFETY: `sigemptyset` initialized the set.
            raw: unsafe { raw.assume_init() },
        })
    }

    /// Create a set containing all the signals.
    pub(crate) fn full() -> io::Result<Self> {
        let mut raw = MaybeUninit::<libc::sigset_t>::zeroed();

        // SAFETY: `raw` is a valid out-pointer for `sigfillset`.
        cerr(unsafe { libc::sigfillset(raw.as_mut_ptr()) })?;

        Ok(Self {
            // SAFETY: `sigfillset` initialized the set.
            raw: unsafe { raw.assume_init() },
        })
    }

    fn sigprocmask(&self, how: libc::c_int) -> io::Result<Self> {
        let mut original_set = MaybeUninit::<libc::sigset_t>::zeroed();

        // SAFETY: `self.raw` is an initialized signal set and the spare slot is a valid
        // out-pointer for the original mask.
        cerr(unsafe { libc::sigprocmask(how, &self.raw, original_set.as_mut_ptr()) })?;

        Ok(Self {
            // SAFETY: `sigprocmask` filled the out-pointer on success.
            raw: unsafe { original_set.assume_init() },
        })
    }

    /// Add the signals of this set to the currently blocked signals.
    pub(crate) fn block(&self) -> io::Result<Self> {
        self.sigprocmask(libc::SIG_BLOCK)
    }

    /// Overwrite the currently blocked signals with this set.
    pub(crate) fn set_mask(&self) -> io::Result<Self> {
        self.sigprocmask(libc::SIG_SETMASK)
    }
}
