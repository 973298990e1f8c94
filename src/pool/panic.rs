//! Panic containment with a backtrace from the panic site.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A panic recovered by [`catch`].
#[derive(Debug)]
pub(crate) struct Caught {
    pub message: String,
    pub backtrace: String,
}

/// Run `f`, turning a panic into [`Caught`].
///
/// The process panic hook is wrapped once: inside `catch` it records a
/// backtrace instead of printing, everywhere else it defers to the hook that
/// was installed before.
pub(crate) fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Caught> {
    install_hook();

    let outer = CAPTURING.with(|c| c.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(outer));

    result.map_err(|payload| Caught {
        message: panic_message(payload.as_ref()),
        backtrace: LAST_BACKTRACE
            .with(|bt| bt.borrow_mut().take())
            .map(|bt| bt.to_string())
            .unwrap_or_default(),
    })
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                LAST_BACKTRACE.with(|bt| *bt.borrow_mut() = Some(Backtrace::force_capture()));
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
