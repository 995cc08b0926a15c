//! Toast notification store
//!
//! Any part of the application can push a transient message (success, error, info,
//! warning) into a `ToastStore`; renderers subscribe to it and receive the ordered list
//! of tracked toasts on every change. Each toast goes from visible to hidden (by timer or
//! explicit dismissal) and is then removed from the list after a short exit window.

mod message;
mod store;

pub use message::{ToastDraft, ToastId, ToastKind, ToastMessage, ToastOptions, ToastPatch};
pub use store::{
    Subscription, ToastAction, ToastConfig, ToastState, ToastStore, ToastWatch,
    DEFAULT_REMOVE_DELAY, DEFAULT_TOAST_DURATION,
};
