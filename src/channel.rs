//! Hardware luminance control seam.
//!
//! Abstracts an ordered enumeration of DDC/CI-style brightness handles so
//! the controller can run against the real protocol backend or a no-op stub
//! (hosts without DDC-capable displays, tests).

mod ddc;

pub use ddc::DdcChannel;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Hardware channel failures. Cable drops and non-DDC displays show up
/// here; callers treat every variant as "brightness unknown", never fatal.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("no hardware channel at index {0}")]
    OutOfRange(usize),

    #[error("luminance read failed: {0}")]
    ReadFailed(String),

    #[error("luminance write failed: {0}")]
    WriteFailed(String),
}

/// Ordered enumeration of hardware brightness handles.
pub trait HardwareBrightnessChannel {
    /// Number of enumerated handles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current luminance of the handle at `index`, in `0..=100`.
    fn read_luminance(&mut self, index: usize) -> Result<u16, ChannelError>;

    /// Set luminance of the handle at `index`; `value` is in `0..=100`.
    fn set_luminance(&mut self, index: usize, value: u16) -> Result<(), ChannelError>;
}

/// Channel handle shared across controllers. The hardware enumeration is
/// global while each controller owns a disjoint index into it.
pub type SharedChannel = Arc<Mutex<dyn HardwareBrightnessChannel + Send>>;

/// Wrap a backend for sharing across controllers.
pub fn shared(channel: impl HardwareBrightnessChannel + Send + 'static) -> SharedChannel {
    Arc::new(Mutex::new(channel))
}

/// Lock a shared channel, recovering from poisoning. The loop is
/// single-threaded, so a poisoned lock only means a previous tick panicked.
///
/// The `'static` bound on the trait object is load-bearing: `MutexGuard` is
/// invariant over its contents, so an elided lifetime would tie the shared
/// channel's contents to the borrow and fail to unify with [`SharedChannel`].
pub fn lock(
    channel: &SharedChannel,
) -> MutexGuard<'_, dyn HardwareBrightnessChannel + Send + 'static> {
    channel.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend for hosts without any controllable display. Every operation
/// reports the index as out of range.
#[derive(Debug, Default)]
pub struct NullChannel;

impl HardwareBrightnessChannel for NullChannel {
    fn len(&self) -> usize {
        0
    }

    fn read_luminance(&mut self, index: usize) -> Result<u16, ChannelError> {
        Err(ChannelError::OutOfRange(index))
    }

    fn set_luminance(&mut self, index: usize, _value: u16) -> Result<(), ChannelError> {
        Err(ChannelError::OutOfRange(index))
    }
}
