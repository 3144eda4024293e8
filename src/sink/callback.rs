//! Push-callback sink

use crate::error::{BoxError, SinkError};
use crate::output::{Payload, PayloadKind};

use super::Sink;

/// Invokes a callback synchronously with each payload. Never backpressured.
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: FnMut(Payload) -> Result<(), BoxError>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Sink for CallbackSink<F>
where
    F: FnMut(Payload) -> Result<(), BoxError>,
{
    fn deliver(&mut self, payload: Payload) -> Result<(), SinkError> {
        (self.callback)(payload).map_err(SinkError::Callback)
    }

    fn accepts(&self, _kind: PayloadKind) -> bool {
        true
    }
}
