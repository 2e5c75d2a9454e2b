//! Poll and cancel operations on future handles.
//!
//! Polling is idempotent and never consumes the handle; the runtime alone
//! moves a future from Pending to Ready. Cancelling permanently invalidates
//! the handle: every later poll, cancel, or complete on it reports the
//! future-invalid error, never stale state. The protocol takes no locks —
//! a caller that shares one handle across threads must synchronize so that
//! no other path touches the handle once cancellation begins.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::handle::{FutureHandle, InstanceHandle};
use crate::proto::future::{FutureCancelInfo, FuturePollInfo, FuturePollResult};
use crate::proto::{Encode, Writer};
use crate::shim::entry;
use crate::status::{NativeResult, ResultStatus};

fn scoped_request<T: Encode>(scope: u64, info: &T) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_u64(scope);
    info.encode(&mut w);
    w.into_vec()
}

impl Client {
    /// Poll the state of a future scoped to the given instance.
    ///
    /// Explicit-scope form: returns the raw native code, and `out` is only
    /// valid to read when the code is a success. Do not read the output on
    /// an error.
    pub fn poll_future_raw(
        &self,
        instance: InstanceHandle,
        info: &FuturePollInfo,
        out: &mut FuturePollResult,
    ) -> NativeResult {
        if info.future.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let request = scoped_request(instance.raw(), info);
        self.invoke_decoding(entry::POLL_FUTURE, &request, out)
    }

    /// Poll the state of a future scoped to the current instance.
    ///
    /// The poll result is only reachable through the success arm, so state
    /// cannot be read on error.
    pub fn poll_future_with(
        &self,
        info: &FuturePollInfo,
    ) -> Result<(ResultStatus, FuturePollResult)> {
        if info.future.is_null() {
            return Err(Error::InvalidArgument {
                reason: "poll info holds a null future handle".to_owned(),
            });
        }
        let instance = self.instance_scope()?;
        let mut out = FuturePollResult::default();
        let status = self.wrap(self.poll_future_raw(instance, info, &mut out))?;
        Ok((status, out))
    }

    /// Poll the state of a future scoped to the current instance, building
    /// the poll info on the caller's behalf.
    pub fn poll_future(&self, future: FutureHandle) -> Result<(ResultStatus, FuturePollResult)> {
        self.poll_future_with(&FuturePollInfo::new(future))
    }

    /// Cancel the future scoped to the given instance and signal that the
    /// async work is not required.
    ///
    /// Explicit-scope form: returns the raw native code. After a successful
    /// cancel, every operation on this future reports future-invalid.
    pub fn cancel_future_raw(
        &self,
        instance: InstanceHandle,
        info: &FutureCancelInfo,
    ) -> NativeResult {
        if info.future.is_null() {
            return NativeResult::VALIDATION_FAILURE;
        }
        let request = scoped_request(instance.raw(), info);
        let mut response = Vec::new();
        self.invoke(entry::CANCEL_FUTURE, &request, &mut response)
    }

    /// Cancel the future scoped to the current instance.
    pub fn cancel_future_with(&self, info: &FutureCancelInfo) -> Result<ResultStatus> {
        if info.future.is_null() {
            return Err(Error::InvalidArgument {
                reason: "cancel info holds a null future handle".to_owned(),
            });
        }
        let instance = self.instance_scope()?;
        self.wrap(self.cancel_future_raw(instance, info))
    }

    /// Cancel the future scoped to the current instance, building the
    /// cancel info on the caller's behalf.
    pub fn cancel_future(&self, future: FutureHandle) -> Result<ResultStatus> {
        self.cancel_future_with(&FutureCancelInfo::new(future))
    }
}
