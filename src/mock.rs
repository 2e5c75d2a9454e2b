//! In-process mock runtime for tests and examples.
//!
//! [`MockRuntime`] implements [`NativeShim`] entirely in memory: it hands
//! out future, context, and entity handles, walks futures from Pending to
//! Ready after a configurable number of polls, and enforces the handle
//! lifecycle rules (a consumed or cancelled future is invalid forever).
//!
//! Individual entry points can be intercepted per instance to script custom
//! responses, and [`MockRuntime::fail_next`] injects a one-shot failure
//! without touching the builtin behavior. Scenarios can also be loaded from
//! JSON via [`Scenario`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::handle::{EntityId, Uuid};
use crate::proto::entity::{
    EntityPersistInfo, EntityUnpersistInfo, PersistEntityCompletion, UnpersistEntityCompletion,
};
use crate::proto::future::{
    FutureCancelInfo, FuturePollInfo, FuturePollResult, FutureState,
};
use crate::proto::persistence::{
    ContextResult, CreateContextCompletion, PersistenceContextCreateInfo, PersistenceScope,
};
use crate::proto::{encode_to_vec, AnchorCreateInfo, Decode, DecodeError, Reader, Writer};
use crate::shim::{entry, NativeShim};
use crate::status::NativeResult;

type Handler = dyn Fn(&[u8], &mut Vec<u8>) -> NativeResult + Send + Sync;

/// Declarative mock configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Poll on which futures first report Ready.
    #[serde(default = "default_ready_after")]
    pub ready_after: u32,
    /// Scopes the mock system claims to support.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<PersistenceScope>,
}

fn default_ready_after() -> u32 {
    1
}

fn default_scopes() -> Vec<PersistenceScope> {
    vec![PersistenceScope::SystemManaged, PersistenceScope::LocalAnchors]
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ready_after: default_ready_after(),
            scopes: default_scopes(),
        }
    }
}

/// Builder for [`MockRuntime`].
#[derive(Debug, Clone, Default)]
pub struct MockRuntimeBuilder {
    scenario: Scenario,
}

impl MockRuntimeBuilder {
    /// Number of polls after which a future reports Ready. With `1` (the
    /// default) the very first poll is already Ready; with `n` the first
    /// `n - 1` polls report Pending.
    pub fn ready_after(mut self, polls: u32) -> Self {
        self.scenario.ready_after = polls;
        self
    }

    /// Scopes reported by scope enumeration and accepted for context
    /// creation.
    pub fn scopes(mut self, scopes: Vec<PersistenceScope>) -> Self {
        self.scenario.scopes = scopes;
        self
    }

    pub fn build(self) -> MockRuntime {
        MockRuntime::from_scenario(self.scenario)
    }
}

enum PendingOp {
    CreateContext { polls_left: u32 },
    Persist { entity_id: EntityId, polls_left: u32 },
    Unpersist { uuid: Uuid, polls_left: u32 },
}

impl PendingOp {
    fn polls_left_mut(&mut self) -> &mut u32 {
        match self {
            Self::CreateContext { polls_left, .. }
            | Self::Persist { polls_left, .. }
            | Self::Unpersist { polls_left, .. } => polls_left,
        }
    }

    fn is_pending(&self) -> bool {
        match self {
            Self::CreateContext { polls_left, .. }
            | Self::Persist { polls_left, .. }
            | Self::Unpersist { polls_left, .. } => *polls_left > 0,
        }
    }
}

#[derive(Default)]
struct MockState {
    next_future: u64,
    next_context: u64,
    next_entity: u64,
    next_uuid: u64,
    futures: HashMap<u64, PendingOp>,
    contexts: HashSet<u64>,
    persisted: HashSet<Uuid>,
}

impl MockState {
    fn issue_future(&mut self, op: PendingOp) -> u64 {
        self.next_future += 1;
        self.futures.insert(self.next_future, op);
        self.next_future
    }

    /// Take a future that has reached Ready, leaving a pending one alone.
    fn consume_ready(&mut self, future: u64) -> Result<PendingOp, NativeResult> {
        match self.futures.get(&future) {
            None => Err(NativeResult::FUTURE_INVALID),
            Some(op) if op.is_pending() => Err(NativeResult::FUTURE_PENDING),
            Some(_) => self.futures.remove(&future).ok_or(NativeResult::FUTURE_INVALID),
        }
    }
}

/// An in-memory stand-in for the native runtime.
pub struct MockRuntime {
    scenario: Scenario,
    state: Mutex<MockState>,
    interceptors: Mutex<HashMap<&'static str, Box<Handler>>>,
    failures: Mutex<HashMap<&'static str, VecDeque<NativeResult>>>,
    calls: Mutex<Vec<String>>,
}

impl MockRuntime {
    pub fn builder() -> MockRuntimeBuilder {
        MockRuntimeBuilder::default()
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            scenario,
            state: Mutex::new(MockState::default()),
            interceptors: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build from a JSON scenario document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_scenario(serde_json::from_str(json)?))
    }

    /// Replace the builtin behavior of one entry point.
    ///
    /// The handler receives the raw request bytes and writes the response
    /// record itself. Intercepting an entry the builtin dispatch does not
    /// know is allowed.
    pub fn intercept<F>(&self, entry: &'static str, handler: F)
    where
        F: Fn(&[u8], &mut Vec<u8>) -> NativeResult + Send + Sync + 'static,
    {
        self.lock(&self.interceptors).insert(entry, Box::new(handler));
    }

    /// Make the next call to `entry` fail with `code`, once. Queued
    /// failures are served in order, before interception and builtins.
    pub fn fail_next(&self, entry: &'static str, code: NativeResult) {
        self.lock(&self.failures).entry(entry).or_default().push_back(code);
    }

    /// Entry-point names of every call dispatched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock(&self.calls).clone()
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll_future(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _instance = read(r.get_u64())?;
        let info = read(FuturePollInfo::decode(&mut r))?;

        let mut state = self.lock(&self.state);
        let op = state
            .futures
            .get_mut(&info.future.raw())
            .ok_or(NativeResult::FUTURE_INVALID)?;
        let polls_left = op.polls_left_mut();
        let observed = if *polls_left > 0 {
            *polls_left -= 1;
            if *polls_left > 0 {
                FutureState::Pending
            } else {
                FutureState::Ready
            }
        } else {
            FutureState::Ready
        };
        Ok(encode_to_vec(&FuturePollResult::new(observed)))
    }

    fn cancel_future(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _instance = read(r.get_u64())?;
        let info = read(FutureCancelInfo::decode(&mut r))?;

        let mut state = self.lock(&self.state);
        if state.futures.remove(&info.future.raw()).is_none() {
            return Err(NativeResult::FUTURE_INVALID);
        }
        Ok(Vec::new())
    }

    fn create_context_async(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _session = read(r.get_u64())?;
        let info = read(PersistenceContextCreateInfo::decode(&mut r))?;
        if !self.scenario.scopes.contains(&info.scope) {
            return Err(NativeResult::SCOPE_UNSUPPORTED);
        }

        let mut state = self.lock(&self.state);
        let polls_left = self.scenario.ready_after;
        let future = state.issue_future(PendingOp::CreateContext { polls_left });
        Ok(u64_response(future))
    }

    fn create_context_complete(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _session = read(r.get_u64())?;
        let future = read(r.get_u64())?;

        let mut state = self.lock(&self.state);
        match state.consume_ready(future)? {
            PendingOp::CreateContext { .. } => {
                state.next_context += 1;
                let context = state.next_context;
                state.contexts.insert(context);
                Ok(encode_to_vec(&CreateContextCompletion::new(
                    NativeResult::SUCCESS,
                    ContextResult::SUCCESS,
                    crate::handle::PersistenceContextHandle::from_raw(context),
                )))
            }
            _ => Err(NativeResult::FUTURE_INVALID),
        }
    }

    fn destroy_context(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let context = read(r.get_u64())?;

        let mut state = self.lock(&self.state);
        if !state.contexts.remove(&context) {
            return Err(NativeResult::HANDLE_INVALID);
        }
        Ok(Vec::new())
    }

    fn enumerate_scopes(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _instance = read(r.get_u64())?;
        let _system = read(r.get_u64())?;
        let capacity = read(r.get_u32())?;

        let mut w = Writer::new();
        w.put_u32(self.scenario.scopes.len() as u32);
        for scope in self.scenario.scopes.iter().take(capacity as usize) {
            w.put_i32(*scope as i32);
        }
        Ok(w.into_vec())
    }

    fn persist_async(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let context = read(r.get_u64())?;
        let info = read(EntityPersistInfo::decode(&mut r))?;

        let mut state = self.lock(&self.state);
        if !state.contexts.contains(&context) {
            return Err(NativeResult::HANDLE_INVALID);
        }
        let polls_left = self.scenario.ready_after;
        let future = state.issue_future(PendingOp::Persist {
            entity_id: info.entity_id,
            polls_left,
        });
        Ok(u64_response(future))
    }

    fn persist_complete(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let context = read(r.get_u64())?;
        let future = read(r.get_u64())?;

        let mut state = self.lock(&self.state);
        if !state.contexts.contains(&context) {
            return Err(NativeResult::HANDLE_INVALID);
        }
        match state.consume_ready(future)? {
            PendingOp::Persist { entity_id, .. } => {
                state.next_uuid += 1;
                let uuid = Uuid::new(state.next_uuid, entity_id.0);
                state.persisted.insert(uuid);
                Ok(encode_to_vec(&PersistEntityCompletion::new(
                    NativeResult::SUCCESS,
                    ContextResult::SUCCESS,
                    uuid,
                )))
            }
            _ => Err(NativeResult::FUTURE_INVALID),
        }
    }

    fn unpersist_async(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let context = read(r.get_u64())?;
        let info = read(EntityUnpersistInfo::decode(&mut r))?;

        let mut state = self.lock(&self.state);
        if !state.contexts.contains(&context) {
            return Err(NativeResult::HANDLE_INVALID);
        }
        let polls_left = self.scenario.ready_after;
        let future = state.issue_future(PendingOp::Unpersist {
            uuid: info.uuid,
            polls_left,
        });
        Ok(u64_response(future))
    }

    fn unpersist_complete(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let context = read(r.get_u64())?;
        let future = read(r.get_u64())?;

        let mut state = self.lock(&self.state);
        if !state.contexts.contains(&context) {
            return Err(NativeResult::HANDLE_INVALID);
        }
        match state.consume_ready(future)? {
            PendingOp::Unpersist { uuid, .. } => {
                let result = if state.persisted.remove(&uuid) {
                    ContextResult::SUCCESS
                } else {
                    ContextResult::UUID_NOT_FOUND
                };
                Ok(encode_to_vec(&UnpersistEntityCompletion::new(
                    NativeResult::SUCCESS,
                    result,
                )))
            }
            _ => Err(NativeResult::FUTURE_INVALID),
        }
    }

    fn create_anchor(&self, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        let mut r = Reader::new(request);
        let _spatial_context = read(r.get_u64())?;
        let _info = read(AnchorCreateInfo::decode(&mut r))?;

        let mut state = self.lock(&self.state);
        state.next_entity += 1;
        let entity = state.next_entity;

        let mut w = Writer::new();
        w.put_u64(entity); // entity id
        w.put_u64(0x4000 + entity); // entity handle
        Ok(w.into_vec())
    }

    fn dispatch(&self, entry_point: &str, request: &[u8]) -> Result<Vec<u8>, NativeResult> {
        match entry_point {
            entry::POLL_FUTURE => self.poll_future(request),
            entry::CANCEL_FUTURE => self.cancel_future(request),
            entry::CREATE_CONTEXT_ASYNC => self.create_context_async(request),
            entry::CREATE_CONTEXT_COMPLETE => self.create_context_complete(request),
            entry::DESTROY_CONTEXT => self.destroy_context(request),
            entry::ENUMERATE_SCOPES => self.enumerate_scopes(request),
            entry::PERSIST_ENTITY_ASYNC => self.persist_async(request),
            entry::PERSIST_ENTITY_COMPLETE => self.persist_complete(request),
            entry::UNPERSIST_ENTITY_ASYNC => self.unpersist_async(request),
            entry::UNPERSIST_ENTITY_COMPLETE => self.unpersist_complete(request),
            entry::CREATE_ANCHOR => self.create_anchor(request),
            _ => Err(NativeResult::FUNCTION_UNSUPPORTED),
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl NativeShim for MockRuntime {
    fn invoke(&self, entry_point: &str, request: &[u8], response: &mut Vec<u8>) -> NativeResult {
        self.lock(&self.calls).push(entry_point.to_owned());

        if let Some(queue) = self.lock(&self.failures).get_mut(entry_point) {
            if let Some(code) = queue.pop_front() {
                return code;
            }
        }
        if let Some(handler) = self.lock(&self.interceptors).get(entry_point) {
            return handler(request, response);
        }
        match self.dispatch(entry_point, request) {
            Ok(bytes) => {
                *response = bytes;
                NativeResult::SUCCESS
            }
            Err(code) => code,
        }
    }
}

/// A request the mock cannot decode is reported as a validation failure,
/// the same way a strict runtime rejects a malformed input record.
fn read<T>(result: Result<T, DecodeError>) -> Result<T, NativeResult> {
    result.map_err(|err| {
        tracing::debug!(%err, "mock rejected malformed request");
        NativeResult::VALIDATION_FAILURE
    })
}

fn u64_response(value: u64) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_u64(value);
    w.into_vec()
}
