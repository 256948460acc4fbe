//! The decay index looper
//!
//! `DecayIndexLooper` walks an index around `[0, size)`: first at a constant
//! cadence, then, once a stop index is requested, with growing delays until
//! it comes to rest exactly on that index.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::domain::LooperState;
use crate::error::{LooperError, Result};
use crate::looper::config::LooperConfig;
use crate::looper::session::{self, Shared};

/// Cyclic index driver with linear and decaying phases.
///
/// Commands are fire-and-forget: requests that do not fit the current phase
/// are dropped without error. Progress is only visible through [`state`],
/// [`subscribe`] and [`updates`].
///
/// A decay request takes effect at the next step boundary: the linear wait
/// already in progress runs out, but the step it would have produced is
/// dropped. The wheel therefore holds its index for up to two linear
/// intervals before the padding steps begin, and padding is computed from
/// the index shown when the request was made.
///
/// Sessions run as tasks on the runtime the looper was built with. Cancelling
/// the owning scope, or dropping the looper, aborts the running session and
/// leaves its last state in place.
///
/// [`state`]: DecayIndexLooper::state
/// [`subscribe`]: DecayIndexLooper::subscribe
/// [`updates`]: DecayIndexLooper::updates
pub struct DecayIndexLooper {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl DecayIndexLooper {
    /// Create a looper on the current tokio runtime with its own scope.
    pub fn new(config: LooperConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| LooperError::NoRuntime(e.to_string()))?;
        Self::with_scope(config, runtime, CancellationToken::new())
    }

    /// Create a looper that runs sessions on `runtime` and dies with `scope`.
    pub fn with_scope(config: LooperConfig, runtime: Handle, scope: CancellationToken) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config, scope.child_token())),
            runtime,
        })
    }

    pub fn config(&self) -> &LooperConfig {
        &self.shared.config
    }

    /// Current phase and index.
    pub fn state(&self) -> LooperState {
        self.shared.output.get()
    }

    /// Latest-value receiver; intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<LooperState> {
        self.shared.output.subscribe()
    }

    /// Receiver for every emission from now on, in order.
    pub fn updates(&self) -> broadcast::Receiver<LooperState> {
        self.shared.output.updates()
    }

    /// True once the owning scope has been torn down
    pub fn is_cancelled(&self) -> bool {
        self.shared.scope.is_cancelled()
    }

    /// Start looping over `[0, size)` from `initial_index`.
    ///
    /// Ignored unless the looper is idle or finished, or if `size` is zero.
    /// `initial_index` is clamped into range.
    pub fn start_loop(&self, size: usize, initial_index: i64) {
        if let Some(generation) = self.shared.begin(size, initial_index) {
            self.runtime
                .spawn(session::supervise(self.shared.clone(), generation));
        }
    }

    /// Decelerate and come to rest on `stop_index`.
    ///
    /// Ignored unless the looper is stepping linearly. `stop_index` is clamped
    /// into range.
    pub fn start_decay(&self, stop_index: i64) {
        self.shared.request_decay(stop_index);
    }
}

impl Drop for DecayIndexLooper {
    fn drop(&mut self) {
        self.shared.scope.cancel();
    }
}

impl std::fmt::Debug for DecayIndexLooper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecayIndexLooper")
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish()
    }
}
