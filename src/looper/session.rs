//! Session state and the control routine that drives it
//!
//! All phase checks and mutations go through `Shared`, under one mutex, and
//! every emission happens while that mutex is held. Commands and the stepping
//! routine therefore never observe each other half-way. The lock is never
//! held across an await point.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::decay::DecayPlan;
use crate::domain::{LooperState, Phase, clamp_index};
use crate::error::{LooperError, Result};
use crate::looper::config::LooperConfig;
use crate::looper::output::StateOutput;

/// Per-session bookkeeping not visible in the output
#[derive(Debug, Default)]
struct Session {
    /// Bumped by every accepted start; routines carry the value they started with
    generation: u64,
    size: usize,
    stop_index: Option<usize>,
}

/// State shared between the looper handle and its control routine
pub(crate) struct Shared {
    pub(crate) config: LooperConfig,
    pub(crate) output: StateOutput,
    pub(crate) scope: CancellationToken,
    session: Mutex<Session>,
}

impl Shared {
    pub(crate) fn new(config: LooperConfig, scope: CancellationToken) -> Self {
        let output = StateOutput::new(config.history_capacity);
        Self {
            config,
            output,
            scope,
            session: Mutex::new(Session::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // a panicking routine never leaves the session half-written
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the session if `generation` is still the live one.
    fn lock_live(&self, generation: u64) -> Result<MutexGuard<'_, Session>> {
        let session = self.lock();
        if session.generation != generation {
            return Err(LooperError::Superseded(generation));
        }
        Ok(session)
    }

    /// Open a new session. Returns its generation, or None if the request is ignored.
    pub(crate) fn begin(&self, size: usize, initial_index: i64) -> Option<u64> {
        if self.scope.is_cancelled() {
            debug!("start_loop ignored: scope cancelled");
            return None;
        }
        if size == 0 {
            debug!("start_loop ignored: size must be positive");
            return None;
        }

        let mut session = self.lock();
        let phase = self.output.get().phase;
        if !phase.accepts_start() {
            debug!("start_loop ignored: looper is {}", phase);
            return None;
        }

        session.generation += 1;
        session.size = size;
        session.stop_index = None;

        let index = clamp_index(initial_index, size);
        self.output.publish(LooperState::new(Phase::Linear, index));
        info!(
            "Session {} started: size={} index={}",
            session.generation, size, index
        );
        Some(session.generation)
    }

    /// Switch a linear session to decaying. Returns the clamped stop index.
    pub(crate) fn request_decay(&self, stop_index: i64) -> Option<usize> {
        if self.scope.is_cancelled() {
            debug!("start_decay ignored: scope cancelled");
            return None;
        }

        let mut session = self.lock();
        let phase = self.output.get().phase;
        if !phase.accepts_decay() {
            debug!("start_decay ignored: looper is {}", phase);
            return None;
        }

        let stop = clamp_index(stop_index, session.size);
        session.stop_index = Some(stop);
        let state = self.output.update(|s| s.with_phase(Phase::Decaying));
        info!(
            "Session {} decaying from index {} toward {}",
            session.generation, state.current_index, stop
        );
        Some(stop)
    }

    fn phase(&self, generation: u64) -> Result<Phase> {
        let _session = self.lock_live(generation)?;
        Ok(self.output.get().phase)
    }

    /// Move one slot forward, wrapping at the session size.
    fn advance(&self, generation: u64) -> Result<LooperState> {
        let session = self.lock_live(generation)?;
        let size = session.size;
        Ok(self
            .output
            .update(|s| s.with_index((s.current_index + 1) % size)))
    }

    /// Size, current index and stop index once decay has been requested.
    fn decay_target(&self, generation: u64) -> Result<(usize, usize, usize)> {
        let session = self.lock_live(generation)?;
        let state = self.output.get();
        if state.phase != Phase::Decaying {
            return Err(LooperError::InvalidState(format!(
                "left linear stepping while {}",
                state.phase
            )));
        }
        let stop = session.stop_index.ok_or_else(|| {
            LooperError::InvalidState("decaying without a stop index".into())
        })?;
        Ok((session.size, state.current_index, stop))
    }

    fn finish(&self, generation: u64, snap_to: Option<usize>) -> Result<LooperState> {
        let _session = self.lock_live(generation)?;
        Ok(self.output.update(|s| LooperState {
            phase: Phase::Finished,
            current_index: snap_to.unwrap_or(s.current_index),
        }))
    }

    /// Drop back to idle at index 0, unless a newer session took over.
    fn reset(&self, generation: u64) {
        if let Ok(_session) = self.lock_live(generation) {
            self.output.publish(LooperState::default());
        }
    }

    /// Wait out one step delay, unless the scope goes away first.
    async fn pause(&self, delay: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.scope.cancelled() => Err(LooperError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// Run one session's control routine to completion.
///
/// Failures and panics reset the session to idle. Cancellation and
/// supersession leave the state as it is; cancellation is returned to the
/// task's joiner.
pub(crate) async fn supervise(shared: Arc<Shared>, generation: u64) -> Result<()> {
    let outcome = AssertUnwindSafe(drive(&shared, generation))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            debug!("Session {} routine exited", generation);
            Ok(())
        }
        Ok(Err(e)) if e.is_cooperative() => {
            debug!("Session {} stopped: {}", generation, e);
            Err(e)
        }
        Ok(Err(e)) => {
            error!("Session {} failed, resetting: {}", generation, e);
            shared.reset(generation);
            Ok(())
        }
        Err(panic) => {
            error!(
                "Session {} panicked, resetting: {}",
                generation,
                panic_message(panic.as_ref())
            );
            shared.reset(generation);
            Ok(())
        }
    }
}

/// Linear stepping, then the decay plan, then rest.
async fn drive(shared: &Shared, generation: u64) -> Result<()> {
    let linear = shared.config.linear_interval;

    // A decay request is seen at the step boundary: the wait in progress
    // completes, but the step it would have produced does not happen.
    loop {
        shared.pause(linear).await?;
        if shared.phase(generation)? != Phase::Linear {
            break;
        }
        shared.advance(generation)?;
    }

    let intervals = shared.config.decay_intervals()?;
    let (size, current, stop) = shared.decay_target(generation)?;
    let plan = DecayPlan::new(size, current, stop, intervals);

    if plan.is_snap() {
        let state = shared.finish(generation, Some(plan.stop_index))?;
        info!("Session {} snapped to {}", generation, state.current_index);
        return Ok(());
    }

    debug!(
        "Session {} decay plan: {} padding + {} decay steps",
        generation,
        plan.pad_steps,
        plan.intervals.len()
    );
    for delay in plan.delays(linear) {
        shared.pause(delay).await?;
        shared.advance(generation)?;
    }

    let state = shared.finish(generation, None)?;
    info!("Session {} finished at {}", generation, state.current_index);
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
