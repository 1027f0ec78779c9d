use std::time::Duration;

use async_trait::async_trait;
use clockabilly::{Clockable, DateTime, Utc, UtcClock};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use tracing::{error, info, warn};

use crate::admin::{CoordinatorFactory, HttpCoordinatorFactory, RequestCoordinator, TlsOptions};
use crate::errors::*;
use crate::k8s::{TargetSelector, TargetSnapshot};
use crate::prelude::*;
use crate::product::Product;


/// Wall-clock interval during which the fleet is known to have been fully
/// paused; produced only when the whole cycle succeeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PausedDuration {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl PausedDuration {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> PausedDuration {
        PausedDuration { start_time, end_time }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }
}

/// Seam over `TargetSelector` so the pause saga can be driven against mocks.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait TargetResolver {
    async fn resolve(&self) -> anyhow::Result<TargetSnapshot>;
}

#[async_trait]
impl TargetResolver for TargetSelector {
    async fn resolve(&self) -> anyhow::Result<TargetSnapshot> {
        self.select().await
    }
}

#[derive(Clone, Debug)]
pub struct PauserConfig {
    pub namespace: String,
    pub helm_release_name: String,
    pub product_hint: Option<Product>,
    pub admin_port_override: Option<i32>,
    pub tls: Option<TlsOptions>,
}

impl PauserConfig {
    pub fn new(namespace: &str, helm_release_name: &str) -> PauserConfig {
        PauserConfig {
            namespace: namespace.into(),
            helm_release_name: helm_release_name.into(),
            product_hint: None,
            admin_port_override: None,
            tls: None,
        }
    }
}

/// Executes one complete pause cycle against a Scalar product fleet:
///
/// 1. Find the target pods to pause.
/// 2. Pause the target pods.
/// 3. Wait for the requested duration.
/// 4. Unpause the target pods.
/// 5. Check whether the fleet changed while it was paused.
///
/// The type holds no mutable state, but it is still not meant to be invoked
/// concurrently: the side effect it produces (pausing a live fleet) is global
/// to the cluster, not partitionable per caller.
pub struct Pauser {
    resolver: Box<dyn TargetResolver + Send + Sync>,
    factory: Box<dyn CoordinatorFactory + Send + Sync>,
    clock: Box<dyn Clockable + Send + Sync>,
}

impl Pauser {
    pub fn new(client: kube::Client, config: PauserConfig) -> Result<Pauser, PauserError> {
        if config.namespace.is_empty() {
            return Err(PauserError::new(PauserErrorKind::InvalidArgument, "namespace is required"));
        }
        if config.helm_release_name.is_empty() {
            return Err(PauserError::new(PauserErrorKind::InvalidArgument, "helm release name is required"));
        }

        let selector = TargetSelector::with_overrides(
            client,
            &config.namespace,
            &config.helm_release_name,
            config.product_hint,
            config.admin_port_override,
        );
        Ok(Pauser::with_parts(
            Box::new(selector),
            Box::new(HttpCoordinatorFactory::new(config.tls)),
            Box::new(UtcClock::new()),
        ))
    }

    pub(crate) fn with_parts(
        resolver: Box<dyn TargetResolver + Send + Sync>,
        factory: Box<dyn CoordinatorFactory + Send + Sync>,
        clock: Box<dyn Clockable + Send + Sync>,
    ) -> Pauser {
        Pauser { resolver, factory, clock }
    }

    /// Run one pause cycle: pause the fleet, hold it paused for
    /// `pause_duration` milliseconds, unpause it, and verify that the fleet's
    /// identity did not change in between.  `max_pause_wait_time` is the drain
    /// budget (in milliseconds) forwarded to the products untouched.
    pub async fn pause(
        &self,
        pause_duration: i64,
        max_pause_wait_time: Option<i64>,
    ) -> Result<PausedDuration, PauserError> {
        if pause_duration < 1 {
            return Err(PauserError::new(
                PauserErrorKind::InvalidArgument,
                "pause duration is required to be greater than 0 milliseconds",
            ));
        }

        let target_before = self.resolver.resolve().await.map_err(|e| {
            PauserError::with_cause(PauserErrorKind::TargetNotFound, "failed to find the target pods to pause", e)
        })?;

        let coordinator = self.factory.build(&target_before).map_err(|e| {
            PauserError::with_cause(
                PauserErrorKind::CoordinatorInit,
                "failed to initialize the admin request coordinator",
                e,
            )
        })?;

        // From here on the pause may have reached the fleet, so nothing is
        // thrown eagerly: every failure is captured and reconciled at the end,
        // and unpause is always attempted.
        let (paused, pause_failure) =
            match self.pause_and_wait(&*coordinator, pause_duration, max_pause_wait_time).await {
                Ok(d) => (Some(d), None),
                Err(e) => (None, Some(PauserError::with_cause(PauserErrorKind::PauseFailed, "pause operation failed", e))),
            };

        let unpause_failure = self.unpause_with_retry(&*coordinator, MAX_UNPAUSE_RETRY_COUNT).await.err();

        let (target_after, get_target_failure) = match self.resolver.resolve().await {
            Ok(t) => (Some(t), None),
            Err(e) => (
                None,
                Some(PauserError::with_cause(
                    PauserErrorKind::GetTargetAfterPauseFailed,
                    "failed to find the target pods to examine whether the target pods were updated during the pause",
                    e,
                )),
            ),
        };

        let (status_unmatched, status_check_failure) = match &target_after {
            None => (false, None),
            Some(after) => match check_status_unchanged(&target_before, after) {
                Ok(unchanged) => (!unchanged, None),
                Err(e) => (
                    false,
                    Some(PauserError::with_cause(PauserErrorKind::StatusCheckFailed, "status check failed", e)),
                ),
            },
        };

        compose_outcome(
            &target_before.deployment_name(),
            paused,
            pause_failure,
            unpause_failure,
            get_target_failure,
            status_check_failure,
            status_unmatched,
        )
    }

    async fn pause_and_wait(
        &self,
        coordinator: &(dyn RequestCoordinator + Send + Sync),
        pause_duration: i64,
        max_pause_wait_time: Option<i64>,
    ) -> anyhow::Result<PausedDuration> {
        coordinator.pause(true, max_pause_wait_time).await?;

        let start_time = self.clock.now();
        // Deliberately uninterruptible: bailing out partway would desynchronize
        // the recorded interval from the actual paused window.
        tokio::time::sleep(Duration::from_millis(pause_duration as u64)).await;
        let end_time = self.clock.now();

        info!("fleet paused from {start_time} to {end_time}");
        Ok(PausedDuration { start_time, end_time })
    }

    async fn unpause_with_retry(
        &self,
        coordinator: &(dyn RequestCoordinator + Send + Sync),
        max_retry_count: usize,
    ) -> Result<(), PauserError> {
        let mut attempts = 0;
        loop {
            match coordinator.unpause().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempts += 1;
                    if attempts >= max_retry_count {
                        return Err(PauserError::with_cause(PauserErrorKind::UnpauseFailed, "unpause operation failed", e));
                    }
                    warn!("unpause attempt {attempts} failed, retrying: {e:#}");
                },
            }
        }
    }
}

fn check_status_unchanged(before: &TargetSnapshot, after: &TargetSnapshot) -> anyhow::Result<bool> {
    Ok(before.status()? == after.status()?)
}

/// Reconcile the captured failure signals of one run into exactly one outcome.
/// Priority order, most severe first: unpause failure (fleet may be stuck
/// paused) > pause failure (backup window unusable) > get-target-after failure
/// > status-check failure > status mismatch.  The highest-priority signal
/// becomes the returned error's kind and cause; every lower-priority signal is
/// attached as a secondary cause so nothing is lost.
fn compose_outcome(
    deployment_name: &str,
    paused: Option<PausedDuration>,
    pause_failure: Option<PauserError>,
    unpause_failure: Option<PauserError>,
    get_target_failure: Option<PauserError>,
    status_check_failure: Option<PauserError>,
    status_unmatched: bool,
) -> Result<PausedDuration, PauserError> {
    let status_unmatched_failure = status_unmatched.then(|| {
        PauserError::new(PauserErrorKind::StatusUnmatched, "the target pods were updated during the pause duration")
    });

    let backup_usable = pause_failure.is_none()
        && get_target_failure.is_none()
        && status_check_failure.is_none()
        && !status_unmatched;

    let mut signals = [
        unpause_failure,
        pause_failure,
        get_target_failure,
        status_check_failure,
        status_unmatched_failure,
    ]
    .into_iter()
    .flatten();

    let primary = match signals.next() {
        None => match paused {
            Some(d) => return Ok(d),
            // A missing duration always comes with a pause failure signal
            None => PauserError::new(PauserErrorKind::PauseFailed, "pause operation failed"),
        },
        Some(p) => p,
    };

    let message = match primary.kind {
        PauserErrorKind::UnpauseFailed => {
            let mut m = format!(
                "Unpause operation failed. Scalar products might still be in a paused state. You \
                 must restart related pods by using the `kubectl rollout restart deployment \
                 {deployment_name}` command to unpause all pods."
            );
            if backup_usable && let Some(d) = paused {
                m += &format!(
                    " However, the pause operations for taking a backup succeeded. You can use a \
                     backup that was taken during this pause duration: Start Time = {}, End Time = {}.",
                    d.start_time(),
                    d.end_time()
                );
            }
            m
        },
        PauserErrorKind::PauseFailed => "Pause operation failed. You cannot use the backup that was taken \
             during this pause duration. You need to retry the pause operation from the beginning to \
             take a backup."
            .into(),
        PauserErrorKind::GetTargetAfterPauseFailed => "Failed to find the target pods to examine whether the \
             target pods were updated during the pause. You cannot trust the backup that was taken \
             during this pause duration."
            .into(),
        PauserErrorKind::StatusCheckFailed => "Status check failed. You cannot use the backup that was \
             taken during this pause duration. You need to retry the pause operation from the \
             beginning to take a backup."
            .into(),
        _ => "The target pods were updated during the pause duration. You cannot use the backup that \
             was taken during this pause duration. You need to retry the pause operation from the \
             beginning to take a backup."
            .into(),
    };

    let mut composed = PauserError::new(primary.kind, message);
    if primary.kind != PauserErrorKind::StatusUnmatched {
        composed = composed.caused_by(primary);
    }
    for signal in signals {
        composed.attach(signal);
    }

    if composed.kind == PauserErrorKind::UnpauseFailed {
        // Library callers own error handling, but a stuck-paused fleet is
        // critical enough to log no matter what the caller does with it
        error!("{composed}");
    }
    Err(composed)
}
