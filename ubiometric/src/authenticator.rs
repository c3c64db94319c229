use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use log::{debug, error, info, warn};
use tokio::sync::oneshot;

use crate::{
    dispatch::MainQueueHandle,
    kind::{BiometricKind, PlatformBiometryType},
    outcome::{AuthenticationOutcome, DenialReason},
    platform::{PlatformBiometricService, ReplyHandler},
};

pub const DEFAULT_REASON: &str = "Logging in with biometrics";

type Deliver = Box<dyn FnOnce(AuthenticationOutcome) + Send + 'static>;

/// Single-use completion slot for one request.
///
/// The first outcome wins. Anything after that is dropped, and a slot that
/// is dropped without ever completing delivers `Denied(NotConfigured)`.
struct Completion {
    deliver: Mutex<Option<Deliver>>,
}

impl Completion {
    fn new<F>(deliver: F) -> Self
    where
        F: FnOnce(AuthenticationOutcome) + Send + 'static,
    {
        Self {
            deliver: Mutex::new(Some(Box::new(deliver))),
        }
    }

    fn complete(&self, outcome: AuthenticationOutcome) -> bool {
        let deliver = match self.deliver.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let Some(deliver) = deliver else {
            warn!("duplicate platform reply ignored ({outcome})");
            return false;
        };

        deliver(outcome);

        true
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        let deliver = match self.deliver.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(deliver) = deliver {
            warn!("platform dropped the request without replying");
            deliver(AuthenticationOutcome::Denied(DenialReason::NotConfigured));
        }
    }
}

/// Awaitable outcome of [`BiometricAuthenticator::request`].
pub struct AuthenticationRequest {
    state: RequestState,
}

enum RequestState {
    Ready(Option<AuthenticationOutcome>),
    Pending(oneshot::Receiver<AuthenticationOutcome>),
}

impl Future for AuthenticationRequest {
    type Output = AuthenticationOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            RequestState::Ready(outcome) => {
                Poll::Ready(outcome.take().unwrap_or(AuthenticationOutcome::Denied(DenialReason::NotConfigured)))
            }
            RequestState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(_)) => {
                    error!("authentication completion lost");
                    Poll::Ready(AuthenticationOutcome::Denied(DenialReason::NotConfigured))
                }
            },
        }
    }
}

pub struct BiometricAuthenticator {
    service: Arc<dyn PlatformBiometricService>,
    main: MainQueueHandle,
    reason: String,
}

impl BiometricAuthenticator {
    pub fn new(service: Arc<dyn PlatformBiometricService>, main: MainQueueHandle) -> Self {
        Self {
            service,
            main,
            reason: DEFAULT_REASON.to_string(),
        }
    }

    #[must_use]
    pub fn with_reason<R>(mut self, reason: R) -> Self
    where
        R: Into<String>,
    {
        self.reason = reason.into();
        self
    }

    pub fn set_reason<R>(&mut self, reason: R)
    where
        R: Into<String>,
    {
        self.reason = reason.into();
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub fn can_authenticate(&self) -> bool {
        let probe = self.service.probe_capability();

        if !probe.available {
            debug!("capability probe failed detail={:?}", probe.detail);
        }

        probe.available
    }

    #[must_use]
    pub fn current_biometric_kind(&self) -> BiometricKind {
        //
        // some platforms only fill in the modality after a probe
        //
        if !self.can_authenticate() {
            return BiometricKind::None;
        }

        let raw: PlatformBiometryType = self.service.read_biometric_kind();
        let kind = BiometricKind::from(raw);

        debug!("platform biometry type {} -> {kind}", raw.0);

        kind
    }

    /// Runs one authentication and posts `on_complete` to the main queue.
    ///
    /// When the capability probe fails, `on_complete` runs immediately on the
    /// calling thread and the platform is never asked to prompt.
    pub fn authenticate<R, F>(&mut self, reason: R, on_complete: F)
    where
        R: Into<String>,
        F: FnOnce(AuthenticationOutcome) + Send + 'static,
    {
        self.set_reason(reason);

        if !self.can_authenticate() {
            info!("biometric authentication not available");
            on_complete(AuthenticationOutcome::Denied(DenialReason::NotConfigured));
            return;
        }

        let main = self.main.clone();

        let completion = Completion::new(move |outcome| {
            if let Err(e) = main.post(move || on_complete(outcome)) {
                error!("unable to deliver {outcome} ({e})");
            }
        });

        self.issue(completion);
    }

    /// Runs one authentication with the configured reason.
    pub fn request(&self) -> AuthenticationRequest {
        if !self.can_authenticate() {
            info!("biometric authentication not available");
            return AuthenticationRequest {
                state: RequestState::Ready(Some(AuthenticationOutcome::Denied(DenialReason::NotConfigured))),
            };
        }

        let (tx, rx) = oneshot::channel();

        let completion = Completion::new(move |outcome| {
            // receiver gone means the caller walked away
            let _ = tx.send(outcome);
        });

        self.issue(completion);

        AuthenticationRequest {
            state: RequestState::Pending(rx),
        }
    }

    fn issue(&self, completion: Completion) {
        let completion = Arc::new(completion);

        let handler = ReplyHandler::new(move |reply| {
            let outcome = AuthenticationOutcome::from(reply);
            debug!("platform replied {outcome}");
            completion.complete(outcome);
        });

        info!("requesting biometric authentication: {}", self.reason);

        self.service.request_authentication(&self.reason, handler);
    }
}
