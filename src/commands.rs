use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use log::info;
use serde::Serialize;
use ubiometric::{
    authenticator::{BiometricAuthenticator, DEFAULT_REASON},
    dispatch::main_queue,
    kind::BiometricKind,
    outcome::AuthenticationOutcome,
    platform::PlatformBiometricService,
};

use crate::{
    args::{AuthArgs, StatusArgs},
    config::UbioConfig,
};

#[derive(Serialize)]
struct StatusReport {
    available: bool,
    kind: BiometricKind,
}

pub fn command_status(service: Arc<dyn PlatformBiometricService>, args: &StatusArgs) -> Result<()> {
    let (handle, _queue) = main_queue();
    let authenticator = BiometricAuthenticator::new(service, handle);

    let report = StatusReport {
        available: authenticator.can_authenticate(),
        kind: authenticator.current_biometric_kind(),
    };

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("available: {}", report.available);
        println!("kind: {}", report.kind);
    }

    Ok(())
}

pub async fn command_auth(service: Arc<dyn PlatformBiometricService>, config: UbioConfig, args: AuthArgs) -> Result<()> {
    let reason = args
        .reason
        .or(config.reason)
        .unwrap_or_else(|| DEFAULT_REASON.to_string());

    let (handle, mut queue) = main_queue();
    let mut authenticator = BiometricAuthenticator::new(service, handle);

    let result: Arc<Mutex<Option<AuthenticationOutcome>>> = Arc::new(Mutex::new(None));

    let slot = result.clone();
    authenticator.authenticate(reason, move |outcome| {
        if let Ok(mut s) = slot.lock() {
            *s = Some(outcome);
        }
    });

    //
    // the in-flight request keeps its own handle, the queue closes once it's done
    //
    drop(authenticator);

    let delivered = || result.lock().map(|s| s.is_some()).unwrap_or(false);

    while !delivered() && queue.turn().await {}

    let outcome = result
        .lock()
        .map_err(|_| anyhow!("outcome lock poisoned"))?
        .take()
        .ok_or_else(|| anyhow!("no authentication outcome"))?;

    info!("authentication {outcome}");

    if args.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!("{outcome}");
    }

    if let AuthenticationOutcome::Denied(reason) = outcome {
        bail!("Authentication denied ({reason})");
    }

    Ok(())
}
