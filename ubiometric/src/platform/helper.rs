use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, error, info, warn};
use tokio::runtime::{Handle, RuntimeFlavor};
use which::which;

use crate::{
    error::{Error, Result},
    kind::PlatformBiometryType,
    outcome::{PlatformErrorCode, PlatformReply},
    platform::{CapabilityProbe, PlatformBiometricService, ReplyHandler},
};

const HELPER_OK: &str = "1";

fn cargo_bin() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    Ok(home.join(".cargo").join("bin"))
}

fn find_helper(name: &str) -> Result<PathBuf> {
    if let Ok(path) = which(name) {
        return Ok(path);
    }

    let path = cargo_bin()?.join(name);

    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::HelperNotFound(name.to_string()))
    }
}

fn parse_probe(exited_ok: bool, stdout: &str) -> CapabilityProbe {
    let stdout = stdout.trim();

    if exited_ok && stdout == HELPER_OK {
        return CapabilityProbe::available();
    }

    CapabilityProbe::unavailable(stdout.parse().ok().map(PlatformErrorCode))
}

fn parse_kind(stdout: &str) -> Result<PlatformBiometryType> {
    let code = stdout.trim().parse()?;
    Ok(PlatformBiometryType(code))
}

fn parse_reply(exited_ok: bool, stdout: &str) -> PlatformReply {
    let stdout = stdout.trim();

    if exited_ok && stdout == HELPER_OK {
        return PlatformReply::success();
    }

    PlatformReply::failure(stdout.parse().ok().map(PlatformErrorCode))
}

/// Delegates sensor work to an external helper program.
///
/// The helper understands three commands: `probe`, `kind` and
/// `authenticate -- <reason>`, and answers on stdout. Only a zero exit
/// status makes a `1` count as success.
pub struct HelperService {
    path: PathBuf,
}

impl HelperService {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    pub fn find(name: &str) -> Result<Self> {
        let path = find_helper(name)?;

        info!("using biometric helper {}", path.display());

        Ok(Self::new(path))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, command: &str) -> Result<(ExitStatus, String)> {
        let out = blocking(|| {
            Command::new(&self.path)
                .arg(command)
                .stdin(Stdio::null())
                .stderr(Stdio::inherit())
                .output()
        })?;

        Ok((out.status, String::from_utf8(out.stdout)?))
    }

    fn kind(&self) -> Result<PlatformBiometryType> {
        let (status, stdout) = self.run("kind")?;

        if !status.success() {
            return Err(Error::HelperFailure {
                path: self.path.clone(),
                status,
            });
        }

        parse_kind(&stdout)
    }
}

/// Runs synchronous helper calls without stalling other tasks on a
/// multi-threaded runtime. Elsewhere the call simply runs inline.
fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}

async fn run_authenticate(path: PathBuf, reason: String) -> PlatformReply {
    info!("executing {} authenticate", path.display());

    let out = tokio::process::Command::new(&path)
        .arg("authenticate")
        .arg("--")
        .arg(&reason)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .output()
        .await;

    let out = match out {
        Ok(v) => v,
        Err(e) => {
            error!("{} failed with {e}", path.display());
            return PlatformReply::failure(None);
        }
    };

    match String::from_utf8(out.stdout) {
        Ok(stdout) => {
            if !out.status.success() {
                warn!("{} exited with {}", path.display(), out.status);
            }
            parse_reply(out.status.success(), &stdout)
        }
        Err(e) => {
            error!("{} produced invalid output ({e})", path.display());
            PlatformReply::failure(None)
        }
    }
}

impl PlatformBiometricService for HelperService {
    fn probe_capability(&self) -> CapabilityProbe {
        match self.run("probe") {
            Ok((status, stdout)) => parse_probe(status.success(), &stdout),
            Err(e) => {
                warn!("{} probe failed ({e})", self.path.display());
                CapabilityProbe::unavailable(None)
            }
        }
    }

    fn read_biometric_kind(&self) -> PlatformBiometryType {
        match self.kind() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{} kind failed ({e})", self.path.display());
                PlatformBiometryType::NONE
            }
        }
    }

    fn request_authentication(&self, reason: &str, reply: ReplyHandler) {
        let Ok(runtime) = Handle::try_current() else {
            error!("no async runtime to run {}", self.path.display());
            reply.reply(PlatformReply::failure(None));
            return;
        };

        let path = self.path.clone();
        let reason = reason.to_string();

        runtime.spawn(async move {
            let res = run_authenticate(path, reason).await;
            debug!("helper replied success={} error={:?}", res.success, res.error);
            reply.reply(res);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn test_parse_probe() {
        assert_eq!(parse_probe(true, "1\n"), CapabilityProbe::available());
        assert_eq!(
            parse_probe(false, "-7"),
            CapabilityProbe::unavailable(Some(PlatformErrorCode::BIOMETRY_NOT_ENROLLED))
        );
        assert_eq!(parse_probe(true, "0"), CapabilityProbe::unavailable(Some(PlatformErrorCode(0))));
        assert_eq!(parse_probe(false, "garbage"), CapabilityProbe::unavailable(None));
        // a helper that says yes but exits with an error isn't believed
        assert!(!parse_probe(false, "1").available);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind(" 2\n").ok(), Some(PlatformBiometryType::FACE_ID));
        assert!(matches!(parse_kind("face"), Err(Error::ParseInt(_))));
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply(true, "1\n"), PlatformReply::success());
        assert_eq!(parse_reply(true, "-2"), PlatformReply::failure(Some(PlatformErrorCode::USER_CANCEL)));
        assert_eq!(parse_reply(true, ""), PlatformReply::failure(None));
        assert!(!parse_reply(false, "1").success);
        assert_eq!(parse_reply(false, "-8"), PlatformReply::failure(Some(PlatformErrorCode::BIOMETRY_LOCKOUT)));
    }

    #[test]
    fn test_missing_helper() {
        let res = HelperService::find("ubiometric-helper-that-does-not-exist");
        assert!(matches!(res, Err(Error::HelperNotFound(_))));
    }

    #[test]
    fn test_unrunnable_helper() {
        let service = HelperService::new("/nonexistent/ubiometric-helper");

        assert!(!service.probe_capability().available);
        assert_eq!(service.read_biometric_kind(), PlatformBiometryType::NONE);
    }

    #[test]
    fn test_request_without_runtime() {
        let service = HelperService::new("/nonexistent/ubiometric-helper");
        let replies = Arc::new(Mutex::new(Vec::new()));

        let seen = replies.clone();
        service.request_authentication(
            "Unlock vault",
            ReplyHandler::new(move |r| {
                if let Ok(mut v) = seen.lock() {
                    v.push(r);
                }
            }),
        );

        let replies = replies.lock().map(|v| v.clone()).unwrap_or_default();
        assert_eq!(replies, vec![PlatformReply::failure(None)]);
    }

    #[tokio::test]
    async fn test_request_spawn_failure() -> Result<()> {
        let service = HelperService::new("/nonexistent/ubiometric-helper");
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));

        service.request_authentication(
            "Unlock vault",
            ReplyHandler::new(move |r| {
                if let Some(tx) = tx.lock().ok().and_then(|mut t| t.take()) {
                    let _ = tx.send(r);
                }
            }),
        );

        assert_eq!(rx.await?, PlatformReply::failure(None));

        Ok(())
    }

    #[cfg(unix)]
    mod scripts {
        use std::{
            env, fs,
            os::unix::fs::PermissionsExt,
            path::PathBuf,
            process,
            sync::{
                Mutex,
                atomic::{AtomicUsize, Ordering},
            },
        };

        use anyhow::Result;
        use tokio::sync::oneshot;

        use super::super::*;

        static SCRIPT_ID: AtomicUsize = AtomicUsize::new(0);

        struct Script {
            path: PathBuf,
        }

        impl Script {
            fn new(probe: &str, kind: &str, authenticate: &str) -> Result<Self> {
                let id = SCRIPT_ID.fetch_add(1, Ordering::SeqCst);
                let path = env::temp_dir().join(format!("ubiometric-helper-{}-{id}", process::id()));

                let body = format!(
                    "#!/bin/sh\ncase \"$1\" in\n  probe) {probe} ;;\n  kind) {kind} ;;\n  authenticate) {authenticate} ;;\nesac\n"
                );

                fs::write(&path, body)?;
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;

                Ok(Self { path })
            }

            fn service(&self) -> HelperService {
                HelperService::new(&self.path)
            }
        }

        impl Drop for Script {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.path);
            }
        }

        async fn authenticate(service: &HelperService, reason: &str) -> Result<PlatformReply> {
            let (tx, rx) = oneshot::channel();
            let tx = Mutex::new(Some(tx));

            service.request_authentication(
                reason,
                ReplyHandler::new(move |r| {
                    if let Some(tx) = tx.lock().ok().and_then(|mut t| t.take()) {
                        let _ = tx.send(r);
                    }
                }),
            );

            Ok(rx.await?)
        }

        #[test]
        fn test_probe_available() -> Result<()> {
            let script = Script::new("echo 1", "echo 1", "echo 1")?;

            assert_eq!(script.service().probe_capability(), CapabilityProbe::available());

            Ok(())
        }

        #[test]
        fn test_probe_unavailable_with_code() -> Result<()> {
            let script = Script::new("echo -7; exit 1", "echo 0", "echo 1")?;

            assert_eq!(
                script.service().probe_capability(),
                CapabilityProbe::unavailable(Some(PlatformErrorCode::BIOMETRY_NOT_ENROLLED))
            );

            Ok(())
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn test_probe_on_worker_thread() -> Result<()> {
            let script = Script::new("echo 1", "echo 2", "echo 1")?;
            let service = script.service();

            assert!(service.probe_capability().available);
            assert_eq!(service.read_biometric_kind(), PlatformBiometryType::FACE_ID);

            Ok(())
        }

        #[test]
        fn test_kind() -> Result<()> {
            let cases = [
                ("echo 1", PlatformBiometryType::TOUCH_ID),
                ("echo 2", PlatformBiometryType::FACE_ID),
                ("echo face", PlatformBiometryType::NONE),
                ("echo 2; exit 1", PlatformBiometryType::NONE),
            ];

            for (kind, expected) in cases {
                let script = Script::new("echo 1", kind, "echo 1")?;
                assert_eq!(script.service().read_biometric_kind(), expected, "{kind}");
            }

            Ok(())
        }

        #[tokio::test]
        async fn test_authenticate_replies() -> Result<()> {
            let cases = [
                ("echo 1", PlatformReply::success()),
                ("echo -2", PlatformReply::failure(Some(PlatformErrorCode::USER_CANCEL))),
                ("true", PlatformReply::failure(None)),
                ("echo 1; exit 3", PlatformReply::failure(Some(PlatformErrorCode(1)))),
            ];

            for (authenticate_cmd, expected) in cases {
                let script = Script::new("echo 1", "echo 1", authenticate_cmd)?;
                let reply = authenticate(&script.service(), "Unlock vault").await?;
                assert_eq!(reply, expected, "{authenticate_cmd}");
            }

            Ok(())
        }

        #[tokio::test]
        async fn test_failed_exit_is_never_success() -> Result<()> {
            let script = Script::new("echo 1", "echo 2", "echo 1; exit 3")?;

            let reply = authenticate(&script.service(), "Unlock vault").await?;

            assert!(!reply.success);

            Ok(())
        }

        #[tokio::test]
        async fn test_reason_after_separator() -> Result<()> {
            let script = Script::new("echo 1", "echo 1", "[ \"$2\" = \"--\" ] && [ \"$3\" = \"-r\" ] && echo 1 || echo -1")?;

            let reply = authenticate(&script.service(), "-r").await?;

            assert_eq!(reply, PlatformReply::success());

            Ok(())
        }
    }
}
