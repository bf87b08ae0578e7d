//! In-memory collaborators for coordinator tests

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use livesync_core::prelude::*;
use livesync_core::{
    AttachRequest, BuildConfig, BuildFingerprint, DebugInformation, DeviceAppData,
    LiveSyncResultInfo, Platform, ProjectData,
};
use livesync_device::FileHashes;

use crate::descriptor::BuildAction;
use crate::services::{
    AnalyticsService, BuildService, DebugService, Disposable, PlatformLiveSyncService,
    PlatformProjectService, PlatformValidator,
};

// ─────────────────────────────────────────────────────────────────────────────
// Project service
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FakeProjectService {
    build_time: Option<String>,
    cleaned: Arc<Mutex<Vec<String>>>,
}

impl FakeProjectService {
    pub fn with_build_time(build_time: Option<&str>) -> Self {
        Self {
            build_time: build_time.map(str::to_string),
            cleaned: Arc::default(),
        }
    }

    /// Devices whose temp folder was cleaned, in order
    pub fn cleaned(&self) -> Vec<String> {
        self.cleaned.lock().unwrap().clone()
    }
}

impl PlatformProjectService for FakeProjectService {
    async fn clean_device_temp_folder(
        &self,
        device_identifier: &str,
        _project: &ProjectData,
    ) -> Result<()> {
        self.cleaned
            .lock()
            .unwrap()
            .push(device_identifier.to_string());
        Ok(())
    }

    fn latest_package(
        &self,
        platform: Platform,
        _build_config: &BuildConfig,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let dir = output_path.unwrap_or(Path::new("/builds"));
        Ok(dir.join(format!("app-{}.pkg", platform.as_key())))
    }

    fn local_build_info(
        &self,
        _platform: Platform,
        build_config: &BuildConfig,
        _output_path: Option<&Path>,
    ) -> Option<BuildFingerprint> {
        self.build_time.as_ref().map(|build_time| BuildFingerprint {
            build_time: build_time.clone(),
            build_for_device: build_config.build_for_device,
            release: build_config.release,
        })
    }

    fn local_file_hashes(&self, _platform: Platform, _project: &ProjectData) -> FileHashes {
        FileHashes::from([
            ("app/main.js".to_string(), "a1".to_string()),
            ("app/app.css".to_string(), "b2".to_string()),
        ])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analytics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FakeAnalytics {
    fail: bool,
    tracked: Arc<AtomicUsize>,
}

impl FakeAnalytics {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn tracked(&self) -> usize {
        self.tracked.load(Ordering::SeqCst)
    }
}

impl AnalyticsService for FakeAnalytics {
    async fn track_install(
        &self,
        _platform: Platform,
        _is_emulator: bool,
        _release: bool,
    ) -> Result<()> {
        self.tracked.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::device("analytics endpoint unreachable"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Platform live sync
// ─────────────────────────────────────────────────────────────────────────────

/// Scripted behavior of [`FakeSyncService`] for one device
#[derive(Debug, Clone, Default)]
pub struct SyncScript {
    pub should_restart: bool,
    /// `None` makes `try_refresh_application` fail
    pub refresh_succeeds: Option<bool>,
    /// Error returned by `should_restart`
    pub should_restart_error: Option<String>,
    /// Error returned by `restart_application`
    pub restart_error: Option<String>,
    /// Error returned by `full_sync`
    pub full_sync_error: Option<String>,
}

impl SyncScript {
    pub fn refreshes() -> Self {
        Self {
            refresh_succeeds: Some(true),
            ..Default::default()
        }
    }

    pub fn needs_restart() -> Self {
        Self {
            should_restart: true,
            refresh_succeeds: Some(true),
            ..Default::default()
        }
    }

    pub fn refresh_fails_softly() -> Self {
        Self {
            refresh_succeeds: Some(false),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            should_restart_error: Some(message.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct SyncCounters {
    should_restart: usize,
    try_refresh: usize,
    restart: usize,
    full_sync: usize,
    wait_for_debugger_seen: Vec<bool>,
}

/// Sync service whose answers are scripted per device identifier
#[derive(Debug, Clone, Default)]
pub struct FakeSyncService {
    scripts: Arc<HashMap<String, SyncScript>>,
    default_script: SyncScript,
    counters: Arc<Mutex<HashMap<String, SyncCounters>>>,
}

impl FakeSyncService {
    pub fn new(default_script: SyncScript) -> Self {
        Self {
            default_script,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device_identifier: &str, script: SyncScript) -> Self {
        Arc::make_mut(&mut self.scripts).insert(device_identifier.to_string(), script);
        self
    }

    fn script(&self, device_identifier: &str) -> &SyncScript {
        self.scripts
            .get(device_identifier)
            .unwrap_or(&self.default_script)
    }

    fn count(&self, device_identifier: &str, f: impl FnOnce(&mut SyncCounters)) {
        let mut counters = self.counters.lock().unwrap();
        f(counters.entry(device_identifier.to_string()).or_default());
    }

    pub fn should_restart_calls(&self, device_identifier: &str) -> usize {
        self.read(device_identifier, |c| c.should_restart)
    }

    pub fn try_refresh_calls(&self, device_identifier: &str) -> usize {
        self.read(device_identifier, |c| c.try_refresh)
    }

    pub fn restart_calls(&self, device_identifier: &str) -> usize {
        self.read(device_identifier, |c| c.restart)
    }

    pub fn full_sync_calls(&self, device_identifier: &str) -> usize {
        self.read(device_identifier, |c| c.full_sync)
    }

    /// `wait_for_debugger` values seen by `restart_application`
    pub fn wait_for_debugger_seen(&self, device_identifier: &str) -> Vec<bool> {
        self.counters
            .lock()
            .unwrap()
            .get(device_identifier)
            .map(|c| c.wait_for_debugger_seen.clone())
            .unwrap_or_default()
    }

    fn read(&self, device_identifier: &str, f: impl FnOnce(&SyncCounters) -> usize) -> usize {
        self.counters
            .lock()
            .unwrap()
            .get(device_identifier)
            .map(f)
            .unwrap_or(0)
    }
}

impl PlatformLiveSyncService for FakeSyncService {
    async fn should_restart(
        &self,
        _project: &ProjectData,
        info: &LiveSyncResultInfo,
    ) -> Result<bool> {
        let id = info.device_identifier();
        self.count(id, |c| c.should_restart += 1);
        let script = self.script(id);
        match &script.should_restart_error {
            Some(message) => Err(Error::refresh(message.clone())),
            None => Ok(script.should_restart),
        }
    }

    async fn try_refresh_application(
        &self,
        _project: &ProjectData,
        info: &LiveSyncResultInfo,
    ) -> Result<bool> {
        let id = info.device_identifier();
        self.count(id, |c| c.try_refresh += 1);
        self.script(id)
            .refresh_succeeds
            .ok_or_else(|| Error::refresh("refresh crashed"))
    }

    async fn restart_application(
        &self,
        _project: &ProjectData,
        info: &LiveSyncResultInfo,
    ) -> Result<()> {
        let id = info.device_identifier();
        self.count(id, |c| {
            c.restart += 1;
            c.wait_for_debugger_seen.push(info.wait_for_debugger);
        });
        match &self.script(id).restart_error {
            Some(message) => Err(Error::refresh(message.clone())),
            None => Ok(()),
        }
    }

    async fn full_sync(
        &self,
        _project: &ProjectData,
        app: &DeviceAppData,
    ) -> Result<LiveSyncResultInfo> {
        self.count(&app.device_identifier, |c| c.full_sync += 1);
        if let Some(message) = &self.script(&app.device_identifier).full_sync_error {
            return Err(Error::device(message.clone()));
        }
        Ok(LiveSyncResultInfo {
            device_app_data: app.clone(),
            modified_files_data: vec!["app/main.js".to_string(), "app/app.css".to_string()],
            is_full_sync: true,
            wait_for_debugger: false,
        })
    }
}

/// Sync result for a device, as the file watcher would deliver it
pub fn sync_result(device_identifier: &str, platform: Platform) -> LiveSyncResultInfo {
    LiveSyncResultInfo {
        device_app_data: DeviceAppData {
            device_identifier: device_identifier.to_string(),
            platform,
            app_identifier: "org.example.app".to_string(),
            project_dir: PathBuf::from("/work/app"),
        },
        modified_files_data: vec!["app/main.js".to_string()],
        is_full_sync: false,
        wait_for_debugger: false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Debug service
// ─────────────────────────────────────────────────────────────────────────────

/// Debug service answering from a queue of scripted results
#[derive(Debug, Clone, Default)]
pub struct FakeDebugService {
    responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    requests: Arc<Mutex<Vec<AttachRequest>>>,
    stopped: Arc<Mutex<Vec<String>>>,
}

impl FakeDebugService {
    /// Each entry answers one `debug` call: `Ok(url)` or `Err(message)`.
    /// Once the queue is empty every call succeeds with a default URL.
    pub fn scripted(responses: Vec<std::result::Result<&str, &str>>) -> Self {
        let responses = responses
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<AttachRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }
}

impl DebugService for FakeDebugService {
    async fn debug(&self, request: &AttachRequest) -> Result<DebugInformation> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("devtools://debug".to_string()));

        match response {
            Ok(url) => Ok(DebugInformation {
                url,
                device_identifier: request.device_identifier.clone(),
                port: Some(40000),
            }),
            Err(message) => Err(Error::debug(message)),
        }
    }

    async fn debug_stop(&self, device_identifier: &str) -> Result<()> {
        self.stopped
            .lock()
            .unwrap()
            .push(device_identifier.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Build, validation, lifetime
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FakeBuildService {
    builds: Arc<Mutex<Vec<BuildAction>>>,
}

impl FakeBuildService {
    pub fn builds(&self) -> Vec<BuildAction> {
        self.builds.lock().unwrap().clone()
    }
}

impl BuildService for FakeBuildService {
    async fn prepare_and_build(&self, action: &BuildAction) -> Result<PathBuf> {
        self.builds.lock().unwrap().push(action.clone());
        Ok(PathBuf::from(format!(
            "/builds/{}-{}.pkg",
            action.platform.as_key(),
            if action.build_config.build_for_device {
                "device"
            } else {
                "emulator"
            }
        )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeValidator {
    invalid: Option<Platform>,
    bundler_version: Option<String>,
    validated: Arc<Mutex<Vec<Platform>>>,
}

impl FakeValidator {
    pub fn rejecting(platform: Platform) -> Self {
        Self {
            invalid: Some(platform),
            ..Default::default()
        }
    }

    pub fn with_bundler_version(mut self, version: &str) -> Self {
        self.bundler_version = Some(version.to_string());
        self
    }

    pub fn validated(&self) -> Vec<Platform> {
        self.validated.lock().unwrap().clone()
    }
}

impl PlatformValidator for FakeValidator {
    async fn validate(&self, platform: Platform, _project: &ProjectData) -> Result<()> {
        self.validated.lock().unwrap().push(platform);
        if self.invalid == Some(platform) {
            return Err(Error::platform_validation(
                platform.to_string(),
                "SDK not found",
            ));
        }
        Ok(())
    }

    async fn bundler_version(&self, _project: &ProjectData) -> Result<Option<String>> {
        Ok(self.bundler_version.clone())
    }
}

/// Long-lived service recording the last disposal setting it received
#[derive(Debug, Default)]
pub struct FakeDisposable {
    configured: AtomicBool,
    should_dispose: AtomicBool,
}

impl FakeDisposable {
    /// `None` until `set_should_dispose` is called
    pub fn should_dispose(&self) -> Option<bool> {
        self.configured
            .load(Ordering::SeqCst)
            .then(|| self.should_dispose.load(Ordering::SeqCst))
    }
}

impl Disposable for FakeDisposable {
    fn set_should_dispose(&self, should_dispose: bool) {
        self.should_dispose.store(should_dispose, Ordering::SeqCst);
        self.configured.store(true, Ordering::SeqCst);
    }
}
