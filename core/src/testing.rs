//! Fake collaborators and helpers shared by the unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::error::PortError;
use crate::events::{AppEvent, HostCommand, HostSender};
use crate::ports::{
    Clipboard, PackageProbe, Ports, PriceDatabase, PriceLookup, PriceQuote, RefreshParams,
    RefreshSummary, TemplateLoader, TemplateSet, WindowWatcher,
};

/// Collect every host command sent so far
pub fn drain_host(rx: &mut mpsc::UnboundedReceiver<HostCommand>) -> Vec<HostCommand> {
    let mut commands = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        commands.push(cmd);
    }
    commands
}

/// Collect every queued app event
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let spawned tasks run without moving the paused clock
pub async fn yield_many() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn host_channel() -> (HostSender, mpsc::UnboundedReceiver<HostCommand>) {
    HostSender::channel()
}

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakeClipboard {
    result: Result<String, PortError>,
    reads: Mutex<Vec<Instant>>,
}

impl FakeClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            result: Err(error),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Instants at which the clipboard was read
    pub fn reads(&self) -> Vec<Instant> {
        self.reads.lock().unwrap().clone()
    }
}

impl Clipboard for FakeClipboard {
    fn read_text(&self) -> Result<String, PortError> {
        self.reads.lock().unwrap().push(Instant::now());
        self.result.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Price Lookup
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakeLookup {
    result: Result<Option<PriceQuote>, PortError>,
    calls: AtomicUsize,
}

impl FakeLookup {
    pub fn returning(result: Result<Option<PriceQuote>, PortError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceLookup for FakeLookup {
    fn process(&self, _text: &str) -> Result<Option<PriceQuote>, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Price Database
// ─────────────────────────────────────────────────────────────────────────────

/// Price database whose refreshes complete only when the test says so
#[derive(Default)]
pub struct FakePriceDatabase {
    updating: AtomicBool,
    calls: Mutex<Vec<RefreshParams>>,
    pending: Mutex<Vec<oneshot::Sender<Result<RefreshSummary, PortError>>>>,
}

impl FakePriceDatabase {
    pub fn calls(&self) -> Vec<RefreshParams> {
        self.calls.lock().unwrap().clone()
    }

    /// Pretend a refresh started elsewhere is running
    pub fn set_updating(&self, updating: bool) {
        self.updating.store(updating, Ordering::SeqCst);
    }

    /// Complete the oldest pending refresh
    pub fn complete(&self, result: Result<RefreshSummary, PortError>) {
        let mut pending = self.pending.lock().unwrap();
        assert!(!pending.is_empty(), "no refresh in flight");
        let tx = pending.remove(0);
        let _ = tx.send(result);
    }
}

#[async_trait]
impl PriceDatabase for FakePriceDatabase {
    fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }

    async fn refresh(&self, params: RefreshParams) -> Result<RefreshSummary, PortError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(params);
        self.pending.lock().unwrap().push(tx);
        self.updating.store(true, Ordering::SeqCst);
        let result = rx
            .await
            .unwrap_or_else(|_| Err(PortError::Other("refresh dropped".into())));
        self.updating.store(false, Ordering::SeqCst);
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup Collaborators
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakeTemplates {
    result: Result<TemplateSet, PortError>,
    loads: AtomicUsize,
}

impl FakeTemplates {
    pub fn ok() -> Self {
        Self {
            result: Ok(TemplateSet {
                root: "templates".into(),
                names: vec!["text-entry".to_string(), "price-entry".to_string()],
            }),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            result: Err(error),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TemplateLoader for FakeTemplates {
    async fn load(&self) -> Result<TemplateSet, PortError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakePackages {
    result: Result<bool, PortError>,
    queries: Mutex<Vec<String>>,
}

impl FakePackages {
    pub fn returning(result: Result<bool, PortError>) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageProbe for FakePackages {
    async fn is_installed(&self, package: &str) -> Result<bool, PortError> {
        self.queries.lock().unwrap().push(package.to_string());
        self.result.clone()
    }
}

/// Window watcher whose setup resolves when the test says so
#[derive(Default)]
pub struct FakeWindowWatcher {
    pending: Mutex<Option<oneshot::Sender<Result<(), PortError>>>>,
}

impl FakeWindowWatcher {
    pub fn resolve(&self, result: Result<(), PortError>) {
        let tx = self.pending.lock().unwrap().take();
        let tx = tx.expect("window watcher setup not started");
        let _ = tx.send(result);
    }
}

#[async_trait]
impl WindowWatcher for FakeWindowWatcher {
    async fn initialize(&self) -> Result<(), PortError> {
        let (tx, rx) = oneshot::channel();
        *self.pending.lock().unwrap() = Some(tx);
        rx.await
            .unwrap_or_else(|_| Err(PortError::Other("setup dropped".into())))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bundle
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete handles to every fake, next to the `Ports` built from them
pub struct Fakes {
    pub templates: Arc<FakeTemplates>,
    pub prices: Arc<FakePriceDatabase>,
    pub lookup: Arc<FakeLookup>,
    pub clipboard: Arc<FakeClipboard>,
    pub packages: Arc<FakePackages>,
    pub window: Arc<FakeWindowWatcher>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            templates: Arc::new(FakeTemplates::ok()),
            prices: Arc::new(FakePriceDatabase::default()),
            lookup: Arc::new(FakeLookup::returning(Ok(None))),
            clipboard: Arc::new(FakeClipboard::with_text("")),
            packages: Arc::new(FakePackages::returning(Ok(true))),
            window: Arc::new(FakeWindowWatcher::default()),
        }
    }

    pub fn ports(&self) -> Ports {
        Ports {
            templates: self.templates.clone(),
            prices: self.prices.clone(),
            lookup: self.lookup.clone(),
            clipboard: self.clipboard.clone(),
            packages: self.packages.clone(),
            window: self.window.clone(),
        }
    }
}
