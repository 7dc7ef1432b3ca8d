//! Application context and event loop
//!
//! [`App`] owns every piece of mutable state: configuration, focus, hotkey
//! bindings, the auto-minimize coordinator and the entry store. It is built
//! once, started once by [`App::run`], and then drains a single event queue
//! until shutdown. Spawned work (timers, refreshes, probes) never touches this
//! state; it reports back through the queue.
//!
//! # Module Structure
//!
//! - `startup` - `StartupPhase` and its forward-only transitions
//! - `refresh` - The price database refresh cycle and its entry
//! - `updates` - Entries for update-available / update-downloaded signals

mod refresh;
mod startup;
mod updates;


pub use refresh::{
    BODY_FAILED, INDICATOR_ID, RefreshCycle, SUCCESS_AUTO_CLOSE, TITLE_FAILED, TITLE_SUCCESS,
    TITLE_UPDATING,
};
pub use startup::StartupPhase;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::auto_minimize::AutoMinimize;
use crate::entries::{EntryAction, EntryId, EntryStore, Icon, NewEntry};
use crate::error::{HotkeyError, PortError, StartupError};
use crate::events::{AppEvent, EventSender, HostCommand, HostEvent, HostSender};
use crate::focus::FocusTracker;
use crate::hotkeys::{
    self, HotkeyAction, HotkeyId, HotkeyRegistry, KeyCombo, PriceCheckOutcome,
};
use crate::ports::{Ports, PriceQuote, RefreshParams, TemplateSet};
use pricelens_types::AppConfig;
use pricelens_types::formatting::{format_chaos, format_divine};

/// Package the overlay needs to focus the game window on Linux
pub const DEPENDENCY_PACKAGE: &str = "wmctrl";

pub struct App {
    config: AppConfig,
    ports: Ports,
    phase: StartupPhase,
    templates: Option<TemplateSet>,

    focus: FocusTracker,
    hotkeys: HotkeyRegistry,
    auto_minimize: AutoMinimize,
    entries: EntryStore,
    refresh: RefreshCycle,

    host: HostSender,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    check_dependencies: bool,
}

impl App {
    pub fn new(config: AppConfig, ports: Ports, host: HostSender) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let entries = EntryStore::new(events_tx.clone(), host.clone());
        Self {
            config,
            ports,
            phase: StartupPhase::Loading,
            templates: None,
            focus: FocusTracker::default(),
            hotkeys: HotkeyRegistry::new(),
            auto_minimize: AutoMinimize::new(),
            entries,
            refresh: RefreshCycle::new(),
            host,
            events_tx,
            events_rx,
            check_dependencies: cfg!(target_os = "linux"),
        }
    }

    /// Override whether the startup dependency check runs. Defaults to Linux
    /// only.
    pub fn with_dependency_check(mut self, enabled: bool) -> Self {
        self.check_dependencies = enabled;
        self
    }

    /// Handle for feeding host events into the queue
    pub fn event_sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> StartupPhase {
        self.phase
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn templates(&self) -> Option<&TemplateSet> {
        self.templates.as_ref()
    }

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    pub fn hotkeys(&self) -> &HotkeyRegistry {
        &self.hotkeys
    }

    pub fn auto_minimize(&self) -> &AutoMinimize {
        &self.auto_minimize
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_running()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Startup
    // ─────────────────────────────────────────────────────────────────────────

    /// Start the app and process events until shutdown.
    ///
    /// Returns an error only when startup failed; the host has then already
    /// been told to show the error and close its windows.
    pub async fn run(mut self) -> Result<(), StartupError> {
        self.start().await?;
        self.run_event_loop().await;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), StartupError> {
        info!("Loading templates");
        let templates = match self.ports.templates.load().await {
            Ok(templates) => templates,
            Err(e) => {
                self.fail(&e);
                return Err(StartupError::Templates(e));
            }
        };
        info!(count = templates.names.len(), root = %templates.root.display(), "Templates loaded");

        self.phase.advance(StartupPhase::Initializing)?;
        self.initialize(templates);
        self.phase.advance(StartupPhase::Ready)?;
        info!("Startup complete");

        // Neither blocks readiness nor waits for the other
        self.spawn_dependency_check();
        self.request_refresh();
        Ok(())
    }

    fn initialize(&mut self, templates: TemplateSet) {
        self.host.send(HostCommand::InitializeGui {
            template_root: templates.root.display().to_string(),
            templates: templates.names.clone(),
        });
        self.templates = Some(templates);

        self.auto_minimize.spawn_initialize(
            Arc::clone(&self.ports.window),
            self.config.auto_minimize,
            &self.events_tx,
        );

        let combo = self.config.hotkeys.price_check.clone();
        self.bind_hotkey(HotkeyAction::PriceCheck, &combo);
        self.host.send(HostCommand::StartKeyHook);
    }

    /// The one fatal path: tell the user, close everything
    fn fail(&mut self, e: &PortError) {
        error!(error = %e, "Error initializing app");
        self.host.send(HostCommand::Alert {
            message: format!("Error initializing app\n{e}"),
        });
        self.host.send(HostCommand::CloseAllWindows);
        if let Err(e) = self.phase.advance(StartupPhase::Failed) {
            warn!(error = %e, "Unexpected phase on startup failure");
        }
    }

    fn spawn_dependency_check(&self) {
        if !self.check_dependencies {
            return;
        }
        let probe = Arc::clone(&self.ports.packages);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = probe.is_installed(DEPENDENCY_PACKAGE).await;
            let _ = events.send(AppEvent::DependencyChecked {
                package: DEPENDENCY_PACKAGE.to_string(),
                result,
            });
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Loop
    // ─────────────────────────────────────────────────────────────────────────

    async fn run_event_loop(&mut self) {
        while let Some(event) = self.events_rx.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        info!("Event loop stopped");
    }

    fn handle_event(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Host(event) => return self.handle_host_event(event),
            AppEvent::SettleElapsed { action } => self.on_settle_elapsed(action),
            AppEvent::AutoCloseElapsed { id, generation } => {
                self.entries.on_auto_close_elapsed(id, generation);
            }
            AppEvent::RefreshFinished { entry, result } => {
                self.refresh.finish(entry, result, &mut self.entries, &self.host);
            }
            AppEvent::DependencyChecked { package, result } => {
                self.on_dependency_checked(&package, result);
            }
            AppEvent::AutoMinimizeReady(result) => {
                let focused = self.focus.focused();
                if let Some(command) = self.auto_minimize.on_initialized(result, focused) {
                    self.host.send(command);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_host_event(&mut self, event: HostEvent) -> ControlFlow<()> {
        match event {
            HostEvent::FocusChanged { focused } => {
                if let Some(focused) = self.focus.on_focus_changed(focused)
                    && let Some(command) = self.auto_minimize.on_focus_transition(focused)
                {
                    self.host.send(command);
                }
            }
            HostEvent::KeyPressed { combo } => self.on_key_pressed(&combo),
            HostEvent::UpdateAvailable(info) => {
                info!(version = %info.version, "Update available");
                self.entries.add(updates::available_entry(&info));
            }
            HostEvent::UpdateDownloaded(info) => {
                info!(version = %info.version, "Update downloaded");
                self.entries.add(updates::downloaded_entry(&info));
            }
            HostEvent::EntryClose { id } => {
                self.entries.request_close(id);
            }
            HostEvent::EntryAction { id, action } => self.on_entry_action(id, action),
            HostEvent::RefreshRequested => {
                self.request_refresh();
            }
            HostEvent::ConfigChanged { config } => self.apply_config(config),
            HostEvent::Shutdown => {
                info!("Shutdown requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hotkeys
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `combo` for `action` and tell the host. An unusable combination
    /// becomes a warning entry.
    fn bind_hotkey(&mut self, action: HotkeyAction, combo: &str) -> Option<HotkeyId> {
        let result = combo.parse::<KeyCombo>().and_then(|combo| {
            let id = self.hotkeys.register(combo.clone(), action)?;
            Ok::<_, HotkeyError>((id, combo))
        });

        match result {
            Ok((id, combo)) => {
                info!(%combo, ?action, "Hotkey registered");
                self.host.send(HostCommand::RegisterHotkey { id, combo });
                Some(id)
            }
            Err(e) => {
                warn!(combo, error = %e, "Could not register hotkey");
                self.entries.add(
                    NewEntry::text("Invalid hotkey")
                        .body(format!("\"{combo}\" could not be registered: {e}"))
                        .icon(Icon::Warning),
                );
                None
            }
        }
    }

    fn rebind_hotkey(&mut self, action: HotkeyAction, combo: &str) {
        if let Some(id) = self.hotkeys.binding_for(action).map(|b| b.id) {
            self.hotkeys.unregister(id);
            self.host.send(HostCommand::UnregisterHotkey { id });
        }
        self.bind_hotkey(action, combo);
    }

    fn on_key_pressed(&mut self, combo: &KeyCombo) {
        let Some(action) = self.hotkeys.find(combo).map(|b| b.action) else {
            trace!(%combo, "Unbound key combination");
            return;
        };
        hotkeys::trigger(action, &self.config, &self.focus, &self.events_tx);
    }

    fn on_settle_elapsed(&mut self, action: HotkeyAction) {
        match action {
            HotkeyAction::PriceCheck => {
                let outcome =
                    hotkeys::run_price_check(self.ports.clipboard.as_ref(), self.ports.lookup.as_ref());
                self.on_price_check(outcome);
            }
        }
    }

    fn on_price_check(&mut self, outcome: PriceCheckOutcome) {
        match outcome {
            PriceCheckOutcome::Priced(quote) => self.show_price(quote),
            PriceCheckOutcome::NotAnItem => debug!("Clipboard does not hold a known item"),
            PriceCheckOutcome::ClipboardFailed(e) => {
                warn!(error = %e, "Failed reading the clipboard");
                self.entries.add(
                    NewEntry::text("Reading the clipboard failed")
                        .body("Please check the log file for more information.")
                        .icon(Icon::Warning)
                        .action(EntryAction::OpenLogFile),
                );
            }
            PriceCheckOutcome::LookupFailed(e) => {
                warn!(error = %e, "Price check failed");
                self.entries.add(
                    NewEntry::text("Price check failed")
                        .body("Please check the log file for more information.")
                        .icon(Icon::Warning)
                        .action(EntryAction::OpenLogFile),
                );
            }
        }
    }

    fn show_price(&mut self, quote: PriceQuote) {
        let settings = &self.config.price_check;
        if quote.chaos_value < settings.min_chaos_value {
            debug!(item = %quote.item_name, value = quote.chaos_value, "Below minimum value, not shown");
            return;
        }

        let mut entry = NewEntry::price(quote.clone()).body(price_body(&quote, settings.european_numbers));
        if let Some(secs) = settings.auto_close_secs.filter(|&secs| secs > 0) {
            entry = entry.auto_close(Duration::from_secs(secs));
        }
        debug!(item = %quote.item_name, value = quote.chaos_value, "Price check result");
        self.entries.add(entry);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entries, Refresh, Settings
    // ─────────────────────────────────────────────────────────────────────────

    fn on_entry_action(&mut self, id: EntryId, action: EntryAction) {
        let attached = self
            .entries
            .get(id)
            .is_some_and(|entry| entry.actions.contains(&action));
        if !attached {
            debug!(%id, ?action, "Action not attached to a live entry, ignored");
            return;
        }

        let command = match action {
            EntryAction::OpenLogFile => HostCommand::OpenLogFile,
            EntryAction::OpenUrl { url } => HostCommand::OpenUrl { url },
            EntryAction::InstallUpdate => HostCommand::InstallUpdate,
        };
        self.host.send(command);
    }

    /// Start a refresh cycle for the configured league unless one is running
    fn request_refresh(&mut self) -> Option<EntryId> {
        let params = RefreshParams {
            league: self.config.league.clone(),
        };
        self.refresh.start(
            &self.ports.prices,
            params,
            &mut self.entries,
            &self.host,
            &self.events_tx,
        )
    }

    fn on_dependency_checked(&mut self, package: &str, result: Result<bool, PortError>) {
        match result {
            Ok(true) => debug!(package, "Dependency present"),
            Ok(false) => {
                warn!(package, "Missing dependency");
                self.entries.add(
                    NewEntry::text("Missing dependency")
                        .body(format!(
                            "This tool uses {package} to focus the Path of Exile window. \
                             It is recommended to install it for an optimal experience."
                        ))
                        .icon(Icon::Warning),
                );
            }
            Err(e) => warn!(package, error = %e, "Could not check dependency"),
        }
    }

    fn apply_config(&mut self, config: AppConfig) {
        let previous = std::mem::replace(&mut self.config, config);
        info!("Settings changed");

        if previous.hotkeys.price_check != self.config.hotkeys.price_check {
            let combo = self.config.hotkeys.price_check.clone();
            self.rebind_hotkey(HotkeyAction::PriceCheck, &combo);
        }
        if previous.league != self.config.league {
            info!(from = %previous.league, to = %self.config.league, "League changed");
            self.request_refresh();
        }
        if previous.auto_minimize != self.config.auto_minimize {
            info!("Auto-minimize change takes effect after restart");
        }
    }
}

/// Price line shown under the item name, e.g. `187c / 1.2div (34 listings)`
fn price_body(quote: &PriceQuote, european: bool) -> String {
    let mut body = format_chaos(quote.chaos_value, european);
    if let Some(rate) = quote.divine_rate
        && quote.chaos_value >= rate
        && let Some(divine) = format_divine(quote.chaos_value, rate, european)
    {
        body.push_str(" / ");
        body.push_str(&divine);
    }
    if let Some(listings) = quote.listings {
        body.push_str(&format!(" ({listings} listings)"));
    }
    body
}
