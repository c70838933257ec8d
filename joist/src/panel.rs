//! Presence and transition lifecycle of a togglable content panel.
//!
//! A panel reads "am I open" from its root and decides whether its subtree
//! is in the output at all, whether it is hidden, and when to ask the
//! [`AnimationDriver`] to play a transition. Driver calls cross an async
//! boundary: state changes are made synchronously and queued, and the host
//! flushes the queue with [`PanelLifecycle::sync_driver`] after each render,
//! once the panel's element exists.
//!
//! ```text
//!  Unmounted/MountedHidden --open--> Opening --driver done--> Open
//!           ^                           |  ^                   |
//!           |                      close|  |open             close
//!           |                           v  |                   |
//!           +------driver done------- Closing <----------------+
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use futures::future::join_all;
use serde::Serialize;

use crate::driver::{AnimationDriver, TransitionCallbacks, TransitionSink};
use crate::error::DriverError;
use crate::handle::ElementHandle;
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};

/// Unique identifier for a panel instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(usize);

impl PanelId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__panel_{}", self.0)
    }
}

/// Lifecycle phase of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelPhase {
    /// Not in the output.
    Unmounted,
    /// In the output but hidden.
    MountedHidden,
    /// Visible, open transition requested or playing.
    Opening,
    /// Visible and settled.
    Open,
    /// Visible, close transition requested or playing.
    Closing,
}

impl PanelPhase {
    /// Whether the panel counts as open (opening or open).
    pub fn is_open(self) -> bool {
        matches!(self, PanelPhase::Opening | PanelPhase::Open)
    }

    /// The transition in progress, if any.
    pub fn transition(self) -> Transition {
        match self {
            PanelPhase::Opening => Transition::Opening,
            PanelPhase::Closing => Transition::Closing,
            _ => Transition::Idle,
        }
    }
}

/// Transition in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    Idle,
    Opening,
    Closing,
}

/// Whether and how the panel appears in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Presence {
    /// Not rendered.
    Absent,
    /// Rendered but hidden.
    Hidden,
    /// Rendered and visible.
    Visible,
}

/// How a rendered-but-hidden panel is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HiddenMode {
    /// Plain `hidden`.
    Hidden,
    /// `hidden="until-found"`: the host can reveal it on find-in-page.
    UntilFound,
}

/// Per-panel configuration.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Keep the subtree in the output while closed.
    pub keep_mounted: bool,
    /// Keep the subtree in the output while closed, hidden until found.
    pub hidden_until_found: bool,
    /// Start in the open phase.
    pub initially_open: bool,
    /// Prefix for the CSS variables the driver writes.
    pub css_var_prefix: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            keep_mounted: false,
            hidden_until_found: false,
            initially_open: false,
            css_var_prefix: "panel".to_string(),
        }
    }
}

impl PanelConfig {
    /// Create a default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the panel in the output while closed.
    pub fn keep_mounted(mut self, keep: bool) -> Self {
        self.keep_mounted = keep;
        self
    }

    /// Hide the closed panel with `hidden="until-found"`.
    pub fn hidden_until_found(mut self, until_found: bool) -> Self {
        self.hidden_until_found = until_found;
        self
    }

    /// Start open.
    pub fn initially_open(mut self, open: bool) -> Self {
        self.initially_open = open;
        self
    }

    /// Set the CSS variable prefix passed to the driver.
    pub fn css_var_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.css_var_prefix = prefix.into();
        self
    }

    /// Whether a closed panel stays in the output.
    pub fn retains_when_closed(&self) -> bool {
        self.keep_mounted || self.hidden_until_found
    }

    fn resting_closed(&self) -> PanelPhase {
        if self.retains_when_closed() {
            PanelPhase::MountedHidden
        } else {
            PanelPhase::Unmounted
        }
    }
}

/// Read-only panel state for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
    pub phase: PanelPhase,
    pub presence: Presence,
    /// In the output at all.
    pub mounted: bool,
    /// Hidden attribute to render, if any.
    pub hidden: Option<HiddenMode>,
    pub transition: Transition,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverCommand {
    Open { immediate: bool },
    Close,
}

impl DriverCommand {
    /// Command that resumes the transition `phase` is waiting on.
    fn resuming(phase: PanelPhase) -> Option<Self> {
        match phase {
            PanelPhase::Opening => Some(DriverCommand::Open { immediate: false }),
            PanelPhase::Closing => Some(DriverCommand::Close),
            _ => None,
        }
    }
}

/// Commands sent to the driver in the current epoch and not yet answered.
///
/// The driver answers every command it accepted exactly once, so a
/// completion only belongs to the latest command of its direction when the
/// count drops to zero.
#[derive(Debug, Default, Clone, Copy)]
struct InFlight {
    opens: u32,
    closes: u32,
}

impl InFlight {
    fn slot(&mut self, opened: bool) -> &mut u32 {
        if opened { &mut self.opens } else { &mut self.closes }
    }

    fn issue(&mut self, command: DriverCommand) {
        *self.slot(matches!(command, DriverCommand::Open { .. })) += 1;
    }

    fn retract(&mut self, command: DriverCommand) {
        let slot = self.slot(matches!(command, DriverCommand::Open { .. }));
        *slot = slot.saturating_sub(1);
    }

    /// Record an answer; true when it answers the latest command.
    fn answer(&mut self, opened: bool) -> bool {
        let slot = self.slot(opened);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        *slot == 0
    }
}

/// A transition requested but not yet sent to the driver.
#[derive(Debug, Clone, Copy)]
struct Pending {
    command: DriverCommand,
    /// Phase to return to if the request is withdrawn before it is sent.
    from: PanelPhase,
}

#[derive(Debug)]
struct PanelState {
    phase: PanelPhase,
    /// Element the host rendered for this panel.
    handle: Option<ElementHandle>,
    /// Element the driver was initialized for.
    initialized: Option<ElementHandle>,
    /// Bumped on every initialization; callbacks from older epochs are stale.
    epoch: u64,
    in_flight: InFlight,
    /// Whether the panel was last settled open.
    visual_open: bool,
    pending: Option<Pending>,
    /// A reveal accepted by a controlled root: the next open skips the
    /// animation, any close request cancels it.
    deferred_reveal: bool,
    /// Elements whose driver resources must be released.
    disposals: Vec<ElementHandle>,
    disposed: bool,
}

#[derive(Debug)]
struct PanelShared {
    id: PanelId,
    config: PanelConfig,
    state: RwLock<PanelState>,
    dirty: AtomicBool,
    render: RenderHandle,
}

impl PanelShared {
    fn mark_changed(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        self.render.request();
    }

    fn complete(&self, epoch: u64, opened: bool) {
        let changed = {
            let Ok(mut state) = self.state.write() else {
                return;
            };
            if state.disposed || state.epoch != epoch {
                log::trace!("{}: stale completion from epoch {} ignored", self.id, epoch);
                return;
            }
            let expected = if opened {
                PanelPhase::Opening
            } else {
                PanelPhase::Closing
            };
            let latest = state.in_flight.answer(opened);
            // A pending request or a later command of the same direction
            // means this callback answers a superseded operation.
            if !latest || state.phase != expected || state.pending.is_some() {
                log::trace!(
                    "{}: {} completion ignored in {:?}",
                    self.id,
                    if opened { "open" } else { "close" },
                    state.phase
                );
                return;
            }
            if opened {
                state.phase = PanelPhase::Open;
                state.visual_open = true;
            } else {
                state.phase = self.config.resting_closed();
                state.visual_open = false;
                if state.phase == PanelPhase::Unmounted {
                    // The element leaves the output with this render.
                    if let Some(handle) = state.handle.take()
                        && state.initialized == Some(handle)
                    {
                        state.initialized = None;
                        state.disposals.push(handle);
                    }
                }
            }
            log::debug!("{}: transition finished, now {:?}", self.id, state.phase);
            true
        };
        if changed {
            self.mark_changed();
        }
    }

    /// Forget a command that was counted but never reached the driver.
    fn retract(&self, epoch: u64, command: DriverCommand) {
        if let Ok(mut state) = self.state.write()
            && state.epoch == epoch
        {
            state.in_flight.retract(command);
        }
    }
}

/// Callback target handed to the driver, bound to one initialization.
struct PanelCallbacks {
    shared: Weak<PanelShared>,
    epoch: u64,
}

impl TransitionCallbacks for PanelCallbacks {
    fn on_open_complete(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.complete(self.epoch, true);
        }
    }

    fn on_close_complete(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.complete(self.epoch, false);
        }
    }
}

/// Work collected under the lock and performed after it is released.
struct DriverWork {
    disposals: Vec<ElementHandle>,
    initialize: Option<(ElementHandle, TransitionSink, bool)>,
    command: Option<(ElementHandle, DriverCommand)>,
    epoch: u64,
}

/// Presence/transition state machine for one panel.
///
/// Cloning shares the panel.
#[derive(Clone)]
pub struct PanelLifecycle {
    shared: Arc<PanelShared>,
    driver: Arc<dyn AnimationDriver>,
}

impl PanelLifecycle {
    /// Create a panel. The initial phase is `Open` when configured initially
    /// open, otherwise `MountedHidden` when closed panels are retained, and
    /// `Unmounted` otherwise.
    pub fn new(config: PanelConfig, driver: Arc<dyn AnimationDriver>) -> Self {
        let phase = if config.initially_open {
            PanelPhase::Open
        } else {
            config.resting_closed()
        };
        let state = PanelState {
            phase,
            handle: None,
            initialized: None,
            epoch: 0,
            in_flight: InFlight::default(),
            visual_open: config.initially_open,
            pending: None,
            deferred_reveal: false,
            disposals: Vec::new(),
            disposed: false,
        };
        Self {
            shared: Arc::new(PanelShared {
                id: PanelId::new(),
                config,
                state: RwLock::new(state),
                dirty: AtomicBool::new(false),
                render: RenderHandle::new(SourceKind::Panel),
            }),
            driver,
        }
    }

    /// Get the unique ID for this panel
    pub fn id(&self) -> PanelId {
        self.shared.id
    }

    /// The panel's configuration.
    pub fn config(&self) -> &PanelConfig {
        &self.shared.config
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> PanelPhase {
        self.shared
            .state
            .read()
            .map(|state| state.phase)
            .unwrap_or(PanelPhase::Unmounted)
    }

    /// Whether and how the panel appears in the output.
    pub fn presence(&self) -> Presence {
        match self.phase() {
            PanelPhase::Unmounted => Presence::Absent,
            PanelPhase::MountedHidden => Presence::Hidden,
            PanelPhase::Opening | PanelPhase::Open | PanelPhase::Closing => Presence::Visible,
        }
    }

    /// Whether the panel subtree is in the output.
    pub fn is_mounted(&self) -> bool {
        self.presence() != Presence::Absent
    }

    /// Hidden attribute to render, if any.
    pub fn hidden_mode(&self) -> Option<HiddenMode> {
        match self.presence() {
            Presence::Hidden if self.shared.config.hidden_until_found => {
                Some(HiddenMode::UntilFound)
            }
            Presence::Hidden => Some(HiddenMode::Hidden),
            _ => None,
        }
    }

    /// Element currently attached.
    pub fn handle(&self) -> Option<ElementHandle> {
        self.shared.state.read().ok().and_then(|state| state.handle)
    }

    /// Whether a transition is waiting for the next driver sync.
    pub fn has_pending(&self) -> bool {
        self.shared
            .state
            .read()
            .map(|state| state.pending.is_some() || !state.disposals.is_empty())
            .unwrap_or(false)
    }

    /// Snapshot for the attribute layer.
    pub fn snapshot(&self) -> PanelSnapshot {
        let phase = self.phase();
        let presence = self.presence();
        PanelSnapshot {
            phase,
            presence,
            mounted: presence != Presence::Absent,
            hidden: self.hidden_mode(),
            transition: phase.transition(),
            open: phase.is_open(),
        }
    }

    // -------------------------------------------------------------------------
    // Input from the root
    // -------------------------------------------------------------------------

    /// Follow the root's derived open flag.
    ///
    /// Returns whether the phase changed. Asking for the state the panel is
    /// already in or heading to is a no-op.
    pub fn set_open(&self, open: bool) -> bool {
        self.request(open, false)
    }

    /// Open without animation, for a find-in-page reveal.
    pub fn reveal(&self) -> bool {
        self.request(true, true)
    }

    /// Make the next open skip the animation.
    ///
    /// For a reveal the root accepted but has not applied yet, as when the
    /// parent of a controlled root supplies the new value on its next
    /// render. Any close request before that open drops it.
    pub fn defer_reveal(&self) {
        if let Ok(mut state) = self.shared.state.write()
            && !state.disposed
            && !state.phase.is_open()
        {
            state.deferred_reveal = true;
        }
    }

    fn request(&self, open: bool, immediate: bool) -> bool {
        let changed = {
            let Ok(mut state) = self.shared.state.write() else {
                return false;
            };
            if state.disposed {
                return false;
            }
            let immediate = immediate || (open && state.deferred_reveal);
            state.deferred_reveal = false;
            let from = state.phase;
            match (open, from) {
                (true, PanelPhase::Opening | PanelPhase::Open)
                | (false, PanelPhase::Closing | PanelPhase::Unmounted | PanelPhase::MountedHidden) => {
                    return false;
                }
                _ => {}
            }
            match state.pending.take() {
                // The opposite request never reached the driver: withdraw it.
                Some(withdrawn) => {
                    state.phase = withdrawn.from;
                }
                None => {
                    let command = if open {
                        DriverCommand::Open { immediate }
                    } else {
                        DriverCommand::Close
                    };
                    state.pending = Some(Pending { command, from });
                    state.phase = if open {
                        PanelPhase::Opening
                    } else {
                        PanelPhase::Closing
                    };
                }
            }
            log::debug!("{}: {:?} -> {:?}", self.shared.id, from, state.phase);
            true
        };
        if changed {
            self.shared.mark_changed();
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Input from the host
    // -------------------------------------------------------------------------

    /// Record the element rendered for this panel.
    ///
    /// Replacing a different, initialized element schedules its disposal.
    pub fn attach(&self, handle: ElementHandle) {
        let Ok(mut state) = self.shared.state.write() else {
            return;
        };
        if state.handle == Some(handle) {
            return;
        }
        Self::release_handle(&mut state);
        state.handle = Some(handle);
        log::debug!("{}: attached {}", self.shared.id, handle);
    }

    /// Forget the element after the host removed it.
    pub fn detach(&self) {
        if let Ok(mut state) = self.shared.state.write() {
            Self::release_handle(&mut state);
        }
    }

    fn release_handle(state: &mut PanelState) {
        if let Some(old) = state.handle.take()
            && state.initialized == Some(old)
        {
            state.initialized = None;
            state.disposals.push(old);
        }
    }

    /// Send queued work to the driver.
    ///
    /// Call after each render pass. Initializes the driver for a newly
    /// attached element, then issues the pending transition. An element
    /// attached mid-transition is sent that transition again. Disconnection
    /// and cancellation are swallowed here; the panel stays in its current
    /// phase. Any other driver error is returned.
    pub async fn sync_driver(&self) -> Result<(), DriverError> {
        let work = self.take_work();
        let epoch = work.epoch;
        let command = work.command;

        let result = self.run_work(work).await;
        if !matches!(result, Ok(true))
            && let Some((_, command)) = command
        {
            self.shared.retract(epoch, command);
        }
        result.map(|_| ())
    }

    /// Returns whether the transition command, if any, reached the driver.
    async fn run_work(&self, work: DriverWork) -> Result<bool, DriverError> {
        for handle in work.disposals {
            if !self.guarded("dispose", self.driver.dispose(handle).await)? {
                return Ok(false);
            }
        }
        if let Some((handle, sink, initially_open)) = work.initialize {
            log::debug!("{}: initializing driver for {}", self.shared.id, handle);
            let prefix = self.shared.config.css_var_prefix.as_str();
            let result = self
                .driver
                .initialize(handle, sink, initially_open, prefix)
                .await;
            if !self.guarded("initialize", result)? {
                return Ok(false);
            }
        }
        let Some((handle, command)) = work.command else {
            return Ok(true);
        };
        log::debug!("{}: issuing {:?} for {}", self.shared.id, command, handle);
        let result = match command {
            DriverCommand::Open { immediate } => self.driver.open(handle, immediate).await,
            DriverCommand::Close => self.driver.close(handle).await,
        };
        self.guarded("transition", result)
    }

    fn take_work(&self) -> DriverWork {
        let mut work = DriverWork {
            disposals: Vec::new(),
            initialize: None,
            command: None,
            epoch: 0,
        };
        let Ok(mut state) = self.shared.state.write() else {
            return work;
        };
        work.disposals = std::mem::take(&mut state.disposals);
        if state.disposed {
            return work;
        }
        let Some(handle) = state.handle else {
            return work;
        };
        let mut resume = None;
        if state.initialized != Some(handle) {
            state.epoch += 1;
            state.in_flight = InFlight::default();
            state.initialized = Some(handle);
            let sink = TransitionSink::new(Arc::new(PanelCallbacks {
                shared: Arc::downgrade(&self.shared),
                epoch: state.epoch,
            }));
            work.initialize = Some((handle, sink, state.visual_open));
            // The transition under way was sent to the previous element.
            resume = DriverCommand::resuming(state.phase);
        }
        work.epoch = state.epoch;
        if let Some(command) = state.pending.take().map(|pending| pending.command).or(resume) {
            state.in_flight.issue(command);
            work.command = Some((handle, command));
        }
        work
    }

    /// Returns `Ok(true)` to continue, `Ok(false)` after a swallowed
    /// interop failure.
    fn guarded(&self, op: &str, result: Result<(), DriverError>) -> Result<bool, DriverError> {
        match result {
            Ok(()) => Ok(true),
            Err(err) if err.is_interop() => {
                log::debug!("{}: driver {} dropped: {}", self.shared.id, op, err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Tear down the panel, releasing driver resources.
    ///
    /// After this every request is ignored and late callbacks are dropped.
    pub async fn dispose(&self) -> Result<(), DriverError> {
        let handles = {
            let Ok(mut state) = self.shared.state.write() else {
                return Ok(());
            };
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            state.pending = None;
            Self::release_handle(&mut state);
            std::mem::take(&mut state.disposals)
        };
        log::debug!("{}: disposed", self.shared.id);
        for handle in handles {
            if !self.guarded("dispose", self.driver.dispose(handle).await)? {
                break;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Install the render sender used after phase changes.
    pub fn install_render(&self, sender: RenderSender) {
        self.shared.render.install(sender);
    }

    /// Source reported in render passes after phase changes.
    pub fn render_source(&self) -> RenderSource {
        self.shared.render.source()
    }

    /// Check if the phase changed since the last check.
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.shared.dirty.store(false, Ordering::SeqCst);
    }
}

/// Flush every panel's queued driver work concurrently.
///
/// All panels are synced even when one fails; the first non-interop error
/// is returned.
pub async fn sync_all<'a>(
    panels: impl IntoIterator<Item = &'a PanelLifecycle>,
) -> Result<(), DriverError> {
    let results = join_all(panels.into_iter().map(|panel| panel.sync_driver())).await;
    results.into_iter().collect()
}

impl std::fmt::Debug for PanelLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelLifecycle")
            .field("id", &self.shared.id)
            .field("phase", &self.phase())
            .finish()
    }
}
