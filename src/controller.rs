use anyhow::Result;
use winit::dpi::PhysicalSize;

pub const LABEL_ACTIVE: &str = "3D On";
pub const LABEL_INACTIVE: &str = "3D Mode";

/// Lifecycle states of the backdrop. `Loading` covers the window between a
/// requested start and its commit, so a stop issued mid-load can cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Off,
    Loading,
    On,
}

impl SessionState {
    /// The label is active exactly while the backdrop is on; a start still
    /// in flight keeps showing the inactive label until it commits.
    pub fn label(self) -> &'static str {
        match self {
            SessionState::On => LABEL_ACTIVE,
            SessionState::Off | SessionState::Loading => LABEL_INACTIVE,
        }
    }
}

/// Anything that mirrors the current state back to the user, like a window
/// title or a button caption.
pub trait ToggleAffordance {
    fn set_label(&mut self, label: &str);
}

/// A live backdrop as the controller sees it. The concrete session carries
/// the GPU surface and scene; tests substitute lightweight fakes.
pub trait BackdropSession {
    fn advance_frame(&mut self);
    fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64);
    fn stop(self: Box<Self>);
}

/// Builds sessions on demand. Failure leaves the controller off.
pub trait SessionDriver {
    fn start(&mut self) -> Result<Box<dyn BackdropSession>>;
}

/// Proof that a particular start attempt is still the current one. A stop
/// issued while the driver works bumps the epoch, and the stale ticket's
/// commit then discards the freshly built session.
#[derive(Debug)]
pub struct StartTicket {
    epoch: u64,
}

pub struct LifecycleController {
    state: SessionState,
    session: Option<Box<dyn BackdropSession>>,
    epoch: u64,
    affordances: Vec<Box<dyn ToggleAffordance>>,
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleController {
    pub fn new() -> Self {
        Self { state: SessionState::Off, session: None, epoch: 0, affordances: Vec::new() }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn register_affordance(&mut self, mut affordance: Box<dyn ToggleAffordance>) {
        affordance.set_label(self.state.label());
        self.affordances.push(affordance);
    }

    /// Begins a start attempt. Returns a ticket only from `Off`; a start
    /// requested while loading or already on is a no-op.
    pub fn begin_start(&mut self) -> Option<StartTicket> {
        if self.state != SessionState::Off {
            return None;
        }
        self.epoch += 1;
        self.state = SessionState::Loading;
        self.push_labels();
        Some(StartTicket { epoch: self.epoch })
    }

    /// Installs a built session if its ticket is still current. A stale
    /// ticket means a stop arrived mid-load; the session is torn down
    /// immediately and never shown.
    pub fn commit_start(&mut self, ticket: StartTicket, session: Box<dyn BackdropSession>) -> bool {
        if self.state != SessionState::Loading || ticket.epoch != self.epoch {
            session.stop();
            return false;
        }
        self.session = Some(session);
        self.state = SessionState::On;
        self.push_labels();
        true
    }

    /// Abandons a start attempt after the driver failed.
    pub fn abort_start(&mut self, ticket: StartTicket) {
        if self.state == SessionState::Loading && ticket.epoch == self.epoch {
            self.state = SessionState::Off;
            self.push_labels();
        }
    }

    /// Stops whatever is running. Off is a no-op, a load in flight is
    /// invalidated via the epoch, and a live session is torn down.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::Off => {}
            SessionState::Loading => {
                self.epoch += 1;
                self.state = SessionState::Off;
                self.push_labels();
            }
            SessionState::On => {
                if let Some(session) = self.session.take() {
                    session.stop();
                }
                self.state = SessionState::Off;
                self.push_labels();
            }
        }
    }

    /// The user-facing toggle. On or loading flips to off; off starts a
    /// session through the driver, synchronously.
    pub fn toggle(&mut self, driver: &mut dyn SessionDriver) {
        match self.state {
            SessionState::On | SessionState::Loading => self.stop(),
            SessionState::Off => {
                let Some(ticket) = self.begin_start() else { return };
                match driver.start() {
                    Ok(session) => {
                        self.commit_start(ticket, session);
                    }
                    Err(err) => {
                        log::warn!("backdrop failed to start: {err:#}");
                        self.abort_start(ticket);
                    }
                }
            }
        }
    }

    pub fn advance_frame(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.advance_frame();
        }
    }

    /// Resizes are forwarded only while a session exists; there is nothing
    /// to keep in sync when the backdrop is off.
    pub fn handle_resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        if let Some(session) = self.session.as_mut() {
            session.resize(physical, scale_factor);
        }
    }

    fn push_labels(&mut self) {
        let label = self.state.label();
        for affordance in &mut self.affordances {
            affordance.set_label(label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        frames: usize,
        resizes: Vec<PhysicalSize<u32>>,
        stopped: bool,
    }

    struct FakeSession {
        probe: Rc<RefCell<Probe>>,
    }

    impl BackdropSession for FakeSession {
        fn advance_frame(&mut self) {
            self.probe.borrow_mut().frames += 1;
        }

        fn resize(&mut self, physical: PhysicalSize<u32>, _scale_factor: f64) {
            self.probe.borrow_mut().resizes.push(physical);
        }

        fn stop(self: Box<Self>) {
            self.probe.borrow_mut().stopped = true;
        }
    }

    struct FakeDriver {
        probes: Vec<Rc<RefCell<Probe>>>,
        starts: usize,
    }

    impl FakeDriver {
        fn new() -> Self {
            Self { probes: Vec::new(), starts: 0 }
        }

        fn probe(&self, index: usize) -> Rc<RefCell<Probe>> {
            self.probes[index].clone()
        }
    }

    impl SessionDriver for FakeDriver {
        fn start(&mut self) -> Result<Box<dyn BackdropSession>> {
            self.starts += 1;
            let probe = Rc::new(RefCell::new(Probe::default()));
            self.probes.push(probe.clone());
            Ok(Box::new(FakeSession { probe }))
        }
    }

    struct FailingDriver;

    impl SessionDriver for FailingDriver {
        fn start(&mut self) -> Result<Box<dyn BackdropSession>> {
            Err(anyhow::anyhow!("no adapter"))
        }
    }

    struct LabelLog(Rc<RefCell<Vec<String>>>);

    impl ToggleAffordance for LabelLog {
        fn set_label(&mut self, label: &str) {
            self.0.borrow_mut().push(label.to_string());
        }
    }

    #[test]
    fn toggle_alternates_between_on_and_off() {
        let mut controller = LifecycleController::new();
        let mut driver = FakeDriver::new();

        controller.toggle(&mut driver);
        assert_eq!(controller.state(), SessionState::On);
        controller.toggle(&mut driver);
        assert_eq!(controller.state(), SessionState::Off);
        assert!(driver.probe(0).borrow().stopped);

        controller.toggle(&mut driver);
        assert_eq!(controller.state(), SessionState::On);
        assert_eq!(driver.starts, 2);
        assert!(!driver.probe(1).borrow().stopped);
    }

    #[test]
    fn stop_when_off_does_nothing() {
        let mut controller = LifecycleController::new();
        controller.stop();
        assert_eq!(controller.state(), SessionState::Off);
    }

    #[test]
    fn begin_start_refused_while_on() {
        let mut controller = LifecycleController::new();
        let mut driver = FakeDriver::new();
        controller.toggle(&mut driver);
        assert!(controller.begin_start().is_none());
        assert_eq!(controller.state(), SessionState::On);
        assert_eq!(driver.starts, 1);
    }

    #[test]
    fn stop_during_load_discards_the_late_session() {
        let mut controller = LifecycleController::new();
        let ticket = controller.begin_start().unwrap();
        assert_eq!(controller.state(), SessionState::Loading);

        controller.stop();
        assert_eq!(controller.state(), SessionState::Off);

        let probe = Rc::new(RefCell::new(Probe::default()));
        let late = Box::new(FakeSession { probe: probe.clone() });
        assert!(!controller.commit_start(ticket, late));
        assert_eq!(controller.state(), SessionState::Off);
        assert!(probe.borrow().stopped);
        assert!(!controller.is_active());
    }

    #[test]
    fn failed_start_returns_to_off() {
        let mut controller = LifecycleController::new();
        controller.toggle(&mut FailingDriver);
        assert_eq!(controller.state(), SessionState::Off);
        assert!(!controller.is_active());
    }

    #[test]
    fn affordances_track_the_state_label() {
        let labels = Rc::new(RefCell::new(Vec::new()));
        let mut controller = LifecycleController::new();
        controller.register_affordance(Box::new(LabelLog(labels.clone())));
        assert_eq!(labels.borrow().last().map(String::as_str), Some(LABEL_INACTIVE));

        let mut driver = FakeDriver::new();
        controller.toggle(&mut driver);
        assert_eq!(labels.borrow().last().map(String::as_str), Some(LABEL_ACTIVE));
        controller.toggle(&mut driver);
        assert_eq!(labels.borrow().last().map(String::as_str), Some(LABEL_INACTIVE));
    }

    #[test]
    fn label_stays_inactive_while_a_start_is_pending() {
        let labels = Rc::new(RefCell::new(Vec::new()));
        let mut controller = LifecycleController::new();
        controller.register_affordance(Box::new(LabelLog(labels.clone())));

        let ticket = controller.begin_start().unwrap();
        assert_eq!(controller.state(), SessionState::Loading);
        assert_eq!(labels.borrow().last().map(String::as_str), Some(LABEL_INACTIVE));

        let probe = Rc::new(RefCell::new(Probe::default()));
        controller.commit_start(ticket, Box::new(FakeSession { probe }));
        assert_eq!(labels.borrow().last().map(String::as_str), Some(LABEL_ACTIVE));
    }

    #[test]
    fn resize_reaches_only_a_live_session() {
        let mut controller = LifecycleController::new();
        controller.handle_resize(PhysicalSize::new(800, 600), 1.0);

        let mut driver = FakeDriver::new();
        controller.toggle(&mut driver);
        controller.handle_resize(PhysicalSize::new(1024, 768), 1.0);
        assert_eq!(driver.probe(0).borrow().resizes, vec![PhysicalSize::new(1024, 768)]);

        controller.toggle(&mut driver);
        controller.handle_resize(PhysicalSize::new(640, 480), 1.0);
        assert_eq!(driver.probe(0).borrow().resizes.len(), 1);
    }

    #[test]
    fn frames_advance_only_while_on() {
        let mut controller = LifecycleController::new();
        controller.advance_frame();

        let mut driver = FakeDriver::new();
        controller.toggle(&mut driver);
        controller.advance_frame();
        controller.advance_frame();
        assert_eq!(driver.probe(0).borrow().frames, 2);

        controller.toggle(&mut driver);
        controller.advance_frame();
        assert_eq!(driver.probe(0).borrow().frames, 2);
    }
}
