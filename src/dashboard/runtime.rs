//! Runtime: owns the model, executes commands, drives the virtual clock.
//!
//! `dispatch()` feeds one message through [`update`] and executes the
//! returned command. `advance()` moves the clock forward and delivers every
//! timer that comes due on the way, in order, including timers scheduled by
//! messages delivered during the same advance.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::time::Duration;

use crate::core::config::Config;
use crate::data::service::MockDataService;
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle};

use super::model::{DashboardCmd, DashboardModel, DashboardMsg};
use super::render::render;
use super::scheduler::{CancellationToken, Scheduler};
use super::surface::Surface;
use super::update::update;

/// Recent events kept in memory for inspection.
const HISTORY_CAPACITY: usize = 256;

/// Executes the dashboard state machine.
#[derive(Debug)]
pub struct DashboardRuntime {
    model: DashboardModel,
    scheduler: Scheduler,
    logger: Option<ActivityLoggerHandle>,
    history: VecDeque<ActivityEvent>,
}

impl DashboardRuntime {
    #[must_use]
    pub fn new(model: DashboardModel) -> Self {
        Self {
            model,
            scheduler: Scheduler::new(),
            logger: None,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Build an unmounted runtime from configuration.
    #[must_use]
    pub fn from_config(config: &Config, data: MockDataService) -> Self {
        Self::new(DashboardModel::from_config(config, data))
    }

    /// Forward every activity event to a logger thread as well.
    #[must_use]
    pub fn with_logger(mut self, logger: ActivityLoggerHandle) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn model(&self) -> &DashboardModel {
        &self.model
    }

    /// Virtual time since the runtime started.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Token of the current view lifetime.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.scheduler.token()
    }

    /// Virtual time until the next timer, if any are pending.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Most recent activity events, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.history.iter()
    }

    /// Apply one message and execute whatever it asks for.
    pub fn dispatch(&mut self, msg: DashboardMsg) {
        let cmd = update(&mut self.model, msg);
        self.execute(cmd);
    }

    /// Attach the view: request every fixture.
    pub fn mount(&mut self) {
        self.dispatch(DashboardMsg::Mount);
    }

    /// Tear the view down. Pending timers are dropped; nothing scheduled
    /// before this point will ever reach the model.
    pub fn unmount(&mut self) {
        self.dispatch(DashboardMsg::Unmount);
    }

    /// Advance the virtual clock by `by`, delivering due timers in order.
    /// Returns how many timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now().saturating_add(by);
        let mut fired = 0;
        while let Some(msg) = self.scheduler.pop_due(until) {
            fired += 1;
            self.dispatch(msg);
        }
        self.scheduler.settle(until);
        fired
    }

    /// Deliver timers until none remain. Returns the virtual time that passed.
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.scheduler.now();
        while let Some(wait) = self.scheduler.time_until_next() {
            self.advance(wait);
        }
        self.scheduler.now().saturating_sub(start)
    }

    /// Render the current view onto `surface`.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        render(&self.model, surface);
    }

    /// Record an event that originates outside the state machine, such as
    /// session start and stop.
    pub fn record(&mut self, event: ActivityEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event.clone());
        }
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    fn execute(&mut self, cmd: DashboardCmd) {
        for cmd in cmd.flatten() {
            match cmd {
                DashboardCmd::None | DashboardCmd::Batch(_) => {}
                DashboardCmd::ScheduleFetch { ticket, after } => {
                    self.scheduler
                        .schedule(after, DashboardMsg::FetchElapsed(ticket));
                }
                DashboardCmd::ScheduleReply { prompt, after } => {
                    self.scheduler
                        .schedule(after, DashboardMsg::ReplyElapsed { prompt });
                }
                DashboardCmd::CancelTimers => {
                    let count = self.scheduler.cancel_all();
                    self.record(ActivityEvent::TimersCancelled { count });
                }
                DashboardCmd::Log(event) => self.record(event),
            }
        }
    }
}
