//! Test Runner
//!
//! Drives one run through its phases (connect, setup, execute, cleanup,
//! report) or repeats it in loop mode. Scenario failures never escape the
//! suites; only connect, bind and test-root creation end a run early.

use chrono::Utc;
use directory::{Connector, DirectoryHandle, SearchRequest, SearchScope, attributes};
use shared::{Component, component_debug, component_error, component_info, component_warn, logging};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::core::{EntryKind, LoopStatistics, TestSuiteRun, Tracker};
use crate::error::{TesterError, TesterResult};
use crate::report;
use crate::runtime::cleanup::perform_cleanup;
use crate::runtime::maintenance::test_root_name;
use crate::runtime::signals::InterruptFlag;
use crate::suites::{self, DEFAULT_ABANDON_WAIT, SuiteContext};

pub const SUITE_NAME: &str = "LDAP Operations Test Suite";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerPhase {
    Idle,
    Connecting,
    SettingUp,
    Executing,
    CleaningUp,
    Reporting,
    Done,
    Error,
}

impl fmt::Display for RunnerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunnerPhase::Idle => "idle",
            RunnerPhase::Connecting => "connecting",
            RunnerPhase::SettingUp => "setting up",
            RunnerPhase::Executing => "executing",
            RunnerPhase::CleaningUp => "cleaning up",
            RunnerPhase::Reporting => "reporting",
            RunnerPhase::Done => "done",
            RunnerPhase::Error => "error",
        };
        f.write_str(name)
    }
}

pub struct Runner {
    config: Config,
    connector: Arc<dyn Connector>,
    tracker: Arc<Tracker>,
    phase: RunnerPhase,
    last_run: Option<TestSuiteRun>,
    statistics: LoopStatistics,
    output: Box<dyn Write + Send>,
}

impl Runner {
    pub fn new(config: Config, connector: Arc<dyn Connector>) -> Self {
        if config.concurrent > 1 {
            component_warn!(
                Component::Runner,
                concurrent = config.concurrent,
                "Concurrent workers are not supported; running sequentially"
            );
        }
        Self {
            config,
            connector,
            tracker: Arc::new(Tracker::new()),
            phase: RunnerPhase::Idle,
            last_run: None,
            statistics: LoopStatistics::new(),
            output: Box::new(std::io::stdout()),
        }
    }

    /// Send reports somewhere other than stdout
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    pub fn last_run(&self) -> Option<&TestSuiteRun> {
        self.last_run.as_ref()
    }

    pub fn statistics(&self) -> &LoopStatistics {
        &self.statistics
    }

    /// 0 iff the most recent run completed with no failing outcome
    pub fn exit_code(&self) -> i32 {
        match &self.last_run {
            Some(run) if run.is_aborted() || !run.all_passed() => 1,
            _ => 0,
        }
    }

    /// Single run, or loop mode when configured
    pub async fn run(&mut self, interrupt: &InterruptFlag) -> TesterResult<()> {
        if self.config.loop_mode {
            self.run_loop(interrupt).await
        } else {
            self.run_once().await
        }
    }

    fn set_phase(&mut self, phase: RunnerPhase) {
        if self.phase != phase {
            component_debug!(Component::Runner, from = %self.phase, to = %phase, "Phase transition");
            self.phase = phase;
        }
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.output.write_all(text.as_bytes()).and_then(|()| self.output.flush()) {
            component_error!(Component::Report, "Failed to write report: {e}");
        }
    }

    /// One pass through every phase; the connection is released on every path
    pub async fn run_once(&mut self) -> TesterResult<()> {
        component_info!(Component::Runner, "🧪 Starting LDAP operations test suite");
        self.set_phase(RunnerPhase::Connecting);
        let mut run = TestSuiteRun::new(SUITE_NAME);

        let result = match self.connect().await {
            Ok(directory) => {
                let result = self.run_phases(&directory, &mut run).await;
                self.release(&directory).await;
                result
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => run.finish(),
            Err(e) => {
                self.set_phase(RunnerPhase::Error);
                run.abort(e.to_string());
            }
        }
        self.last_run = Some(run);
        result
    }

    async fn connect(&self) -> TesterResult<DirectoryHandle> {
        component_info!(Component::Runner, address = %self.connector.address(), "🔌 Connecting to LDAP server");
        let directory = self.connector.connect().await.map_err(|e| {
            component_error!(Component::Runner, "Failed to connect: {e}");
            TesterError::Connection(e)
        })?;

        let credentials = self.config.credentials();
        if let Err(e) = directory.bind(&credentials.bind_dn, &credentials.bind_password).await {
            component_error!(Component::Runner, "Authentication failed: {e}");
            self.release(&directory).await;
            return Err(TesterError::Connection(e));
        }
        logging::log_success(Component::Connection, "Bound to LDAP server");
        Ok(directory)
    }

    async fn release(&self, directory: &DirectoryHandle) {
        component_debug!(Component::Runner, "Closing LDAP connection");
        if let Err(e) = directory.unbind().await {
            component_debug!(Component::Runner, "Connection close reported: {e}");
        }
    }

    /// Root DSE read; failure is only a warning
    async fn health_check(&self, directory: &DirectoryHandle) {
        let request = SearchRequest::new("", SearchScope::Base, "(objectClass=*)")
            .with_attributes(&["namingContexts", "supportedLDAPVersion"]);
        let started = Instant::now();
        match directory.search(request).await {
            Ok(page) => {
                if let Some(root_dse) = page.entries.first() {
                    component_debug!(
                        Component::HealthCheck,
                        naming_contexts = ?root_dse.attributes.get("namingContexts"),
                        ldap_version = ?root_dse.first_value("supportedLDAPVersion"),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Root DSE"
                    );
                }
            }
            Err(e) => component_warn!(Component::Runner, "Health check failed: {e}"),
        }
    }

    async fn run_phases(&mut self, directory: &DirectoryHandle, run: &mut TestSuiteRun) -> TesterResult<()> {
        self.health_check(directory).await;

        // Setup
        self.set_phase(RunnerPhase::SettingUp);
        let test_root = self.setup(directory).await?;
        run.test_root = Some(test_root.clone());

        // Execute
        self.set_phase(RunnerPhase::Executing);
        component_info!(Component::Runner, suite = %self.config.test_suite, "Executing test operations");
        if self.config.dry_run {
            component_info!(Component::Runner, "DRY RUN: Skipping test execution");
        } else {
            let ctx = SuiteContext {
                directory: directory.clone(),
                connector: self.connector.clone(),
                credentials: self.config.credentials(),
                base_dn: self.config.base_dn.clone(),
                test_root,
                tracker: self.tracker.clone(),
                abandon_wait: DEFAULT_ABANDON_WAIT,
            };
            run.extend(suites::run_selected(self.config.test_suite, &ctx).await);
        }

        // Cleanup
        self.set_phase(RunnerPhase::CleaningUp);
        if !self.config.should_cleanup(run.all_passed()) {
            component_info!(Component::Cleanup, "Cleanup not requested, preserving test data");
        } else if self.config.dry_run {
            component_info!(Component::Cleanup, "DRY RUN: Would cleanup test data");
        } else {
            run.cleanup = Some(perform_cleanup(directory.as_ref(), &self.tracker).await);
        }
        run.finish();

        // Report; loop mode reports cumulatively instead
        if !self.config.loop_mode {
            self.set_phase(RunnerPhase::Reporting);
            let preserved = if run.cleanup.is_some() {
                Vec::new()
            } else {
                self.tracker.entries()
            };
            match report::render(self.config.report_format, run, &preserved) {
                Ok(text) => self.emit(&text),
                Err(e) => component_error!(Component::Report, "{e}"),
            }
        }

        self.set_phase(RunnerPhase::Done);
        Ok(())
    }

    /// Create the uniquely named test root
    ///
    /// Names have one-second resolution; two runs started in the same second
    /// against the same base collide and the second fails setup.
    async fn setup(&self, directory: &DirectoryHandle) -> TesterResult<String> {
        component_info!(Component::Setup, "Creating test organizational structure");
        let now = Utc::now();
        let name = test_root_name(&self.config.test_prefix, now);
        let dn = format!("ou={name},{}", self.config.base_dn);
        component_info!(Component::Setup, dn = %dn, "Creating test base OU");

        if self.config.dry_run {
            component_info!(Component::Setup, dn = %dn, "DRY RUN: Would create test base OU");
            return Ok(dn);
        }

        let description = format!("Test OU created by LDAP test suite at {}", now.to_rfc3339());
        let attrs = attributes(&[
            ("objectClass", &["organizationalUnit"]),
            ("ou", &[name.as_str()]),
            ("description", &[description.as_str()]),
        ]);

        directory.add(&dn, attrs).await.map_err(|source| {
            component_error!(Component::Setup, "Failed to create test base OU: {source}");
            TesterError::Setup { dn: dn.clone(), source }
        })?;

        logging::log_success(Component::Setup, &format!("Test OU created successfully: {dn}"));
        self.tracker.track(dn.clone(), EntryKind::Container);
        Ok(dn)
    }

    /// Repeat runs until the count is reached or `interrupt` is raised
    ///
    /// Always returns `Ok`; failed iterations are counted, not propagated.
    pub async fn run_loop(&mut self, interrupt: &InterruptFlag) -> TesterResult<()> {
        component_info!(Component::Runner, "🔁 Starting LDAP operations test suite in LOOP mode");
        let count = self.config.loop_count;
        if count > 0 {
            component_info!(Component::Runner, count, "Will run for {count} iterations");
        } else {
            component_info!(Component::Runner, "Running indefinitely (Ctrl+C to stop)");
        }
        let delay = self.config.loop_delay();

        let mut iteration: u32 = 0;
        loop {
            if interrupt.is_raised() {
                component_info!(Component::Runner, "Stopping loop mode");
                break;
            }
            if count > 0 && iteration >= count {
                component_info!(Component::Runner, count, "Completed all iterations");
                break;
            }
            iteration += 1;
            component_info!(Component::Runner, "=== Starting iteration {iteration} ===");

            if let Err(e) = self.run_once().await {
                component_error!(Component::Runner, iteration, "Iteration failed: {e}");
            }

            if let Some(run) = self.last_run.take() {
                self.statistics.record(&run);
                let lines = format!(
                    "{}{}",
                    report::console::iteration_line(iteration, &run),
                    report::console::cumulative_line(&self.statistics)
                );
                self.emit(&lines);
                self.last_run = Some(run);
            }

            // Bookkeeping reset only; directory entries follow this iteration's cleanup policy
            self.tracker.clear();

            let more = count == 0 || iteration < count;
            if more && !delay.is_zero() && !interrupt.is_raised() {
                component_debug!(Component::Runner, seconds = delay.as_secs(), "Waiting before next iteration");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = interrupt.wait() => {}
                }
            }
        }

        let summary = report::console::render_loop_summary(&self.statistics);
        self.emit(&summary);
        Ok(())
    }
}
