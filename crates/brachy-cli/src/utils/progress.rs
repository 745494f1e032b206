use brachyplan::engine::config::PlannerType;
use brachyplan::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Workflow phases in the order the planning workflow reports them.
const PLAN_PHASES: [&str; 4] = [
    "Loading Patient",
    "Adjoint Data",
    "Candidate Enumeration",
    "Optimization",
];

/// `[n/4] name` for a known phase, the bare name otherwise.
fn phase_label(name: &str) -> String {
    match PLAN_PHASES.iter().position(|phase| *phase == name) {
        Some(index) => format!("[{}/{}] {}", index + 1, PLAN_PHASES.len(), name),
        None => name.to_string(),
    }
}

/// What a task step counts in `phase`. Adjoint generation ticks once per
/// structure; IIEM ticks once per needle goal and the greedy planners once per
/// inserted seed out of the candidate pool.
fn step_unit(phase: &str, planner: PlannerType) -> &'static str {
    match (phase, planner) {
        ("Adjoint Data", _) => "structures",
        ("Optimization", PlannerType::Iiem) => "needle goals",
        ("Optimization", _) => "candidates",
        _ => "steps",
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style(unit: &str) -> ProgressStyle {
    let template =
        format!("{{msg:<32}} [{{bar:36.cyan/blue}}] {{pos}}/{{len}} {unit} ({{elapsed}})");
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

struct PhaseTracker {
    bar: ProgressBar,
    planner: PlannerType,
    phase: &'static str,
    started: Instant,
}

impl PhaseTracker {
    fn handle(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.phase = name;
                self.started = Instant::now();
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(spinner_style());
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                self.bar.set_message(phase_label(name));
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.finish_with_message(format!(
                    "✓ {} ({:.1}s)",
                    phase_label(self.phase),
                    self.started.elapsed().as_secs_f64()
                ));
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total_steps);
                self.bar.set_position(0);
                self.bar
                    .set_style(bar_style(step_unit(self.phase, self.planner)));
                self.bar.set_message(phase_label(self.phase));
            }
            Progress::TaskIncrement => self.bar.inc(1),
            // Greedy planners stop once coverage is reached; `abandon` keeps the
            // count where the planner left it instead of filling the bar.
            Progress::TaskFinish => self.bar.abandon(),
            Progress::Message(msg) => self.bar.println(format!("  {}", msg)),
        }
    }
}

/// Renders the planning workflow on stderr: a numbered spinner per phase and a
/// bar counting structures, needle goals or candidates inside it.
#[derive(Clone)]
pub struct CliProgressHandler {
    tracker: Arc<Mutex<PhaseTracker>>,
}

impl CliProgressHandler {
    pub fn new(planner: PlannerType) -> Self {
        let bar = ProgressBar::new(0)
            .with_style(spinner_style())
            .with_message("Initializing...");
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.finish_and_clear();

        Self {
            tracker: Arc::new(Mutex::new(PhaseTracker {
                bar,
                planner,
                phase: "",
                started: Instant::now(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let tracker = self.tracker.clone();
        Box::new(move |event: Progress| match tracker.lock() {
            Ok(mut tracker) => tracker.handle(event),
            Err(_) => warn!("Progress tracker mutex was poisoned. Cannot update progress."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bar(handler: &CliProgressHandler) -> ProgressBar {
        handler.tracker.lock().unwrap().bar.clone()
    }

    #[test]
    fn phases_are_numbered_and_report_their_duration() {
        let handler = CliProgressHandler::new(PlannerType::Scm);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Adjoint Data",
        });
        assert_eq!(bar(&handler).message(), "[2/4] Adjoint Data");
        assert!(!bar(&handler).is_finished());

        callback(Progress::PhaseFinish);
        let message = bar(&handler).message();
        assert!(message.starts_with("✓ [2/4] Adjoint Data ("));
        assert!(message.ends_with("s)"));
    }

    #[test]
    fn unknown_phase_keeps_its_name() {
        assert_eq!(phase_label("Exporting"), "Exporting");
        assert_eq!(phase_label("Optimization"), "[4/4] Optimization");
    }

    #[test]
    fn optimization_steps_are_counted_in_planner_units() {
        assert_eq!(step_unit("Optimization", PlannerType::Iiem), "needle goals");
        assert_eq!(step_unit("Optimization", PlannerType::Dwdmm), "candidates");
        assert_eq!(step_unit("Adjoint Data", PlannerType::Iiem), "structures");
        assert_eq!(step_unit("Loading Patient", PlannerType::Scm), "steps");
    }

    #[test]
    fn early_finish_keeps_the_reached_count() {
        let handler = CliProgressHandler::new(PlannerType::Scm);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Optimization",
        });
        callback(Progress::TaskStart { total_steps: 24 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        assert_eq!(bar(&handler).length(), Some(24));
        assert_eq!(bar(&handler).message(), "[4/4] Optimization");

        callback(Progress::TaskFinish);
        let pb = bar(&handler);
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new(PlannerType::Iiem);
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Loading Patient",
            });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = bar(&handler);
        assert!(pb.is_finished());
        assert!(pb.message().starts_with("✓ [1/4] Loading Patient"));
    }
}
