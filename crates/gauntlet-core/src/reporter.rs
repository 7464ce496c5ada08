//! Reporter contract and the built-in console reporter.
//!
//! The reporter stream is the engine's sole observable output besides the
//! final counts: the executor invokes every callback on every registered
//! reporter, synchronously, in registration order. Rendering is entirely the
//! reporter's concern; the engine never formats text itself.

use std::time::Instant;

use colored::Colorize;

/// Event sink for run lifecycle notifications.
///
/// `depth` is the nesting level of the suite or test the event belongs to;
/// the implicit root is never reported. All methods default to no-ops so
/// implementors override only what they render.
pub trait Reporter: Send {
    /// The run is starting.
    fn started_all(&mut self) {}

    /// The run finished with the final root counts.
    fn finished_all(&mut self, _failed: u32, _passed: u32) {}

    /// A suite is about to execute its members.
    fn started_suite(&mut self, _name: &str, _depth: i32) {}

    /// A suite finished, with its own counts.
    fn finished_suite(&mut self, _name: &str, _depth: i32, _failed: u32, _passed: u32) {}

    /// A test is about to run. Emitted once per test, not per attempt.
    fn started_test(&mut self, _name: &str, _depth: i32) {}

    /// A test passed, with the elapsed time of the successful attempt.
    fn passed_test(&mut self, _elapsed_ms: u64, _depth: i32) {}

    /// A test (or a hook at a member boundary) failed after exhausting its
    /// attempts.
    fn failed_test(&mut self, _error: &anyhow::Error, _depth: i32) {}
}

const INDENT: &str = "   ";

fn indent(depth: i32) -> String {
    INDENT.repeat(usize::try_from(depth).unwrap_or(0))
}

/// Colored terminal reporter: indented suite tree, per-test verdict lines, a
/// failure summary, and a final PASS/FAIL banner.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    started: Option<Instant>,
    current_test: String,
    failures: Vec<(String, String)>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn started_all(&mut self) {
        self.started = Some(Instant::now());
        self.failures.clear();
        println!("\n{}\n", "Running tests...".cyan().bold());
    }

    fn finished_all(&mut self, failed: u32, passed: u32) {
        let elapsed = self.started.map(|s| s.elapsed().as_millis()).unwrap_or(0);
        println!("\n{}", "Test run complete.".bold());
        println!("   {}", format!("✓ Passed: {passed}").green());
        println!("   {}", format!("✗ Failed: {failed}").red());
        println!("   {}", format!("Duration: {elapsed}ms").cyan());

        if !self.failures.is_empty() {
            println!("\n{}", "Failed Tests:".red().bold());
            for (index, (name, message)) in self.failures.iter().enumerate() {
                println!("\n{}", format!("{}) {name}", index + 1).red());
                println!("{}", message.dimmed());
            }
        }

        if failed > 0 {
            println!("\n{} Some tests failed.", " FAIL ".on_red().white().bold());
        } else {
            println!("\n{} All tests passed.", " PASS ".on_green().black().bold());
        }
    }

    fn started_suite(&mut self, name: &str, depth: i32) {
        println!("{}{}", indent(depth), name.bold());
    }

    fn finished_suite(&mut self, name: &str, depth: i32, failed: u32, _passed: u32) {
        if failed > 0 {
            println!(
                "{}{}",
                indent(depth),
                format!("✗ {failed} failed in {name}").red()
            );
        }
    }

    fn started_test(&mut self, name: &str, depth: i32) {
        self.current_test = name.to_string();
        println!("{}{name}", indent(depth));
    }

    fn passed_test(&mut self, elapsed_ms: u64, depth: i32) {
        println!(
            "{}{}",
            indent(depth),
            format!("✓ Passed - {elapsed_ms}ms").green()
        );
    }

    fn failed_test(&mut self, error: &anyhow::Error, depth: i32) {
        println!("{}{}", indent(depth), format!("✗ Failed: {error}").red());
        self.failures
            .push((self.current_test.clone(), format!("{error:#}")));
    }
}
