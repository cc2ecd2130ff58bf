//! Minimal TAP (Test Anything Protocol) writer for the template test harness.
//!
//! Results are printed as they arrive; the plan line (`1..N`) is emitted by
//! [`Tap::finish`] once the total is known.

pub struct Tap {
    count: usize,
    failures: usize,
}

impl Tap {
    pub fn new() -> Self {
        println!("TAP version 13");
        Tap {
            count: 0,
            failures: 0,
        }
    }

    pub fn ok(&mut self, name: impl AsRef<str>) {
        self.count += 1;
        println!("ok {} - {}", self.count, name.as_ref());
    }

    /// Record a failure. Each line of `diagnostic` is printed as a `#` comment.
    pub fn not_ok(&mut self, name: impl AsRef<str>, diagnostic: impl AsRef<str>) {
        self.count += 1;
        self.failures += 1;
        println!("not ok {} - {}", self.count, name.as_ref());
        for line in diagnostic.as_ref().lines() {
            println!("  # {}", line);
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures
    }

    pub fn finish(self) {
        println!("1..{}", self.count);
        if self.failures > 0 {
            println!("# failed {} of {} tests", self.failures, self.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failures() {
        let mut tap = Tap::new();
        tap.ok("first");
        tap.not_ok("second", "line one\nline two");
        tap.ok("third");
        assert_eq!(tap.count, 3);
        assert_eq!(tap.failure_count(), 1);
        tap.finish();
    }
}
