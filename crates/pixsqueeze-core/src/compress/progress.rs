/// Forwards progress to a callback, dropping values that would move
/// backwards or repeat. The last value reported is always 100.
pub(crate) struct ProgressReporter<F> {
    sink: F,
    last: Option<u8>,
}

impl<F: FnMut(u8)> ProgressReporter<F> {
    pub(crate) fn new(sink: F) -> Self {
        Self { sink, last: None }
    }

    pub(crate) fn report(&mut self, progress: u8) {
        let progress = progress.min(100);
        if self.last.is_some_and(|last| progress <= last) {
            return;
        }
        self.last = Some(progress);
        (self.sink)(progress);
    }

    /// Report `done` of `total` steps as a percentage.
    pub(crate) fn step(&mut self, done: u32, total: u32) {
        let total = u64::from(total.max(1));
        let percent = (u64::from(done) * 100 / total).min(100);
        self.report(percent as u8);
    }

    pub(crate) fn finish(&mut self) {
        self.report(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_is_monotonic() {
        let mut seen = Vec::new();
        let mut reporter = ProgressReporter::new(|p| seen.push(p));

        reporter.report(10);
        reporter.report(5);
        reporter.report(10);
        reporter.report(40);
        reporter.finish();
        reporter.finish();

        drop(reporter);
        assert_eq!(seen, vec![10, 40, 100]);
    }

    #[test]
    fn test_reporter_steps() {
        let mut seen = Vec::new();
        let mut reporter = ProgressReporter::new(|p| seen.push(p));

        reporter.step(1, 3);
        reporter.step(2, 3);
        reporter.step(3, 3);

        drop(reporter);
        assert_eq!(seen, vec![33, 66, 100]);
    }

    #[test]
    fn test_reporter_clamps() {
        let mut seen = Vec::new();
        let mut reporter = ProgressReporter::new(|p| seen.push(p));
        reporter.report(250);

        drop(reporter);
        assert_eq!(seen, vec![100]);
    }

    #[test]
    fn test_zero_total_counts_as_one() {
        let mut seen = Vec::new();
        let mut reporter = ProgressReporter::new(|p| seen.push(p));
        reporter.step(0, 0);

        drop(reporter);
        assert_eq!(seen, vec![0]);
    }
}
