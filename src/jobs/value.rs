use crate::parallel::Job;
use std::fmt::Debug;

/// Trivial job that logs the value it was built with
#[derive(Debug, Clone)]
pub struct ValueJob<T> {
    value: T,
}

impl<T> ValueJob<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Debug + Send> Job for ValueJob<T> {
    fn work(&mut self) {
        tracing::info!("value: {:?}", self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::run_job;

    #[test]
    fn test_value_job_runs() {
        let mut job = ValueJob::new(3);
        run_job(&mut job);
        assert_eq!(*job.value(), 3);
    }
}
