/// A piece of work. Workers, who live in a [`Pool`](super::Pool), run these.
///
/// `work` takes no arguments and returns nothing: a job talks to the rest of
/// the program only through whatever queues or state it captured before it
/// started. A job owns its failure handling too. The pool never catches,
/// retries or classifies anything a job does, so a job either logs and
/// carries on or takes the process down.
pub trait Job: Send {
    fn work(&mut self);
}

impl<J: Job + ?Sized> Job for Box<J> {
    fn work(&mut self) {
        (**self).work()
    }
}

/// Adapter that turns a closure into a [`Job`]
pub struct FnJob<F> {
    f: F,
}

impl<F> Job for FnJob<F>
where
    F: FnMut() + Send,
{
    fn work(&mut self) {
        (self.f)()
    }
}

/// Wrap a closure as a job
pub fn job_fn<F>(f: F) -> FnJob<F>
where
    F: FnMut() + Send,
{
    FnJob { f }
}

/// No frills job running on the calling thread, for use outside of a pool
pub fn run_job<J: Job + ?Sized>(job: &mut J) {
    job.work();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_job_invokes_once() {
        let mut calls = 0;
        run_job(&mut job_fn(|| calls += 1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_boxed_job_delegates() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let mut job: Box<dyn Job> = Box::new(job_fn(move || tx.send("ran").unwrap()));
        run_job(&mut job);
        assert_eq!(rx.recv().unwrap(), "ran");
    }
}
