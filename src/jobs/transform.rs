use crate::parallel::{Job, Queue};

type Body<I, O> = Box<dyn FnMut(&Queue<I>, &Queue<O>) + Send>;

/// Transform the data arriving on one queue and publish it on another
///
/// The body receives both queues and decides everything: how many items to
/// read, what to emit and whether to close the output. Keeping the body a
/// closure makes it easy to express the work inline, and sharing queues
/// between several transform jobs is how they run in parallel on one stream.
pub struct TransformJob<I, O> {
    input: Queue<I>,
    output: Queue<O>,
    body: Body<I, O>,
}

impl<I, O> TransformJob<I, O> {
    pub fn new<F>(input: Queue<I>, output: Queue<O>, body: F) -> Self
    where
        F: FnMut(&Queue<I>, &Queue<O>) + Send + 'static,
    {
        Self {
            input,
            output,
            body: Box::new(body),
        }
    }

    /// Map every input item through `f` in arrival order, then close the
    /// output once the input reaches end-of-stream
    pub fn map<F>(input: Queue<I>, output: Queue<O>, mut f: F) -> Self
    where
        F: FnMut(I) -> O + Send + 'static,
        I: 'static,
        O: 'static,
    {
        Self::new(input, output, move |input, output| {
            for item in input {
                if output.push(f(item)).is_err() {
                    tracing::warn!("output queue closed, stopping transform");
                    break;
                }
            }
            output.close();
        })
    }

    pub fn input(&self) -> &Queue<I> {
        &self.input
    }

    pub fn output(&self) -> &Queue<O> {
        &self.output
    }
}

impl<I: Send, O: Send> Job for TransformJob<I, O> {
    fn work(&mut self) {
        (self.body)(&self.input, &self.output);
    }
}
