//! The suspension protocol.
//!
//! A [`Step`] is a computation that has either finished or stopped at a
//! [`Request`] only the embedding can answer: running script code, or
//! yielding control before touching a host object. Suspended steps carry
//! their own continuation, so nothing here ever blocks or recurses into the
//! evaluator.
//!
//! Steps compose with [`Step::and_then`]; when the left side is already
//! finished the continuation runs immediately, so purely local computations
//! never allocate.

use std::fmt;

use crate::completion::Completion;
use crate::value::Value;

/// The outcome of a finished step: a value, or an abrupt completion.
pub type Flow<T> = Result<T, Completion>;

/// Continuation of a suspended step, fed the answer to its request.
pub type Resume<T> = Box<dyn FnOnce(Flow<Value>) -> Step<T>>;

/// What a suspended step is waiting for.
pub enum Request {
    /// Yield point before a host access. Answered with any value; only the
    /// fact that the driver resumed matters.
    Checkpoint,
    /// Run script function `callee` with `this` and `args`.
    Call {
        callee: Value,
        this: Value,
        args: Vec<Value>,
    },
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Checkpoint => f.write_str("Checkpoint"),
            Request::Call { callee, args, .. } => f
                .debug_struct("Call")
                .field("callee", &callee.debug_string())
                .field("args", &args.len())
                .finish_non_exhaustive(),
        }
    }
}

/// A possibly-suspended computation producing `T`.
pub enum Step<T> {
    Ready(Flow<T>),
    Suspended { request: Request, resume: Resume<T> },
}

impl<T: 'static> Step<T> {
    #[inline]
    pub fn ready(value: T) -> Self {
        Step::Ready(Ok(value))
    }

    #[inline]
    pub fn throw(completion: Completion) -> Self {
        Step::Ready(Err(completion))
    }

    #[inline]
    pub fn from_flow(flow: Flow<T>) -> Self {
        Step::Ready(flow)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Step::Ready(_))
    }

    /// The outcome, if the step finished without suspending.
    pub fn now(self) -> Option<Flow<T>> {
        match self {
            Step::Ready(flow) => Some(flow),
            Step::Suspended { .. } => None,
        }
    }

    /// Continue with `f` once this step produced a value. Abrupt
    /// completions skip `f`.
    pub fn and_then<U: 'static>(self, f: impl FnOnce(T) -> Step<U> + 'static) -> Step<U> {
        match self {
            Step::Ready(Ok(value)) => f(value),
            Step::Ready(Err(completion)) => Step::Ready(Err(completion)),
            Step::Suspended { request, resume } => Step::Suspended {
                request,
                resume: Box::new(move |answer| resume(answer).and_then(f)),
            },
        }
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Step<U> {
        self.and_then(move |value| Step::ready(f(value)))
    }

    /// Continue with `f` on either outcome, abrupt ones included.
    pub fn then<U: 'static>(self, f: impl FnOnce(Flow<T>) -> Step<U> + 'static) -> Step<U> {
        match self {
            Step::Ready(flow) => f(flow),
            Step::Suspended { request, resume } => Step::Suspended {
                request,
                resume: Box::new(move |answer| resume(answer).then(f)),
            },
        }
    }
}

impl Step<Value> {
    /// Suspend on `request`; the answer becomes this step's outcome.
    pub fn request(request: Request) -> Self {
        Step::Suspended {
            request,
            resume: Box::new(Step::Ready),
        }
    }
}

/// Suspend on a [`Request::Checkpoint`].
pub fn checkpoint() -> Step<()> {
    Step::Suspended {
        request: Request::Checkpoint,
        resume: Box::new(|answer| Step::Ready(answer.map(|_| ()))),
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Ready(Ok(_)) => f.write_str("Step::Ready(Ok(..))"),
            Step::Ready(Err(completion)) => write!(f, "Step::Ready(Err({completion}))"),
            Step::Suspended { request, .. } => write!(f, "Step::Suspended({request:?})"),
        }
    }
}

/// Answers the requests of suspended steps.
///
/// The returned step may suspend again; the driver resolves it completely
/// before resuming the step that asked.
pub trait Handler {
    fn handle(&mut self, request: Request) -> Step<Value>;
}

impl<F> Handler for F
where
    F: FnMut(Request) -> Step<Value>,
{
    fn handle(&mut self, request: Request) -> Step<Value> {
        self(request)
    }
}
