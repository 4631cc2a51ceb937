//! Scheduling kernel: busy counter, single-slot coalescing build queue and
//! cancellable prepare tasks.

mod counter;
pub mod prepare;
mod queue;
mod request;

pub use counter::TaskCounter;
pub use prepare::{completion, Completion, Pending, Prepare, PrepareTask};
pub use queue::{BuildQueue, Coalesce, Submitted};
pub use request::BuildRequest;
