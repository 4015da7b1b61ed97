pub mod emitter;
pub mod handlers;
pub mod host;
pub mod mutations;
pub mod queue;
pub mod recorder;
pub mod state;
pub mod timers;

pub use emitter::CommandEmitter;
pub use handlers::{HandlerContext, HandlerRegistry};
pub use host::{ChannelHost, Host, HostMessage};
pub use queue::{GestureSummary, MouseoverQueue, QueueEntry};
pub use recorder::Recorder;
pub use state::{RecordingState, TypeLock};
pub use timers::{TimerHandle, TimerQueue, TimerTask};
