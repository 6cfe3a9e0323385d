//! Headtrack Annotator
//!
//! Manual point marking over extracted video windows:
//! - **Session:** Cursor/point state machine driven by discrete events
//! - **Input:** Line commands mapped to session events
//! - **Observer:** Rendering hooks notified after every transition
//! - **Driver:** The single-threaded read-dispatch-render loop
//!
//! The session never performs I/O; persistence happens after close.

pub mod driver;
pub mod input;
pub mod observer;
pub mod session;

pub use driver::run_session;
pub use input::{parse_bytes, parse_line, InputError, ParsedInput};
pub use observer::{SessionObserver, SignalLog, TerminalRenderer};
pub use session::{AnnotationEvent, AnnotationSession, Cursor, SessionError, SessionSignal};
