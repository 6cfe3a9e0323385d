//! Interactive read-dispatch-render loop.

use std::io::{BufRead, Write};

use headtrack_common::error::HeadtrackResult;

use crate::input::{parse_bytes, ParsedInput, HELP};
use crate::observer::SessionObserver;
use crate::session::{AnnotationEvent, AnnotationSession, SessionSignal};

/// Feed `input` lines to the session until it closes.
///
/// End of input closes the session. Help text and input errors go to
/// `messages`; session state goes to the observers. A failed read closes
/// the session before the error is returned, so the points marked so far
/// can still be saved.
pub fn run_session<R: BufRead, W: Write>(
    session: &mut AnnotationSession,
    mut input: R,
    messages: &mut W,
    observers: &mut [&mut dyn SessionObserver],
) -> HeadtrackResult<()> {
    for observer in observers.iter_mut() {
        observer.on_start(session);
    }

    let mut line = Vec::new();
    while !session.is_closed() {
        line.clear();
        let event = match input.read_until(b'\n', &mut line) {
            Ok(0) => AnnotationEvent::Close,
            Ok(_) => match parse_bytes(&line) {
                Ok(ParsedInput::Event(event)) => event,
                Ok(ParsedInput::Empty) => continue,
                Ok(ParsedInput::Help) => {
                    writeln!(messages, "{HELP}")?;
                    continue;
                }
                Err(e) => {
                    writeln!(messages, "{e}")?;
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!("Input failed, closing session: {e}");
                dispatch(session, AnnotationEvent::Close, observers);
                return Err(e.into());
            }
        };

        dispatch(session, event, observers);
    }

    tracing::info!(
        marked = session.store().marked_count(),
        "Annotation session finished"
    );
    Ok(())
}

fn dispatch(
    session: &mut AnnotationSession,
    event: AnnotationEvent,
    observers: &mut [&mut dyn SessionObserver],
) {
    let signal = session.handle(event);
    if signal != SessionSignal::Ignored {
        for observer in observers.iter_mut() {
            observer.on_transition(session, &signal);
        }
    }
}
