//! Session observers.
//!
//! Observers render or record session state after each transition. They
//! never feed back into the session.

use std::io::Write;

use headtrack_model::point::Point2D;

use crate::session::{AnnotationSession, SessionSignal};

/// Receives the session after every transition.
pub trait SessionObserver {
    /// Called once before the first event.
    fn on_start(&mut self, _session: &AnnotationSession) {}

    /// Called after each handled event.
    fn on_transition(&mut self, session: &AnnotationSession, signal: &SessionSignal);
}

/// Keeps every signal, in order.
#[derive(Debug, Default, Clone)]
pub struct SignalLog {
    pub signals: Vec<SessionSignal>,
}

impl SessionObserver for SignalLog {
    fn on_transition(&mut self, _session: &AnnotationSession, signal: &SessionSignal) {
        self.signals.push(*signal);
    }
}

/// Writes a one-line status per transition.
///
/// `reference[s][f]` is the tracked head centre for frame `f` of segment
/// `s`, shown next to the marked point for comparison.
pub struct TerminalRenderer<W: Write> {
    out: W,
    reference: Vec<Vec<Option<Point2D>>>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, reference: Vec<Vec<Option<Point2D>>>) -> Self {
        Self { out, reference }
    }

    /// Recover the writer (used to inspect output in tests).
    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_line(&self, session: &AnnotationSession) -> String {
        let cursor = session.cursor();
        let tracked = self
            .reference
            .get(cursor.segment)
            .and_then(|s| s.get(cursor.frame))
            .copied()
            .flatten();

        format!(
            "[segment {}/{}] frame {}/{}  tracked {}  marked {}  ({} marked)",
            cursor.segment + 1,
            session.segment_count(),
            cursor.frame + 1,
            session.current_frame_count(),
            fmt_point(tracked),
            fmt_point(session.current_point()),
            session.store().marked_count(),
        )
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to render session status: {e}");
        }
    }
}

impl<W: Write> SessionObserver for TerminalRenderer<W> {
    fn on_start(&mut self, session: &AnnotationSession) {
        let line = self.status_line(session);
        self.write_line(&line);
    }

    fn on_transition(&mut self, session: &AnnotationSession, signal: &SessionSignal) {
        match signal {
            SessionSignal::Closed => {
                let line = format!(
                    "Session closed with {} marked frames",
                    session.store().marked_count()
                );
                self.write_line(&line);
            }
            SessionSignal::Ignored => {}
            SessionSignal::SegmentComplete { marked } => {
                let line = format!(
                    "Segment {} complete; move on with next/prev",
                    marked.segment + 1
                );
                self.write_line(&line);
                let status = self.status_line(session);
                self.write_line(&status);
            }
            SessionSignal::Moved(_) | SessionSignal::Advanced { .. } => {
                let status = self.status_line(session);
                self.write_line(&status);
            }
        }
    }
}

fn fmt_point(point: Option<Point2D>) -> String {
    match point {
        Some(p) => format!("({:.1}, {:.1})", p.x, p.y),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AnnotationEvent;

    #[test]
    fn test_renderer_shows_reference_and_mark() {
        let reference = vec![vec![Some(Point2D::new(10.0, 20.0)), None]];
        let mut renderer = TerminalRenderer::new(Vec::new(), reference);
        let mut session = AnnotationSession::new(&[2]).unwrap();

        renderer.on_start(&session);
        let signal = session.handle(AnnotationEvent::Mark(Point2D::new(11.0, 21.0)));
        renderer.on_transition(&session, &signal);

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "[segment 1/1] frame 1/2  tracked (10.0, 20.0)  marked -  (0 marked)"
        );
        assert_eq!(
            lines[1],
            "[segment 1/1] frame 2/2  tracked -  marked -  (1 marked)"
        );
    }

    #[test]
    fn test_renderer_announces_completion() {
        let mut renderer = TerminalRenderer::new(Vec::new(), vec![]);
        let mut session = AnnotationSession::new(&[1]).unwrap();
        let signal = session.handle(AnnotationEvent::Mark(Point2D::new(1.0, 1.0)));
        renderer.on_transition(&session, &signal);

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with("Segment 1 complete"));
        assert!(text.contains("marked (1.0, 1.0)"));
    }

    #[test]
    fn test_signal_log_records_in_order() {
        let mut log = SignalLog::default();
        let mut session = AnnotationSession::new(&[2]).unwrap();
        for event in [AnnotationEvent::Next, AnnotationEvent::Close] {
            let signal = session.handle(event);
            log.on_transition(&session, &signal);
        }
        assert_eq!(log.signals.len(), 2);
        assert_eq!(log.signals[1], SessionSignal::Closed);
    }
}
