//! Annotation session state machine.
//!
//! All state lives in [`AnnotationSession`]; every input is an
//! [`AnnotationEvent`] applied by [`AnnotationSession::handle`], which runs
//! to completion and reports what happened as a [`SessionSignal`].

use headtrack_model::annotation::PointStore;
use headtrack_model::point::Point2D;

/// Position of the frame being annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub segment: usize,
    pub frame: usize,
}

impl Cursor {
    pub fn new(segment: usize, frame: usize) -> Self {
        Self { segment, frame }
    }
}

/// User input, independent of how it was delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationEvent {
    /// Go to the previous frame.
    Prev,
    /// Go to the next frame.
    Next,
    /// Mark a point on the current frame.
    Mark(Point2D),
    /// Finish the session.
    Close,
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionSignal {
    /// Cursor moved by navigation.
    Moved(Cursor),
    /// Point stored; cursor jumped to the first unmarked frame of the segment.
    Advanced { marked: Cursor, to: Cursor },
    /// Point stored and every frame of the segment is now marked. Cursor unchanged.
    SegmentComplete { marked: Cursor },
    /// Session closed; the store is final.
    Closed,
    /// Event arrived after close.
    Ignored,
}

/// Session state: cursor, points, and whether the session has closed.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    cursor: Cursor,
    store: PointStore,
    closed: bool,
}

impl AnnotationSession {
    /// Start an empty session with `frame_counts[s]` frames in segment `s`.
    pub fn new(frame_counts: &[usize]) -> Result<Self, SessionError> {
        Self::with_store(PointStore::new(frame_counts))
    }

    /// Resume from existing points. The cursor starts at the first unmarked
    /// frame, or at the first frame when everything is marked.
    pub fn with_store(store: PointStore) -> Result<Self, SessionError> {
        if store.segment_count() == 0 {
            return Err(SessionError::NoSegments);
        }
        if let Some(segment) = (0..store.segment_count()).find(|&s| store.frame_count(s) == 0) {
            return Err(SessionError::EmptySegment { segment });
        }

        let cursor = (0..store.segment_count())
            .find_map(|s| store.first_unmarked(s).map(|f| Cursor::new(s, f)))
            .unwrap_or(Cursor::new(0, 0));

        Ok(Self {
            cursor,
            store,
            closed: false,
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Final points; consumes the session.
    pub fn into_store(self) -> PointStore {
        self.store
    }

    pub fn segment_count(&self) -> usize {
        self.store.segment_count()
    }

    /// Frames in the current segment.
    pub fn current_frame_count(&self) -> usize {
        self.store.frame_count(self.cursor.segment)
    }

    /// Point on the current frame, if marked.
    pub fn current_point(&self) -> Option<Point2D> {
        self.store.get(self.cursor.segment, self.cursor.frame)
    }

    /// Apply one event.
    pub fn handle(&mut self, event: AnnotationEvent) -> SessionSignal {
        if self.closed {
            return SessionSignal::Ignored;
        }

        let signal = match event {
            AnnotationEvent::Prev => {
                self.cursor = self.previous();
                SessionSignal::Moved(self.cursor)
            }
            AnnotationEvent::Next => {
                self.cursor = self.next();
                SessionSignal::Moved(self.cursor)
            }
            AnnotationEvent::Mark(point) => self.mark(point),
            AnnotationEvent::Close => {
                self.closed = true;
                SessionSignal::Closed
            }
        };

        tracing::trace!(?event, ?signal, "Session transition");
        signal
    }

    fn previous(&self) -> Cursor {
        let Cursor { segment, frame } = self.cursor;
        if frame > 0 {
            return Cursor::new(segment, frame - 1);
        }
        let segments = self.store.segment_count();
        let prev = (segment + segments - 1) % segments;
        Cursor::new(prev, self.store.frame_count(prev) - 1)
    }

    fn next(&self) -> Cursor {
        let Cursor { segment, frame } = self.cursor;
        if frame + 1 < self.store.frame_count(segment) {
            return Cursor::new(segment, frame + 1);
        }
        Cursor::new((segment + 1) % self.store.segment_count(), 0)
    }

    fn mark(&mut self, point: Point2D) -> SessionSignal {
        let marked = self.cursor;
        // The cursor always addresses an existing slot.
        self.store.set(marked.segment, marked.frame, point);

        match self.store.first_unmarked(marked.segment) {
            Some(frame) => {
                self.cursor = Cursor::new(marked.segment, frame);
                SessionSignal::Advanced {
                    marked,
                    to: self.cursor,
                }
            }
            None => {
                tracing::info!(segment = marked.segment, "Segment complete");
                SessionSignal::SegmentComplete { marked }
            }
        }
    }
}

/// Errors that can occur when starting a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Annotation session needs at least one segment")]
    NoSegments,

    #[error("Segment {segment} has no frames")]
    EmptySegment { segment: usize },
}
