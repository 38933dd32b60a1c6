//! Detection observers
//!
//! The detector reports every intermediate rectangle to a caller-supplied
//! [`DetectionObserver`]. Nothing is logged unless the caller asks for it.

use super::types::{Edge, Frame};

/// Receives the intermediate states of a frame detection.
///
/// Every method has a no-op default so implementors only override what
/// they care about.
pub trait DetectionObserver {
    /// Called once before scanning, with the control color in 16-bit channels
    fn on_image(&mut self, _width: u32, _height: u32, _control: [u32; 3]) {}

    /// Called after each directional scan with the working rectangle
    fn on_edge(&mut self, _edge: Edge, _found: bool, _frame: &Frame) {}

    /// Called with the content rectangle once all scans are done
    fn on_content(&mut self, _content: &Frame, _blank: bool) {}

    /// Called with the final frame after margin expansion and clamping
    fn on_frame(&mut self, _frame: &Frame, _margin: u32) {}
}

/// Observer that discards all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl DetectionObserver for NullObserver {}

/// Observer that forwards events to `tracing`
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    /// `label` identifies the image in every emitted event
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl DetectionObserver for TracingObserver {
    fn on_image(&mut self, width: u32, height: u32, control: [u32; 3]) {
        tracing::debug!(
            image = %self.label,
            width,
            height,
            control = ?control,
            "image size"
        );
    }

    fn on_edge(&mut self, edge: Edge, found: bool, frame: &Frame) {
        tracing::debug!(
            image = %self.label,
            edge = edge.name(),
            found,
            frame = %frame,
            "edge scanned"
        );
    }

    fn on_content(&mut self, content: &Frame, blank: bool) {
        if blank {
            tracing::warn!(image = %self.label, "no content found, image is a single color");
        }
        tracing::info!(image = %self.label, content = %content, "found picture");
    }

    fn on_frame(&mut self, frame: &Frame, margin: u32) {
        tracing::info!(image = %self.label, margin, frame = %frame, "frame with margin");
    }
}

/// One recorded observer callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionEvent {
    Image {
        width: u32,
        height: u32,
        control: [u32; 3],
    },
    Edge {
        edge: Edge,
        found: bool,
        frame: Frame,
    },
    Content {
        content: Frame,
        blank: bool,
    },
    Final {
        frame: Frame,
        margin: u32,
    },
}

/// Observer that keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<DetectionEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Working rectangle after each scan, in scan order
    pub fn edge_frames(&self) -> Vec<(Edge, Frame)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DetectionEvent::Edge { edge, frame, .. } => Some((*edge, *frame)),
                _ => None,
            })
            .collect()
    }
}

impl DetectionObserver for RecordingObserver {
    fn on_image(&mut self, width: u32, height: u32, control: [u32; 3]) {
        self.events.push(DetectionEvent::Image {
            width,
            height,
            control,
        });
    }

    fn on_edge(&mut self, edge: Edge, found: bool, frame: &Frame) {
        self.events.push(DetectionEvent::Edge {
            edge,
            found,
            frame: *frame,
        });
    }

    fn on_content(&mut self, content: &Frame, blank: bool) {
        self.events.push(DetectionEvent::Content {
            content: *content,
            blank,
        });
    }

    fn on_frame(&mut self, frame: &Frame, margin: u32) {
        self.events.push(DetectionEvent::Final {
            frame: *frame,
            margin,
        });
    }
}
