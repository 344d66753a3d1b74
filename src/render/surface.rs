//! Surface - the document region the engine renders into

use std::sync::Arc;

use parking_lot::Mutex;

use super::bindings::Binding;
use crate::markup::Markup;

/// A region whose whole content is replaced on every render
pub trait Surface: Send {
    /// Replace the region's content
    fn replace(&mut self, markup: &Markup);

    /// Attach handlers for the freshly inserted content
    fn bind(&mut self, bindings: &[Binding]);
}

/// What a [`MemorySurface`] currently shows
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub html: String,
    pub bindings: Vec<Binding>,
    pub renders: u64,
}

/// In-memory surface; clones share the same frame
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    frame: Arc<Mutex<Frame>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> String {
        self.frame.lock().html.clone()
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.frame.lock().bindings.clone()
    }

    pub fn render_count(&self) -> u64 {
        self.frame.lock().renders
    }

    pub fn snapshot(&self) -> Frame {
        self.frame.lock().clone()
    }
}

impl Surface for MemorySurface {
    fn replace(&mut self, markup: &Markup) {
        let mut frame = self.frame.lock();
        frame.html = markup.as_str().to_string();
        frame.bindings.clear();
        frame.renders += 1;
    }

    fn bind(&mut self, bindings: &[Binding]) {
        self.frame.lock().bindings = bindings.to_vec();
    }
}
