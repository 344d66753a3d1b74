//! Render Engine - dispatch, whole-tree replace, rebind
//!
//! ```text
//! AppState ──► auth gate ──► loading? ──► view fn ──► Surface::replace
//!                                                       │
//!                                   scan(markup) ◄──────┘
//!                                        │
//!                                        ▼
//!                        HandlerRegistry + Surface::bind
//! ```

mod bindings;
mod surface;

pub use bindings::{hook, scan, Binding, EventKind, HandlerRegistry};
pub use surface::{Frame, MemorySurface, Surface};

use tracing::debug;

use crate::markup::Markup;
use crate::state::{AppState, Collection, View};
use crate::views;

/// Result of one render pass
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub view: View,
    pub markup: Markup,
    pub bindings: Vec<Binding>,
    /// True when the auth gate rewrote the requested view
    pub redirected: bool,
}

/// View the gate allows for this state
pub fn effective_view(state: &AppState) -> View {
    if !state.is_authenticated() && !state.current_view.is_public() {
        View::Login
    } else {
        state.current_view
    }
}

/// Produce markup and bindings for a state, applying the auth gate in place
pub fn render(state: &mut AppState) -> RenderOutput {
    // Checked on every render, not only on navigation
    let gated = effective_view(state);
    let redirected = gated != state.current_view;
    if redirected {
        debug!(requested = %state.current_view, "Auth gate redirect to login");
        state.current_view = gated;
        state.view_param = None;
    }

    if state.is_loading && state.collection(Collection::Listings).is_empty() && !gated.is_public()
    {
        return RenderOutput {
            view: gated,
            markup: views::loading(),
            bindings: Vec::new(),
            redirected,
        };
    }

    let markup = views::render_view(gated, state, state.view_param.as_deref());
    let bindings = scan(&markup);

    RenderOutput {
        view: gated,
        markup,
        bindings,
        redirected,
    }
}

/// Owns the surface and the handlers attached to its current tree
pub struct RenderEngine {
    surface: Box<dyn Surface>,
    registry: HandlerRegistry,
    renders: u64,
}

impl RenderEngine {
    pub fn new(surface: impl Surface + 'static) -> Self {
        Self {
            surface: Box::new(surface),
            registry: HandlerRegistry::new(),
            renders: 0,
        }
    }

    /// Render the state into the surface and rebind handlers
    pub fn render(&mut self, state: &mut AppState) -> View {
        let output = render(state);
        self.surface.replace(&output.markup);
        self.surface.bind(&output.bindings);
        self.registry = HandlerRegistry::from_bindings(&output.bindings);
        self.renders += 1;
        debug!(
            view = %output.view,
            bindings = output.bindings.len(),
            render = self.renders,
            "Rendered"
        );
        output.view
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
