use std::fmt;

/// User activity that keeps a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityEvent {
    pub const ALL: [ActivityEvent; 6] = [
        ActivityEvent::PointerDown,
        ActivityEvent::PointerMove,
        ActivityEvent::KeyPress,
        ActivityEvent::Scroll,
        ActivityEvent::TouchStart,
        ActivityEvent::Click,
    ];
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActivityEvent::PointerDown => write!(f, "pointer-down"),
            ActivityEvent::PointerMove => write!(f, "pointer-move"),
            ActivityEvent::KeyPress => write!(f, "key-press"),
            ActivityEvent::Scroll => write!(f, "scroll"),
            ActivityEvent::TouchStart => write!(f, "touch-start"),
            ActivityEvent::Click => write!(f, "click"),
        }
    }
}

/// The page an idle session timer runs against.
///
/// Missing page elements are not errors: a page without a warning modal simply
/// gets no countdown, and a countdown without a display still counts down.
pub trait SessionSurface: Send {
    /// Whether the page carries the signed-in indicator.
    fn is_signed_in(&self) -> bool;

    /// Shows the warning modal. Returns false when the page has none.
    fn show_warning(&mut self) -> bool;

    fn hide_warning(&mut self);

    fn render_countdown(&mut self, remaining: u32);

    /// Navigates to the sign-out action.
    fn sign_out(&mut self);
}
