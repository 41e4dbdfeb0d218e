//! Input event types for keyboard, mouse, and scroll handling.
//!
//! These types abstract over native platform event details and provide a
//! clean Rust-native interface for input handling. The platform collaborator
//! translates its native events into this representation and queues them;
//! the toolkit drains the queue once per frame.

/// A platform input event.
///
/// One event is dispatched to widget logic per frame. If several events
/// queue up between frames, the toolkit drains them into a single
/// representative dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The window was resized to the given size in pixels.
    WindowResize { width: f32, height: f32 },
    /// Scroll wheel / trackpad delta, with the mouse position at the time
    /// of the event so multi-pane layouts can hit-test the target.
    Scroll { dx: f32, dy: f32, x: f32, y: f32 },
    /// Mouse moved to the given position (view coordinates, origin top-left).
    MouseMove { x: f32, y: f32 },
    /// Mouse button pressed.
    MouseDown { x: f32, y: f32, modifiers: Modifiers },
    /// Mouse button released.
    MouseUp { x: f32, y: f32, modifiers: Modifiers },
    /// Key pressed.
    KeyDown { key: Key, modifiers: Modifiers },
    /// Key released.
    KeyUp { key: Key, modifiers: Modifiers },
    /// Committed text input (already composed; one or more characters).
    Text(String),
}

impl Event {
    /// Returns the pointer position carried by this event, if any.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Event::Scroll { x, y, .. }
            | Event::MouseMove { x, y }
            | Event::MouseDown { x, y, .. }
            | Event::MouseUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }

    /// Returns true for mouse-button and mouse-move events.
    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            Event::MouseMove { .. } | Event::MouseDown { .. } | Event::MouseUp { .. }
        )
    }
}

/// Modifier keys that can be held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift key
    pub shift: bool,
    /// Control key
    pub control: bool,
    /// Alt / Option key
    pub alt: bool,
    /// Meta key (Cmd on macOS, Win/Super elsewhere)
    pub meta: bool,
}

impl Modifiers {
    /// Returns true if no modifier keys are held.
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.control && !self.alt && !self.meta
    }

    /// Returns true if only shift is held.
    pub fn is_shift_only(&self) -> bool {
        self.shift && !self.control && !self.alt && !self.meta
    }
}

/// Keys that can be pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (already accounts for shift state)
    Char(char),
    /// Backspace / delete backward
    Backspace,
    /// Forward delete
    Delete,
    /// Return / Enter
    Return,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Home key
    Home,
    /// End key
    End,
    /// Tab key
    Tab,
    /// Escape key
    Escape,
    /// Page Up
    PageUp,
    /// Page Down
    PageDown,
}

/// Whole-string clipboard access provided by the platform collaborator.
pub trait Clipboard {
    /// Returns the current clipboard contents, if any.
    fn get(&mut self) -> Option<String>;

    /// Replaces the clipboard contents.
    fn set(&mut self, text: &str);
}
