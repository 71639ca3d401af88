//! Framework-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the engines' keyboard handling from any particular event source
/// (DOM key events, crossterm, winit) so key handling can be tested without a
/// view layer. Adapters translate their native key events into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (activate or execute).
    Enter,
    /// Backspace key (delete last query character).
    Backspace,
    /// Tab key.
    Tab,
    /// Escape key (dismiss).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (jump to first).
    Home,
    /// End key (jump to last).
    End,
}
