/// Anything the host can show or hide: a menu panel, a static backdrop, a video surface.
pub trait Visibility {
    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;
}

/// Display side of an on/off control.
///
/// Only the displayed value is pushed through here; user edits come back to the menu as
/// control events, never by reading the widget.
pub trait ToggleView {
    fn set_is_on(&mut self, on: bool);
}
