//! Widget traits shared by the form fields and the markdown view.

use crate::core::input_event::InputEvent;

/// Widget that draws itself into lines of at most `width` columns.
pub trait Component {
    fn render(&mut self, width: usize) -> Vec<String>;

    fn handle_event(&mut self, _event: &InputEvent) {}

    /// Space granted by the parent. Scrolling widgets honour `rows`; the
    /// rest only look at `cols` when rendering.
    fn set_viewport_size(&mut self, _cols: usize, _rows: usize) {}

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }
}

/// Widget that shows a cursor or highlight while focused.
pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
