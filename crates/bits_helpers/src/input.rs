use bevy::prelude::*;

/// Where a single pointer (left mouse button or first touch) is in its press cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Pressed,
    Held,
    Released,
}

/// Last cursor position seen inside the window. Keep one in a `Local` so a
/// mouse release outside the window still reports where the pointer left.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LastCursor(pub Option<Vec2>);

/// Current pointer phase and screen position, touches taking priority over the mouse.
///
/// `cursor_position` is the window's cursor, `None` while it is outside.
pub fn pointer_screen_sample(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    cursor_position: Option<Vec2>,
    last_cursor: &mut LastCursor,
) -> Option<(PointerPhase, Vec2)> {
    if let Some(touch) = touch_input.iter_just_pressed().next() {
        return Some((PointerPhase::Pressed, touch.position()));
    }
    if let Some(touch) = touch_input
        .iter_just_released()
        .chain(touch_input.iter_just_canceled())
        .next()
    {
        return Some((PointerPhase::Released, touch.position()));
    }
    if let Some(touch) = touch_input.iter().next() {
        return Some((PointerPhase::Held, touch.position()));
    }

    if let Some(position) = cursor_position {
        last_cursor.0 = Some(position);
        if button_input.just_pressed(MouseButton::Left) {
            return Some((PointerPhase::Pressed, position));
        }
    }
    // A release must always end the press, even off-window.
    if button_input.just_released(MouseButton::Left) {
        return last_cursor.0.map(|position| (PointerPhase::Released, position));
    }
    if button_input.pressed(MouseButton::Left) {
        return cursor_position.map(|position| (PointerPhase::Held, position));
    }
    None
}

/// Same as [`pointer_screen_sample`], projected through the 2D camera.
pub fn pointer_world_sample(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    last_cursor: &mut LastCursor,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<(PointerPhase, Vec2)> {
    let window = windows.get_single().ok()?;
    let (phase, position) = pointer_screen_sample(
        button_input,
        touch_input,
        window.cursor_position(),
        last_cursor,
    )?;

    let (camera, camera_transform) = camera.get_single().ok()?;
    camera
        .viewport_to_world_2d(camera_transform, position)
        .map(|world| (phase, world))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn released_buttons() -> ButtonInput<MouseButton> {
        let mut buttons = ButtonInput::default();
        buttons.press(MouseButton::Left);
        buttons.clear();
        buttons.release(MouseButton::Left);
        buttons
    }

    #[test]
    fn mouse_press_hold_release_inside_the_window() {
        let touches = Touches::default();
        let mut last = LastCursor::default();
        let mut buttons = ButtonInput::default();

        buttons.press(MouseButton::Left);
        let at = Vec2::new(10.0, 20.0);
        let pressed = pointer_screen_sample(&buttons, &touches, Some(at), &mut last);
        assert_eq!(pressed, Some((PointerPhase::Pressed, at)), "press");

        buttons.clear();
        let at = Vec2::new(15.0, 20.0);
        let held = pointer_screen_sample(&buttons, &touches, Some(at), &mut last);
        assert_eq!(held, Some((PointerPhase::Held, at)), "hold");

        buttons.release(MouseButton::Left);
        let at = Vec2::new(30.0, 5.0);
        let released = pointer_screen_sample(&buttons, &touches, Some(at), &mut last);
        assert_eq!(released, Some((PointerPhase::Released, at)), "release");
    }

    #[test]
    fn release_outside_the_window_uses_the_last_cursor() {
        let touches = Touches::default();
        let mut last = LastCursor(Some(Vec2::new(200.0, 90.0)));

        let released = pointer_screen_sample(&released_buttons(), &touches, None, &mut last);
        assert_eq!(
            released,
            Some((PointerPhase::Released, Vec2::new(200.0, 90.0))),
            "an off-window release still ends the press"
        );
    }

    #[test]
    fn holding_outside_the_window_reports_nothing() {
        let touches = Touches::default();
        let mut last = LastCursor(Some(Vec2::ONE));
        let mut buttons = ButtonInput::default();
        buttons.press(MouseButton::Left);
        buttons.clear();

        assert_eq!(
            pointer_screen_sample(&buttons, &touches, None, &mut last),
            None,
            "no position to report while held off-window"
        );
        assert_eq!(last, LastCursor(Some(Vec2::ONE)), "last cursor is kept");
    }

    #[test]
    fn idle_cursor_is_remembered() {
        let touches = Touches::default();
        let mut last = LastCursor::default();
        let buttons = ButtonInput::default();

        assert_eq!(
            pointer_screen_sample(&buttons, &touches, Some(Vec2::new(4.0, 8.0)), &mut last),
            None,
            "no button, no sample"
        );
        assert_eq!(last, LastCursor(Some(Vec2::new(4.0, 8.0))), "position still tracked");
    }
}
