//! Gamepad polling through gilrs

use gilrs::{Button, EventType, Gilrs};

use super::{DevicePoller, Direction, InputEvent};

/// Translates gilrs button presses into menu events.
pub struct GamepadPoller {
    gilrs: Gilrs,
}

impl GamepadPoller {
    /// Returns `None` if gamepad support could not be initialized.
    pub fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => Some(Self { gilrs }),
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                    e
                );
                None
            }
        }
    }
}

fn map_button(button: Button) -> Option<InputEvent> {
    Some(match button {
        Button::DPadUp => InputEvent::Navigate(Direction::Up),
        Button::DPadDown => InputEvent::Navigate(Direction::Down),
        Button::DPadLeft => InputEvent::Navigate(Direction::Left),
        Button::DPadRight => InputEvent::Navigate(Direction::Right),
        // South=A, East=B in Xbox layout
        Button::South => InputEvent::Confirm,
        Button::East => InputEvent::Back,
        Button::Start => InputEvent::Menu,
        _ => return None,
    })
}

impl DevicePoller for GamepadPoller {
    fn poll(&mut self, events: &mut Vec<InputEvent>) {
        while let Some(event) = self.gilrs.next_event() {
            let id = usize::from(event.id);
            match event.event {
                EventType::ButtonPressed(button, _) => events.extend(map_button(button)),
                EventType::Connected => events.push(InputEvent::DeviceConnected(id)),
                EventType::Disconnected => events.push(InputEvent::DeviceDisconnected(id)),
                _ => {}
            }
        }
    }
}
