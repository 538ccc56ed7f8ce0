//! Interaction mode and the main menu.

/// Mode shared by the keypad/LCD and the serial console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    MainMenu,
    /// Custom text editor on the keypad.
    TextInput,
    /// Key editor on the keypad.
    KeyInput,
    /// A card operation is running; input is ignored.
    Processing,
    /// Waiting for a line of custom text on the console.
    SerialTextInput,
    /// Waiting for a 12 digit hex key on the console.
    SerialKeyInput,
}

/// Main menu entries in keypad order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    WriteDefault,
    WriteCustom,
    ReadCard,
    FormatCard,
    ChangeKey,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::WriteDefault,
        MenuItem::WriteCustom,
        MenuItem::ReadCard,
        MenuItem::FormatCard,
        MenuItem::ChangeKey,
    ];

    /// Console numbering, which lists the card operations first.
    pub const SERIAL_ORDER: [MenuItem; 5] = [
        MenuItem::WriteDefault,
        MenuItem::ReadCard,
        MenuItem::FormatCard,
        MenuItem::WriteCustom,
        MenuItem::ChangeKey,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::WriteDefault => "Write Default",
            MenuItem::WriteCustom => "Write Custom",
            MenuItem::ReadCard => "Read Card",
            MenuItem::FormatCard => "Format Card",
            MenuItem::ChangeKey => "Change Key",
        }
    }

    /// Parse a console menu choice (`"1"`..`"5"`).
    pub fn from_serial(choice: &str) -> Option<MenuItem> {
        match choice.trim().as_bytes() {
            [digit @ b'1'..=b'5'] => Some(Self::SERIAL_ORDER[usize::from(digit - b'1')]),
            _ => None,
        }
    }
}

/// Highlighted main menu entry, wrapping at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuSelection {
    index: usize,
}

impl MenuSelection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> MenuItem {
        MenuItem::ALL[self.index]
    }

    /// Entry shown on the second LCD row.
    pub fn following(&self) -> MenuItem {
        MenuItem::ALL[(self.index + 1) % MenuItem::ALL.len()]
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % MenuItem::ALL.len();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }
}
