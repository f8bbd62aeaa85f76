use ratatui::layout::Rect;

use crate::client::JokeAction;
use crate::page::{Document, CUSTOM_MODAL_ID, FIRST_NAME_ID, LAST_NAME_ID};
use crate::widget::{self, Applied, Completion, JokeWidget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which name input of the custom modal has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalField {
    #[default]
    First,
    Last,
}

impl ModalField {
    pub fn input_id(&self) -> &'static str {
        match self {
            ModalField::First => FIRST_NAME_ID,
            ModalField::Last => LAST_NAME_ID,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            ModalField::First => ModalField::Last,
            ModalField::Last => ModalField::First,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub modal_field: ModalField,

    pub document: Document,
    pub widget: JokeWidget,

    /// Requests sent and not yet completed.
    pub in_flight: usize,
    pub jokes_shown: usize,

    pub animation_frame: usize,

    // Panel areas for mouse hit-testing, in JokeAction::ALL order
    pub panel_areas: [Option<Rect>; 3],
}

impl App {
    pub fn new(widget: JokeWidget) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            modal_field: ModalField::default(),

            document: Document::home(),
            widget,

            in_flight: 0,
            jokes_shown: 0,

            animation_frame: 0,

            panel_areas: [None; 3],
        }
    }

    /// A "button press": random and personal fetch at once, custom opens the modal.
    pub fn trigger(&mut self, action: JokeAction) {
        match action {
            JokeAction::Random | JokeAction::Personal => {
                if self.widget.fetch(&self.document, action).is_some() {
                    self.in_flight += 1;
                }
            }
            JokeAction::Custom => self.open_custom_modal(),
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.document.is_dialog_open(CUSTOM_MODAL_ID)
    }

    pub fn open_custom_modal(&mut self) {
        self.document.show_dialog(CUSTOM_MODAL_ID);
        self.modal_field = ModalField::First;
        self.input_mode = InputMode::Editing;
    }

    /// Closing the modal, by any key, is what sends the custom request.
    pub fn dismiss_custom_modal(&mut self) {
        self.input_mode = InputMode::Normal;
        if self.widget.dismiss_custom_modal(&mut self.document).is_some() {
            self.in_flight += 1;
        }
    }

    pub fn modal_input(&self) -> &str {
        self.document
            .input_value(self.modal_field.input_id())
            .unwrap_or_default()
    }

    pub fn modal_input_mut(&mut self) -> Option<&mut String> {
        self.document.input_value_mut(self.modal_field.input_id())
    }

    pub fn next_modal_field(&mut self) {
        self.modal_field = self.modal_field.toggle();
    }

    pub fn on_completion(&mut self, completion: Completion) -> Applied {
        self.in_flight = self.in_flight.saturating_sub(1);
        let applied = widget::apply(&mut self.document, completion);
        if applied == Applied::Replaced {
            self.jokes_shown += 1;
        }
        applied
    }

    pub fn tick_animation(&mut self) {
        if self.in_flight > 0 {
            self.animation_frame = (self.animation_frame + 1) % 4;
        }
    }

    pub fn panel_at(&self, x: u16, y: u16) -> Option<JokeAction> {
        self.panel_areas
            .iter()
            .zip(JokeAction::ALL)
            .find(|(area, _)| area.map_or(false, |r| point_in_rect(x, y, r)))
            .map(|(_, action)| action)
    }
}

pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
