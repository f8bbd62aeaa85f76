use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crate::app::{App, InputMode};
use crate::client::JokeAction;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Joke(completion) => {
            app.on_completion(completion);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_modal_editing(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('r') | KeyCode::Char('1') => app.trigger(JokeAction::Random),
        KeyCode::Char('p') | KeyCode::Char('2') => app.trigger(JokeAction::Personal),
        KeyCode::Char('c') | KeyCode::Char('3') => app.trigger(JokeAction::Custom),

        _ => {}
    }
}

fn handle_modal_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        // Either way out of the modal sends the request
        KeyCode::Esc | KeyCode::Enter => app.dismiss_custom_modal(),

        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.next_modal_field(),

        KeyCode::Backspace => {
            if let Some(input) = app.modal_input_mut() {
                input.pop();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(input) = app.modal_input_mut() {
                input.clear();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = app.modal_input_mut() {
                input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || app.is_modal_open() {
        return;
    }

    if let Some(action) = app.panel_at(mouse.column, mouse.row) {
        app.trigger(action);
    }
}
