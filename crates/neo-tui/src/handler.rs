use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, ProfileItem, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.is_blocked() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.acknowledge_blocking();
        }
        return;
    }

    if app.screen == Screen::Landing {
        handle_landing(app, key).await;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key).await,
        InputMode::Editing => handle_composer_editing(app, key),
        InputMode::AttachPath => handle_attach_path(app, key).await,
        InputMode::Search => handle_search_editing(app, key),
    }
}

async fn handle_landing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('l') => app.login().await,
        KeyCode::Char('t') => app.toggle_theme().await,
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if app.profile_menu.is_open() {
        handle_profile_menu(app, key).await;
        return;
    }
    if app.row_menu.is_open() {
        handle_row_menu(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => {
            app.dismiss();
        }

        // Navigation
        KeyCode::Char('n') => app.new_chat(),
        KeyCode::Char('c') => app.navigate(Screen::Chats),
        KeyCode::Char('m') => app.navigate(Screen::Memories),
        KeyCode::Char('h') if app.screen != Screen::Chat => app.navigate(Screen::Chat),
        KeyCode::Char('b') => app.toggle_sidebar(),
        KeyCode::Char('p') => app.toggle_profile_menu(),
        KeyCode::Char('t') => app.toggle_theme().await,

        KeyCode::Char('j') | KeyCode::Down => match app.screen {
            Screen::Chat => app.scroll_down(1),
            _ => app.select_next_row(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.screen {
            Screen::Chat => app.scroll_up(1),
            _ => app.select_prev_row(),
        },
        KeyCode::Char('G') if app.screen == Screen::Chat => app.follow_bottom = true,

        // Composer
        KeyCode::Char('i') | KeyCode::Enter if app.screen == Screen::Chat => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('a') if app.screen == Screen::Chat => {
            app.attach_input.clear();
            app.input_mode = InputMode::AttachPath;
        }
        KeyCode::Char('x') if app.screen == Screen::Chat => app.session.clear_attachment(),
        KeyCode::Char('v') if app.screen == Screen::Chat => app.toggle_dictation(),

        // List pages
        KeyCode::Char('/') if matches!(app.screen, Screen::Chats | Screen::Memories) => {
            app.input_mode = InputMode::Search;
        }
        KeyCode::Enter | KeyCode::Char('.') if app.screen != Screen::Chat => app.toggle_row_menu(),
        _ => {}
    }
}

async fn handle_profile_menu(app: &mut App, key: KeyEvent) {
    let last = ProfileItem::ALL.len() - 1;
    match key.code {
        KeyCode::Esc | KeyCode::Char('p') => {
            app.profile_menu.close();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.profile_selection = (app.profile_selection + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.profile_selection = app.profile_selection.saturating_sub(1);
        }
        KeyCode::Enter => app.activate_profile_item().await,
        _ => {}
    }
}

fn handle_row_menu(app: &mut App, key: KeyEvent) {
    let count = app.row_menu.current().map_or(0, |k| k.items().len());
    match key.code {
        KeyCode::Esc | KeyCode::Char('.') => {
            app.row_menu.close();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.row_menu_selection = (app.row_menu_selection + 1).min(count.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.row_menu_selection = app.row_menu_selection.saturating_sub(1);
        }
        KeyCode::Enter => app.activate_row_item(),
        _ => {}
    }
}

fn handle_composer_editing(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        // Alt+Enter or Ctrl+J inserts a newline
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => app.insert_newline(),
        KeyCode::Char('j') if ctrl => app.insert_newline(),
        KeyCode::Char('u') if ctrl => app.set_draft(String::new()),
        KeyCode::Enter => app.submit(),
        _ => app.edit_composer(key),
    }
}

async fn handle_attach_path(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.attach_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let path = std::mem::take(&mut app.attach_input);
            app.attach_path(&path).await;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.attach_input.pop();
        }
        KeyCode::Char(c) => app.attach_input.push(c),
        _ => {}
    }
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.query_mut().pop();
            app.clamp_selection();
        }
        KeyCode::Char(c) => {
            app.query_mut().push(c);
            app.clamp_selection();
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(mouse.column, mouse.row),
        MouseEventKind::ScrollUp if app.screen == Screen::Chat => app.scroll_up(3),
        MouseEventKind::ScrollDown if app.screen == Screen::Chat => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.select_prev_row(),
        MouseEventKind::ScrollDown => app.select_next_row(),
        _ => {}
    }
}
