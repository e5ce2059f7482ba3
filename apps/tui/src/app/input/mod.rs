pub mod helpers;

use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_input(app: &mut App, key: KeyCode) {
    if handle_help_toggle(app, key) {
        return;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                app.select_tab(digit as usize - 1);
            }
        }
        KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Left => app.step_back(),
        KeyCode::Right => app.step_forward(),
        KeyCode::Home => app.jump_first(),
        KeyCode::End => app.jump_last(),
        KeyCode::Up => app.previous_month(),
        KeyCode::Down => app.next_month(),
        KeyCode::Char('r') => app.replay_entrance(),
        _ => {}
    }
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if matches!(key, KeyCode::F(1) | KeyCode::Char('?')) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::handle_input;
    use crate::app::state::App;
    use crossterm::event::KeyCode;
    use monsoon_radial::PageConfig;
    use monsoon_radial_tui::config::AppConfig;
    use std::path::PathBuf;

    fn app() -> App {
        App::new(&AppConfig {
            page: PageConfig::monsoon_default(),
            data_dir: PathBuf::from("."),
            log_file: PathBuf::from("test.log"),
        })
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = app();
        handle_input(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        handle_input(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn digits_select_tabs_in_range() {
        let mut app = app();
        handle_input(&mut app, KeyCode::Char('2'));
        assert_eq!(app.selected, 1);
        handle_input(&mut app, KeyCode::Char('9'));
        assert_eq!(app.selected, 1);
        handle_input(&mut app, KeyCode::Tab);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn quit_keys_stop_the_app() {
        let mut app = app();
        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }
}
