//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nbx_core::DispatchError;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::notebook;
use crate::state::AppState;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tick = app.tick.wrapping_add(1);
            app.status_line.on_notebook(
                app.notebook.session.len(),
                app.notebook.animating_count(),
            );
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.size = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TypingScheduled { cell, schedule } => {
            notebook::handle_scheduled(&mut app.notebook, cell, schedule);
            vec![]
        }
        UiEvent::Typing {
            cell,
            schedule,
            event,
        } => {
            notebook::handle_typing(&mut app.notebook, cell, schedule, event);
            vec![]
        }
    }
}

/// Effects for the first frame: every initial cell starts typing.
pub fn startup_effects(app: &AppState) -> Vec<UiEffect> {
    notebook::start_all(&app.notebook)
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => {
            let result = notebook::handle_mouse(&mut app.notebook, mouse);
            report(app, result)
        }
        Event::Resize(_, _) => {
            app.notebook.hits.clear();
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let page = app.notebook.scroll.viewport_lines().max(1);

    match key.code {
        KeyCode::Char('c') if ctrl => quit(app),
        KeyCode::Char('q') | KeyCode::Esc => quit(app),
        KeyCode::Char('r') => {
            app.diagnostic = None;
            notebook::reset(&mut app.notebook)
        }
        KeyCode::Char('s') => notebook::skip_all(&mut app.notebook),
        KeyCode::Tab => {
            notebook::focus_next(&mut app.notebook);
            vec![]
        }
        KeyCode::BackTab => {
            notebook::focus_prev(&mut app.notebook);
            vec![]
        }
        KeyCode::Enter => {
            let result = notebook::activate_focused(&mut app.notebook);
            report(app, result)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.notebook.scroll.scroll_up(1);
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.notebook.scroll.scroll_down(1);
            vec![]
        }
        KeyCode::PageUp => {
            app.notebook.scroll.scroll_up(page);
            vec![]
        }
        KeyCode::PageDown => {
            app.notebook.scroll.scroll_down(page);
            vec![]
        }
        KeyCode::Home => {
            app.notebook.scroll.scroll_to_top();
            vec![]
        }
        KeyCode::End => {
            app.notebook.scroll.follow();
            vec![]
        }
        _ => vec![],
    }
}

fn quit(app: &mut AppState) -> Vec<UiEffect> {
    app.should_quit = true;
    vec![UiEffect::Quit]
}

/// Clears the diagnostic on success or records the failure.
fn report(app: &mut AppState, result: Result<Vec<UiEffect>, DispatchError>) -> Vec<UiEffect> {
    match result {
        Ok(effects) => {
            if !effects.is_empty() {
                app.diagnostic = None;
            }
            effects
        }
        Err(err) => {
            app.diagnostic = Some(err.to_string());
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent, MouseEventKind};
    use nbx_core::{Action, Cell, Datasets, Output, ScheduleId, Span, SpanKind, TypingEvent};

    use super::*;
    use crate::notebook::{Hit, TargetRef};
    use crate::state::NotebookOptions;

    fn app() -> AppState {
        AppState::new(Datasets::builtin().unwrap(), &NotebookOptions::default())
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn drive_to_done(app: &mut AppState, cell: usize) {
        let schedule = ScheduleId::default().next();
        let len = app.notebook.session.cells()[cell].code_len();
        update(app, UiEvent::TypingScheduled { cell, schedule });
        for event in [
            TypingEvent::Started,
            TypingEvent::Revealed(len),
            TypingEvent::Done,
        ] {
            update(
                app,
                UiEvent::Typing {
                    cell,
                    schedule,
                    event,
                },
            );
        }
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = app();
            assert_eq!(update(&mut app, key(code)), vec![UiEffect::Quit]);
            assert!(app.should_quit);
        }

        let mut app = app();
        let ctrl_c = UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(update(&mut app, ctrl_c), vec![UiEffect::Quit]);
    }

    #[test]
    fn test_typing_events_reach_notebook() {
        let mut app = app();
        assert!(app.notebook.is_animating());

        drive_to_done(&mut app, 0);

        assert!(!app.notebook.is_animating());
        update(&mut app, UiEvent::Tick);
        let snap = app.status_line.snapshot();
        assert_eq!((snap.cells, snap.animating), (1, 0));
    }

    #[test]
    fn test_enter_on_focused_target_appends_cell() {
        let mut app = app();
        drive_to_done(&mut app, 0);

        update(&mut app, key(KeyCode::Tab));
        assert!(app.tooltip().is_some());

        let effects = update(&mut app, key(KeyCode::Enter));

        assert_eq!(app.notebook.session.len(), 2);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::StartTyping { cell: 1, .. }]
        ));
    }

    #[test]
    fn test_failed_click_sets_diagnostic_and_reset_clears_it() {
        let mut app = app();
        app.notebook.session.append(
            Cell::new("broken", Output::Empty).with_spans(vec![
                Span::new(0, 6, SpanKind::Keyword).with_action(Action::load("missing_data")),
            ]),
        );
        app.notebook.animations.push(crate::notebook::CellAnimation::pending(6));
        app.notebook.hits.replace(
            vec![Hit {
                row: 2,
                col_start: 9,
                col_end: 15,
                target: TargetRef::span(1, 0),
            }],
            vec![],
        );

        let click = UiEvent::Terminal(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 2,
            modifiers: KeyModifiers::NONE,
        }));
        assert!(update(&mut app, click).is_empty());
        assert_eq!(
            app.diagnostic.as_deref(),
            Some("Dataset 'missing_data' not found")
        );
        assert_eq!(app.notebook.session.len(), 2);

        let effects = update(&mut app, key(KeyCode::Char('r')));
        assert_eq!(app.diagnostic, None);
        assert_eq!(app.notebook.session.len(), 1);
        assert_eq!(effects.first(), Some(&UiEffect::CancelAllTyping));
    }

    #[test]
    fn test_skip_key() {
        let mut app = app();
        assert_eq!(
            update(&mut app, key(KeyCode::Char('s'))),
            vec![UiEffect::CancelAllTyping]
        );
        assert!(!app.notebook.is_animating());
    }

    #[test]
    fn test_cursor_blinks() {
        let mut app = app();
        assert!(app.cursor_visible());
        for _ in 0..8 {
            update(&mut app, UiEvent::Tick);
        }
        assert!(!app.cursor_visible());
    }

    #[test]
    fn test_startup_effects_cover_initial_cells() {
        let app = app();
        assert!(matches!(
            startup_effects(&app).as_slice(),
            [UiEffect::StartTyping { cell: 0, .. }]
        ));
    }
}
