//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous submission to the assessment service

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::ArtifactLoader;
use crate::application::AssessmentService;
use crate::config::AppConfig;
use crate::HeartCheckError;

use super::ui::{
    form::{render_form, FormState},
    glossary::render_glossary,
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Glossary,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    service: AssessmentService,
    form_state: FormState,
    result_state: ResultState,
}

impl App {
    /// Load the configured artifacts and build the application.
    ///
    /// # Errors
    /// Returns error if the model or scaler cannot be loaded and verified.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ArtifactLoader::new(config.integrity.clone());
        let context = loader
            .load(&config.model_path, &config.scaler_path)
            .map_err(|e| {
                anyhow!(
                    "{e}. Set HEARTCHECK_MODEL_PATH and HEARTCHECK_SCALER_PATH to the exported artifacts."
                )
            })?;

        Ok(Self::with_service(AssessmentService::new(context)))
    }

    /// Create the application around an already loaded service.
    #[must_use]
    pub fn with_service(service: AssessmentService) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form_state: FormState::default(),
            result_state: ResultState::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(4)])
                    .split(f.area());

                match self.screen {
                    Screen::Form => render_form(f, chunks[0], &self.form_state),
                    Screen::Glossary => render_glossary(f, chunks[0]),
                    Screen::Result => render_result(
                        f,
                        chunks[0],
                        &self.result_state,
                        self.service.model_name(),
                    ),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Glossary => self.handle_glossary_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::F(1) => {
                self.screen = Screen::Glossary;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.step(false);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.form_state.step(true);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_glossary_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
            self.screen = Screen::Form;
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state.clear_sensitive();
                self.result_state = ResultState::Empty;
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let input = match self.form_state.to_patient_input() {
            Ok(input) => input,
            Err(message) => {
                self.form_state.error_message = Some(message);
                return;
            }
        };

        match self.service.assess(&input) {
            Ok(assessment) => {
                self.result_state = ResultState::Complete { assessment };
                self.screen = Screen::Result;
            }
            Err(HeartCheckError::Validation(message)) => {
                self.form_state.error_message = Some(message);
            }
            Err(e) => {
                tracing::error!("Assessment failed: {}", e);
                self.result_state = ResultState::Error {
                    message: e.to_string(),
                };
                self.screen = Screen::Result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLabel;
    use std::path::Path;

    fn test_app() -> App {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let context = ArtifactLoader::default()
            .load(
                &root.join("model/bernoulli_naive_bayes_model.json"),
                &root.join("model/scaler.json"),
            )
            .expect("Shipped artifacts should load");
        App::with_service(AssessmentService::new(context))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn result_label(app: &App) -> Option<RiskLabel> {
        match &app.result_state {
            ResultState::Complete { assessment } => Some(assessment.result.label),
            _ => None,
        }
    }

    #[test]
    fn test_submit_defaults_shows_result() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Result);
        assert_eq!(result_label(&app), Some(RiskLabel::Absent));

        // Back to the form keeps the answers.
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Form);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_sample_patient_is_present() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('S'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(result_label(&app), Some(RiskLabel::Present));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Form);
        assert!(matches!(app.result_state, ResultState::Empty));
        assert_eq!(app.form_state.fields[0].value, "30");
    }

    #[test]
    fn test_invalid_field_stays_on_form() {
        let mut app = test_app();
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Form);
        assert!(app
            .form_state
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("Age")));
    }

    #[test]
    fn test_glossary_and_quit() {
        let mut app = test_app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.screen(), Screen::Glossary);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Form);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
