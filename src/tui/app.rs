//! Main TUI application.
//!
//! Handles:
//! - Terminal setup and teardown
//! - Input event handling
//! - Synchronous submission through the prediction service

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
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

use crate::adapters::{LogisticRegression, ModelArtifacts, StandardScaler};
use crate::application::PredictionService;
use crate::config::AppConfig;
use crate::HeartcheckError;

use super::ui::{
    form::{render_form, FormState, Outcome},
    render_disclaimer,
};

type Service = PredictionService<StandardScaler, LogisticRegression>;

/// Main application state
pub struct App {
    /// Whether the app should quit
    should_quit: bool,

    prediction_service: Service,

    form_state: FormState,
}

impl App {
    /// Create a new application, loading the model artifacts named by `config`.
    ///
    /// # Errors
    /// Returns error if the artifacts are missing or fail their checks.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let model_dir = &config.model_dir;
        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set HEARTCHECK_MODEL_PATH to a directory containing scaler.json and logreg_model.json.",
                model_dir
            ));
        }

        // Refuse to start without a usable model.
        let artifacts = ModelArtifacts::load(model_dir, config.require_manifest)
            .with_context(|| format!("Failed to load model from {model_dir:?}"))?;

        Ok(Self::with_service(PredictionService::new(
            artifacts.scaler,
            artifacts.classifier,
        )))
    }

    /// Create application with an injected prediction service.
    #[must_use]
    pub fn with_service(prediction_service: Service) -> Self {
        Self {
            should_quit: false,
            prediction_service,
            form_state: FormState::default(),
        }
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
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(f.area());

                render_form(f, chunks[0], &self.form_state);
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

        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.cycle(false),
            KeyCode::Right => self.form_state.cycle(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form_state.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.form_state.reset(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let inputs = match self.form_state.to_raw_inputs() {
            Ok(inputs) => inputs,
            Err(message) => {
                self.form_state.outcome = Some(Outcome::Invalid(message));
                return;
            }
        };

        self.form_state.outcome = Some(match self.prediction_service.submit(&inputs) {
            Ok(result) => Outcome::Prediction(result),
            Err(e @ HeartcheckError::Validation(_)) => Outcome::Invalid(e.to_string()),
            Err(e) => Outcome::Fault(e.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::INCOMPLETE_SELECTION_MESSAGE;

    fn test_app() -> App {
        App::new(&AppConfig::default()).expect("shipped models load")
    }

    #[test]
    fn test_missing_model_dir_fails_fast() {
        let config = AppConfig {
            model_dir: "does/not/exist".into(),
            ..AppConfig::default()
        };
        let err = App::new(&config).err().expect("must fail");
        assert!(err.to_string().contains("HEARTCHECK_MODEL_PATH"));
    }

    #[test]
    fn test_submit_empty_form_shows_incomplete_message() {
        let mut app = test_app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            app.form_state.outcome,
            Some(Outcome::Invalid(INCOMPLETE_SELECTION_MESSAGE.to_string()))
        );
    }

    #[test]
    fn test_submit_sample_predicts() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(app.form_state.outcome, Some(Outcome::Prediction(_))));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit);
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.should_quit);
    }
}
