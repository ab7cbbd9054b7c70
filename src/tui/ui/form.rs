//! Risk factor input form.
//!
//! Every control is generated from the feature catalog: numeric entries,
//! the vessel-count slider and the selection lists with a leading placeholder.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    FeatureKind, FeatureSpec, NumericInput, PredictionResult, RawInput, FEATURE_CATALOG,
};
use crate::tui::styles::MedicalTheme;

/// Text shown for a selection list with nothing chosen.
pub const PLACEHOLDER: &str = "Select...";

/// Current value of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Typed number; empty means the default of 0
    Text(String),
    Slider(i32),
    /// Index into the field's choices
    Selection(Option<usize>),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FeatureSpec,
    pub value: FieldValue,
}

impl FormField {
    fn new(spec: &'static FeatureSpec) -> Self {
        let value = match spec.kind {
            FeatureKind::Numeric(NumericInput::Slider { min, .. }) => FieldValue::Slider(min),
            FeatureKind::Numeric(_) => FieldValue::Text(String::new()),
            FeatureKind::Categorical(_) => FieldValue::Selection(None),
        };
        Self { spec, value }
    }

    /// Text shown in the control.
    #[must_use]
    pub fn display(&self) -> String {
        match (&self.value, self.spec.kind) {
            (FieldValue::Text(text), _) => text.clone(),
            (FieldValue::Slider(v), FeatureKind::Numeric(NumericInput::Slider { min, max })) => {
                let track: String = (min..=max)
                    .map(|i| if i == *v { '●' } else { '─' })
                    .collect();
                format!("◀ {v} ▶  {min} {track} {max}")
            }
            (FieldValue::Slider(v), _) => v.to_string(),
            (FieldValue::Selection(None), _) => PLACEHOLDER.to_string(),
            (FieldValue::Selection(Some(i)), _) => self
                .spec
                .choices()
                .get(*i)
                .map_or_else(|| PLACEHOLDER.to_string(), |c| c.label.to_string()),
        }
    }

    /// Hint shown while a numeric entry is empty.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self.spec.kind {
            FeatureKind::Numeric(NumericInput::Decimal) => "0.0",
            _ => "0",
        }
    }

    fn accepts(&self, c: char) -> bool {
        match self.spec.kind {
            FeatureKind::Numeric(NumericInput::Integer) => c.is_ascii_digit() || c == '-',
            FeatureKind::Numeric(NumericInput::Decimal) => {
                c.is_ascii_digit() || c == '-' || c == '.'
            }
            _ => false,
        }
    }

    fn to_raw_input(&self) -> Result<RawInput, String> {
        match &self.value {
            FieldValue::Text(text) if text.trim().is_empty() => {
                Ok(RawInput::Numeric(self.spec.numeric_default()))
            }
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(RawInput::Numeric)
                .map_err(|_| format!("{}: Invalid number", self.spec.label)),
            FieldValue::Slider(v) => Ok(RawInput::Numeric(f64::from(*v))),
            FieldValue::Selection(selected) => Ok(RawInput::Categorical(
                selected
                    .and_then(|i| self.spec.choices().get(i))
                    .map(|c| c.label.to_string()),
            )),
        }
    }
}

/// What the last submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Prediction(PredictionResult),
    /// Form-level error the user can fix (incomplete selection, bad number)
    Invalid(String),
    /// Model or artifact fault
    Fault(String),
}

/// Form state
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub outcome: Option<Outcome>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: FEATURE_CATALOG.iter().map(FormField::new).collect(),
            selected_field: 0,
            outcome: None,
        }
    }
}

impl FormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    fn current(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    /// Add a character to the current numeric entry
    pub fn input_char(&mut self, c: char) {
        let field = self.current();
        if !field.accepts(c) {
            return;
        }
        if let FieldValue::Text(text) = &mut field.value {
            text.push(c);
            self.outcome = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldValue::Text(text) = &mut self.current().value {
            text.pop();
            self.outcome = None;
        }
    }

    /// Return the current control to its initial state
    pub fn clear_field(&mut self) {
        let spec = self.current().spec;
        if let FieldValue::Text(text) = &mut self.current().value {
            text.zeroize();
        }
        *self.current() = FormField::new(spec);
        self.outcome = None;
    }

    /// Step the slider or selection list forward or backward.
    ///
    /// Selection lists cycle through the placeholder followed by the choices.
    pub fn cycle(&mut self, forward: bool) {
        let field = self.current();
        let spec = field.spec;
        match (&mut field.value, spec.kind) {
            (FieldValue::Slider(v), FeatureKind::Numeric(NumericInput::Slider { min, max })) => {
                *v = if forward { (*v + 1).min(max) } else { (*v - 1).max(min) };
            }
            (FieldValue::Selection(selected), FeatureKind::Categorical(choices)) => {
                // Position 0 is the placeholder.
                let slots = choices.len() + 1;
                let pos = selected.map_or(0, |i| i + 1);
                let next = if forward {
                    (pos + 1) % slots
                } else {
                    (pos + slots - 1) % slots
                };
                *selected = next.checked_sub(1);
            }
            _ => return,
        }
        self.outcome = None;
    }

    /// Collect one raw input per field in catalog order.
    ///
    /// # Errors
    /// Returns a message naming the field if a numeric entry is not a number.
    pub fn to_raw_inputs(&self) -> Result<Vec<RawInput>, String> {
        self.fields.iter().map(FormField::to_raw_input).collect()
    }

    /// Load sample data for testing (63yo male, asymptomatic chest pain)
    pub fn load_sample_data(&mut self) {
        let sample: [(&str, &str); 13] = [
            ("age", "63"),
            ("trestbps", "145"),
            ("chol", "233"),
            ("thalach", "150"),
            ("oldpeak", "2.3"),
            ("ca", "0"),
            ("sex", "Male"),
            ("cp", "Asymptomatic"),
            ("fbs", "No"),
            ("restecg", "Normal"),
            ("exang", "No"),
            ("slope", "Flat"),
            ("thal", "Normal"),
        ];
        for (field, (_, value)) in self.fields.iter_mut().zip(sample) {
            field.value = match &field.value {
                FieldValue::Text(_) => FieldValue::Text(value.to_string()),
                FieldValue::Slider(_) => FieldValue::Slider(value.parse().unwrap_or_default()),
                FieldValue::Selection(_) => FieldValue::Selection(
                    field.spec.choices().iter().position(|c| c.label == value),
                ),
            };
        }
        self.outcome = None;
    }

    /// Wipe all entries and return every control to its initial state.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            if let FieldValue::Text(text) = &mut field.value {
                text.zeroize();
            }
        }
        *self = Self::default();
    }
}

/// Render the risk factor form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/outcome
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Heart Disease Prediction", MedicalTheme::title()),
        Span::styled(
            " │ Enter your medical details (fill all fields)",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    // Numeric fields on the left, selections on the right.
    let mid = crate::domain::NUMERIC_COUNT;
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.selected_field);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let mut block = Block::default()
            .title(Span::styled(format!(" {} ", field.spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);
        if is_selected {
            if let Some(help) = field.spec.help {
                block = block.title_bottom(Span::styled(format!(" {help} "), MedicalTheme::text_muted()));
            }
        }

        let value = match &field.value {
            FieldValue::Text(text) if text.is_empty() => {
                Span::styled(field.hint(), MedicalTheme::text_muted())
            }
            FieldValue::Selection(None) => Span::styled(PLACEHOLDER, MedicalTheme::text_muted()),
            _ => Span::styled(field.display(), MedicalTheme::text()),
        };

        let mut spans = vec![Span::raw(" "), value];
        if is_selected {
            match field.value {
                FieldValue::Text(_) => spans.push(Span::styled("▌", MedicalTheme::cursor())),
                FieldValue::Selection(_) => {
                    spans.push(Span::styled("  ◀ ▶", MedicalTheme::key_hint()))
                }
                FieldValue::Slider(_) => {}
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = match &state.outcome {
        Some(Outcome::Prediction(result)) => Line::from(vec![
            Span::styled("Prediction: ", MedicalTheme::text_secondary()),
            Span::styled(
                result.label.to_string(),
                MedicalTheme::prediction(result.label),
            ),
        ]),
        Some(Outcome::Invalid(message)) => Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(message.clone(), MedicalTheme::danger()),
        ]),
        Some(Outcome::Fault(message)) => Line::from(vec![
            Span::styled("Prediction failed: ", MedicalTheme::danger()),
            Span::styled(message.clone(), MedicalTheme::text()),
        ]),
        None => Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict Heart Disease Risk ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assemble;

    fn select(state: &mut FormState, key: &str) {
        state.selected_field = crate::domain::catalog::feature_index(key).expect("key");
    }

    #[test]
    fn test_default_form_is_incomplete() {
        let state = FormState::default();
        let inputs = state.to_raw_inputs().expect("numeric defaults parse");
        assert_eq!(inputs[0], RawInput::Numeric(0.0));
        assert_eq!(inputs[12], RawInput::unselected());
        assert!(assemble(&inputs).is_err());
    }

    #[test]
    fn test_sample_data_assembles() {
        let mut state = FormState::default();
        state.load_sample_data();
        let vector = assemble(&state.to_raw_inputs().expect("parse")).expect("complete");
        assert_eq!(
            vector.as_slice(),
            &[63.0, 145.0, 233.0, 150.0, 2.3, 0.0, 1.0, 3.0, 0.0, 0.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_selection_cycles_through_placeholder() {
        let mut state = FormState::default();
        select(&mut state, "sex");

        state.cycle(true);
        assert_eq!(state.fields[6].display(), "Male");
        state.cycle(true);
        assert_eq!(state.fields[6].display(), "Female");
        state.cycle(true);
        assert_eq!(state.fields[6].display(), PLACEHOLDER);
        state.cycle(false);
        assert_eq!(state.fields[6].display(), "Female");
    }

    #[test]
    fn test_slider_is_bounded() {
        let mut state = FormState::default();
        select(&mut state, "ca");
        for _ in 0..5 {
            state.cycle(true);
        }
        assert_eq!(state.fields[5].value, FieldValue::Slider(3));
        for _ in 0..5 {
            state.cycle(false);
        }
        assert_eq!(state.fields[5].value, FieldValue::Slider(0));
    }

    #[test]
    fn test_integer_entry_rejects_decimal_point() {
        let mut state = FormState::default();
        select(&mut state, "age");
        for c in "6.3x".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[0].value, FieldValue::Text("63".into()));

        select(&mut state, "oldpeak");
        for c in "2.3".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[4].value, FieldValue::Text("2.3".into()));
    }

    #[test]
    fn test_negative_age_is_passed_through() {
        let mut state = FormState::default();
        state.load_sample_data();
        select(&mut state, "age");
        state.clear_field();
        for c in "-5".chars() {
            state.input_char(c);
        }
        let vector = assemble(&state.to_raw_inputs().expect("parse")).expect("accepted");
        assert_eq!(vector.get(0), Some(-5.0));
    }

    #[test]
    fn test_malformed_number_names_field() {
        let mut state = FormState::default();
        select(&mut state, "chol");
        state.input_char('-');
        let err = state.to_raw_inputs().expect_err("lone minus");
        assert!(err.starts_with("Serum Cholestoral"));
    }

    #[test]
    fn test_editing_clears_stale_outcome() {
        let mut state = FormState::default();
        select(&mut state, "age");
        state.input_char('6');
        state.outcome = Some(Outcome::Invalid("x".into()));

        state.delete_char();
        assert!(state.outcome.is_none());
        assert_eq!(state.fields[0].value, FieldValue::Text(String::new()));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = FormState::default();
        state.load_sample_data();
        state.outcome = Some(Outcome::Invalid("x".into()));
        state.reset();
        assert!(state.outcome.is_none());
        assert!(state
            .fields
            .iter()
            .all(|f| f.value == FormField::new(f.spec).value));
    }
}
