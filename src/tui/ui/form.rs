//! Health data input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    ChestPainType, FieldRange, PatientInput, RawSubmission, RestingEcg, Sex, StSlope, AGE_RANGE,
    CHOLESTEROL_RANGE, MAX_HR_RANGE, OLDPEAK_RANGE, OLDPEAK_STEP, RESTING_BP_RANGE,
    YES_NO_LABELS,
};
use crate::tui::styles::MedicalTheme;

const AGE: usize = 0;
const SEX: usize = 1;
const CHEST_PAIN: usize = 2;
const RESTING_BP: usize = 3;
const CHOLESTEROL: usize = 4;
const FASTING_BS: usize = 5;
const RESTING_ECG: usize = 6;
const MAX_HR: usize = 7;
const EXERCISE_ANGINA: usize = 8;
const OLDPEAK: usize = 9;
const ST_SLOPE: usize = 10;

/// How a field takes input.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Integer { range: FieldRange },
    Decimal { range: FieldRange, step: f64 },
    Choice { options: &'static [&'static str] },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub question: &'static str,
    pub kind: FieldKind,
    /// Text buffer for numeric fields
    pub value: String,
    /// Selected option for choice fields
    pub choice: usize,
}

impl FormField {
    fn integer(label: &'static str, question: &'static str, range: FieldRange, default: u32) -> Self {
        Self {
            label,
            question,
            kind: FieldKind::Integer { range },
            value: default.to_string(),
            choice: 0,
        }
    }

    fn decimal(label: &'static str, question: &'static str, range: FieldRange, default: f64) -> Self {
        Self {
            label,
            question,
            kind: FieldKind::Decimal {
                range,
                step: OLDPEAK_STEP,
            },
            value: format!("{default:.1}"),
            choice: 0,
        }
    }

    fn choice(
        label: &'static str,
        question: &'static str,
        options: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            label,
            question,
            kind: FieldKind::Choice { options },
            value: String::new(),
            choice: default,
        }
    }

    /// Range hint shown for numeric fields.
    fn hint(&self) -> String {
        match self.kind {
            FieldKind::Integer { range } => format!("{}-{}", range.min, range.max),
            FieldKind::Decimal { range, .. } => format!("{:.1}-{:.1}", range.min, range.max),
            FieldKind::Choice { .. } => String::new(),
        }
    }

    fn selected_option(&self) -> &'static str {
        match self.kind {
            FieldKind::Choice { options } => options[self.choice % options.len()],
            _ => "",
        }
    }
}

/// Form state
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::integer("Age", "How old are you? (years)", AGE_RANGE, 30),
                FormField::choice("Sex", "What is your gender?", Sex::LABELS, 1),
                FormField::choice(
                    "Chest Pain Type",
                    "What type of chest pain do you experience?",
                    ChestPainType::LABELS,
                    0,
                ),
                FormField::integer(
                    "Resting BP",
                    "What is your resting blood pressure? (mm Hg)",
                    RESTING_BP_RANGE,
                    110,
                ),
                FormField::integer(
                    "Cholesterol",
                    "What is your cholesterol level? (mg/dL)",
                    CHOLESTEROL_RANGE,
                    150,
                ),
                FormField::choice(
                    "Fasting BS > 120",
                    "Is your fasting blood sugar greater than 120 mg/dL?",
                    YES_NO_LABELS,
                    0,
                ),
                FormField::choice(
                    "Resting ECG",
                    "What is your resting electrocardiogram (ECG) result?",
                    RestingEcg::LABELS,
                    0,
                ),
                FormField::integer(
                    "Max HR",
                    "What is your maximum heart rate achieved? (bpm)",
                    MAX_HR_RANGE,
                    150,
                ),
                FormField::choice(
                    "Exercise Angina",
                    "Do you experience angina induced by exercise?",
                    YES_NO_LABELS,
                    1,
                ),
                FormField::decimal(
                    "Oldpeak",
                    "What is your ST depression value (Oldpeak 0.0 - 6.0)?",
                    OLDPEAK_RANGE,
                    1.5,
                ),
                FormField::choice(
                    "ST Slope",
                    "What is the slope of your peak exercise ST segment?",
                    StSlope::LABELS,
                    0,
                ),
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl FormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

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

    /// Type a character into the current numeric field.
    pub fn input_char(&mut self, c: char) {
        let field = self.current();
        let accepted = match field.kind {
            FieldKind::Integer { .. } => c.is_ascii_digit(),
            FieldKind::Decimal { .. } => c.is_ascii_digit() || (c == '.' && !field.value.contains('.')),
            FieldKind::Choice { .. } => false,
        };
        if accepted {
            field.value.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.current().value.pop();
    }

    pub fn clear_field(&mut self) {
        self.current().value.zeroize();
    }

    /// Move the current field one step: the next option for choice fields,
    /// one unit (or one oldpeak step) for numeric fields, clamped to range.
    pub fn step(&mut self, forward: bool) {
        let field = self.current();
        match field.kind {
            FieldKind::Choice { options } => {
                let n = options.len();
                field.choice = if forward {
                    (field.choice + 1) % n
                } else {
                    (field.choice + n - 1) % n
                };
            }
            FieldKind::Integer { range } => {
                let current = field.value.parse::<f64>().unwrap_or(range.min);
                let next = if forward { current + 1.0 } else { current - 1.0 };
                field.value = format!("{}", next.clamp(range.min, range.max));
            }
            FieldKind::Decimal { range, step } => {
                let current = field.value.parse::<f64>().unwrap_or(range.min);
                let next = if forward { current + step } else { current - step };
                // Snap to the step grid so repeated steps do not drift.
                let snapped = (next / step).round() * step;
                field.value = format!("{:.1}", snapped.clamp(range.min, range.max));
            }
        }
        self.error_message = None;
    }

    /// Wipe numeric buffers and restore the form defaults.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
        }
        *self = Self::default();
    }

    fn integer(&self, index: usize) -> Result<u32, String> {
        let field = &self.fields[index];
        let value: u32 = field
            .value
            .trim()
            .parse()
            .map_err(|_| format!("{}: Invalid number", field.label))?;
        if let FieldKind::Integer { range } = field.kind {
            if !range.contains(f64::from(value)) {
                return Err(format!(
                    "{}: Value must be between {} and {}",
                    field.label, range.min, range.max
                ));
            }
        }
        Ok(value)
    }

    fn decimal(&self, index: usize) -> Result<f64, String> {
        let field = &self.fields[index];
        let value: f64 = field
            .value
            .trim()
            .parse()
            .map_err(|_| format!("{}: Invalid number", field.label))?;
        if let FieldKind::Decimal { range, .. } = field.kind {
            if !range.contains(value) {
                return Err(format!(
                    "{}: Value must be between {:.1} and {:.1}",
                    field.label, range.min, range.max
                ));
            }
        }
        Ok(value)
    }

    fn option(&self, index: usize) -> String {
        self.fields[index].selected_option().to_string()
    }

    /// Collect the answers as untyped strings, exactly as shown.
    ///
    /// # Errors
    /// Returns a message naming the first numeric field that is empty,
    /// malformed or out of range.
    pub fn to_submission(&self) -> Result<RawSubmission, String> {
        Ok(RawSubmission {
            age: self.integer(AGE)?,
            sex: self.option(SEX),
            chest_pain_type: self.option(CHEST_PAIN),
            resting_bp: self.integer(RESTING_BP)?,
            cholesterol: self.integer(CHOLESTEROL)?,
            fasting_bs: self.option(FASTING_BS),
            resting_ecg: self.option(RESTING_ECG),
            max_hr: self.integer(MAX_HR)?,
            exercise_angina: self.option(EXERCISE_ANGINA),
            oldpeak: self.decimal(OLDPEAK)?,
            st_slope: self.option(ST_SLOPE),
        })
    }

    /// Validate and convert to a typed `PatientInput`.
    ///
    /// # Errors
    /// Returns a message for an invalid numeric field or an unknown option.
    pub fn to_patient_input(&self) -> Result<PatientInput, String> {
        let raw = self.to_submission()?;
        PatientInput::try_from(&raw).map_err(|e| e.to_string())
    }

    /// Load a sample high-risk patient.
    pub fn load_sample_data(&mut self) {
        // 55yo male, asymptomatic, exercise angina, flat ST slope
        let numeric = [
            (AGE, "55"),
            (RESTING_BP, "140"),
            (CHOLESTEROL, "289"),
            (MAX_HR, "130"),
            (OLDPEAK, "1.0"),
        ];
        for (index, value) in numeric {
            self.fields[index].value = value.to_string();
        }

        let choices = [
            (SEX, "Male"),
            (CHEST_PAIN, "Asymptomatic"),
            (FASTING_BS, "No"),
            (RESTING_ECG, "Normal"),
            (EXERCISE_ANGINA, "Yes"),
            (ST_SLOPE, "Flat"),
        ];
        for (index, label) in choices {
            let field = &mut self.fields[index];
            if let FieldKind::Choice { options } = field.kind {
                field.choice = options.iter().position(|o| *o == label).unwrap_or(0);
            }
        }
        self.error_message = None;
    }
}

/// Render the health data input form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, state: &FormState) {
    let question = state
        .fields
        .get(state.selected_field)
        .map_or("", |field| field.question);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Input Health Data", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_secondary()),
        Span::styled(question, MedicalTheme::text_secondary()),
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

    let mid = state.fields.len().div_ceil(2);

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn field_line(field: &FormField, is_selected: bool) -> Line<'_> {
    match field.kind {
        FieldKind::Choice { options } => {
            let mut spans = vec![Span::raw(" ")];
            for (i, option) in options.iter().enumerate() {
                let style = if i == field.choice {
                    MedicalTheme::selected()
                } else {
                    MedicalTheme::text_muted()
                };
                spans.push(Span::styled(format!(" {option} "), style));
            }
            Line::from(spans)
        }
        FieldKind::Integer { .. } | FieldKind::Decimal { .. } => {
            let value = if field.value.is_empty() {
                Span::styled(field.hint(), MedicalTheme::text_muted())
            } else {
                Span::styled(field.value.as_str(), MedicalTheme::text())
            };
            Line::from(vec![
                Span::raw(" "),
                value,
                if is_selected {
                    Span::styled("▌", MedicalTheme::cursor())
                } else {
                    Span::raw("")
                },
                Span::styled(format!("  ({})", field.hint()), MedicalTheme::text_muted()),
            ])
        }
    }
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

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        f.render_widget(Paragraph::new(field_line(field, is_selected)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→/Space] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[F1] ", MedicalTheme::key_hint()),
            Span::styled("Glossary ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
