//! Introduction and glossary of health terms.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

const INTRO: &str = "Enter your health data to predict the probability of heart disease using \
our machine learning model. This application will analyze the information you provide and \
estimate your risk of developing heart disease. For the best results, please ensure the data \
you enter accurately reflects your health condition. The model considers several factors such \
as age, gender, blood pressure, cholesterol level, maximum heart rate, and other medical \
examination results.";

/// Term, explanation, and nested sub-terms.
const GLOSSARY: &[(&str, &str, &[(&str, &str)])] = &[
    ("Age", "Age of the patient in years.", &[]),
    ("Sex", "Gender of the patient (Male or Female).", &[]),
    (
        "Chest Pain Type",
        "Type of chest discomfort experienced:",
        &[
            ("Typical Angina", "Chest pain related to heart problems"),
            ("Atypical Angina", "Chest pain with unusual characteristics"),
            ("Non-anginal Pain", "Chest pain not related to the heart"),
            ("Asymptomatic", "No chest pain symptoms"),
        ],
    ),
    ("Resting Blood Pressure", "Blood pressure measured while resting.", &[]),
    (
        "Cholesterol",
        "Level of fat in the blood that may affect heart health.",
        &[],
    ),
    ("Fasting Blood Sugar", "Blood sugar level measured after fasting.", &[]),
    (
        "Resting ECG",
        "Result of an electrical recording of the heart at rest.",
        &[],
    ),
    (
        "Maximum Heart Rate",
        "Highest heart rate reached during physical activity.",
        &[],
    ),
    ("Exercise-Induced Angina", "Chest pain that occurs during exercise.", &[]),
    ("Oldpeak", "Change in heart electrical activity during exercise.", &[]),
    ("ST Segment Slope", "Pattern of heart activity during peak exercise.", &[]),
];

fn glossary_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (term, explanation, sub_terms) in GLOSSARY {
        lines.push(Line::from(vec![
            Span::styled(" • ", MedicalTheme::text_muted()),
            Span::styled(*term, MedicalTheme::focused()),
            Span::styled(": ", MedicalTheme::text_secondary()),
            Span::styled(*explanation, MedicalTheme::text()),
        ]));
        for (sub_term, sub_explanation) in *sub_terms {
            lines.push(Line::from(vec![
                Span::styled("     - ", MedicalTheme::text_muted()),
                Span::styled(*sub_term, MedicalTheme::subtitle()),
                Span::styled(": ", MedicalTheme::text_secondary()),
                Span::styled(*sub_explanation, MedicalTheme::text_secondary()),
            ]));
        }
    }
    lines
}

/// Render the intro text and the glossary
pub fn render_glossary(f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Intro
            Constraint::Min(0),    // Glossary
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Heart Disease Prediction", MedicalTheme::title()),
        Span::styled(" │ Glossary of Health Terms", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let intro = Paragraph::new(Span::styled(INTRO, MedicalTheme::text_secondary()))
        .wrap(Wrap { trim: true });
    f.render_widget(intro, chunks[1]);

    let glossary = Paragraph::new(glossary_lines())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(" Glossary ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
    f.render_widget(glossary, chunks[2]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Esc/F1] ", MedicalTheme::key_hint()),
        Span::styled("Back to Form", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, chunks[3]);
}
