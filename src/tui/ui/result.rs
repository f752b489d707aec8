//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::Assessment;
use crate::tui::styles::MedicalTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing submitted yet
    #[default]
    Empty,
    /// Completed assessment
    Complete { assessment: Assessment },
    /// The submission could not be scored
    Error { message: String },
}

/// Render the prediction result
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState, model_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], model_name);
    match state {
        ResultState::Empty => render_empty(f, chunks[1]),
        ResultState::Complete { assessment } => render_assessment(f, chunks[1], assessment),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect, model_name: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction Result", MedicalTheme::title()),
        Span::styled(format!(" │ {model_name}"), MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(Line::from(Span::styled(
        "No prediction yet. Fill in the form and press Enter.",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let result = &assessment.result;
    let label_style = MedicalTheme::risk_label(result.label);

    let block = Block::default()
        .title(Span::styled(" Prediction Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Length(3), // Probability gauge
            Constraint::Min(4),    // Recommendation
            Constraint::Length(1), // Timestamp
        ])
        .margin(1)
        .split(inner);

    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            result.label.to_string(),
            label_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(result.summary(), MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(summary, chunks[0]);

    let disease = result.disease_probability();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Probability of Heart Disease ",
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(label_style)
        .ratio(disease.clamp(0.0, 1.0))
        .label(format!("{:.2}%", disease * 100.0));
    f.render_widget(gauge, chunks[1]);

    let recommendation = Paragraph::new(Line::from(Span::styled(
        result.label.recommendation(),
        MedicalTheme::text(),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(
                " Clinical Recommendation ",
                MedicalTheme::subtitle(),
            ))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(recommendation, chunks[2]);

    let assessed_at = Paragraph::new(Line::from(vec![
        Span::styled("Assessed at ", MedicalTheme::text_muted()),
        Span::styled(
            assessment
                .assessed_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            MedicalTheme::text_secondary(),
        ),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(assessed_at, chunks[3]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "No result is shown. Check the answers and the model artifacts, then try again.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[Enter/Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back to Form ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Form", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
