use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

use equine_eligibility::appetite::{AppetiteGuide, AppetiteRule, AppetiteStatus};
use equine_eligibility::plans::PlanCatalog;
use equine_eligibility::reference::{AgeBand, Category, Preference};
use equine_eligibility::summary::{
    format_usd, StatusLevel, CLASSIC_NO_COINSURANCE_NOTE, DISCLAIMER, NO_MAJOR_MEDICAL_MESSAGE,
};
use equine_eligibility::wizard::{Step, Wizard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Wizard,
    Appetite,
    Plans,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Wizard => Page::Appetite,
            Page::Appetite => Page::Plans,
            Page::Plans => Page::Wizard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Wizard => Page::Plans,
            Page::Appetite => Page::Wizard,
            Page::Plans => Page::Appetite,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Wizard => "Eligibility Wizard",
            Page::Appetite => "Appetite Guide",
            Page::Plans => "Product Explorer",
        }
    }
}

pub struct App {
    pub current_page: Page,
    pub wizard: Wizard,
    /// Highlighted option on list steps of the wizard
    pub cursor: usize,
    pub message: Option<String>,
    pub appetite: AppetiteGuide,
    pub appetite_state: TableState,
    pub plans: PlanCatalog,
    pub plans_state: TableState,
    pub show_detail: bool,
}

impl App {
    pub fn new(appetite: AppetiteGuide, plans: PlanCatalog) -> Self {
        let mut appetite_state = TableState::default();
        if appetite.rule_count() > 0 {
            appetite_state.select(Some(0));
        }

        let mut plans_state = TableState::default();
        if !plans.plans().is_empty() {
            plans_state.select(Some(0));
        }

        Self {
            current_page: Page::Wizard,
            wizard: Wizard::new(),
            cursor: 0,
            message: None,
            appetite,
            appetite_state,
            plans,
            plans_state,
            show_detail: false,
        }
    }

    /// Flattened (category, rule) rows for the appetite table
    pub fn appetite_rows(&self) -> Vec<(&str, &AppetiteRule)> {
        self.appetite
            .categories()
            .iter()
            .flat_map(|c| c.rules.iter().map(move |r| (c.category.as_str(), r)))
            .collect()
    }

    /// Number of choices on the current wizard step
    pub fn option_count(&self) -> usize {
        match self.wizard.step() {
            Step::Category => Category::ALL.len(),
            Step::Use => self.wizard.available_uses().len(),
            Step::Age => AgeBand::ALL.len(),
            Step::Preferences => Preference::ALL.len(),
            Step::Value | Step::Results => 0,
        }
    }

    /// Handle one key press. Returns false when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Tab => {
                self.current_page = self.current_page.next();
                self.show_detail = false;
            }
            KeyCode::BackTab => {
                self.current_page = self.current_page.previous();
                self.show_detail = false;
            }
            _ => match self.current_page {
                Page::Wizard => return self.handle_wizard_key(code),
                Page::Appetite | Page::Plans => return self.handle_table_key(code),
            },
        }
        true
    }

    fn handle_wizard_key(&mut self, code: KeyCode) -> bool {
        self.message = None;

        if self.wizard.step() == Step::Value {
            match code {
                KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '$') => {
                    self.wizard.push_value_char(c)
                }
                KeyCode::Backspace => self.wizard.pop_value_char(),
                KeyCode::Enter | KeyCode::Right => self.advance(),
                KeyCode::Left => self.back(),
                KeyCode::Char('q') => return false,
                _ => {}
            }
            return true;
        }

        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Down | KeyCode::Char('j') => self.next_option(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_option(),
            KeyCode::Char(' ') => self.choose(),
            KeyCode::Enter => {
                if self.wizard.step() != Step::Preferences {
                    self.choose();
                }
                self.advance();
            }
            KeyCode::Right | KeyCode::Char('n') => self.advance(),
            KeyCode::Left | KeyCode::Backspace => self.back(),
            KeyCode::Char('r') => {
                self.wizard.reset();
                self.cursor = 0;
            }
            _ => {}
        }
        true
    }

    fn handle_table_key(&mut self, code: KeyCode) -> bool {
        let len = match self.current_page {
            Page::Appetite => self.appetite.rule_count(),
            _ => self.plans.plans().len(),
        };
        let state = match self.current_page {
            Page::Appetite => &mut self.appetite_state,
            _ => &mut self.plans_state,
        };

        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Down | KeyCode::Char('j') => select_next(state, len),
            KeyCode::Up | KeyCode::Char('k') => select_previous(state, len),
            KeyCode::Home => state.select(Some(0)),
            KeyCode::End if len > 0 => state.select(Some(len - 1)),
            KeyCode::Enter => self.show_detail = !self.show_detail,
            _ => {}
        }
        true
    }

    fn next_option(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    fn previous_option(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
        }
    }

    /// Apply the highlighted option to the wizard
    fn choose(&mut self) {
        match self.wizard.step() {
            Step::Category => {
                if let Some(category) = Category::ALL.get(self.cursor) {
                    self.wizard.select_category(*category);
                }
            }
            Step::Use => {
                if let Some(use_) = self.wizard.available_uses().get(self.cursor).copied() {
                    if let Err(e) = self.wizard.select_use(use_) {
                        self.message = Some(e.to_string());
                    }
                }
            }
            Step::Age => {
                if let Some(age) = AgeBand::ALL.get(self.cursor) {
                    self.wizard.select_age(*age);
                }
            }
            Step::Preferences => {
                if let Some(pref) = Preference::ALL.get(self.cursor) {
                    self.wizard.toggle_preference(*pref);
                }
            }
            Step::Value | Step::Results => {}
        }
    }

    fn advance(&mut self) {
        if self.wizard.advance() {
            self.cursor = 0;
        } else if self.wizard.step() != Step::Results {
            self.message = Some(match self.wizard.step() {
                Step::Value => "Enter a readable insured value to continue.".to_string(),
                Step::Preferences => "Choose at least one preference.".to_string(),
                _ => "Make a selection to continue.".to_string(),
            });
        }
    }

    fn back(&mut self) {
        self.wizard.back();
        self.cursor = 0;
    }
}

fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    };
    state.select(Some(i));
}

fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    };
    state.select(Some(i));
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Wizard => render_wizard(f, chunks[1], app),
        Page::Appetite => render_appetite(f, chunks[1], app),
        Page::Plans => render_plans(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn section_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Wizard, Page::Appetite, Page::Plans];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    if app.current_page == Page::Wizard {
        let step = app.wizard.step();
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Step {} of {}: {}", step.number(), Step::ALL.len(), step.title()),
            Style::default().fg(Color::White),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn option_line(label: &str, highlighted: bool, selected: bool) -> Line<'static> {
    let marker = if highlighted { "→ " } else { "  " };
    let check = if selected { "[x] " } else { "[ ] " };
    let style = if highlighted {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::raw(format!("  {}", marker)),
        Span::styled(format!("{}{}", check, label), style),
    ])
}

fn render_wizard(f: &mut Frame, area: Rect, app: &App) {
    let wizard = &app.wizard;
    let mut lines = vec![Line::from("")];

    match wizard.step() {
        Step::Category => {
            lines.push(Line::from(Span::styled("  Select horse type", section_style())));
            lines.push(Line::from(""));
            for (i, category) in Category::ALL.iter().enumerate() {
                lines.push(option_line(
                    category.label(),
                    i == app.cursor,
                    wizard.category() == Some(*category),
                ));
            }
        }
        Step::Value => {
            lines.push(Line::from(Span::styled("  Insured value (USD)", section_style())));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  $ ", label_style()),
                Span::raw(format!("{}_", wizard.value_input())),
            ]));
            lines.push(Line::from(""));
            if let Some(status) = wizard.value_status() {
                let color = match status.level {
                    StatusLevel::Error => Color::Red,
                    StatusLevel::Info => Color::Yellow,
                    StatusLevel::Ok => Color::Green,
                };
                lines.push(Line::from(Span::styled(
                    format!("  {}", status.text),
                    Style::default().fg(color),
                )));
            }
        }
        Step::Use => {
            lines.push(Line::from(Span::styled("  Primary use", section_style())));
            lines.push(Line::from(""));
            for (i, use_) in wizard.available_uses().iter().enumerate() {
                lines.push(option_line(use_.label(), i == app.cursor, wizard.use_() == Some(*use_)));
            }
        }
        Step::Age => {
            lines.push(Line::from(Span::styled("  Age", section_style())));
            lines.push(Line::from(""));
            for (i, age) in AgeBand::ALL.iter().enumerate() {
                lines.push(option_line(age.label(), i == app.cursor, wizard.age() == Some(*age)));
            }
        }
        Step::Preferences => {
            lines.push(Line::from(Span::styled(
                "  Client preferences (Space to toggle)",
                section_style(),
            )));
            lines.push(Line::from(""));
            for (i, pref) in Preference::ALL.iter().enumerate() {
                lines.push(option_line(
                    pref.label(),
                    i == app.cursor,
                    wizard.preferences().contains(*pref),
                ));
            }
        }
        Step::Results => results_lines(wizard, &mut lines),
    }

    if let Some(message) = &app.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red),
        )));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", wizard.step().title())),
        );

    f.render_widget(body, area);
}

fn results_lines(wizard: &Wizard, lines: &mut Vec<Line<'static>>) {
    let Some(outcome) = wizard.outcome() else {
        lines.push(Line::from("  Answers are incomplete."));
        return;
    };

    lines.push(Line::from(vec![
        Span::styled("  Horse: ", label_style()),
        Span::raw(format!(
            "{} · {} · {} · {}",
            outcome.category.label(),
            outcome.use_.label(),
            outcome.age.label(),
            format_usd(outcome.value)
        )),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("  MAJOR MEDICAL", section_style())));
    if outcome.summary.has_major_medical() {
        for name in &outcome.summary.major_medical {
            lines.push(Line::from(Span::styled(
                format!("  ✓ {}", name),
                Style::default().fg(Color::Green),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            format!("  {}", NO_MAJOR_MEDICAL_MESSAGE),
            Style::default().fg(Color::Red),
        )));
    }
    if outcome.summary.show_100k_note {
        lines.push(Line::from(Span::styled(
            format!("  {}", CLASSIC_NO_COINSURANCE_NOTE),
            Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    if !outcome.summary.other_options.is_empty() {
        lines.push(Line::from(Span::styled("  OTHER ELIGIBLE OPTIONS", section_style())));
        for name in &outcome.summary.other_options {
            lines.push(Line::from(format!("  • {}", name)));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("  RECOMMENDED", section_style())));
    for text in outcome.recommendations.primary_lines() {
        lines.push(Line::from(Span::styled(
            format!("  → {}", text),
            Style::default().fg(Color::Yellow),
        )));
    }
    for text in outcome.recommendations.supplemental_lines() {
        lines.push(Line::from(format!("  + {}", text)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", DISCLAIMER),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));
}

fn status_color(status: AppetiteStatus) -> Color {
    match status {
        AppetiteStatus::Eligible => Color::Green,
        AppetiteStatus::Ineligible => Color::Red,
        AppetiteStatus::UwSubmit => Color::Yellow,
        AppetiteStatus::Conditional => Color::Cyan,
    }
}

fn render_appetite(f: &mut Frame, area: Rect, app: &mut App) {
    let (table_area, detail_area) = split_for_detail(area, app.show_detail);

    let header = Row::new(["Category", "Use / Breed", "Status"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = app
        .appetite_rows()
        .into_iter()
        .map(|(category, rule)| {
            Row::new(vec![
                Cell::from(truncate(category, 28)),
                Cell::from(truncate(&rule.label, 40)),
                Cell::from(rule.status.label())
                    .style(Style::default().fg(status_color(rule.status))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(30), Constraint::Length(42), Constraint::Length(24)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Appetite ({} rules) ", app.appetite.rule_count())),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, table_area, &mut app.appetite_state);

    if let Some(detail_area) = detail_area {
        let rows = app.appetite_rows();
        let text = match app.appetite_state.selected().and_then(|i| rows.get(i)) {
            Some((category, rule)) => {
                let mut lines: Vec<Line> = app
                    .appetite
                    .lookup(category, &rule.label)
                    .map(|sel| sel.printable_summary())
                    .unwrap_or_default()
                    .lines()
                    .map(|l| Line::from(format!("  {}", l)))
                    .collect();
                if rule.status == AppetiteStatus::UwSubmit {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        "  Email underwriting with the CLI: appetite --mailto",
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                }
                lines
            }
            None => vec![Line::from("  No rule selected")],
        };
        render_detail(f, detail_area, " Rule Details ", text);
    }
}

fn render_plans(f: &mut Frame, area: Rect, app: &mut App) {
    let (table_area, detail_area) = split_for_detail(area, app.show_detail);

    let header = Row::new(["Plan", "Company", "Co-Pay", "Rates"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = app
        .plans
        .plans()
        .iter()
        .map(|plan| {
            Row::new(vec![
                Cell::from(truncate(&plan.plan_name, 42)),
                Cell::from(plan.company.clone()),
                Cell::from(plan.co_pay.clone()),
                Cell::from(plan.rates.len().to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(44),
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Plans "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, table_area, &mut app.plans_state);

    if let Some(detail_area) = detail_area {
        let selected = app
            .plans_state
            .selected()
            .and_then(|i| app.plans.plans().get(i));
        let text = match selected {
            Some(plan) => {
                let mut lines = vec![
                    Line::from(vec![Span::styled("  States: ", label_style()), Span::raw(plan.state_filing_approved.clone())]),
                    Line::from(vec![Span::styled("  Age: ", label_style()), Span::raw(plan.age_eligibility.clone())]),
                    Line::from(vec![Span::styled("  Use & value: ", label_style()), Span::raw(plan.use_and_value_eligibility.clone())]),
                    Line::from(vec![Span::styled("  Limits: ", label_style()), Span::raw(plan.special_limits.clone())]),
                    Line::from(vec![Span::styled("  Exclusions: ", label_style()), Span::raw(plan.exclusions.clone())]),
                    Line::from(""),
                    Line::from(Span::styled("  RATES", section_style())),
                ];
                for rate in &plan.rates {
                    lines.push(Line::from(format!(
                        "  {} | {} | ded {} | limit {} | {}",
                        rate.horse_category, rate.sum_insured, rate.deductible, rate.limit, rate.premium
                    )));
                }
                lines
            }
            None => vec![Line::from("  No plan selected")],
        };
        render_detail(f, detail_area, " Plan Details ", text);
    }
}

fn split_for_detail(area: Rect, show_detail: bool) -> (Rect, Option<Rect>) {
    if !show_detail {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

fn render_detail(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title.to_string()),
    );
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut spans = vec![key(" Tab"), Span::raw(" Page | ")];
    match app.current_page {
        Page::Wizard => match app.wizard.step() {
            Step::Value => {
                spans.extend([key("0-9"), Span::raw(" Type | "), key("Enter"), Span::raw(" Next | ")]);
                spans.extend([key("←"), Span::raw(" Back | ")]);
            }
            Step::Results => {
                spans.extend([key("r"), Span::raw(" Start over | "), key("←"), Span::raw(" Back | ")]);
            }
            _ => {
                spans.extend([key("↑/↓"), Span::raw(" Choose | "), key("Space"), Span::raw(" Select | ")]);
                spans.extend([key("Enter"), Span::raw(" Next | "), key("←"), Span::raw(" Back | ")]);
            }
        },
        Page::Appetite | Page::Plans => {
            spans.extend([key("↑/↓"), Span::raw(" Nav | "), key("Enter"), Span::raw(" Details | ")]);
        }
    }
    spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
