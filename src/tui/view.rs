use crate::calendar;
use crate::client::DataOrigin;
use crate::color_utils::subject_color;
use crate::countdown::{self, Countdown};
use crate::pomodoro::Phase;
use crate::schedule::{self, EMPTY_ROW};
use crate::todo::TodoList;
use crate::tui::state::{AdminTab, AppState, CalendarView, InputMode, Page};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
};

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, state, v_chunks[0]);

    match state.page {
        Page::Home => draw_home(f, state, v_chunks[1]),
        Page::Settings => draw_settings(f, state, v_chunks[1]),
        Page::AdminLogin => draw_admin_login(f, state, v_chunks[1]),
        Page::AdminDashboard => draw_admin_dashboard(f, state, v_chunks[1]),
    }

    draw_footer(f, state, v_chunks[2]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let clock = Paragraph::new(Line::from(vec![
        Span::styled(
            schedule::format_clock(&state.now),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(schedule::format_date_jp(&state.now)),
        Span::styled(
            format!("  [{}]", state.class_id()),
            Style::default().fg(Color::Yellow),
        ),
        origin_badge(state.data_origin),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" 時間割 "));
    f.render_widget(clock, h_chunks[0]);

    let selected = match state.page {
        Page::Home => 0,
        Page::Settings => 1,
        Page::AdminLogin | Page::AdminDashboard => 2,
    };
    let tabs = Tabs::new(vec!["1 Home", "2 Settings", "3 Admin"])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Pages "));
    f.render_widget(tabs, h_chunks[1]);
}

fn origin_badge(origin: Option<DataOrigin>) -> Span<'static> {
    match origin {
        Some(DataOrigin::Cache) => Span::styled(" offline", Style::default().fg(Color::Magenta)),
        Some(DataOrigin::Empty) => Span::styled(" no data", Style::default().fg(Color::Red)),
        Some(DataOrigin::Source) | None => Span::raw(""),
    }
}

// --- Home ---

fn draw_home(f: &mut Frame, state: &mut AppState, area: Rect) {
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(h_chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(7),
        ])
        .split(h_chunks[1]);

    draw_next_period(f, state, left[0]);
    draw_daily_schedule(f, state, left[1]);
    draw_countdown(f, state, right[0]);
    draw_todos(f, state, right[1]);
    draw_pomodoro(f, state, right[2]);
    draw_calendar(f, state, right[3]);
}

fn draw_next_period(f: &mut Frame, state: &AppState, area: Rect) {
    let status = schedule::lookup_period(&state.data, state.class_id(), &state.now);
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", status.badge()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::styled(status.time_diff(), Style::default().fg(Color::Gray)),
        ]),
        Line::from(Span::styled(
            status.headline(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Next "));
    f.render_widget(p, area);
}

fn draw_daily_schedule(f: &mut Frame, state: &AppState, area: Rect) {
    let rows = schedule::daily_rows(&state.data, state.class_id(), &state.now);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let subject_style = if row.subject == EMPTY_ROW {
                Style::default().fg(Color::DarkGray)
            } else {
                let (r, g, b) = subject_color(&row.subject);
                Style::default().fg(Color::Rgb(r, g, b))
            };
            let mut line = Line::from(vec![
                Span::styled(format!("{:>2} ", row.period), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<16}", row.subject), subject_style),
                Span::styled(
                    format!("{} - {}", row.start, row.end),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            if row.current {
                line = line.style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
            }
            ListItem::new(line)
        })
        .collect();

    let title = if state.loading {
        " Today (Loading...) ".to_string()
    } else {
        format!(" {}曜日 ", schedule::day_label_jp(chrono::Datelike::weekday(&state.now)))
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn draw_countdown(f: &mut Frame, state: &AppState, area: Rect) {
    let upcoming = countdown::upcoming(&state.data.tests, &state.now);
    let mut lines = match upcoming.first() {
        Some((test, due)) => {
            let cd = Countdown::between(&state.now, due);
            vec![
                Line::from(Span::styled(
                    test.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "あと {}日 {}時間 {}分  ({})",
                    cd.days, cd.hours, cd.minutes, test.date
                )),
            ]
        }
        None => vec![Line::from(countdown::NO_TESTS)],
    };
    if let Some((test, _)) = upcoming.get(1) {
        lines.push(Line::from(Span::styled(
            format!("次: {} ({})", test.name, test.date),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Test "));
    f.render_widget(p, area);
}

fn draw_todos(f: &mut Frame, state: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let items: Vec<ListItem> = state
        .settings
        .todos
        .iter()
        .map(|t| {
            let checkbox = if t.done { "[x]" } else { "[ ]" };
            let style = if t.done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!("{} {}", checkbox, t.text), style)))
        })
        .collect();

    let title = format!(" ToDo ({}) ", state.settings.todos.progress_text());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        );
    f.render_stateful_widget(list, chunks[0], &mut state.todo_list);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(state.settings.todos.percent().round() as u16);
    f.render_widget(gauge, chunks[1]);
}

fn draw_pomodoro(f: &mut Frame, state: &AppState, area: Rect) {
    let pomo = &state.pomodoro;
    let (label, color) = match pomo.phase {
        Phase::Work => ("作業", Color::Red),
        Phase::Break => ("休憩", Color::Green),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                pomo.display(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {}", label)),
        ]),
        Line::from(Span::styled(
            format!("p: {} | r: Reset", pomo.button_label()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Pomodoro "));
    f.render_widget(p, area);
}

fn draw_calendar(f: &mut Frame, state: &AppState, area: Rect) {
    let url = &state.settings.ical_url;
    let mut lines: Vec<Line> = Vec::new();
    if url.is_empty() {
        lines.push(Line::from(Span::styled(
            calendar::PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            calendar::LINKED,
            Style::default().fg(Color::Green),
        )));
        lines.push(Line::from(Span::styled(
            calendar::url_preview(url),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(calendar::embed_link(url)));
        match &state.calendar {
            CalendarView::Loading => lines.push(Line::from("Loading events...")),
            CalendarView::Failed(e) => lines.push(Line::from(Span::styled(
                format!("Calendar error: {}", e),
                Style::default().fg(Color::Red),
            ))),
            CalendarView::Events(events) => {
                lines.extend(events.iter().map(|e| Line::from(e.label())));
            }
            CalendarView::Unlinked => {}
        }
    }
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Calendar "));
    f.render_widget(p, area);
}

// --- Settings ---

fn draw_settings(f: &mut Frame, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let class_spans: Vec<Span> = state
        .classes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == state.settings_class {
                Span::styled(
                    format!("[{}] ", c),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(format!(" {}  ", c))
            }
        })
        .collect();
    let classes = Paragraph::new(Line::from(class_spans))
        .block(Block::default().borders(Borders::ALL).title(" Class (←/→) "));
    f.render_widget(classes, chunks[0]);

    let ical_text = if state.settings_ical.is_empty() {
        Span::styled("(none)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.settings_ical.clone())
    };
    let ical = Paragraph::new(Line::from(ical_text))
        .block(Block::default().borders(Borders::ALL).title(" iCal URL (i) "));
    f.render_widget(ical, chunks[1]);

    let help = Paragraph::new("Enter: 保存 | Esc: Home")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

// --- Admin ---

fn draw_admin_login(f: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = vec![Line::from("管理者パスワードを入力してください (Enter)")];
    if state.admin.login_error {
        lines.push(Line::from(Span::styled(
            "パスワードが違います",
            Style::default().fg(Color::Red),
        )));
    }
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Admin Login "));
    f.render_widget(p, area);
}

fn draw_admin_dashboard(f: &mut Frame, state: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let tab_index = match state.admin_tab {
        AdminTab::Timings => 0,
        AdminTab::Schedule => 1,
        AdminTab::Tests => 2,
    };
    let tabs = Tabs::new(
        [AdminTab::Timings, AdminTab::Schedule, AdminTab::Tests]
            .iter()
            .map(|t| t.title())
            .collect::<Vec<_>>(),
    )
    .select(tab_index)
    .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    .block(Block::default().borders(Borders::ALL).title(" Admin (t: tab | x: export | o: logout) "));
    f.render_widget(tabs, chunks[0]);

    let (title, items): (String, Vec<ListItem>) = match state.admin_tab {
        AdminTab::Timings => (
            " 時限 (Enter: edit as 08:50-09:40) ".to_string(),
            state
                .data
                .time_settings
                .iter()
                .enumerate()
                .map(|(i, s)| ListItem::new(format!("{}限  {} ~ {}", i + 1, s.start, s.end)))
                .collect(),
        ),
        AdminTab::Schedule => {
            let class_id = state.admin_class_id();
            let day = state.admin_day_key();
            let items = (1..=crate::admin::EDITABLE_PERIODS as u8)
                .map(|p| {
                    let subject = state.data.subject(&class_id, day, p).unwrap_or("");
                    let shown = if subject.is_empty() {
                        Span::styled("科目名", Style::default().fg(Color::DarkGray))
                    } else {
                        Span::raw(subject.to_string())
                    };
                    ListItem::new(Line::from(vec![Span::raw(format!("{}限  ", p)), shown]))
                })
                .collect();
            (
                format!(" {} / {} (h/l: day, H/L: class, Enter: edit) ", class_id, day),
                items,
            )
        }
        AdminTab::Tests => (
            " Tests (n: add 'Name @YYYY-MM-DD', d: delete) ".to_string(),
            state
                .data
                .tests
                .iter()
                .map(|t| ListItem::new(format!("{} ({})", t.name, t.date)))
                .collect(),
        ),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        );
    f.render_stateful_widget(list, chunks[1], &mut state.admin_list);
}

// --- Footer / Input ---

fn draw_status(f: &mut Frame, state: &AppState, footer_area: Rect) {
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(footer_area);
    let status_color = if state.message.contains("Error") {
        Color::Red
    } else {
        Color::Cyan
    };
    let status = Paragraph::new(state.message.clone())
        .style(Style::default().fg(status_color))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(" Status "),
        );
    let help_text = match state.page {
        Page::Home => "n:Add | Space:Done | d:Del | p/r:Pomo | c:Class | q:Quit",
        Page::Settings => "←/→:Class | i:iCal | Enter:Save | q:Quit",
        Page::AdminLogin => "Enter:Login | Tab:Page | q:Quit",
        Page::AdminDashboard => "t:Tab | j/k:Move | Enter:Edit | x:Export | q:Quit",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);
}

fn draw_footer(f: &mut Frame, state: &AppState, footer_area: Rect) {
    let (title, prefix, color) = match state.mode {
        InputMode::Normal => {
            draw_status(f, state, footer_area);
            return;
        }
        InputMode::AddingTodo => (" New ToDo ", "> ", Color::Yellow),
        InputMode::EditingIcal => (" iCal URL ", "> ", Color::Blue),
        InputMode::Password => (" Password ", "# ", Color::Magenta),
        InputMode::EditingTiming => (" Period Time ", "> ", Color::Green),
        InputMode::EditingSubject => (" Subject ", "> ", Color::Green),
        InputMode::AddingTest => (" New Test ", "> ", Color::Yellow),
        InputMode::ExportPath => (" Export To ", "> ", Color::Cyan),
    };
    let shown = if state.mode == InputMode::Password {
        "*".repeat(state.input_buffer.chars().count())
    } else {
        state.input_buffer.clone()
    };
    let input = Paragraph::new(format!("{}{}", prefix, shown))
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, footer_area);

    let offset = if state.mode == InputMode::Password {
        state.cursor_position
    } else {
        let before_cursor: String = state.input_buffer.chars().take(state.cursor_position).collect();
        Span::raw(before_cursor).width()
    };
    let cursor_x = footer_area.x + 1 + prefix.chars().count() as u16 + offset as u16;
    let cursor_y = footer_area.y + 1;
    f.set_cursor_position((cursor_x, cursor_y));
}
