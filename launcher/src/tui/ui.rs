//! Frame rendering for the picker.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::history::StateStore;
use crate::tui::app::App;
use crate::types::{format_age, now_millis, smart_truncate_path, truncate_text, Project};

/// Longest branch name rendered before truncation.
const BRANCH_DISPLAY_LEN: usize = 20;

/// Renders one picker frame: search bar, project list, status line.
pub fn draw<S>(frame: &mut Frame, app: &mut App<S>)
where
    S: StateStore + Clone + Send + Sync + 'static,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_search_bar(frame, app, chunks[0]);
    draw_project_list(frame, app, chunks[1]);
    draw_status_line(frame, app, chunks[2]);
}

fn draw_search_bar<S>(frame: &mut Frame, app: &App<S>, area: ratatui::layout::Rect)
where
    S: StateStore + Clone + Send + Sync + 'static,
{
    let title = if app.loading {
        " Trae Projects (loading…) "
    } else {
        " Trae Projects "
    };

    let input = Paragraph::new(Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.filter.as_str()),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(input, area);
}

fn draw_project_list<S>(frame: &mut Frame, app: &mut App<S>, area: ratatui::layout::Rect)
where
    S: StateStore + Clone + Send + Sync + 'static,
{
    let now = now_millis();
    // Rows own their text, so the borrow of the project list ends here and
    // the list state can be borrowed mutably below.
    let items: Vec<ListItem> = app
        .filtered()
        .into_iter()
        .map(|p| project_row(p, now))
        .collect();

    if items.is_empty() && !app.loading {
        let empty = Paragraph::new(vec![
            Line::raw(""),
            Line::styled(
                "No projects found",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "Open a folder with Trae or adjust the filter.",
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .centered();
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn project_row(project: &Project, now: i64) -> ListItem<'static> {
    let mut spans = vec![Span::styled(
        project.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if let Some(branch) = &project.branch {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{}]", truncate_text(branch, BRANCH_DISPLAY_LEN)),
            Style::default().fg(Color::Green),
        ));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        smart_truncate_path(&project.path),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!("  · {}", format_age(project.last_used, now)),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(Line::from(spans))
}

fn draw_status_line<S>(frame: &mut Frame, app: &App<S>, area: ratatui::layout::Rect)
where
    S: StateStore + Clone + Send + Sync + 'static,
{
    let line = match &app.status {
        Some(status) => {
            let style = if status.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            Line::styled(status.message.clone(), style)
        }
        None => Line::styled(
            " enter open · ctrl-y copy path · ctrl-r reveal · ctrl-n new window · esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(line), area);
}
