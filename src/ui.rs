use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{ColorForm, ListRow, Mode, State};
use crate::cli::Opts;
use crate::hex;

/// Stateless renderer: draws the current [`State`] every frame
pub struct UI;

impl UI {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, f: &mut Frame, state: &State, cli: &Opts) {
        let size = f.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);
        let (title_area, list_area, input_area) = (chunks[0], chunks[1], chunks[2]);

        let border_type = if cli.rounded_borders {
            BorderType::Rounded
        } else {
            BorderType::Plain
        };

        // Title/status panel
        let status = if state.status.is_empty() {
            format!("{} colors shown", state.rows.iter().filter(|r| r.selectable()).count())
        } else {
            state.status.clone()
        };
        let title_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(cli.main_border_color))
            .border_type(border_type)
            .title(Span::styled(
                format!(" Csel — {} ", state.category.as_str()),
                Style::default().fg(cli.header_title_color),
            ));
        f.render_widget(
            Paragraph::new(status)
                .block(title_block)
                .style(Style::default().fg(cli.main_text_color)),
            title_area,
        );

        // Color list
        let items: Vec<ListItem> = state.rows.iter().map(|row| row_item(row, cli)).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(cli.list_border_color))
                    .border_type(border_type)
                    .title(Span::styled(
                        " Colors ",
                        Style::default().fg(cli.header_title_color),
                    )),
            )
            .style(Style::default().fg(cli.list_text_color))
            .highlight_style(
                Style::default()
                    .fg(cli.highlight_color)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(state.selected);
        f.render_stateful_widget(list, list_area, &mut list_state);

        // Search input
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(cli.input_border_color))
            .border_type(border_type)
            .title(Span::styled(
                " Search ",
                Style::default().fg(cli.header_title_color),
            ));
        f.render_widget(
            Paragraph::new(format!("{}{}", state.query, cli.cursor))
                .block(input_block)
                .style(Style::default().fg(cli.input_text_color)),
            input_area,
        );

        if let Mode::Form(form) = &state.mode {
            render_form(f, form, cli, size);
        }
    }
}

/// One list line: headers are dimmed labels, entries get a color
/// swatch, title and hex detail.
fn row_item<'a>(row: &'a ListRow, cli: &Opts) -> ListItem<'a> {
    match row {
        ListRow::Header(label) => ListItem::new(Line::from(Span::styled(
            *label,
            Style::default()
                .fg(cli.header_title_color)
                .add_modifier(Modifier::DIM | Modifier::BOLD),
        ))),
        ListRow::Quick(quick) => {
            let (title, detail) = match quick {
                crate::hex::QuickInput::Solid(hex) => ("Fill screen", hex.clone()),
                crate::hex::QuickInput::Gradient(a, b) => {
                    ("Fill gradient", format!("{} → {}", a, b))
                }
            };
            let mut spans = swatch(quick.hex(), quick.hex2());
            spans.push(Span::raw(format!("{}  ", title)));
            spans.push(Span::styled(detail, Style::default().add_modifier(Modifier::DIM)));
            ListItem::new(Line::from(spans))
        }
        ListRow::Recent(entry) => {
            let mut spans = swatch(&entry.hex, entry.hex2.as_deref());
            spans.push(Span::raw(entry.title.clone()));
            spans.push(Span::styled(
                format!("  {}", entry.hex),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(Line::from(spans))
        }
        ListRow::Custom(option) => {
            let mut spans = swatch(&option.hex, option.hex2.as_deref());
            if option.favorite {
                spans.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
            }
            spans.push(Span::raw(option.title.clone()));
            spans.push(Span::styled(
                format!("  {}", detail_of(option)),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(Line::from(spans))
        }
        ListRow::Preset { option, favorite } => {
            let mut spans = swatch(&option.hex, option.hex2.as_deref());
            if *favorite {
                spans.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
            }
            spans.push(Span::raw(option.title.clone()));
            spans.push(Span::styled(
                format!("  {}", detail_of(option)),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(Line::from(spans))
        }
        ListRow::Create => ListItem::new(Line::from(vec![
            Span::raw("＋ "),
            Span::raw("Custom Color…"),
        ])),
    }
}

fn detail_of(option: &crate::model::ColorOption) -> String {
    if option.is_gradient() {
        format!(
            "{} → {}",
            option.hex,
            option.hex2.as_deref().unwrap_or_default()
        )
    } else {
        option.hex.clone()
    }
}

/// Colored block(s) previewing the entry
fn swatch(hex1: &str, hex2: Option<&str>) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some((r, g, b)) = hex::rgb_of(hex1) {
        spans.push(Span::styled(
            "██",
            Style::default().fg(Color::Rgb(r, g, b)),
        ));
    }
    if let Some((r, g, b)) = hex2.and_then(hex::rgb_of) {
        spans.push(Span::styled(
            "██",
            Style::default().fg(Color::Rgb(r, g, b)),
        ));
    }
    spans.push(Span::raw(" "));
    spans
}

fn render_form(f: &mut Frame, form: &ColorForm, cli: &Opts, size: Rect) {
    let width = size.width.min(48);
    let height = 9;
    let area = Rect::new(
        size.x + (size.width.saturating_sub(width)) / 2,
        size.y + (size.height.saturating_sub(height)) / 2,
        width,
        height.min(size.height),
    );
    f.render_widget(Clear, area);

    let title = if form.editing.is_some() {
        " Edit Custom Color "
    } else {
        " New Custom Color "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if cli.rounded_borders {
            BorderType::Rounded
        } else {
            BorderType::Plain
        })
        .border_style(Style::default().fg(cli.highlight_color))
        .title(Span::styled(
            title,
            Style::default().fg(cli.header_title_color),
        ));

    let field = |label: &str, value: &str, index: usize| -> Line<'static> {
        let style = if form.focus == index {
            Style::default()
                .fg(cli.highlight_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(cli.main_text_color)
        };
        Line::from(vec![
            Span::styled(format!("{:<10}", label), style),
            Span::styled(value.to_string(), style),
            if form.focus == index {
                Span::styled(cli.cursor.clone(), style)
            } else {
                Span::raw("")
            },
        ])
    };

    let mut lines = vec![
        field("Title", &form.title, 0),
        field("Hex", &form.hex, 1),
        field("Hex 2", &form.hex2, 2),
        field("Keywords", &form.keywords, 3),
        Line::from(""),
    ];
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Enter saves · Esc cancels · Tab next field",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left),
        area,
    );
}
