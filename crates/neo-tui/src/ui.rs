use neo_core::models::conversation_log::{Alignment as Side, RenderEntry};
use neo_core::models::notifications::{NotificationKind, NotificationLevel};
use neo_core::services::search_filter::count_label;
use neo_core::settings::Theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, InputMode, ProfileItem, RowKey, Screen};

const ACCENT: Color = Color::Rgb(0, 208, 132);

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    border: Color,
    user: Color,
    error: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            bg: Color::Rgb(17, 24, 39),
            fg: Color::Rgb(243, 244, 246),
            muted: Color::Rgb(156, 163, 175),
            border: Color::Rgb(75, 85, 99),
            user: Color::Rgb(55, 65, 81),
            error: Color::Rgb(248, 113, 113),
        },
        Theme::Light => Palette {
            bg: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(17, 24, 39),
            muted: Color::Rgb(107, 114, 128),
            border: Color::Rgb(209, 213, 219),
            user: Color::Rgb(229, 231, 235),
            error: Color::Rgb(220, 38, 38),
        },
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let colors = palette(app.theme());
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)), area);

    app.hit_areas.profile_menu = None;
    app.hit_areas.row_menu = None;

    if app.screen == Screen::Landing {
        render_landing(app, frame, area, colors);
        render_toasts(app, frame, area, colors);
        return;
    }

    let [body_area, footer_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let sidebar_width = if app.sidebar_collapsed { 6 } else { 30 };
    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(20)])
            .areas(body_area);

    render_sidebar(app, frame, sidebar_area, colors);
    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, main_area, colors),
        Screen::Chats | Screen::Memories => render_list_screen(app, frame, main_area, colors),
        Screen::Landing => {}
    }
    render_footer(app, frame, footer_area, colors);

    if app.profile_menu.is_open() {
        render_profile_menu(app, frame, sidebar_area, colors);
    }
    if app.row_menu.is_open() {
        render_row_menu(app, frame, main_area, colors);
    }
    if app.input_mode == InputMode::AttachPath {
        render_attach_prompt(app, frame, main_area, colors);
    }
    render_toasts(app, frame, area, colors);
}

fn render_landing(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .areas(area);

    let text = Text::from(vec![
        Line::from(Span::styled("▟▀▀▙", Style::default().fg(ACCENT))),
        Line::from(Span::styled("█  █", Style::default().fg(ACCENT))),
        Line::default(),
        Line::from(Span::styled(
            "Ask Neo",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your personal assistant, in the terminal",
            Style::default().fg(colors.muted),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(" Enter ", Style::default().bg(ACCENT).fg(Color::Black)),
            Span::raw(" log in   "),
            Span::styled("t", Style::default().fg(ACCENT)),
            Span::raw(format!(" theme ({})   ", app.theme().as_str())),
            Span::styled("q", Style::default().fg(ACCENT)),
            Span::raw(" quit"),
        ]),
    ]);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), center);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(colors.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [nav_area, recents_area, profile_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(inner);

    let active = |screen: Screen| {
        if app.screen == screen {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let nav: Vec<Line> = if app.sidebar_collapsed {
        vec![
            Line::from(Span::styled(" N", Style::default().fg(ACCENT))),
            Line::from(Span::styled(" +", active(Screen::Chat))),
            Line::from(Span::styled(" ≡", active(Screen::Chats))),
            Line::from(Span::styled(" ✦", active(Screen::Memories))),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled(" Neo", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Span::styled("   b collapse", Style::default().fg(colors.muted)),
            ]),
            Line::from(Span::styled(" + New chat      n", active(Screen::Chat))),
            Line::from(Span::styled(" ≡ Chats         c", active(Screen::Chats))),
            Line::from(Span::styled(" ✦ Memories      m", active(Screen::Memories))),
        ]
    };
    frame.render_widget(Paragraph::new(nav), nav_area);

    if !app.sidebar_collapsed {
        let mut lines = vec![Line::from(Span::styled(
            " Recents",
            Style::default().fg(colors.muted),
        ))];
        let width = recents_area.width.saturating_sub(3) as usize;
        lines.extend(
            app.chats
                .iter()
                .map(|chat| Line::from(format!(" {}", truncate(&chat.title, width)))),
        );
        frame.render_widget(Paragraph::new(lines), recents_area);
    }

    let initial = app
        .config
        .user_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    let profile = if app.sidebar_collapsed {
        Line::from(Span::styled(format!(" ({})", initial), Style::default().fg(ACCENT)))
    } else {
        Line::from(vec![
            Span::styled(format!(" ({}) ", initial), Style::default().fg(ACCENT)),
            Span::raw(app.config.user_name.clone()),
            Span::styled("  p", Style::default().fg(colors.muted)),
        ])
    };
    frame.render_widget(Paragraph::new(profile), profile_area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    let composer_height = composer_height(app);
    let [header_area, messages_area, composer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(composer_height),
    ])
    .areas(area);

    let theme_label = match app.theme() {
        Theme::Dark => "☾ dark",
        Theme::Light => "☀ light",
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(theme_label, Style::default().fg(colors.muted)),
            Span::styled("  t ", Style::default().fg(colors.muted)),
        ]))
        .alignment(Alignment::Right),
        header_area,
    );

    app.hit_areas.chat_area = Some(messages_area);
    if app.session.log().is_empty() && !app.session.is_pending() {
        let [_, greeting_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(messages_area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                app.config.greeting(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            greeting_area,
        );
    } else {
        render_messages(app, frame, messages_area, colors);
    }

    render_composer(app, frame, composer_area, colors);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let bubble_width = (width * 3 / 4).max(10);
    let mut lines: Vec<Line> = Vec::new();

    for entry in app.session.log().render_entries() {
        match entry {
            RenderEntry::Message { message, alignment } => {
                let (align, style, label) = match alignment {
                    Side::End => (
                        Alignment::Right,
                        Style::default().bg(colors.user).fg(colors.fg),
                        "You",
                    ),
                    Side::Start => (Alignment::Left, Style::default().fg(colors.fg), "Neo"),
                };
                lines.push(
                    Line::from(Span::styled(label, Style::default().fg(colors.muted)))
                        .alignment(align),
                );
                for text_line in message.content().lines() {
                    for chunk in wrap_line(text_line, bubble_width) {
                        lines.push(
                            Line::from(Span::styled(format!(" {} ", chunk), style))
                                .alignment(align),
                        );
                    }
                }
                lines.push(Line::default());
            }
            RenderEntry::Typing => {
                let dots = "•".repeat(app.animation_frame as usize + 1);
                lines.push(Line::from(vec![
                    Span::styled("Neo ", Style::default().fg(colors.muted)),
                    Span::styled(dots, Style::default().fg(ACCENT)),
                ]));
            }
        }
    }

    let visible = area.height as usize;
    let max_scroll = lines.len().saturating_sub(visible) as u16;
    if app.follow_bottom || app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::NONE))
            .scroll((app.chat_scroll, 0)),
        area,
    );
}

fn composer_height(app: &App) -> u16 {
    let text_lines = app.composer_input.lines().len().clamp(1, 6) as u16;
    let attachment = u16::from(app.session.composer().attachment().is_some());
    text_lines + attachment + 2
}

fn render_composer(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    let composer = app.session.composer();
    let editing = app.input_mode == InputMode::Editing;
    let border = if editing { ACCENT } else { colors.border };

    let mic = if !composer.supports_dictation() {
        Span::styled("mic n/a", Style::default().fg(colors.muted))
    } else if composer.is_recording() {
        Span::styled("● recording  v stop", Style::default().fg(colors.error))
    } else {
        Span::styled("v dictate", Style::default().fg(colors.muted))
    };
    let send = if app.session.can_submit() {
        Span::styled("⏎ send", Style::default().fg(ACCENT))
    } else {
        Span::styled("⏎ send", Style::default().fg(colors.muted))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(" Message ")
        .title_bottom(Line::from(vec![
            Span::raw(" "),
            Span::styled("a attach", Style::default().fg(colors.muted)),
            Span::raw("  "),
            mic,
            Span::raw("  "),
            send,
            Span::raw(" "),
        ]));
    let inner = block.inner(area);

    let attachment_line = composer.attachment().map(|attachment| {
        Line::from(vec![
            Span::styled(
                format!("📎 {} ", attachment.name),
                Style::default().fg(ACCENT),
            ),
            Span::styled(
                format!("({})  x remove", attachment.display_size()),
                Style::default().fg(colors.muted),
            ),
        ])
    });
    frame.render_widget(block, area);

    let [attachment_area, text_area] = Layout::vertical([
        Constraint::Length(u16::from(attachment_line.is_some())),
        Constraint::Min(1),
    ])
    .areas(inner);
    if let Some(line) = attachment_line {
        frame.render_widget(Paragraph::new(line), attachment_area);
    }

    if editing {
        app.composer_input
            .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
    } else {
        app.composer_input.set_cursor_style(Style::default());
    }
    app.composer_input
        .set_placeholder_style(Style::default().fg(colors.muted));
    frame.render_widget(&app.composer_input, text_area);
}

fn render_list_screen(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    let [title_area, search_area, list_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .areas(area);

    let (title, placeholder) = match app.screen {
        Screen::Memories => ("Memories", "Search your memories..."),
        _ => ("Chats", "Search your chats..."),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        title_area,
    );

    let (filtered, total) = match app.screen {
        Screen::Memories => (app.filtered_memories().len(), app.memories.len()),
        _ => (app.filtered_chats().len(), app.chats.len()),
    };
    let searching = app.input_mode == InputMode::Search;
    let query = app.query().to_string();
    let search_line = if query.is_empty() && !searching {
        Line::from(Span::styled(
            format!("{}  (/ to search)", placeholder),
            Style::default().fg(colors.muted),
        ))
    } else {
        Line::from(query.clone())
    };
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if searching { ACCENT } else { colors.border }))
        .title_top(Line::from(format!(" {} ", count_label(filtered, total))).right_aligned());
    let search_inner = search_block.inner(search_area);
    frame.render_widget(Paragraph::new(search_line).block(search_block), search_area);
    if searching {
        let col = search_inner.x + query.chars().count() as u16;
        frame.set_cursor_position((
            col.min(search_inner.right().saturating_sub(1)),
            search_inner.y,
        ));
    }

    let items: Vec<ListItem> = match app.screen {
        Screen::Memories => app
            .filtered_memories()
            .into_iter()
            .map(|memory| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            memory.title.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", memory.kind.label()),
                            Style::default().fg(ACCENT),
                        ),
                    ]),
                    Line::from(Span::styled(
                        memory.content.clone(),
                        Style::default().fg(colors.muted),
                    )),
                    Line::from(Span::styled(
                        memory.created_at.format("%b %-d, %Y").to_string(),
                        Style::default().fg(colors.muted),
                    )),
                ])
            })
            .collect(),
        _ => app
            .filtered_chats()
            .into_iter()
            .map(|chat| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        chat.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        chat.last_message.clone(),
                        Style::default().fg(colors.muted),
                    )),
                ])
            })
            .collect(),
    };

    if items.is_empty() {
        let noun = if app.screen == Screen::Memories { "memories" } else { "chats" };
        let hint = match (app.screen, query.is_empty()) {
            (_, false) => "Try adjusting your search terms",
            (Screen::Memories, true) => "Start saving your conversations and insights",
            (_, true) => "Start a new chat to see it here",
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::default(),
                Line::from(Span::styled(
                    format!("No {} found", noun),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(hint, Style::default().fg(colors.muted))),
            ])
            .alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let list = List::new(items)
        .highlight_style(Style::default().fg(ACCENT))
        .highlight_symbol("▌ ")
        .block(
            Block::default()
                .borders(Borders::NONE)
                .title_bottom(Span::styled(
                    " j/k move  Enter menu ",
                    Style::default().fg(colors.muted),
                )),
        );
    frame.render_stateful_widget(list, list_area, &mut app.list_state);
}

fn render_profile_menu(app: &mut App, frame: &mut Frame, sidebar_area: Rect, colors: Palette) {
    let height = ProfileItem::ALL.len() as u16 + 5;
    let width = 30u16.min(frame.area().width);
    let area = Rect {
        x: sidebar_area.x,
        y: sidebar_area.bottom().saturating_sub(height + 2),
        width,
        height,
    };
    app.hit_areas.profile_menu = Some(area);

    let mut lines = vec![
        Line::from(Span::styled(
            app.config.user_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            app.config.user_email.clone(),
            Style::default().fg(colors.muted),
        )),
        Line::default(),
    ];
    for (i, item) in ProfileItem::ALL.iter().enumerate() {
        let style = match (i == app.profile_selection, item) {
            (true, _) => Style::default().fg(Color::Black).bg(ACCENT),
            (false, ProfileItem::Logout) => Style::default().fg(colors.error),
            (false, _) => Style::default(),
        };
        lines.push(Line::from(Span::styled(format!(" {} ", item.label()), style)));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.bg)),
        ),
        area,
    );
}

fn render_row_menu(app: &mut App, frame: &mut Frame, main_area: Rect, colors: Palette) {
    let Some(key) = app.row_menu.current().cloned() else {
        return;
    };
    let items = key.items();
    let height = items.len() as u16 + 2;
    let width: u16 = 16;
    let row = app.list_state.selected().unwrap_or(0) as u16;
    let rows_per_entry = match key {
        RowKey::Memory(_) => 3,
        _ => 2,
    };
    let area = Rect {
        x: main_area.right().saturating_sub(width + 2),
        y: (main_area.y + 5 + row * rows_per_entry).min(main_area.bottom().saturating_sub(height)),
        width,
        height,
    };
    app.hit_areas.row_menu = Some(area);

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let style = match (i == app.row_menu_selection, *label) {
                (true, _) => Style::default().fg(Color::Black).bg(ACCENT),
                (false, "Delete") => Style::default().fg(colors.error),
                (false, _) => Style::default(),
            };
            Line::from(Span::styled(format!(" {} ", label), style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.bg)),
        ),
        area,
    );
}

fn render_attach_prompt(app: &App, frame: &mut Frame, main_area: Rect, colors: Palette) {
    let width = main_area.width.saturating_sub(4).min(70);
    let area = Rect {
        x: main_area.x + (main_area.width.saturating_sub(width)) / 2,
        y: main_area.y + main_area.height / 2,
        width,
        height: 3,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(" Attach file (path) ")
        .style(Style::default().bg(colors.bg));
    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(app.attach_input.as_str()).block(block), area);
    let col = inner.x + app.attach_input.chars().count() as u16;
    frame.set_cursor_position((col.min(inner.right().saturating_sub(1)), inner.y));
}

fn render_toasts(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let toasts = app.notifications.all();
    let width = 44u16.min(area.width);
    for (i, toast) in toasts.iter().rev().take(3).enumerate() {
        let toast_area = Rect {
            x: area.right().saturating_sub(width + 1),
            y: area.y + 1 + i as u16 * 3,
            width,
            height: 3,
        };
        if toast_area.bottom() > area.bottom() {
            break;
        }
        let color = match toast.level {
            NotificationLevel::Error => colors.error,
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Info => ACCENT,
        };
        let title = match toast.kind {
            NotificationKind::Blocking => " Esc to dismiss ",
            NotificationKind::Transient => "",
        };
        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(toast.message.as_str())
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(color))
                        .title_bottom(Line::from(title).right_aligned())
                        .style(Style::default().bg(colors.bg)),
                ),
            toast_area,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let hints = match (app.screen, app.input_mode) {
        (_, InputMode::Editing) => "Enter send  Alt+Enter newline  Ctrl+U clear  Esc done",
        (_, InputMode::AttachPath) => "Enter attach  Esc cancel",
        (_, InputMode::Search) => "type to filter  Esc done",
        (Screen::Chat, _) => {
            "i type  a attach  v dictate  n new  c chats  m memories  p profile  q quit"
        }
        _ => "/ search  j/k move  Enter menu  h home  q quit",
    };

    let errors = app.error_store.error_count();
    let warnings = app.error_store.warning_count();
    let mut spans = vec![Span::styled(
        format!(" {}", hints),
        Style::default().fg(colors.muted),
    )];
    if warnings > 0 || errors > 0 {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("⚠ {} ", warnings),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!("✖ {}", errors),
            Style::default().fg(colors.error),
        ));
        if let Some(latest) = app.error_store.latest() {
            spans.push(Span::styled(
                format!("  {}", truncate(&latest.message, 48)),
                Style::default().fg(colors.muted),
            ));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Break `line` into chunks of at most `width` chars
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
