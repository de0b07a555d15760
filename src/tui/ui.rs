//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::bits::{Bit, Nibble};
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(frame.area());

    // Left side: program, status and input
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(18),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_program(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);
    draw_input(frame, left_chunks[2], app);

    // Right side: registers and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(6),
        ])
        .split(chunks[1]);

    draw_registers(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw program memory with the clock address highlighted.
fn draw_program(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let items: Vec<ListItem> = app
        .get_program_listing()
        .into_iter()
        .map(|(addr, text, is_current)| {
            let prefix = if is_current { "▶ " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.cpu.mem.read(Nibble::new(addr)).is_zero() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(format!("{}P{:<2} {}", prefix, addr, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register file, clock and machine state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let mut content: Vec<Line> = app
        .cpu
        .regs
        .values()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mut spans = vec![Span::raw(format!("R{:<3}", i))];
            spans.extend(bit_spans(*value));
            spans.push(Span::raw(format!(" = {:>2}", value.value())));
            Line::from(spans)
        })
        .collect();

    let mut clock = vec![Span::raw("CLK ")];
    clock.extend(bit_spans(app.cpu.regs.pc));
    clock.push(Span::raw(format!(" = {:>2}", app.cpu.regs.pc.value())));
    content.push(Line::from(clock));

    content.push(Line::from(vec![
        Span::raw("Cycles: "),
        Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        Span::raw("   Mode: "),
        Span::styled(format!("{}", app.cpu.mode()),
            if app.cpu.is_running() {
                Style::default().fg(Color::Green)
            } else if app.cpu.is_programming() {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::White)
            }),
    ]));

    if let Some(instr) = app.cpu.last_instruction() {
        content.push(Line::from(format!(
            "Last: {}",
            crate::asm::disasm::format_instruction(&instr)
        )));
    }

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw the input line.
fn draw_input(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let input = Paragraph::new(format!("> {}_", app.input))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default()
            .title(" Input ")
            .borders(Borders::ALL));

    frame.render_widget(input, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("OPCODE INPUT1 INPUT2, e.g. 011 0001 0101"),
        Line::from("program  end  run  reset  exit"),
        Line::from("Esc: Stop run  Ctrl-C: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Colored spans for the bits of a nibble.
fn bit_spans(value: Nibble) -> Vec<Span<'static>> {
    value
        .to_bits()
        .into_iter()
        .map(|bit| Span::styled(bit.to_char().to_string(), bit_style(bit)))
        .collect()
}

/// Get color style for a bit.
fn bit_style(b: Bit) -> Style {
    match b {
        Bit::Zero => Style::default().fg(Color::Gray),
        Bit::One => Style::default().fg(Color::Green),
    }
}
