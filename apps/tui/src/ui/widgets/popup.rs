use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

/// Rectangle of the given share of `area`, centered in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

const WIDTH_PERCENT: u16 = 70;
const HEIGHT_PERCENT: u16 = 80;

/// Overlay drawn over whatever is below it, with a closing hint on its last
/// inner row.
pub struct Popup<'a> {
    title: &'a str,
    body: Text<'a>,
    hint: &'a str,
}

impl<'a> Popup<'a> {
    pub fn new(title: &'a str, body: Text<'a>) -> Self {
        Self {
            title,
            body,
            hint: "",
        }
    }

    #[must_use]
    pub const fn hint(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }
}

impl Widget for Popup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(WIDTH_PERCENT, HEIGHT_PERCENT, area);
        Clear.render(popup_area, buf);

        let accent = Style::default().fg(Color::Yellow);
        let block = Block::default()
            .title(self.title)
            .title_style(accent.add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(accent);

        Paragraph::new(self.body)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(popup_area, buf);

        if self.hint.is_empty() || popup_area.height < 3 {
            return;
        }
        let hint_area = Rect {
            x: popup_area.x,
            y: popup_area.y + popup_area.height - 2,
            width: popup_area.width,
            height: 1,
        };
        Paragraph::new(self.hint)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(hint_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::{centered_rect, Popup};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::text::Text;
    use ratatui::widgets::Widget;

    #[test]
    fn centers_the_requested_share() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 50, area);
        assert_eq!(rect, Rect::new(20, 10, 60, 20));
    }

    #[test]
    fn draws_title_and_hint() {
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        Popup::new("Help", Text::from("body"))
            .hint("Esc to close")
            .render(area, &mut buf);

        let rows: Vec<String> = (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect())
            .collect();
        // 28x8 popup at (6, 1)
        assert!(rows[1].contains("Help"));
        assert!(rows[2].contains("body"));
        assert!(rows[7].contains("Esc to close"));
        assert!(rows[0].trim().is_empty());
    }
}
