//! Three-band equalizer with a bar preview.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{BarChart, Paragraph};

use intercfg_core::PanelUpdate;
use intercfg_core::settings::{Equalizer, LEVEL_MAX};

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::popup::render_screen_block;

pub struct EqualizerScreen {
    form: Form,
}

impl EqualizerScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let eq = ctx.panel.equalizer;
        Self {
            form: Form::new(vec![
                Field::level("low", "Low", eq.low, LEVEL_MAX),
                Field::level("mid", "Mid", eq.mid, LEVEL_MAX),
                Field::level("high", "High", eq.high, LEVEL_MAX),
                Field::button("save", "Save"),
            ]),
        }
    }

    fn draft(&self) -> Equalizer {
        Equalizer {
            low: self.form.level("low"),
            mid: self.form.level("mid"),
            high: self.form.level("high"),
        }
    }
}

impl Component for EqualizerScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => {
                Some(Action::save(PanelUpdate::Equalizer(self.draft())))
            }
            FormEvent::Cancel => Some(Action::GoBack),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Equalizer");
        let rows = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(inner);
        let cols = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(rows[0]);

        self.form.render(frame, cols[0]);

        let eq = self.draft();
        let data = [
            ("Low", u64::from(eq.low)),
            ("Mid", u64::from(eq.mid)),
            ("High", u64::from(eq.high)),
        ];
        let chart = BarChart::default()
            .data(&data[..])
            .max(u64::from(LEVEL_MAX))
            .bar_width(5)
            .bar_gap(2)
            .bar_style(Style::default().fg(theme::ELECTRIC_PURPLE))
            .value_style(Style::default().fg(theme::BG_DARK).bg(theme::ELECTRIC_PURPLE))
            .label_style(theme::key_hint());
        frame.render_widget(chart, cols[1]);

        frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), rows[1]);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Equalizer"
    }
}
