//! Encoder settings for the main and second video streams.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;
use strum::IntoEnumIterator;

use intercfg_core::PanelUpdate;
use intercfg_core::settings::video::bitrate_options;
use intercfg_core::settings::{
    BitrateMode, Resolution, StreamKind, StreamSettings, VideoProfile, VideoSettings,
};

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;
use crate::widgets::sub_tabs::render_sub_tabs;

const HINTS: &[(&str, &str)] = &[
    ("PgUp/PgDn", "stream"),
    ("↑/↓", "field"),
    ("◂/▸", "change"),
    ("Ctrl+S", "save"),
    ("Esc", "back"),
];

fn index_of<T: PartialEq>(mut all: impl Iterator<Item = T>, value: &T) -> usize {
    all.position(|x| x == *value).unwrap_or(0)
}

pub struct VideoStreamScreen {
    draft: VideoSettings,
    kind: StreamKind,
    form: Form,
    bitrates: Vec<u32>,
}

impl VideoStreamScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let draft = ctx.panel.video.clone();
        let bitrates = bitrate_options();
        let form = Self::build_form(draft.stream(StreamKind::Main), &bitrates);
        Self {
            draft,
            kind: StreamKind::Main,
            form,
            bitrates,
        }
    }

    fn build_form(s: &StreamSettings, bitrates: &[u32]) -> Form {
        Form::new(vec![
            Field::readonly("codec", "Codec", s.codec.clone()),
            Field::choice(
                "profile",
                "Profile",
                VideoProfile::iter(),
                index_of(VideoProfile::iter(), &s.profile),
            ),
            Field::choice(
                "resolution",
                "Resolution",
                Resolution::iter(),
                index_of(Resolution::iter(), &s.resolution),
            ),
            Field::number("framerate", "Frame rate (fps)", s.framerate.clone()),
            Field::choice(
                "bitrate_mode",
                "Bitrate control",
                BitrateMode::iter(),
                index_of(BitrateMode::iter(), &s.bitrate_mode),
            ),
            Field::choice(
                "bitrate",
                "Bitrate",
                bitrates.iter().map(|b| format!("{b} kbit/s")),
                index_of(bitrates.iter().copied(), &s.bitrate_kbps),
            ),
            Field::number("keyframe", "I-frame interval", s.keyframe_interval.clone()),
            Field::button("save", "Save"),
        ])
    }

    /// Copy the visible form into the draft stream it edits.
    fn store_form(&mut self) {
        let form = &self.form;
        let bitrate = self.bitrates.get(form.choice("bitrate")).copied();
        let stream = self.draft.stream_mut(self.kind);
        stream.profile = VideoProfile::iter()
            .nth(form.choice("profile"))
            .unwrap_or(stream.profile);
        stream.resolution = Resolution::iter()
            .nth(form.choice("resolution"))
            .unwrap_or(stream.resolution);
        form.text("framerate").clone_into(&mut stream.framerate);
        stream.bitrate_mode = BitrateMode::iter()
            .nth(form.choice("bitrate_mode"))
            .unwrap_or(stream.bitrate_mode);
        stream.bitrate_kbps = bitrate.unwrap_or(stream.bitrate_kbps);
        form.text("keyframe").clone_into(&mut stream.keyframe_interval);
    }

    fn switch_stream(&mut self, kind: StreamKind) {
        if kind == self.kind {
            return;
        }
        self.store_form();
        self.kind = kind;
        self.form = Self::build_form(self.draft.stream(kind), &self.bitrates);
    }

    fn submit(&mut self) -> Option<Action> {
        self.store_form();
        match self.draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::Video(self.draft.clone()))),
            Err(e) => {
                self.form.set_error(Some(e.to_string()));
                None
            }
        }
    }
}

impl Component for VideoStreamScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::PageUp => {
                self.switch_stream(StreamKind::Main);
                return Ok(None);
            }
            KeyCode::PageDown => {
                self.switch_stream(StreamKind::Second);
                return Ok(None);
            }
            _ => {}
        }
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => self.submit(),
            FormEvent::Cancel => Some(Action::GoBack),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Video stream");
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        let labels: Vec<&str> = StreamKind::iter().map(StreamKind::label).collect();
        let active = index_of(StreamKind::iter(), &self.kind);
        frame.render_widget(Paragraph::new(render_sub_tabs(&labels, active)), layout[0]);
        self.form.render(frame, layout[1]);
        frame.render_widget(Paragraph::new(hint_line(HINTS)), layout[2]);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Video stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, key};

    #[test]
    fn edits_survive_switching_streams() {
        let harness = Harness::default();
        let mut screen = VideoStreamScreen::new(&harness.ctx());

        // Profile is the first focusable field.
        screen.handle_key_event(key(KeyCode::Right)).ok();
        screen.handle_key_event(key(KeyCode::PageDown)).ok();
        assert_eq!(screen.kind, StreamKind::Second);
        screen.handle_key_event(key(KeyCode::PageUp)).ok();

        let Some(Action::SavePanel(update)) = screen.handle_key_event(ctrl('s')).ok().flatten()
        else {
            panic!("expected a save");
        };
        let PanelUpdate::Video(video) = *update else {
            panic!("wrong section");
        };
        assert_eq!(video.main.profile, VideoProfile::Main);
        assert_eq!(video.second, harness.panel.video.second);
    }

    #[test]
    fn invalid_framerate_blocks_saving() {
        let harness = Harness::default();
        let mut screen = VideoStreamScreen::new(&harness.ctx());
        for _ in 0..2 {
            screen.handle_key_event(key(KeyCode::Tab)).ok();
        }
        assert_eq!(screen.form.focused_key(), Some("framerate"));
        screen.handle_key_event(key(KeyCode::Char('9'))).ok();
        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        assert_eq!(
            screen.form.error(),
            Some("Main stream: frame rate must be between 1 and 30")
        );
    }
}
