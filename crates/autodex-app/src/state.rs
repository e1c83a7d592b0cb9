// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Theme, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewKind,
    pub theme: Theme,
    pub loading: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: ViewKind::Tree,
            theme: Theme::Dark,
            loading: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SwitchView(ViewKind),
    NextView,
    PrevView,
    ToggleTheme,
    BeginLoading,
    EndLoading,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    ThemeChanged(Theme),
    LoadingChanged(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SwitchView(view) => {
                if self.view == view {
                    return Vec::new();
                }
                self.view = view;
                vec![AppEvent::ViewChanged(view)]
            }
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![
                    AppEvent::ThemeChanged(self.theme),
                    self.set_status(&format!("theme {}", self.theme.as_str())),
                ]
            }
            AppCommand::BeginLoading => {
                self.loading = true;
                vec![AppEvent::LoadingChanged(true)]
            }
            AppCommand::EndLoading => {
                self.loading = false;
                vec![AppEvent::LoadingChanged(false)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.view = views[next];
        vec![AppEvent::ViewChanged(self.view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{Theme, ViewKind};

    #[test]
    fn view_rotation_wraps() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(state.view, ViewKind::Grid);
        assert_eq!(events, vec![AppEvent::ViewChanged(ViewKind::Grid)]);

        state.dispatch(AppCommand::PrevView);
        assert_eq!(state.view, ViewKind::Tree);
    }

    #[test]
    fn switching_to_active_view_is_a_no_op() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::SwitchView(ViewKind::Tree)).is_empty());
        assert_eq!(
            state.dispatch(AppCommand::SwitchView(ViewKind::Table)),
            vec![AppEvent::ViewChanged(ViewKind::Table)]
        );
    }

    #[test]
    fn theme_toggle_updates_status() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::ToggleTheme);
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(
            events,
            vec![
                AppEvent::ThemeChanged(Theme::Light),
                AppEvent::StatusUpdated("theme light".to_owned()),
            ],
        );
    }

    #[test]
    fn loading_brackets_toggle_flag() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::BeginLoading);
        assert!(state.loading);
        state.dispatch(AppCommand::EndLoading);
        assert!(!state.loading);
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("load failed".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("load failed"));
        assert_eq!(
            state.dispatch(AppCommand::ClearStatus),
            vec![AppEvent::StatusCleared]
        );
        assert_eq!(state.status_line, None);
    }
}
