use crate::app::AppScreen;
use crate::arcade::game::ArcadeView;
use crate::session::test::TypingView;
use crate::store::history::HistoryFilter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
}

impl ChartKind {
    pub fn toggle(self) -> Self {
        match self {
            ChartKind::Bar => ChartKind::Line,
            ChartKind::Line => ChartKind::Bar,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub screen: AppScreen,
    pub history_filter: HistoryFilter,
    pub chart: ChartKind,
    pub notification: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Slice {
    Typing(TypingView),
    Arcade(ArcadeView),
    Ui(UiState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SliceKind {
    Typing,
    Arcade,
    Ui,
}

impl Slice {
    pub fn kind(&self) -> SliceKind {
        match self {
            Slice::Typing(_) => SliceKind::Typing,
            Slice::Arcade(_) => SliceKind::Arcade,
            Slice::Ui(_) => SliceKind::Ui,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

type Watcher = Box<dyn FnMut(&Slice)>;

/// Latest value of each slice plus the watchers interested in it.
///
/// `update` stores the new value and notifies that slice's watchers once,
/// and only if the value actually changed.
#[derive(Default)]
pub struct StateStore {
    typing: Option<TypingView>,
    arcade: Option<ArcadeView>,
    ui: UiState,
    watchers: Vec<(WatchId, SliceKind, Watcher)>,
    next_id: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch<F>(&mut self, kind: SliceKind, watcher: F) -> WatchId
    where
        F: FnMut(&Slice) + 'static,
    {
        let id = WatchId(self.next_id);
        self.next_id += 1;
        self.watchers.push((id, kind, Box::new(watcher)));
        id
    }

    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(wid, _, _)| *wid != id);
        self.watchers.len() != before
    }

    /// Returns true when the slice changed and watchers were told.
    pub fn update(&mut self, slice: Slice) -> bool {
        let changed = match &slice {
            Slice::Typing(view) => self.typing.as_ref() != Some(view),
            Slice::Arcade(view) => self.arcade.as_ref() != Some(view),
            Slice::Ui(state) => &self.ui != state,
        };
        if !changed {
            return false;
        }

        let kind = slice.kind();
        for (_, watched, watcher) in &mut self.watchers {
            if *watched == kind {
                watcher(&slice);
            }
        }
        match slice {
            Slice::Typing(view) => self.typing = Some(view),
            Slice::Arcade(view) => self.arcade = Some(view),
            Slice::Ui(state) => self.ui = state,
        }
        true
    }

    /// Change the UI slice in place.
    pub fn update_ui(&mut self, f: impl FnOnce(&mut UiState)) -> bool {
        let mut ui = self.ui.clone();
        f(&mut ui);
        self.update(Slice::Ui(ui))
    }

    pub fn typing(&self) -> Option<&TypingView> {
        self.typing.as_ref()
    }

    pub fn arcade(&self) -> Option<&ArcadeView> {
        self.arcade.as_ref()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Forget the arcade slice when the game is torn down.
    pub fn clear_arcade(&mut self) {
        self.arcade = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(store: &mut StateStore, kind: SliceKind) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        store.watch(kind, move |_| h.set(h.get() + 1));
        hits
    }

    #[test]
    fn test_notifies_only_on_change() {
        let mut store = StateStore::new();
        let hits = counter(&mut store, SliceKind::Ui);

        assert!(!store.update(Slice::Ui(UiState::default())));
        assert_eq!(hits.get(), 0);

        assert!(store.update_ui(|ui| ui.chart = ChartKind::Line));
        assert_eq!(hits.get(), 1);
        assert!(!store.update_ui(|ui| ui.chart = ChartKind::Line));
        assert_eq!(hits.get(), 1);
        assert_eq!(store.ui().chart, ChartKind::Line);
    }

    #[test]
    fn test_watchers_scoped_to_slice() {
        let mut store = StateStore::new();
        let ui_hits = counter(&mut store, SliceKind::Ui);
        let arcade_hits = counter(&mut store, SliceKind::Arcade);

        store.update_ui(|ui| ui.notification = Some("hi".into()));
        assert_eq!(ui_hits.get(), 1);
        assert_eq!(arcade_hits.get(), 0);
    }

    #[test]
    fn test_unwatch() {
        let mut store = StateStore::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = store.watch(SliceKind::Ui, move |_| h.set(h.get() + 1));
        assert!(store.unwatch(id));
        store.update_ui(|ui| ui.chart = ChartKind::Line);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_chart_kind_toggle() {
        assert_eq!(ChartKind::Bar.toggle(), ChartKind::Line);
        assert_eq!(ChartKind::Line.toggle(), ChartKind::Bar);
    }
}
