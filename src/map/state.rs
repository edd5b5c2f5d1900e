use super::drawing::Drawing;
use crate::model::{Hut, LatLng, NewZone, Vertex, Zone, ZoneType};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HutMode {
    Add,
    Edit,
    Delete,
}

impl HutMode {
    pub const ALL: [Self; 3] = [Self::Add, Self::Edit, Self::Delete];
}

impl Display for HutMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "Toevoegen",
            Self::Edit => "Bewerken",
            Self::Delete => "Verwijderen",
        })
    }
}

/// A zone as shown on the map. Locally drawn zones have no id until saved;
/// until then they are found by their `draft` key.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneShape {
    pub id: Option<i64>,
    pub kind: ZoneType,
    pub label: String,
    pub latlngs: Vec<LatLng>,
    pub draft: Option<u64>,
}

impl From<Zone> for ZoneShape {
    fn from(zone: Zone) -> Self {
        Self {
            id: Some(zone.id),
            kind: zone.kind,
            label: zone.label.unwrap_or_default(),
            latlngs: zone.latlngs.into_iter().map(|Vertex(at)| at).collect(),
            draft: None,
        }
    }
}

impl ZoneShape {
    /// A freshly drawn zone. An empty label falls back to the zone type.
    pub fn drawn(kind: ZoneType, label: &str, latlngs: Vec<LatLng>) -> Self {
        let label = match label.trim() {
            "" => kind.as_str().to_owned(),
            label => label.to_owned(),
        };
        Self {
            id: None,
            kind,
            label,
            latlngs,
            draft: None,
        }
    }

    pub fn title(&self) -> String {
        let label = if self.label.is_empty() {
            self.kind.as_str()
        } else {
            self.label.as_str()
        };
        match self.id {
            Some(id) => format!("{label} (ID {id})"),
            None => format!("{label} (ID -)"),
        }
    }

    pub fn to_new(&self) -> NewZone {
        NewZone {
            kind: self.kind.clone(),
            label: self.label.clone(),
            latlngs: self.latlngs.iter().copied().map(Vertex).collect(),
        }
    }
}

/// What a click on the map asks of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    LoginRequired,
    NewHut(LatLng),
    EditHut(i64),
    DeleteHut(i64),
    OpenHut(i64),
}

#[derive(Debug, Default)]
pub struct MapState {
    pub huts: Vec<Hut>,
    pub zones: Vec<ZoneShape>,
    pub drawing: Drawing,
    selected: Option<usize>,
    hut_mode: Option<HutMode>,
    drafts: u64,
}

impl MapState {
    pub const fn hut_mode(&self) -> Option<HutMode> {
        self.hut_mode
    }

    /// Entering a mode needs a valid session; without one the mode resets.
    pub fn set_hut_mode(&mut self, mode: Option<HutMode>, logged_in: bool) -> Result<(), MapAction> {
        if mode.is_some() && !logged_in {
            self.hut_mode = None;
            return Err(MapAction::LoginRequired);
        }
        self.hut_mode = mode;
        Ok(())
    }

    pub fn hut(&self, id: i64) -> Option<&Hut> {
        self.huts.iter().find(|hut| hut.id == id)
    }

    pub fn replace_huts(&mut self, huts: Vec<Hut>) {
        self.huts = huts;
    }

    pub fn upsert_hut(&mut self, hut: Hut) {
        match self.huts.iter_mut().find(|old| old.id == hut.id) {
            Some(old) => *old = hut,
            None => self.huts.push(hut),
        }
    }

    pub fn remove_hut(&mut self, id: i64) -> Option<Hut> {
        let index = self.huts.iter().position(|hut| hut.id == id)?;
        Some(self.huts.remove(index))
    }

    /// Swaps in the server's zones. Drafts still waiting for an id stay.
    pub fn replace_zones(&mut self, zones: Vec<Zone>) {
        self.deselect_zone();
        let drafts = std::mem::take(&mut self.zones)
            .into_iter()
            .filter(|zone| zone.draft.is_some());
        self.zones = zones.into_iter().map(ZoneShape::from).chain(drafts).collect();
    }

    /// Adds a locally drawn zone and returns its draft key.
    pub fn push_zone(&mut self, mut zone: ZoneShape) -> u64 {
        self.drafts += 1;
        let key = self.drafts;
        zone.draft = Some(key);
        self.zones.push(zone);
        key
    }

    fn draft_index(&self, key: u64) -> Option<usize> {
        self.zones.iter().position(|zone| zone.draft == Some(key))
    }

    /// Gives the draft its server id.
    pub fn zone_saved(&mut self, key: u64, id: i64) -> bool {
        let Some(index) = self.draft_index(key) else {
            return false;
        };
        let zone = &mut self.zones[index];
        zone.id = Some(id);
        zone.draft = None;
        true
    }

    pub fn discard_draft(&mut self, key: u64) -> Option<ZoneShape> {
        let index = self.draft_index(key)?;
        self.discard_zone(index)
    }

    /// Drops a zone by index, fixing up the selection.
    pub fn discard_zone(&mut self, index: usize) -> Option<ZoneShape> {
        if index >= self.zones.len() {
            return None;
        }
        match self.selected {
            Some(selected) if selected == index => self.selected = None,
            Some(selected) if selected > index => self.selected = Some(selected - 1),
            _ => {}
        }
        Some(self.zones.remove(index))
    }

    pub fn remove_zone(&mut self, id: i64) -> Option<ZoneShape> {
        let index = self.zones.iter().position(|zone| zone.id == Some(id))?;
        self.discard_zone(index)
    }

    pub const fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_zone(&self) -> Option<&ZoneShape> {
        self.zones.get(self.selected?)
    }

    /// At most one zone is selected; selecting another drops the first.
    pub fn select_zone(&mut self, index: usize) {
        self.deselect_zone();
        if index < self.zones.len() {
            debug!(index, "zone selected");
            self.selected = Some(index);
        }
    }

    pub fn deselect_zone(&mut self) {
        self.selected = None;
    }

    /// Moves one vertex of the selected zone.
    pub fn move_vertex(&mut self, vertex: usize, to: LatLng) -> bool {
        let Some(zone) = self.selected.and_then(|index| self.zones.get_mut(index)) else {
            return false;
        };
        match zone.latlngs.get_mut(vertex) {
            Some(at) => {
                *at = to;
                true
            }
            None => false,
        }
    }

    pub fn click_map(&mut self, at: LatLng, logged_in: bool) -> Option<MapAction> {
        if self.drawing.add_point(at) {
            return None;
        }
        self.deselect_zone();
        match self.hut_mode {
            Some(HutMode::Add) if logged_in => Some(MapAction::NewHut(at)),
            Some(HutMode::Add) => {
                self.hut_mode = None;
                Some(MapAction::LoginRequired)
            }
            _ => None,
        }
    }

    /// Add mode is one-shot: after an attempt the mode resets.
    pub fn finish_add(&mut self) {
        if self.hut_mode == Some(HutMode::Add) {
            self.hut_mode = None;
        }
    }

    pub fn click_hut(&self, id: i64, logged_in: bool) -> MapAction {
        match self.hut_mode {
            Some(HutMode::Edit | HutMode::Delete) if !logged_in => MapAction::LoginRequired,
            Some(HutMode::Edit) => MapAction::EditHut(id),
            Some(HutMode::Delete) => MapAction::DeleteHut(id),
            _ => MapAction::OpenHut(id),
        }
    }

    pub fn click_zone(&mut self, index: usize) {
        if self.drawing.is_drawing() {
            return;
        }
        self.select_zone(index);
    }

    /// Drops every in-progress interaction.
    pub fn exit_edit_modes(&mut self) {
        self.hut_mode = None;
        self.drawing.cancel();
        self.deselect_zone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hut(id: i64) -> Hut {
        Hut {
            id,
            name: "Eik".into(),
            number: id.to_string(),
            desc: String::new(),
            lat: 51.43,
            lng: 7.87,
        }
    }

    fn zone(id: i64, kind: ZoneType) -> Zone {
        Zone {
            id,
            kind,
            label: None,
            latlngs: vec![
                Vertex(LatLng::new(51.0, 7.0)),
                Vertex(LatLng::new(51.1, 7.0)),
                Vertex(LatLng::new(51.1, 7.1)),
            ],
        }
    }

    fn state() -> MapState {
        let mut state = MapState::default();
        state.replace_huts(vec![hut(1), hut(2)]);
        state.replace_zones(vec![zone(10, ZoneType::Bos), zone(11, ZoneType::Grens)]);
        state
    }

    #[test]
    fn mode_requires_login() {
        let mut state = state();
        assert_eq!(
            state.set_hut_mode(Some(HutMode::Add), false),
            Err(MapAction::LoginRequired)
        );
        assert_eq!(state.hut_mode(), None);
        state.set_hut_mode(Some(HutMode::Edit), true).unwrap();
        assert_eq!(state.hut_mode(), Some(HutMode::Edit));
        state.set_hut_mode(None, false).unwrap();
        assert_eq!(state.hut_mode(), None);
    }

    #[test]
    fn hut_click_dispatches_by_mode() {
        let mut state = state();
        assert_eq!(state.click_hut(1, false), MapAction::OpenHut(1));
        state.set_hut_mode(Some(HutMode::Edit), true).unwrap();
        assert_eq!(state.click_hut(1, true), MapAction::EditHut(1));
        assert_eq!(state.click_hut(1, false), MapAction::LoginRequired);
        state.set_hut_mode(Some(HutMode::Delete), true).unwrap();
        assert_eq!(state.click_hut(2, true), MapAction::DeleteHut(2));
    }

    #[test]
    fn map_click_adds_in_add_mode_only() {
        let mut state = state();
        let at = LatLng::new(51.2, 7.2);
        assert_eq!(state.click_map(at, true), None);
        state.set_hut_mode(Some(HutMode::Add), true).unwrap();
        assert_eq!(state.click_map(at, true), Some(MapAction::NewHut(at)));
        state.finish_add();
        assert_eq!(state.hut_mode(), None);
    }

    #[test]
    fn map_click_while_drawing_adds_point() {
        let mut state = state();
        state.set_hut_mode(Some(HutMode::Add), true).unwrap();
        state.drawing.start(ZoneType::Voederplek);
        assert_eq!(state.click_map(LatLng::new(51.2, 7.2), true), None);
        assert_eq!(state.drawing.points().len(), 1);
    }

    #[test]
    fn map_click_deselects_zone() {
        let mut state = state();
        state.click_zone(0);
        assert_eq!(state.selected_zone().and_then(|zone| zone.id), Some(10));
        state.click_map(LatLng::new(0.0, 0.0), false);
        assert_eq!(state.selected_zone(), None);
    }

    #[test]
    fn single_selection() {
        let mut state = state();
        state.select_zone(0);
        state.select_zone(1);
        assert_eq!(state.selected_index(), Some(1));
        state.select_zone(5);
        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn discard_fixes_selection() {
        let mut state = state();
        state.select_zone(1);
        state.discard_zone(0);
        assert_eq!(state.selected_zone().and_then(|zone| zone.id), Some(11));
        assert_eq!(state.remove_zone(11).and_then(|zone| zone.id), Some(11));
        assert_eq!(state.selected_index(), None);
        assert!(state.zones.is_empty());
    }

    #[test]
    fn vertex_moves_only_on_selection() {
        let mut state = state();
        let to = LatLng::new(52.0, 8.0);
        assert!(!state.move_vertex(0, to));
        state.select_zone(0);
        assert!(state.move_vertex(2, to));
        assert!(!state.move_vertex(3, to));
        assert_eq!(state.zones[0].latlngs[2], to);
    }

    #[test]
    fn hut_upsert_and_remove() {
        let mut state = state();
        let mut renamed = hut(2);
        renamed.name = "Beuk".into();
        state.upsert_hut(renamed);
        state.upsert_hut(hut(3));
        assert_eq!(state.hut(2).map(|hut| hut.name.as_str()), Some("Beuk"));
        assert_eq!(state.huts.len(), 3);
        assert!(state.remove_hut(1).is_some());
        assert!(state.remove_hut(1).is_none());
    }

    #[test]
    fn exit_clears_everything() {
        let mut state = state();
        state.set_hut_mode(Some(HutMode::Delete), true).unwrap();
        state.select_zone(0);
        state.drawing.start(ZoneType::Bos);
        state.exit_edit_modes();
        assert_eq!(state.hut_mode(), None);
        assert_eq!(state.selected_index(), None);
        assert!(!state.drawing.is_drawing());
    }

    #[test]
    fn zone_titles() {
        let mut shape = ZoneShape::from(zone(4, ZoneType::Bos));
        assert_eq!(shape.title(), "bos (ID 4)");
        shape.label = "Eikenbos".into();
        shape.id = None;
        assert_eq!(shape.title(), "Eikenbos (ID -)");
        assert_eq!(shape.to_new().latlngs.len(), 3);
    }

    fn drawn(label: &str) -> ZoneShape {
        ZoneShape::drawn(ZoneType::Voederplek, label, vec![LatLng::new(51.2, 7.2)])
    }

    fn ids(state: &MapState) -> Vec<Option<i64>> {
        state.zones.iter().map(|zone| zone.id).collect()
    }

    #[test]
    fn empty_label_falls_back_to_type() {
        assert_eq!(drawn("  ").to_new().label, "voederplek");
        assert_eq!(drawn("Bij de beek").to_new().label, "Bij de beek");
    }

    #[test]
    fn saved_draft_survives_removal_before_it() {
        let mut state = state();
        let key = state.push_zone(drawn("nieuw"));
        state.remove_zone(10);

        assert!(state.zone_saved(key, 99));
        assert_eq!(ids(&state), [Some(11), Some(99)]);
        assert_eq!(state.zones[1].label, "nieuw");
        assert_eq!(state.zones[1].draft, None);
        assert!(!state.zone_saved(key, 100));
    }

    #[test]
    fn reload_keeps_drafts() {
        let mut state = state();
        let key = state.push_zone(drawn("nieuw"));
        state.replace_zones(vec![
            zone(10, ZoneType::Bos),
            zone(11, ZoneType::Grens),
            zone(12, ZoneType::Wildakker),
        ]);
        assert_eq!(ids(&state), [Some(10), Some(11), Some(12), None]);

        assert!(state.zone_saved(key, 99));
        assert_eq!(ids(&state), [Some(10), Some(11), Some(12), Some(99)]);
    }

    #[test]
    fn failed_draft_only_removes_itself() {
        let mut state = state();
        let first = state.push_zone(drawn("a"));
        let second = state.push_zone(drawn("b"));
        state.remove_zone(10);

        assert_eq!(state.discard_draft(first).map(|zone| zone.label), Some("a".into()));
        assert_eq!(ids(&state), [Some(11), None]);
        assert_eq!(state.zones[1].draft, Some(second));
        assert_eq!(state.discard_draft(first), None);
    }
}
