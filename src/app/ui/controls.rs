use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use synergy_atlas::{ConnectionViewMode, NodeRef, RoutingMode, SynergyState};

use super::super::ViewModel;
use super::super::render_utils::state_color;

const SEARCH_RESULT_LIMIT: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

struct SearchHit {
    node: NodeRef,
    label: String,
    score: i64,
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search companies and synergies")
            .on_hover_text("Fuzzy match on names, ids and materials.");
        ui.text_edit_singleline(&mut self.search);

        let hits = self.search_hits();
        if !hits.is_empty() {
            egui::ScrollArea::vertical()
                .id_salt("search_results_scroll")
                .max_height(220.0)
                .show(ui, |ui| {
                    for hit in hits {
                        let selected = self.selected.as_ref() == Some(&hit.node);
                        if ui.selectable_label(selected, hit.label).clicked() {
                            self.set_selected(Some(hit.node));
                        }
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        ui.horizontal_wrapped(|ui| {
            for mode in ConnectionViewMode::ALL {
                ui.selectable_value(&mut self.view_mode, mode, mode.label())
                    .on_hover_text(match mode {
                        ConnectionViewMode::All => "Every synergy connection.",
                        ConnectionViewMode::Key => "Only the strongest quarter (at least five).",
                        ConnectionViewMode::Focus => {
                            "Only connections of the selected company."
                        }
                    });
            }
        });

        let routing = self.atlas.routing();
        let mut next_routing = routing;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut next_routing, RoutingMode::Ordered, "Ordered lanes");
            ui.selectable_value(&mut next_routing, RoutingMode::Natural, "Natural lines");
        });
        if next_routing != routing {
            self.set_routing(next_routing);
        }

        ui.checkbox(&mut self.show_labels, "Show company labels");
        if ui.button("Fit view").clicked() {
            self.fit_pending = true;
        }

        ui.separator();
        ui.label(RichText::new("Personalized view").strong());
        let focus_candidate = self
            .selected
            .as_ref()
            .filter(|node| node.is_company())
            .and_then(|node| self.atlas.index().company(node))
            .filter(|company| !company.is_focus)
            .map(|company| (company.id.clone(), company.name.clone()));

        match focus_candidate {
            Some((id, name)) => {
                if ui.button(format!("Center on {name}")).clicked() {
                    self.personalize(Some(&id));
                }
            }
            None if self.atlas.focus().is_none() => {
                ui.label("Select a company to center the view on it.");
            }
            None => {}
        }

        if let Some(focus) = self.atlas.focus().map(str::to_owned) {
            ui.label(format!("Centered on {focus}"));
            if ui.button("Back to general view").clicked() {
                self.personalize(None);
            }
        }

        ui.separator();
        ui.label(RichText::new("Synergy states").strong());
        for state in [
            SynergyState::Pending,
            SynergyState::InRfp,
            SynergyState::Recommended,
            SynergyState::Approved,
            SynergyState::CounterOffer,
            SynergyState::Closed,
            SynergyState::Rejected,
        ] {
            ui.label(RichText::new(format!("● {}", state.label())).color(state_color(state)));
        }
    }

    fn search_hits(&self) -> Vec<SearchHit> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let index = self.atlas.index();

        let companies = index.companies().filter_map(|company| {
            let score = fuzzy_match_score(&matcher, &company.name, query)
                .max(fuzzy_match_score(&matcher, &company.id, query))?;
            Some(SearchHit {
                node: company.node.clone(),
                label: format!("{}  ({})", company.name, company.cluster),
                score,
            })
        });

        let synergies = index.clusters.iter().flat_map(|cluster| {
            cluster.synergies.iter().filter_map(|synergy| {
                let score = fuzzy_match_score(&matcher, &synergy.id, query)
                    .max(fuzzy_match_score(&matcher, &synergy.material, query))?;
                Some(SearchHit {
                    node: NodeRef::synergy(&cluster.id, &synergy.id),
                    label: format!("{}  {}", synergy.id, synergy.material),
                    score,
                })
            })
        });

        let mut hits = companies
            .chain(synergies)
            .filter(|hit| index.node(&hit.node).is_some())
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.label.cmp(&b.label)));
        hits.truncate(SEARCH_RESULT_LIMIT);
        hits
    }
}
