use eframe::egui::{self, RichText, Ui};
use synergy_atlas::{Company, ConnectionKind, NodeKind, NodeRef, SynergyRecord};

use crate::util::{describe_entry, format_volume};

use super::super::ViewModel;
use super::super::render_utils::state_color;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected) = self.selected.clone() else {
            ui.label("Select a company or synergy marker from the map or the search results.");
            return;
        };

        let mut next_selection = None;
        match selected.kind {
            NodeKind::Company => {
                let Some(company) = self.atlas.index().company(&selected) else {
                    ui.label("Selected company is not part of the current view.");
                    return;
                };
                self.company_details(ui, company, &mut next_selection);
            }
            NodeKind::Synergy => {
                let record = self
                    .atlas
                    .index()
                    .cluster(&selected.cluster)
                    .and_then(|cluster| {
                        cluster
                            .synergies
                            .iter()
                            .find(|synergy| synergy.id == selected.entity)
                    });
                let Some(record) = record else {
                    ui.label("Selected synergy is not part of the current view.");
                    return;
                };
                self.synergy_details(ui, &selected.cluster, record, &mut next_selection);
            }
            kind => {
                ui.label(missing_details(kind));
                return;
            }
        }

        if let Some(next) = next_selection {
            self.set_selected(Some(next));
        }
    }

    fn company_details(&self, ui: &mut Ui, company: &Company, next: &mut Option<NodeRef>) {
        ui.label(RichText::new(&company.name).strong());
        ui.small(company.node.to_string());
        ui.add_space(6.0);

        let dataset = self.atlas.dataset();
        if let Some(cluster) = self.atlas.index().cluster(&company.cluster) {
            ui.label(format!("Cluster: {}", cluster.label));
        }
        if let Some(definition) = dataset.cluster(&company.cluster)
            && !definition.description.is_empty()
        {
            ui.label(RichText::new(&definition.description).weak());
        }
        if let Some(location) = dataset.location(&company.id) {
            ui.label(format!("Location: {:.4}, {:.4}", location.lat, location.lon));
        }
        ui.label(format!(
            "Position: x {:.1}, z {:.1}, height {:.2}",
            company.position.x, company.position.z, company.position.y
        ));
        if let Some(segments) = company.focus_segments {
            ui.label(format!("Focus of a {segments}-company ring"));
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        let touching = self
            .connections
            .iter()
            .filter(|connection| {
                connection.cluster == company.cluster && connection.touches(&company.id)
            })
            .collect::<Vec<_>>();
        if touching.is_empty() {
            ui.label("No connections in the current view.");
        }
        for connection in touching {
            let other = connection.other_end(&company.id).unwrap_or_default();
            match (connection.kind, connection.synergy()) {
                (ConnectionKind::Synergy, Some(record)) => {
                    let label = RichText::new(format!(
                        "{} with {other}  ({:.2})",
                        record.id, connection.strength
                    ))
                    .color(state_color(record.state));
                    if ui.link(label).clicked() {
                        *next = Some(NodeRef::synergy(&connection.cluster, &record.id));
                    }
                }
                _ => {
                    ui.label(format!("baseline with {other}"));
                }
            }
        }

        ui.separator();
        ui.label(RichText::new("Maintenance").strong());
        entry_list(ui, &company.maintenance, "No maintenance records.");

        ui.separator();
        ui.label(RichText::new("Material needs").strong());
        entry_list(ui, &company.material_needs, "No material needs recorded.");
    }

    fn synergy_details(
        &self,
        ui: &mut Ui,
        cluster: &str,
        record: &SynergyRecord,
        next: &mut Option<NodeRef>,
    ) {
        ui.label(RichText::new(&record.id).strong());
        if !record.material.is_empty() {
            ui.label(&record.material);
        }
        ui.add_space(6.0);

        ui.label(
            RichText::new(format!("State: {}", record.state.label()))
                .color(state_color(record.state)),
        );
        ui.label(format!("Volume: {}", format_volume(record.volume)));
        ui.label(format!("Companies involved: {}", record.company_count));
        ui.label(format!("Strength: {:.3}", record.strength()));

        ui.separator();
        ui.label(RichText::new("Participants").strong());
        let index = self.atlas.index();
        for participant in &record.companies {
            let node = NodeRef::company(cluster, participant);
            match index.company(&node) {
                Some(company) => {
                    if ui.link(&company.name).clicked() {
                        *next = Some(node);
                    }
                }
                None => {
                    ui.label(RichText::new(format!("{participant} (not placed)")).weak());
                }
            }
        }
    }
}

fn entry_list(ui: &mut Ui, entries: &[serde_json::Value], empty: &str) {
    if entries.is_empty() {
        ui.label(empty);
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt(empty)
        .max_height(160.0)
        .show(ui, |ui| {
            for entry in entries {
                ui.label(format!("- {}", describe_entry(entry)));
            }
        });
}

fn missing_details(kind: NodeKind) -> String {
    format!("No details for {} nodes.", kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_only_kinds_get_a_placeholder() {
        assert_eq!(missing_details(NodeKind::Rfp), "No details for rfp nodes.");
        assert_eq!(
            missing_details(NodeKind::Provider),
            "No details for provider nodes."
        );
        assert_eq!(missing_details(NodeKind::Event), "No details for event nodes.");
    }
}
