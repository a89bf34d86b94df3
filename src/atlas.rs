use tracing::{debug, info};

use crate::cache::LayoutCache;
use crate::cluster::{self, ClusterLayout};
use crate::config::LayoutConfig;
use crate::connections::RoutingMode;
use crate::dataset::Dataset;
use crate::index::AtlasIndex;

/// Layout engine over one dataset.
///
/// Every operation rebuilds the affected clusters from scratch and replaces the index
/// wholesale; the cache keeps that cheap.
#[derive(Debug)]
pub struct Atlas {
    dataset: Dataset,
    config: LayoutConfig,
    cache: LayoutCache,
    general: Vec<ClusterLayout>,
    routing: RoutingMode,
    focus: Option<String>,
    index: AtlasIndex,
}

impl Atlas {
    /// Lays out `dataset` with its own `layout` settings.
    pub fn new(dataset: Dataset) -> Self {
        let config = dataset.layout.clone();
        Self::with_config(dataset, config)
    }

    pub fn with_config(dataset: Dataset, config: LayoutConfig) -> Self {
        let mut atlas = Self {
            dataset,
            config,
            cache: LayoutCache::new(),
            general: Vec::new(),
            routing: RoutingMode::default(),
            focus: None,
            index: AtlasIndex::default(),
        };
        atlas.regenerate();
        info!(
            clusters = atlas.general.len(),
            companies = atlas.index.companies().count(),
            connections = atlas.index.connections().len(),
            "atlas ready"
        );
        atlas
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    pub fn index(&self) -> &AtlasIndex {
        &self.index
    }

    /// General layouts of every cluster, regardless of the current focus.
    pub fn general_clusters(&self) -> &[ClusterLayout] {
        &self.general
    }

    pub fn routing(&self) -> RoutingMode {
        self.routing
    }

    pub fn set_routing(&mut self, routing: RoutingMode) -> &AtlasIndex {
        if self.routing != routing {
            debug!(routing = routing.as_str(), "routing mode changed");
            self.routing = routing;
        }
        self.regenerate()
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Rebuilds every cluster and reapplies the current focus.
    pub fn regenerate(&mut self) -> &AtlasIndex {
        self.general = self
            .dataset
            .clusters
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                cluster::build_general(definition, index, &self.dataset, &self.config, &self.cache)
            })
            .collect();

        let focus = self.focus.take();
        self.apply_focus(focus.as_deref());
        &self.index
    }

    /// Switches to the radial view around `company`, or back to the general view for `None`
    /// or a company no cluster contains. The personalized index holds only the focus cluster.
    pub fn personalize(&mut self, company: Option<&str>) -> &AtlasIndex {
        self.apply_focus(company);
        match &self.focus {
            Some(focus) => info!(focus = %focus, "personalized view"),
            None => info!("general view"),
        }
        &self.index
    }

    /// Cluster id of the first cluster listing `company`.
    pub fn cluster_of(&self, company: &str) -> Option<&str> {
        self.general
            .iter()
            .find(|cluster| cluster.company(company).is_some())
            .map(|cluster| cluster.id.as_str())
    }

    pub fn clear_cache(&self) {
        debug!(entries = self.cache.len(), "clearing layout cache");
        self.cache.clear();
    }

    fn apply_focus(&mut self, company: Option<&str>) {
        let personalized = company.and_then(|company| {
            self.general.iter().find_map(|cluster| {
                cluster::personalize(cluster, company, &self.config, &self.cache)
            })
        });

        self.index = match personalized {
            Some(layout) => {
                self.focus = company.map(str::to_owned);
                AtlasIndex::aggregate(vec![layout], self.routing, self.focus.clone())
            }
            None => {
                self.focus = None;
                AtlasIndex::aggregate(self.general.clone(), self.routing, None)
            }
        };
    }
}
