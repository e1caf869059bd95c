//! Incremental Merge Engine
//!
//! Folds an expansion into an existing document and returns a new value.
//!
//! Merge rules:
//! - clusters, recommendations, people-also-ask, matrix rows and sources are
//!   concatenated, base first, with no de-duplication (cluster name
//!   collisions stay as separate entries)
//! - pain points and discussions keep the base values; the delta's are dropped
//! - the executive summary is always the base's

use tracing::debug;

use super::model::{AnalysisDocument, DiscoveryBundle, PartialAnalysisDocument};

/// Merge `delta` into `base` without touching either input.
pub fn merge(base: &AnalysisDocument, delta: &PartialAnalysisDocument) -> AnalysisDocument {
    let empty = DiscoveryBundle::default();
    let delta_discovery = delta.deep_discovery.as_ref().unwrap_or(&empty);

    if let Some(discovery) = &delta.deep_discovery
        && (!discovery.pain_points.is_empty() || !discovery.discussions.is_empty())
    {
        debug!(
            pain_points = discovery.pain_points.len(),
            discussions = discovery.discussions.len(),
            "Expansion carried pain points or discussions, keeping base values"
        );
    }

    AnalysisDocument {
        executive_summary: base.executive_summary.clone(),
        clusters: concat(&base.clusters, &delta.clusters),
        recommendations: concat(&base.recommendations, &delta.recommendations),
        deep_discovery: DiscoveryBundle {
            pain_points: base.deep_discovery.pain_points.clone(),
            people_also_ask: concat(
                &base.deep_discovery.people_also_ask,
                &delta_discovery.people_also_ask,
            ),
            discussions: base.deep_discovery.discussions.clone(),
            matrix: concat(&base.deep_discovery.matrix, &delta_discovery.matrix),
        },
        sources: concat(&base.sources, &delta.sources),
    }
}

fn concat<T: Clone>(base: &[T], delta: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(base.len() + delta.len());
    merged.extend_from_slice(base);
    merged.extend_from_slice(delta);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::{
        Citation, Cluster, Discussion, DiscoveryRow, Recommendation, Sentiment,
    };
    use proptest::prelude::*;

    fn cluster(name: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn citation(uri: &str) -> Citation {
        Citation {
            title: uri.to_string(),
            uri: uri.to_string(),
        }
    }

    fn row(term: &str) -> DiscoveryRow {
        DiscoveryRow {
            term: term.to_string(),
            ..Default::default()
        }
    }

    fn base_document() -> AnalysisDocument {
        AnalysisDocument {
            executive_summary: "Base summary".to_string(),
            clusters: vec![cluster("Entretien")],
            recommendations: vec![Recommendation {
                title: "Guide".to_string(),
                ..Default::default()
            }],
            deep_discovery: DiscoveryBundle {
                pain_points: vec!["slow charging".to_string()],
                people_also_ask: vec!["q1".to_string()],
                discussions: vec![Discussion {
                    topic: "range".to_string(),
                    sentiment: Sentiment::Negative,
                    ..Default::default()
                }],
                matrix: vec![row("batterie")],
            },
            sources: vec![citation("https://a.example")],
        }
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let base = base_document();
        let delta = PartialAnalysisDocument {
            clusters: vec![cluster("Batteries"), cluster("Entretien")],
            recommendations: vec![Recommendation {
                title: "Comparatif".to_string(),
                ..Default::default()
            }],
            deep_discovery: Some(DiscoveryBundle {
                people_also_ask: vec!["q2".to_string()],
                matrix: vec![row("chargeur")],
                ..Default::default()
            }),
            sources: vec![citation("https://a.example")],
        };

        let merged = merge(&base, &delta);

        assert_eq!(
            merged.cluster_names(),
            vec!["Entretien", "Batteries", "Entretien"]
        );
        assert_eq!(merged.recommendations.len(), 2);
        assert_eq!(merged.recommendations[1].title, "Comparatif");
        assert_eq!(merged.deep_discovery.people_also_ask, vec!["q1", "q2"]);
        assert_eq!(merged.deep_discovery.matrix[1].term, "chargeur");
        // Duplicate sources are kept
        assert_eq!(merged.sources.len(), 2);
        assert_eq!(merged.executive_summary, "Base summary");
    }

    #[test]
    fn test_merge_keeps_base_pain_points() {
        let base = base_document();
        let delta = PartialAnalysisDocument {
            deep_discovery: Some(DiscoveryBundle {
                pain_points: vec!["short range".to_string()],
                discussions: vec![Discussion::default()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = merge(&base, &delta);

        assert_eq!(merged.deep_discovery.pain_points, vec!["slow charging"]);
        assert_eq!(
            merged.deep_discovery.discussions,
            base.deep_discovery.discussions
        );
    }

    #[test]
    fn test_merge_without_discovery() {
        let base = base_document();
        let merged = merge(&base, &PartialAnalysisDocument::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let base = base_document();
        let delta = PartialAnalysisDocument {
            clusters: vec![cluster("Batteries")],
            ..Default::default()
        };
        let base_before = base.clone();
        let delta_before = delta.clone();

        let mut merged = merge(&base, &delta);
        merged.clusters[0].name = "changed".to_string();

        assert_eq!(base, base_before);
        assert_eq!(delta, delta_before);
    }

    fn delta_strategy() -> impl Strategy<Value = PartialAnalysisDocument> {
        (
            prop::collection::vec("[a-z]{1,6}", 0..4),
            prop::collection::vec("[a-z]{1,6}", 0..4),
            prop::collection::vec("[a-z]{1,6}", 0..4),
            prop::collection::vec("[a-z]{1,6}", 0..3),
        )
            .prop_map(|(clusters, questions, sources, pains)| PartialAnalysisDocument {
                clusters: clusters.iter().map(|n| cluster(n)).collect(),
                recommendations: Vec::new(),
                deep_discovery: Some(DiscoveryBundle {
                    pain_points: pains,
                    people_also_ask: questions.clone(),
                    discussions: Vec::new(),
                    matrix: questions.iter().map(|t| row(t)).collect(),
                }),
                sources: sources.iter().map(|u| citation(u)).collect(),
            })
    }

    proptest! {
        #[test]
        fn prop_sequential_merges_preserve_order(d1 in delta_strategy(), d2 in delta_strategy()) {
            let base = base_document();
            let merged = merge(&merge(&base, &d1), &d2);

            let expected_clusters: Vec<String> = base
                .cluster_names()
                .into_iter()
                .chain(d1.clusters.iter().map(|c| c.name.clone()))
                .chain(d2.clusters.iter().map(|c| c.name.clone()))
                .collect();
            prop_assert_eq!(merged.cluster_names(), expected_clusters);

            let d1_discovery = d1.deep_discovery.clone().unwrap_or_default();
            let d2_discovery = d2.deep_discovery.clone().unwrap_or_default();

            let expected_questions: Vec<String> = base
                .deep_discovery
                .people_also_ask
                .iter()
                .chain(&d1_discovery.people_also_ask)
                .chain(&d2_discovery.people_also_ask)
                .cloned()
                .collect();
            prop_assert_eq!(&merged.deep_discovery.people_also_ask, &expected_questions);

            let expected_rows: Vec<DiscoveryRow> = base
                .deep_discovery
                .matrix
                .iter()
                .chain(&d1_discovery.matrix)
                .chain(&d2_discovery.matrix)
                .cloned()
                .collect();
            prop_assert_eq!(&merged.deep_discovery.matrix, &expected_rows);

            let expected_sources: Vec<Citation> = base
                .sources
                .iter()
                .chain(&d1.sources)
                .chain(&d2.sources)
                .cloned()
                .collect();
            prop_assert_eq!(&merged.sources, &expected_sources);

            prop_assert_eq!(&merged.deep_discovery.pain_points, &base.deep_discovery.pain_points);
            prop_assert_eq!(&merged.deep_discovery.discussions, &base.deep_discovery.discussions);
        }
    }
}
