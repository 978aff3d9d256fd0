//! Aggregation pipeline construction for the k-NN lookup

use mongodb::bson::{Bson, Document, doc};

use crate::models::{KnnQuery, SearchStage};

/// Build the aggregation for `query`: one search stage, then `$unset` of
/// the vector path when stripping is on.
pub fn build_pipeline(query: &KnnQuery) -> Vec<Document> {
    let vector: Vec<Bson> = query
        .vector
        .iter()
        .map(|v| Bson::Double(*v))
        .collect();

    let search_stage = match query.stage {
        SearchStage::KnnBeta => doc! {
            "$search": {
                "index": query.index.as_str(),
                "knnBeta": {
                    "vector": vector,
                    "path": query.path.as_str(),
                    "k": i64::from(query.k),
                }
            }
        },
        SearchStage::VectorSearch => doc! {
            "$vectorSearch": {
                "index": query.index.as_str(),
                "path": query.path.as_str(),
                "queryVector": vector,
                "numCandidates": i64::from(query.num_candidates),
                "limit": i64::from(query.k),
            }
        },
    };

    let mut pipeline = vec![search_stage];
    if query.strip_embedding {
        pipeline.push(doc! { "$unset": query.path.as_str() });
    }
    pipeline
}

/// Remove a dotted field path from a document, descending into arrays of
/// sub-documents the way `$unset` does.
pub fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => match document.get_mut(head) {
            Some(Bson::Document(inner)) => remove_path(inner, rest),
            Some(Bson::Array(items)) => {
                for item in items.iter_mut() {
                    if let Bson::Document(inner) = item {
                        remove_path(inner, rest);
                    }
                }
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchSettings;

    fn query(stage: SearchStage, strip: bool) -> KnnQuery {
        SearchSettings::new("movies")
            .with_stage(stage)
            .with_strip_embedding(strip)
            .knn_query(vec![0.5, -0.25])
    }

    #[test]
    fn test_knn_beta_pipeline() {
        let pipeline = build_pipeline(&query(SearchStage::KnnBeta, true));

        assert_eq!(
            pipeline,
            vec![
                doc! {
                    "$search": {
                        "index": "vectorIndex",
                        "knnBeta": {
                            "vector": [0.5, -0.25],
                            "path": "embedding",
                            "k": 5_i64,
                        }
                    }
                },
                doc! { "$unset": "embedding" },
            ]
        );
    }

    #[test]
    fn test_vector_search_pipeline() {
        let pipeline = build_pipeline(&query(SearchStage::VectorSearch, true));

        assert_eq!(
            pipeline[0],
            doc! {
                "$vectorSearch": {
                    "index": "vectorIndex",
                    "path": "embedding",
                    "queryVector": [0.5, -0.25],
                    "numCandidates": 100_i64,
                    "limit": 5_i64,
                }
            }
        );
        assert_eq!(pipeline[1], doc! { "$unset": "embedding" });
    }

    #[test]
    fn test_vector_values_are_sent_without_rounding() {
        let knn = SearchSettings::new("movies").knn_query(vec![0.1, -0.017_453_292_519_943_295]);
        let pipeline = build_pipeline(&knn);

        let vector = pipeline[0]
            .get_document("$search")
            .and_then(|search| search.get_document("knnBeta"))
            .and_then(|knn| knn.get_array("vector"))
            .unwrap();
        assert_eq!(
            vector,
            &vec![Bson::Double(0.1), Bson::Double(-0.017_453_292_519_943_295)]
        );
    }

    #[test]
    fn test_no_unset_when_not_stripping() {
        let pipeline = build_pipeline(&query(SearchStage::KnnBeta, false));
        assert_eq!(pipeline.len(), 1);
        assert!(pipeline[0].contains_key("$search"));
    }

    #[test]
    fn test_remove_top_level_path() {
        let mut document = doc! { "title": "Alien", "embedding": [0.1, 0.2] };
        remove_path(&mut document, "embedding");
        assert_eq!(document, doc! { "title": "Alien" });
    }

    #[test]
    fn test_remove_nested_path() {
        let mut document = doc! {
            "title": "Alien",
            "vectors": { "plot": [0.1], "poster": [0.2] },
            "scenes": [ { "plot": [0.3], "n": 1 }, "interlude" ],
        };
        remove_path(&mut document, "vectors.plot");
        remove_path(&mut document, "scenes.plot");

        assert_eq!(
            document,
            doc! {
                "title": "Alien",
                "vectors": { "poster": [0.2] },
                "scenes": [ { "n": 1 }, "interlude" ],
            }
        );
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut document = doc! { "title": "Alien" };
        remove_path(&mut document, "embedding.values");
        assert_eq!(document, doc! { "title": "Alien" });
    }
}
