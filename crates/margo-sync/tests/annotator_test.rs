//! Integration tests for the annotator: reply cascade and corpus-wide
//! bulk operations, running over the notes backend against a mock server.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use margo_core::{Annotation, HeaderTemplate, NoteCodec};
use margo_paperless::{NotesAnnotationStore, PaperlessClient};
use margo_sync::Annotator;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn codec() -> NoteCodec {
    NoteCodec::for_serializer("85gj", HeaderTemplate::default()).unwrap()
}

fn annotation(page_index: i32, extra: &[(&str, serde_json::Value)]) -> Annotation {
    Annotation {
        created: "2024-03-01T10:00:00Z".to_string(),
        author: "alice".to_string(),
        kind: 1,
        page_index,
        db_id: None,
        contents: Some("see note".to_string()),
        extra: extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn annotator(server: &MockServer) -> Annotator {
    let client = Arc::new(PaperlessClient::new(server.uri(), "secret-token").unwrap());
    let store = Arc::new(NotesAnnotationStore::new(client.clone(), codec()));
    Annotator::new(client, store)
}

#[tokio::test]
async fn test_delete_cascades_to_same_page_replies_only() {
    let server = MockServer::start().await;
    let codec = codec();

    // A is the target; B and C reply to it on the same page; D replies to
    // it from another page and must survive the one-level cascade.
    let a = annotation(2, &[("id", json!("anno-a"))]);
    let b = annotation(2, &[("id", json!("anno-b")), ("inReplyToId", json!("anno-a"))]);
    let c = annotation(2, &[("id", json!("anno-c")), ("inReplyToId", json!("anno-a"))]);
    let d = annotation(5, &[("id", json!("anno-d")), ("inReplyToId", json!("anno-a"))]);

    Mock::given(method("GET"))
        .and(path("/api/documents/1/notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "note": codec.encode(&a).unwrap()},
            {"id": 2, "note": codec.encode(&b).unwrap()},
            {"id": 3, "note": codec.encode(&c).unwrap()},
            {"id": 4, "note": codec.encode(&d).unwrap()}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    for reply_id in [1, 2, 3] {
        Mock::given(method("DELETE"))
            .and(path("/api/documents/1/notes/"))
            .and(query_param("id", reply_id.to_string()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    // The other-page reply is never touched.
    Mock::given(method("DELETE"))
        .and(path("/api/documents/1/notes/"))
        .and(query_param("id", "4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut target = a.clone();
    target.db_id = Some(1);

    assert!(annotator(&server)
        .delete_annotation(1, &target)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delete_without_db_id_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/1/notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let target = annotation(0, &[("id", json!("anno-x"))]);
    assert!(!annotator(&server)
        .delete_annotation(1, &target)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_documents_with_annotations_probes_each_document() {
    let server = MockServer::start().await;
    let codec = codec();
    let encoded = codec
        .encode(&annotation(0, &[("id", json!("anno-a"))]))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null,
            "results": [{"id": 1}, {"id": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/documents/1/notes/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "note": encoded}])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/documents/2/notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "note": "just a human note"}
        ])))
        .mount(&server)
        .await;

    let docs = annotator(&server)
        .documents_with_annotations(&HashSet::new())
        .await
        .unwrap();
    assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn test_delete_all_annotations_returns_processed_ids() {
    let server = MockServer::start().await;
    let codec = codec();
    let encoded = codec
        .encode(&annotation(0, &[("id", json!("anno-a"))]))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null,
            "results": [{"id": 1}, {"id": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/documents/1/notes/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "note": encoded}])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/documents/2/notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/documents/1/notes/"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let processed = annotator(&server)
        .delete_all_annotations(&HashSet::new())
        .await
        .unwrap();
    assert_eq!(processed, HashSet::from([1]));
}

#[tokio::test]
async fn test_delete_all_annotations_honors_skip_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{"id": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The skipped document is never probed, let alone modified.
    Mock::given(method("GET"))
        .and(path("/api/documents/1/notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let processed = annotator(&server)
        .delete_all_annotations(&HashSet::from([1]))
        .await
        .unwrap();
    assert!(processed.is_empty());
}

#[tokio::test]
async fn test_download_document_passthrough() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents/9/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = annotator(&server).download_document(9).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7");
}
