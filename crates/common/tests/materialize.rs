//! Integration tests for document materialization

mod common;

use ::common::connector::{
    blob_key, id_for_key, parent_id, ConnectorError, ConnectorOptions, PrimaryType, Properties,
    PropertyValue, ABSOLUTE_URI, JCR_CREATED, JCR_ENCODING, JCR_LAST_MODIFIED, JCR_MIME_TYPE,
    MIX_MIME_TYPE,
};
use ::common::extra::ExtraPropertiesStore;

#[tokio::test]
async fn test_folder_with_file_and_nested_prefix() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/docs/report.txt", b"quarterly numbers").await;
    common::put_file(&connector, "/docs/notes/readme.md", b"# notes").await;

    let docs = connector.get_document("/docs").await.unwrap().unwrap();
    assert_eq!(docs.primary_type(), &PrimaryType::Folder);
    assert_eq!(docs.parent(), Some("/"));
    assert!(docs.page().is_none());
    assert!(!docs.is_queryable());

    let children: Vec<(&str, &str)> = docs
        .children()
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    assert_eq!(
        children,
        vec![("/docs/notes", "notes"), ("/docs/report.txt", "report.txt")]
    );

    let notes = connector.get_document("/docs/notes").await.unwrap().unwrap();
    assert_eq!(notes.primary_type(), &PrimaryType::Folder);

    let report = connector.get_document("/docs/report.txt").await.unwrap().unwrap();
    assert_eq!(report.primary_type(), &PrimaryType::File);
    assert_eq!(report.parent(), Some("/docs"));
    assert!(report.binary().is_none());
}

#[tokio::test]
async fn test_file_document_shape() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/a/b.txt", b"b").await;

    let file = connector.get_document("/a/b.txt").await.unwrap().unwrap();
    assert_eq!(file.children().len(), 1);
    assert_eq!(file.children()[0].id, "/a/b.txt/jcr:content");
    assert_eq!(file.children()[0].name, "jcr:content");
    assert!(file.property(JCR_CREATED).is_some());
    assert!(file.property(JCR_LAST_MODIFIED).is_some());
    assert_eq!(
        file.property(ABSOLUTE_URI),
        Some(&PropertyValue::from("memory:///bucket/a/b.txt"))
    );
    assert!(!file.is_queryable());
}

#[tokio::test]
async fn test_root_is_always_a_folder() {
    let (connector, _, _) = common::setup_test_env();

    let root = connector.get_document("/").await.unwrap().unwrap();
    assert_eq!(root.primary_type(), &PrimaryType::Folder);
    assert!(root.children().is_empty());
    assert!(root.page().is_none());
    assert!(root.parent().is_none());

    common::put_file(&connector, "/top.txt", b"t").await;
    let root = connector.get_document("/").await.unwrap().unwrap();
    assert_eq!(root.children()[0].id, "/top.txt");
}

#[tokio::test]
async fn test_unresolvable_and_invalid_ids() {
    let (connector, _, _) = common::setup_test_env();

    assert!(connector.get_document("//").await.unwrap().is_none());
    assert!(connector.get_document("/jcr:content").await.unwrap().is_none());
    assert!(matches!(
        connector.get_document("").await,
        Err(ConnectorError::InvalidIdentifier(_))
    ));
}

#[tokio::test]
async fn test_missing_content_fails_on_open_not_on_read() {
    let (connector, _, _) = common::setup_test_env();

    // a file is emitted whether or not its object exists
    let file = connector.get_document("/ghost.bin").await.unwrap().unwrap();
    assert_eq!(file.primary_type(), &PrimaryType::File);

    let content = connector
        .get_document("/ghost.bin/jcr:content")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(content.primary_type(), &PrimaryType::Resource);
    assert_eq!(content.parent(), Some("/ghost.bin"));
    assert_eq!(
        content.property(JCR_LAST_MODIFIED),
        Some(&PropertyValue::Date(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH))
    );

    let binary = content.binary().unwrap();
    match binary.open_stream().await {
        Err(ConnectorError::ContentMissing { container, key }) => {
            assert_eq!(container, "bucket");
            assert_eq!(key, "ghost.bin");
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected missing content"),
    }
}

#[tokio::test]
async fn test_parent_listing_contains_child() {
    let (connector, _, _) = common::setup_test_env();
    let files = ["/x.txt", "/a/y.txt", "/a/b/z.txt", "/a/b/c/w.txt"];
    for file in files {
        common::put_file(&connector, file, b"data").await;
    }

    for id in ["/x.txt", "/a", "/a/y.txt", "/a/b", "/a/b/z.txt", "/a/b/c", "/a/b/c/w.txt"] {
        let parent = parent_id(id).unwrap();
        let children = common::all_children(&connector, &parent).await;
        assert!(
            children.iter().any(|child| child == id),
            "{parent} does not list {id}: {children:?}"
        );
    }
}

#[tokio::test]
async fn test_key_derivation_is_idempotent_over_listed_ids() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/docs/report.txt", b"r").await;
    common::put_file(&connector, "/docs/notes/readme.md", b"n").await;

    for id in common::all_children(&connector, "/docs").await {
        let once = blob_key(&id).unwrap();
        assert_eq!(blob_key(&id_for_key(&once)).unwrap(), once);
    }
}

#[tokio::test]
async fn test_extra_properties_override_computed_ones() {
    let (connector, _, extra) = common::setup_test_env();
    common::put_file(&connector, "/a.txt", b"a").await;

    let mut overrides = Properties::new();
    overrides.insert("jcr:primaryType".into(), "ex:report".into());
    overrides.insert(JCR_CREATED.into(), "long ago".into());
    overrides.insert("ex:title".into(), "Report".into());
    extra.store_properties("/a.txt", overrides).await.unwrap();

    let file = connector.get_document("/a.txt").await.unwrap().unwrap();
    assert_eq!(file.primary_type(), &PrimaryType::Other("ex:report".into()));
    assert_eq!(file.property(JCR_CREATED), Some(&"long ago".into()));
    assert_eq!(file.property("ex:title"), Some(&"Report".into()));
    // computed properties without an override survive
    assert!(file.property(ABSOLUTE_URI).is_some());
}

#[tokio::test]
async fn test_mime_mixin_mode() {
    let (connector, _, _) = common::setup_with_options(ConnectorOptions {
        add_mime_type_mixin: true,
        ..Default::default()
    });
    common::put_file(&connector, "/docs/readme.txt", b"plain words").await;

    let folder = connector.get_document("/docs").await.unwrap().unwrap();
    assert_eq!(folder.mixin_types(), [MIX_MIME_TYPE.to_string()]);

    let content = connector
        .get_document("/docs/readme.txt/jcr:content")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(content.mixin_types(), [MIX_MIME_TYPE.to_string()]);
    assert_eq!(content.property(JCR_MIME_TYPE), Some(&"text/plain".into()));
    assert_eq!(content.property(JCR_ENCODING), Some(&PropertyValue::Null));

    // detection failure is logged, not raised
    let missing = connector
        .get_document("/docs/gone.txt/jcr:content")
        .await
        .unwrap()
        .unwrap();
    assert!(missing.property(JCR_MIME_TYPE).is_none());
}

#[tokio::test]
async fn test_mime_is_not_computed_by_default() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/readme.txt", b"plain words").await;

    let content = connector
        .get_document("/readme.txt/jcr:content")
        .await
        .unwrap()
        .unwrap();
    assert!(content.property(JCR_MIME_TYPE).is_none());
    assert!(content.property(JCR_ENCODING).is_none());
    assert!(content.mixin_types().is_empty());
}

#[tokio::test]
async fn test_has_document_and_locator() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/docs/report.txt", b"report").await;

    assert!(connector.has_document("/docs").await.unwrap());
    assert!(connector.has_document("/docs/report.txt").await.unwrap());
    assert!(!connector.has_document("/docs/other.txt").await.unwrap());
    assert_eq!(
        connector.get_document_id("/docs").await.unwrap().as_deref(),
        Some("/docs")
    );

    let file = connector.get_document("/docs/report.txt").await.unwrap().unwrap();
    let locator = file.property(ABSOLUTE_URI).and_then(|v| v.as_str()).unwrap();
    let binary = connector.get_binary_value(locator);
    assert_eq!(binary.to_bytes().await.unwrap().as_ref(), b"report");
    assert_eq!(binary.size().await.unwrap(), 6);
}

#[tokio::test]
async fn test_listed_children_with_escapable_names_resolve() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/docs/a#1.txt", b"hash").await;
    common::put_file(&connector, "/docs/50%.txt", b"percent").await;
    common::put_file(&connector, "/docs/a b.txt", b"space").await;

    let docs = connector.get_document("/docs").await.unwrap().unwrap();
    let ids: Vec<&str> = docs.children().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["/docs/50%.txt", "/docs/a b.txt", "/docs/a#1.txt"]);

    for (child, expected) in docs.children().iter().zip([&b"percent"[..], b"space", b"hash"]) {
        let file = connector.get_document(&child.id).await.unwrap().unwrap();
        assert_eq!(file.parent(), Some("/docs"));

        let content_id = &file.children()[0].id;
        let content = connector.get_document(content_id).await.unwrap().unwrap();
        let bytes = content.binary().unwrap().to_bytes().await.unwrap();
        assert_eq!(&bytes[..], expected);
    }
}

#[tokio::test]
async fn test_list_limit_bounds_children() {
    let (connector, _, _) = common::setup_with_options(ConnectorOptions {
        page_size: 2,
        list_limit: 3,
        ..Default::default()
    });
    for name in ["e", "d", "c", "b", "a"] {
        common::put_file(&connector, &format!("/many/{name}.txt"), b"x").await;
    }

    let children = common::all_children(&connector, "/many").await;
    assert_eq!(children, vec!["/many/a.txt", "/many/b.txt", "/many/c.txt"]);

    let folder = connector.get_document("/many").await.unwrap().unwrap();
    let page = folder.page().unwrap();
    assert_eq!((page.offset, page.size, page.remaining), (2, 2, 1));
}
