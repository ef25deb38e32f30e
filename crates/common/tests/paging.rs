//! Integration tests for paged folder listings

mod common;

use std::collections::HashSet;

use ::common::connector::{ConnectorError, ConnectorOptions, PageDescriptor, PageKey};

fn options(page_size: usize) -> ConnectorOptions {
    ConnectorOptions {
        page_size,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_first_page_descriptor() {
    let (connector, _, _) = common::setup_with_options(options(1));
    for name in ["a", "b", "c"] {
        common::put_file(&connector, &format!("/x/{name}"), b"data").await;
    }

    let folder = connector.get_document("/x").await.unwrap().unwrap();
    assert_eq!(folder.children().len(), 1);
    assert_eq!(folder.children()[0].id, "/x/a");
    assert_eq!(
        folder.page(),
        Some(&PageDescriptor {
            offset: 1,
            size: 1,
            remaining: 2
        })
    );
}

#[tokio::test]
async fn test_exhausting_pages_yields_every_child_once() {
    let (connector, _, _) = common::setup_with_options(options(1));
    for name in ["a", "b", "c"] {
        common::put_file(&connector, &format!("/x/{name}"), b"data").await;
    }

    let children = common::all_children(&connector, "/x").await;
    assert_eq!(children, vec!["/x/a", "/x/b", "/x/c"]);
    let distinct: HashSet<&String> = children.iter().collect();
    assert_eq!(distinct.len(), 3);
}

#[tokio::test]
async fn test_adjacent_windows_match_a_double_window() {
    let (connector, _, _) = common::setup_test_env();
    for i in 0..9 {
        common::put_file(&connector, &format!("/many/f{i}.bin"), b"x").await;
    }

    for n in 1..5 {
        let first = connector
            .get_children(&PageKey::new("/many", 0, n))
            .await
            .unwrap()
            .unwrap();
        let second = connector
            .get_children(&PageKey::new("/many", n, n))
            .await
            .unwrap()
            .unwrap();
        let double = connector
            .get_children(&PageKey::new("/many", 0, 2 * n))
            .await
            .unwrap()
            .unwrap();

        let mut joined = first.children().to_vec();
        joined.extend_from_slice(second.children());
        assert_eq!(joined, double.children(), "block size {n}");
    }
}

#[tokio::test]
async fn test_last_page_has_no_descriptor() {
    let (connector, _, _) = common::setup_with_options(options(2));
    for name in ["a", "b", "c"] {
        common::put_file(&connector, &format!("/x/{name}"), b"data").await;
    }

    let last = connector
        .get_children(&PageKey::new("/x", 2, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.children().len(), 1);
    assert!(last.page().is_none());

    let past = connector
        .get_children(&PageKey::new("/x", 10, 2))
        .await
        .unwrap()
        .unwrap();
    assert!(past.children().is_empty());
    assert!(past.page().is_none());
}

#[tokio::test]
async fn test_page_key_from_string() {
    let (connector, _, _) = common::setup_with_options(options(1));
    for name in ["a", "b"] {
        common::put_file(&connector, &format!("/x/{name}"), b"data").await;
    }

    let key: PageKey = "/x#1#1".parse().unwrap();
    let page = connector.get_children(&key).await.unwrap().unwrap();
    assert_eq!(page.children()[0].id, "/x/b");
}

#[tokio::test]
async fn test_children_of_non_folders() {
    let (connector, _, _) = common::setup_test_env();
    common::put_file(&connector, "/file.txt", b"data").await;

    assert!(connector
        .get_children(&PageKey::new("/file.txt", 0, 5))
        .await
        .unwrap()
        .is_none());
    assert!(connector
        .get_children(&PageKey::new("/file.txt/jcr:content", 0, 5))
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        connector.get_children(&PageKey::new("/", 0, 0)).await,
        Err(ConnectorError::InvalidPageKey(_))
    ));
}
